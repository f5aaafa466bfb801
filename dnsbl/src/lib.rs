// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A DNS blocklist for IPv4 addresses.
//!
//! Clients ask for `4.3.2.1.<domain>` to know if `1.2.3.4` is listed. Listed
//! addresses get a (deliberately abbreviated) `A` answer, everything else gets
//! NXDOMAIN.

#![warn(rust_2018_idioms, missing_debug_implementations)]

use std::net::SocketAddr;

use dnsbl_server::{reply, transaction_id, Class, Name, ParseError, QType, Query, ServerService};
use pretty_hex::simple_hex;
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod config;
mod lookup;
pub mod store;

pub use lookup::LookupKey;
pub use store::Blocklist;

/// Why a query was answered with NXDOMAIN.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Unlisted {
    #[error("flags {0:#06x} are not a standard query")]
    MalformedFlags(u16),
    #[error("not a host address query on the internet ({qtype:?} {class:?})")]
    UnsupportedQuestion { qtype: QType, class: Class },
    #[error("{0} is not an address under the blocklist domain")]
    NoDomainMatch(String),
    #[error("{0} is not listed")]
    KeyNotFound(LookupKey),
    #[error("malformed query: {0}")]
    TruncatedDatagram(#[from] ParseError),
}

/// The blocklist service: decodes each query, looks the address up in a
/// [Blocklist] and encodes the reply.
#[derive(Debug)]
pub struct Dnsbl<'a, B> {
    suffix: Name<'a>,
    store: B,
}

impl<'a, B: Blocklist> Dnsbl<'a, B> {
    /// Create a blocklist for queries under `suffix`, answering with the addresses in `store`.
    pub fn new(suffix: Name<'a>, store: B) -> Self {
        Dnsbl { suffix, store }
    }

    /// Find the listed address a datagram asks for.
    pub fn resolve(&self, datagram: &[u8]) -> Result<LookupKey, Unlisted> {
        let query = Query::try_from(datagram)?;
        self.lookup(&query).map(|(key, _)| key)
    }

    /// Build the reply to a datagram.
    ///
    /// # Errors
    ///
    /// Only datagrams too short to carry a transaction id can not be answered.
    pub fn reply(&self, datagram: &[u8]) -> Result<Vec<u8>, ParseError> {
        let id = transaction_id(datagram)?;
        let found = Query::try_from(datagram)
            .map_err(Unlisted::from)
            .and_then(|query| {
                self.lookup(&query)
                    .map(|(key, name)| (key, name.split_dotted_labels()))
            });
        let owner = match found {
            Ok((key, owner)) => {
                info!(%key, "listed");
                Some(owner)
            }
            Err(reason) => {
                debug!(%reason, "answering NXDOMAIN");
                None
            }
        };
        Ok(reply::encode(id, owner.as_ref()))
    }

    fn lookup<'q, 'd>(&self, query: &'q Query<'d>) -> Result<(LookupKey, &'q Name<'d>), Unlisted> {
        let header = &query.header;
        debug!(
            id = header.id,
            flags = format_args!("{:#06x}", header.flags),
            questions = header.questions,
            answers = header.answers,
            authority = header.authority,
            additional = header.additional,
            "header"
        );

        let question = query
            .question
            .as_ref()
            .ok_or(Unlisted::MalformedFlags(header.flags))?;
        debug!(name = %question.name, qtype = ?question.qtype, class = ?question.class, "question");
        let name = question
            .host_name()
            .ok_or(Unlisted::UnsupportedQuestion {
                qtype: question.qtype,
                class: question.class,
            })?;

        let key = LookupKey::from_name(name, &self.suffix)
            .ok_or_else(|| Unlisted::NoDomainMatch(name.to_string()))?;
        if self.store.contains(&key) {
            Ok((key, name))
        } else {
            Err(Unlisted::KeyNotFound(key))
        }
    }
}

impl<B: Blocklist> ServerService for Dnsbl<'_, B> {
    fn run(&self, client: SocketAddr, datagram: &[u8]) -> Option<Vec<u8>> {
        debug!(%client, query = %simple_hex(&datagram), "query received");
        match self.reply(datagram) {
            Ok(reply) => Some(reply),
            Err(e) => {
                warn!(%client, error = %e, "dropping datagram without transaction id");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    const DOMAIN: &str = "dnsbl.example.com";

    fn query(id: u16, flags: u16, name: &str, qtype: u16, class: u16) -> Vec<u8> {
        let labels: Vec<&str> = name.split('.').collect();
        query_labels(id, flags, &labels, qtype, class)
    }

    fn query_labels(id: u16, flags: u16, labels: &[&str], qtype: u16, class: u16) -> Vec<u8> {
        let mut out = vec![];
        for n in [id, flags, 1, 0, 0, 0] {
            out.extend(n.to_be_bytes());
        }
        for label in labels {
            out.push(label.len() as u8);
            out.extend(label.as_bytes());
        }
        out.push(0);
        out.extend(qtype.to_be_bytes());
        out.extend(class.to_be_bytes());
        out
    }

    fn listed() -> BTreeSet<String> {
        ["1.2.3.4".to_string()].into_iter().collect()
    }

    fn dnsbl(store: &BTreeSet<String>) -> Dnsbl<'static, &BTreeSet<String>> {
        Dnsbl::new(Name::try_from(DOMAIN).unwrap(), store)
    }

    #[test]
    fn listed_address() {
        let store = listed();
        let q = query(0x1234, 0x0100, "4.3.2.1.dnsbl.example.com", 1, 1);
        let reply = dnsbl(&store).reply(&q).unwrap();

        let mut expected = vec![0x12, 0x34, 0x81, 0x80, 0, 1, 0, 1, 0, 0, 0, 0];
        expected.extend(&q[12..q.len() - 4]);
        expected.extend([0, 1, 0, 1, 0xC0, 0x0C]);
        assert_eq!(reply, expected);
    }

    #[test]
    fn unlisted_address() {
        let store = listed();
        let q = query(0x1234, 0x0100, "5.3.2.1.dnsbl.example.com", 1, 1);
        let service = dnsbl(&store);
        assert_eq!(
            service.resolve(&q),
            Err(Unlisted::KeyNotFound(
                LookupKey::from_query("5.3.2.1.dnsbl.example.com", DOMAIN).unwrap()
            ))
        );
        assert_eq!(service.reply(&q).unwrap(), vec![0x12, 0x34, 0x81, 0x83]);
    }

    #[test]
    fn malformed_flags() {
        let store = listed();
        let q = query(0xabcd, 0x0101, "4.3.2.1.dnsbl.example.com", 1, 1);
        let service = dnsbl(&store);
        assert_eq!(service.resolve(&q), Err(Unlisted::MalformedFlags(0x0101)));
        assert_eq!(service.reply(&q).unwrap(), vec![0xab, 0xcd, 0x81, 0x83]);
    }

    #[test]
    fn unsupported_question() {
        let store = listed();
        let q = query(1, 0x0120, "4.3.2.1.dnsbl.example.com", 28, 1);
        assert_eq!(
            dnsbl(&store).resolve(&q),
            Err(Unlisted::UnsupportedQuestion {
                qtype: QType::Unknown(28),
                class: Class::IN
            })
        );
        assert_eq!(dnsbl(&store).reply(&q).unwrap(), vec![0, 1, 0x81, 0x83]);
    }

    #[test]
    fn outside_the_domain() {
        let store = listed();
        let q = query(2, 0x0100, "4.3.2.1.example.com", 1, 1);
        assert_eq!(
            dnsbl(&store).resolve(&q),
            Err(Unlisted::NoDomainMatch("4.3.2.1.example.com".to_string()))
        );
        assert_eq!(dnsbl(&store).reply(&q).unwrap(), vec![0, 2, 0x81, 0x83]);
    }

    #[test]
    fn empty_domain_lists_nothing() {
        let store = listed();
        let service = Dnsbl::new(Name::try_from("").unwrap(), &store);
        let q = query(0x1234, 0x0100, "4.3.2.1", 1, 1);
        assert_eq!(
            service.resolve(&q),
            Err(Unlisted::NoDomainMatch("4.3.2.1".to_string()))
        );
        assert_eq!(service.reply(&q).unwrap(), vec![0x12, 0x34, 0x81, 0x83]);
    }

    #[test]
    fn dotted_labels_are_joined() {
        let store = listed();
        let q = query_labels(0x1234, 0x0100, &["4.3", "2.1", "dnsbl", "example", "com"], 1, 1);
        let reply = dnsbl(&store).reply(&q).unwrap();

        // The owner name is written with one label per group
        let plain = query(0x1234, 0x0100, "4.3.2.1.dnsbl.example.com", 1, 1);
        let mut expected = vec![0x12, 0x34, 0x81, 0x80, 0, 1, 0, 1, 0, 0, 0, 0];
        expected.extend(&plain[12..plain.len() - 4]);
        expected.extend([0, 1, 0, 1, 0xC0, 0x0C]);
        assert_eq!(reply, expected);
    }

    #[test]
    fn truncated_datagrams() {
        let store = listed();
        let service = dnsbl(&store);
        let q = query(0x0303, 0x0100, "4.3.2.1.dnsbl.example.com", 1, 1);
        for len in 2..q.len() {
            assert!(matches!(
                service.resolve(&q[..len]),
                Err(Unlisted::TruncatedDatagram(_))
            ));
            assert_eq!(service.reply(&q[..len]).unwrap(), vec![3, 3, 0x81, 0x83]);
        }
    }

    #[test]
    fn no_transaction_id() {
        let store = listed();
        let service = dnsbl(&store);
        assert!(service.reply(&[]).is_err());
        assert!(service.run("127.0.0.1:53".parse().unwrap(), &[7]).is_none());
    }

    #[test]
    fn same_query_same_reply() {
        let store = listed();
        let service = dnsbl(&store);
        let client = "[::1]:40000".parse().unwrap();
        for name in ["4.3.2.1.dnsbl.example.com", "8.8.8.8.dnsbl.example.com"] {
            let q = query(0x4242, 0x0100, name, 1, 1);
            let first = service.run(client, &q).unwrap();
            let second = service.run(client, &q).unwrap();
            assert_eq!(first, second);
        }
    }
}
