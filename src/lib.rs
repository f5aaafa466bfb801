// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # DNSBL parser
//!
//! Decoding of DNS blocklist queries and the building blocks to encode the replies.
//!
//! Only the subset of the protocol a blocklist needs is understood: the 12 byte
//! header and the first question of a query. Resource records are never parsed,
//! and the [reply] module writes the two fixed reply layouts of the list.
//!
//! ```
//! use dnsbl_parser::Query;
//!
//! let datagram = [
//!     0x12, 0x34, 0x01, 0x00, 0, 1, 0, 0, 0, 0, 0, 0, // header
//!     7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 3, b'n', b'e', b't', 0, // example.net
//!     0, 1, 0, 1, // A IN
//! ];
//! let query = Query::try_from(&datagram[..]).unwrap();
//! assert_eq!(query.header.id, 0x1234);
//! assert_eq!(query.host_name().unwrap().to_string(), "example.net");
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    rustdoc::broken_intra_doc_links
)]

use thiserror::Error;

use body::name::Name;
use body::Question;
use header::DnsHeader;

mod binutils;
pub mod body;
pub mod header;
pub mod reply;

/// Size in bytes of the DNS header, the question always starts right after it.
pub const HEADER_SIZE: usize = 12;

// +---------------------+
// |        Header       |
// +---------------------+
// |       Question      | only the first one is decoded
// +---------------------+
// |   Answer/Authority  | ignored
// |      Additional     |
// +---------------------+
/// A DNS query as seen by the blocklist.
///
/// The question is only decoded when the header flags describe a standard query
/// (see [header::is_standard]), otherwise it is left as `None` even if the datagram
/// carries one. The record counts of the header are not validated: a query with
/// `questions != 1` is decoded as if it had exactly one question.
#[derive(Clone, Debug)]
pub struct Query<'a> {
    /// The header of the query.
    pub header: DnsHeader,
    /// The first question, if the flags allowed decoding it.
    pub question: Option<Question<'a>>,
}

impl<'a> TryFrom<&'a [u8]> for Query<'a> {
    type Error = ParseError;

    fn try_from(buff: &'a [u8]) -> Result<Self, Self::Error> {
        let header = DnsHeader::try_from(buff)?;
        let question = if header.is_standard_query() {
            let (question, _) = Question::parse(buff, HEADER_SIZE)?;
            Some(question)
        } else {
            None
        };
        Ok(Self { header, question })
    }
}

impl<'a> Query<'a> {
    /// The queried host name, only present for standard queries of type `A` and class `IN`.
    #[inline]
    pub fn host_name(&self) -> Option<&Name<'a>> {
        self.question.as_ref().and_then(Question::host_name)
    }
}

/// Read the transaction id of a datagram.
///
/// Only the first two bytes are needed, so this works even when the rest of the
/// datagram is too short or malformed to be parsed as a [Query].
///
/// ```
/// # use dnsbl_parser::transaction_id;
/// assert_eq!(transaction_id(&[0xab, 0xcd, 0x01]).unwrap(), 0xabcd);
/// assert!(transaction_id(&[0xab]).is_err());
/// ```
#[inline]
pub fn transaction_id(buff: &[u8]) -> Result<u16, ParseError> {
    binutils::safe_u16_read(buff, 0)
}

/// The errors that can be found while decoding or encoding DNS data.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// The datagram does not contain a complete header.
    #[error(
        "Length of package ({0} bytes) is too small to contain a DNS header ({} bytes in length).",
        HEADER_SIZE
    )]
    HeaderLength(usize),
    /// A label length overflows the rest of the package or does not fit in a length byte.
    #[error("Specified label length ({0}) is too long, it overflows the rest of the package or does not fit in a single byte.")]
    LabelLength(usize),
    /// A read went past the end of the datagram.
    #[error("Out-of-bounds read attempt at position {0}")]
    OobRead(usize),
    /// A label is not valid UTF-8 text.
    #[error("Non UTF-8 label: {0}")]
    NonUtf8(#[from] std::str::Utf8Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{Class, QType};

    const QUERY: [u8; 43] = [
        0x12, 0x34, 0x01, 0x00, 0, 1, 0, 0, 0, 0, 0, 0, // header
        1, 52, 1, 51, 1, 50, 1, 49, // 4.3.2.1
        5, 100, 110, 115, 98, 108, // dnsbl
        7, 101, 120, 97, 109, 112, 108, 101, // example
        3, 99, 111, 109, 0, // com
        0, 1, 0, 1, // A IN
    ];

    #[test]
    fn standard_query() {
        let query = Query::try_from(&QUERY[..]).unwrap();
        assert_eq!(query.header.id, 0x1234);
        assert_eq!(query.header.questions, 1);
        let question = query.question.as_ref().unwrap();
        assert_eq!(question.qtype, QType::A);
        assert_eq!(question.class, Class::IN);
        assert_eq!(
            query.host_name().unwrap().to_string(),
            "4.3.2.1.dnsbl.example.com"
        );
    }

    #[test]
    fn dnssec_ok_query() {
        let mut buff = QUERY;
        buff[3] = 0x20;
        let query = Query::try_from(&buff[..]).unwrap();
        assert!(query.host_name().is_some());
    }

    #[test]
    fn question_skipped_with_unexpected_flags() {
        let mut buff = QUERY;
        buff[3] = 0x01;
        let query = Query::try_from(&buff[..]).unwrap();
        assert_eq!(query.header.id, 0x1234);
        assert_eq!(query.header.flags, 0x0101);
        assert!(query.question.is_none());
        assert!(query.host_name().is_none());
    }

    #[test]
    fn question_skipped_even_if_corrupt() {
        let buff = [0x12, 0x34, 0x00, 0x80, 0, 1, 0, 0, 0, 0, 0, 0, 60, 1];
        let query = Query::try_from(&buff[..]).unwrap();
        assert!(query.question.is_none());
    }

    #[test]
    fn not_an_address_query() {
        let mut buff = QUERY;
        buff[40] = 28; // AAAA
        let query = Query::try_from(&buff[..]).unwrap();
        assert_eq!(query.question.as_ref().unwrap().qtype, QType::Unknown(28));
        assert!(query.host_name().is_none());

        let mut buff = QUERY;
        buff[42] = 3; // CH
        let query = Query::try_from(&buff[..]).unwrap();
        assert!(query.host_name().is_none());
    }

    #[test]
    fn question_count_ignored() {
        let mut buff = QUERY;
        buff[5] = 0;
        let query = Query::try_from(&buff[..]).unwrap();
        assert_eq!(query.header.questions, 0);
        assert!(query.host_name().is_some());
    }

    #[test]
    fn truncated_question() {
        assert_eq!(
            Query::try_from(&QUERY[..41]).unwrap_err(),
            ParseError::OobRead(41)
        );
        assert_eq!(
            Query::try_from(&QUERY[..23]).unwrap_err(),
            ParseError::LabelLength(5)
        );
    }

    #[test]
    fn truncated_header() {
        assert_eq!(
            Query::try_from(&QUERY[..7]).unwrap_err(),
            ParseError::HeaderLength(7)
        );
        assert_eq!(transaction_id(&QUERY[..7]).unwrap(), 0x1234);
    }
}
