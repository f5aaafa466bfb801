// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The two replies a blocklist can give.
//!
//! Both are abbreviated compared to a complete DNS message:
//!
//! ```text
//! listed:   ID | 0x8180 | 1 | 1 | 0 | 0 | QNAME | TYPE A | CLASS IN | 0xC00C
//! unlisted: ID | 0x8183
//! ```
//!
//! The listed reply ends with the compression pointer that would start the answer
//! record; there is no TTL, RDLENGTH or RDATA after it. The unlisted reply has no
//! record counts at all.

use crate::binutils::push_u16;
use crate::body::name::Name;
use crate::body::{Class, QType};
use crate::header::{reply_flags, DnsHeader, ResponseCode};
use crate::HEADER_SIZE;

/// Compression pointer to the question name, which always starts right after the header.
pub const QUESTION_POINTER: u16 = 0b1100_0000_0000_0000 | HEADER_SIZE as u16;

/// Encode the reply for transaction `id`.
///
/// With `Some(name)` the reply tells the client that `name` is listed, with `None`
/// it is an NXDOMAIN.
///
/// ```
/// # use dnsbl_parser::reply::encode;
/// assert_eq!(encode(0x1234, None), vec![0x12, 0x34, 0x81, 0x83]);
/// ```
pub fn encode(id: u16, listed: Option<&Name<'_>>) -> Vec<u8> {
    match listed {
        Some(name) => listed_reply(id, name),
        None => unlisted_reply(id),
    }
}

fn listed_reply(id: u16, name: &Name<'_>) -> Vec<u8> {
    let header = DnsHeader {
        id,
        flags: reply_flags(ResponseCode::NoError),
        questions: 1,
        answers: 1,
        authority: 0,
        additional: 0,
    };
    let mut out = Vec::with_capacity(HEADER_SIZE + 64);
    header.serialize(&mut out);
    name.serialize(&mut out);
    push_u16(&mut out, QType::A.into());
    push_u16(&mut out, Class::IN.into());
    push_u16(&mut out, QUESTION_POINTER);
    out
}

fn unlisted_reply(id: u16) -> Vec<u8> {
    let mut out = Vec::with_capacity(4);
    push_u16(&mut out, id);
    push_u16(&mut out, reply_flags(ResponseCode::NXDomain));
    out
}
