// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The DNS header, the check for standard queries and the flags of the replies.

use crate::binutils::*;
use crate::{ParseError, HEADER_SIZE};

/// Response: set in every reply.
const RESPONSE: u16 = 0b1000_0000_0000_0000;
/// Recursion desired: the bit every standard query of a client resolver carries.
pub const STANDARD: u16 = 0b0000_0001_0000_0000;
/// Recursion available: always advertised in the replies.
const RECURSION: u16 = 0b0000_0000_1000_0000;
/// Authentic data: resolvers doing DNSSEC set it, only accepted together with [STANDARD].
pub const EXTRA: u16 = 0b0000_0000_0010_0000;
const EXPECTED: u16 = STANDARD | EXTRA;

/// Check if the raw `flags` of a header describe a standard query.
///
/// No bits other than [STANDARD] and [EXTRA] may be set, and [EXTRA] is only
/// accepted when [STANDARD] is present as well.
///
/// ```
/// # use dnsbl_parser::header::is_standard;
/// assert!(is_standard(0x0100));
/// assert!(is_standard(0x0120));
/// assert!(!is_standard(0x0101));
/// assert!(!is_standard(0x0080));
/// ```
#[inline]
pub fn is_standard(flags: u16) -> bool {
    flags & !EXPECTED == 0 && matches!(flags & EXPECTED, STANDARD | EXPECTED)
}

/// Response code of a reply, the low four bits of its flags.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResponseCode {
    /// The name is listed.
    NoError = 0,
    /// The name does not exist in the blocklist.
    NXDomain = 3,
}

/// The flags a blocklist answers with: a non authoritative response to a
/// recursive query, with recursion available.
///
/// ```
/// # use dnsbl_parser::header::{reply_flags, ResponseCode};
/// assert_eq!(reply_flags(ResponseCode::NoError), 0x8180);
/// assert_eq!(reply_flags(ResponseCode::NXDomain), 0x8183);
/// ```
#[inline]
pub const fn reply_flags(rcode: ResponseCode) -> u16 {
    RESPONSE | STANDARD | RECURSION | rcode as u16
}

/// A DNS header.
///
/// ```text
///       0  1  2  3  4  5  6  7  0  1  2  3  4  5  6  7
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                      ID                       |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |QR|   Opcode  |AA|TC|RD|RA| Z|AD|CD|   RCODE   |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                    QDCOUNT                    |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                    ANCOUNT                    |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                    NSCOUNT                    |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                    ARCOUNT                    |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
///
/// The flags are kept as the raw 16 bits: a query with flags outside the expected
/// set still has to be answered, so they are never rejected while parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DnsHeader {
    /// Transaction id chosen by the client, echoed in the reply.
    pub id: u16,
    /// The raw flags, see [is_standard].
    pub flags: u16,
    /// Question records count
    pub questions: u16,
    /// Answer records count
    pub answers: u16,
    /// Name server records count
    pub authority: u16,
    /// Aditional records count
    pub additional: u16,
}

impl TryFrom<&[u8]> for DnsHeader {
    type Error = ParseError;

    #[inline]
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() < HEADER_SIZE {
            Err(ParseError::HeaderLength(bytes.len()))?
        }
        Ok(DnsHeader {
            id: safe_u16_read(bytes, 0)?,
            flags: safe_u16_read(bytes, 2)?,
            questions: safe_u16_read(bytes, 4)?,
            answers: safe_u16_read(bytes, 6)?,
            authority: safe_u16_read(bytes, 8)?,
            additional: safe_u16_read(bytes, 10)?,
        })
    }
}

impl DnsHeader {
    /// Check the flags with [is_standard].
    #[inline]
    pub fn is_standard_query(&self) -> bool {
        is_standard(self.flags)
    }

    /// Serialize a [DnsHeader] into a vector of bytes.
    #[inline]
    pub fn serialize(&self, target: &mut Vec<u8>) {
        push_u16(target, self.id);
        push_u16(target, self.flags);
        push_u16(target, self.questions);
        push_u16(target, self.answers);
        push_u16(target, self.authority);
        push_u16(target, self.additional);
    }
}
