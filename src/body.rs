// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The question section of a query.

/// Domain name structure and funtions
pub mod name;

use crate::binutils::safe_u16_read;
use crate::body::name::Name;
use crate::ParseError;

/// The type of [Question]. Only host addresses are answered, every other type is
/// kept as its raw value.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum QType {
    /// A host address (IPv4)
    A,
    /// Any other type.
    Unknown(u16),
}

impl From<u16> for QType {
    #[inline]
    fn from(value: u16) -> Self {
        match value {
            1 => Self::A,
            _ => Self::Unknown(value),
        }
    }
}

impl From<QType> for u16 {
    #[inline]
    fn from(value: QType) -> Self {
        match value {
            QType::A => 1,
            QType::Unknown(n) => n,
        }
    }
}

/// The class of [Question], only the internet is answered.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Class {
    /// IN: the Internet
    IN,
    /// Any other class.
    Unknown(u16),
}

impl From<u16> for Class {
    #[inline]
    fn from(value: u16) -> Self {
        match value {
            1 => Self::IN,
            _ => Self::Unknown(value),
        }
    }
}

impl From<Class> for u16 {
    #[inline]
    fn from(value: Class) -> Self {
        match value {
            Class::IN => 1,
            Class::Unknown(n) => n,
        }
    }
}

/// A query for the records of the specified [QType] and [Class] owned by a [Name].
///
/// ```text
///    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///    |                                               |
///    /                     QNAME                     /
///    /                                               /
///    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///    |                     QTYPE                     |
///    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///    |                     QCLASS                    |
///    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
#[derive(Clone, Debug)]
pub struct Question<'a> {
    /// The domain name to be queried
    pub name: Name<'a>,
    /// The type of record being queried
    pub qtype: QType,
    /// The class of record being queried
    pub class: Class,
}

impl<'a> Question<'a> {
    /// Parse from the specified `buff`, starting at position `start`.
    ///
    /// Returns the question and the number of bytes it takes in `buff`.
    ///
    /// # Errors
    ///
    /// It will error if the name is malformed or if the buffer ends before the
    /// type and class.
    #[inline]
    pub fn parse(buff: &'a [u8], start: usize) -> Result<(Self, usize), ParseError> {
        let (name, size) = Name::parse(buff, start)?;
        let n = start + size;
        Ok((
            Question {
                name,
                qtype: safe_u16_read(buff, n)?.into(),
                class: safe_u16_read(buff, n + 2)?.into(),
            },
            size + 4,
        ))
    }

    /// The queried name, but only for host address queries on the internet (`A` and `IN`).
    #[inline]
    pub fn host_name(&self) -> Option<&Name<'a>> {
        match (self.qtype, self.class) {
            (QType::A, Class::IN) => Some(&self.name),
            _ => None,
        }
    }
}
