// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::binutils::*;
use crate::ParseError;
use std::fmt;
use std::iter::Copied;
use std::iter::Rev;
use std::str;

const INIT_NUM_LABELS: usize = 8;

/// Every label has to fit behind a single length byte.
pub(crate) const MAX_LABEL_SIZE: usize = u8::MAX as usize;

/// A domain name represented as an inverted list of labels.
///
/// Labels are stored from the top level domain down and printed in the usual
/// order, without the trailing dot of the root.
#[derive(Clone, PartialEq, Eq)]
pub struct Name<'a>(Vec<&'a str>);

type IterHuman<'a> = Rev<IterHierarchy<'a>>;
type IterHierarchy<'a> = Copied<std::slice::Iter<'a, &'a str>>;

impl fmt::Display for Name<'_> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, l) in self.iter_human().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(l)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Name<'_> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string())
    }
}

impl Default for Name<'_> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> TryFrom<&'a str> for Name<'a> {
    type Error = ParseError;

    /// Split a dotted domain name in its labels. Empty labels are ignored, so a
    /// trailing dot for the root is accepted.
    fn try_from(value: &'a str) -> Result<Self, Self::Error> {
        let mut name = Name::default();
        for label in value.rsplit('.') {
            name.push_label(label)?;
        }
        Ok(name)
    }
}

impl<'a> Name<'a> {
    /// Parse from the specified `buff`, starting at position `pos`.
    ///
    /// Returns the name and the number of bytes it takes in `buff`, including the
    /// terminating zero. Every non-zero byte is read as the length of the next label:
    /// compression pointers are not followed and the 63 bytes label limit is not
    /// enforced.
    ///
    /// ```
    /// # use dnsbl_parser::body::name::Name;
    /// let buff = [3, b'w', b'w', b'w', 7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 0, 0, 1];
    /// let (name, n) = Name::parse(&buff, 0).unwrap();
    /// assert_eq!(n, 13);
    /// assert_eq!(name.to_string(), "www.example");
    /// ```
    ///
    /// # Errors
    ///
    /// It will error if a label length goes past the end of `buff`, if there is no
    /// terminating zero or if some label is not valid UTF-8.
    #[inline]
    pub fn parse(buff: &'a [u8], pos: usize) -> Result<(Self, usize), ParseError> {
        let (positions, n) = find_labels(buff, pos)?;
        let name = parse_labels(buff, positions)?;
        Ok((name, n))
    }

    /// Serialize the [Name] and append it tho the end of the provided `packet`
    ///
    /// ```
    /// # use dnsbl_parser::body::name::Name;
    /// let name = Name::try_from("abcdef.com").unwrap();
    /// let mut out = Vec::new();
    /// name.serialize(&mut out);
    /// assert_eq!(out, b"\x06abcdef\x03com\x00");
    /// ```
    #[inline]
    pub fn serialize(&self, packet: &mut Vec<u8>) {
        for label in self.iter_human() {
            // Labels longer than a byte can not be built, see `push_label` and `try_from`
            packet.push(label.len() as u8);
            packet.extend(label.as_bytes());
        }
        packet.push(0u8);
    }

    /// Create a new, empty, domain name.
    ///
    /// ```
    /// # use dnsbl_parser::body::name::Name;
    /// let name = Name::new();
    /// assert_eq!(name.to_string(), "".to_string());
    /// assert_eq!(name.label_count(), 0);
    /// ```
    #[inline]
    pub fn new() -> Self {
        Name(Vec::with_capacity(INIT_NUM_LABELS))
    }

    /// Push a new label to the end of the domain name, as a subdomain of the current one. Empty
    /// labels will be ignored.
    ///
    /// ```
    /// # use dnsbl_parser::body::name::Name;
    /// let mut name = Name::new();
    /// name.push_label("com").unwrap();
    /// name.push_label("example").unwrap();
    /// assert_eq!(name.to_string(), "example.com".to_string())
    /// ```
    ///
    /// # Errors
    ///
    /// It will error if the label does not fit behind a length byte.
    #[inline]
    pub fn push_label(&mut self, label: &'a str) -> Result<(), ParseError> {
        if label.len() > MAX_LABEL_SIZE {
            Err(ParseError::LabelLength(label.len()))?
        }
        if !label.is_empty() {
            self.0.push(label);
        }
        Ok(())
    }

    /// Get the number of labels in the domain name.
    ///
    /// ```
    /// # use dnsbl_parser::body::name::Name;
    /// let name = Name::try_from("example.com").unwrap();
    /// assert_eq!(2, name.label_count())
    /// ```
    #[inline]
    pub fn label_count(&self) -> usize {
        self.0.len()
    }

    /// Return an iterator over the labels in human order.
    ///
    /// ```
    /// # use dnsbl_parser::body::name::Name;
    /// let name = Name::try_from("subdomain.example.com").unwrap();
    /// let mut human = name.iter_human();
    ///
    /// assert_eq!(human.next(), Some("subdomain"));
    /// assert_eq!(human.next(), Some("example"));
    /// assert_eq!(human.next(), Some("com"));
    /// ```
    #[inline]
    pub fn iter_human(&self) -> IterHuman<'_> {
        self.iter_hierarchy().rev()
    }

    /// Return an iterator over the labels in hierarchical order.
    ///
    /// ```
    /// # use dnsbl_parser::body::name::Name;
    /// let name = Name::try_from("subdomain.example.com").unwrap();
    /// let mut hierarchy = name.iter_hierarchy();
    ///
    /// assert_eq!(hierarchy.next(), Some("com"));
    /// assert_eq!(hierarchy.next(), Some("example"));
    /// assert_eq!(hierarchy.next(), Some("subdomain"));
    /// ```
    #[inline]
    pub fn iter_hierarchy(&self) -> IterHierarchy<'_> {
        self.0.iter().copied()
    }

    /// Split every label that contains dots, the way the dotted form of the name
    /// would be split. Empty pieces are dropped.
    ///
    /// ```
    /// # use dnsbl_parser::body::name::Name;
    /// let mut name = Name::try_from("example.com").unwrap();
    /// name.push_label("4.3").unwrap();
    /// assert_eq!(name.label_count(), 3);
    ///
    /// let split = name.split_dotted_labels();
    /// assert_eq!(split.label_count(), 4);
    /// assert_eq!(split.iter_human().next(), Some("4"));
    /// ```
    pub fn split_dotted_labels(&self) -> Name<'a> {
        // Pieces are never longer than the label they come from
        Name(
            self.0
                .iter()
                .flat_map(|label| label.split('.').rev())
                .filter(|piece| !piece.is_empty())
                .collect(),
        )
    }
}

type LabelsPositions = Vec<(usize, usize)>;

#[inline]
fn parse_labels(buff: &[u8], positions: LabelsPositions) -> Result<Name<'_>, ParseError> {
    let mut name = Name::new();
    for (pos, size) in positions.into_iter().rev() {
        let label = str::from_utf8(&buff[pos..pos + size])?;
        name.0.push(label);
    }
    Ok(name)
}

fn find_labels(buff: &[u8], start: usize) -> Result<(LabelsPositions, usize), ParseError> {
    let blen = buff.len();
    let mut positions = LabelsPositions::with_capacity(INIT_NUM_LABELS);
    let mut pos = start;
    loop {
        match safe_u8_read(buff, pos)? as usize {
            0 => return Ok((positions, pos + 1 - start)),
            s if blen <= pos + s => Err(ParseError::LabelLength(s))?,
            s => {
                positions.push((pos + 1, s));
                pos += s + 1;
            }
        }
    }
}
