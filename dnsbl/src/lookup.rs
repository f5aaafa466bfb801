// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;

use dnsbl_server::Name;

/// Number of groups of digits in front of the blocklist domain.
const OCTETS: usize = 4;

/// The key of an address in the blocklist: its four groups of digits in normal order.
///
/// Queries carry the groups reversed (`4.3.2.1.<domain>` asks for `1.2.3.4`). The
/// groups are only checked to be made of ASCII digits, so `999.0.0.1` is a valid key
/// even though it is not a valid IPv4 address.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LookupKey(String);

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl LookupKey {
    /// Extract the key from a queried `name` under the blocklist `suffix`.
    ///
    /// The dotted form of the name has to be exactly four groups of digits, a dot
    /// and the dotted form of `suffix`, compared case sensitively. Labels are joined
    /// before matching, so a label holding `4.3` counts as two groups. An empty
    /// `suffix` matches nothing.
    pub fn from_name(name: &Name<'_>, suffix: &Name<'_>) -> Option<Self> {
        if suffix.label_count() == 0 {
            return None;
        }
        let name = name.to_string();
        let reversed = name
            .strip_suffix(suffix.to_string().as_str())?
            .strip_suffix('.')?;
        let mut octets: Vec<&str> = reversed.split('.').collect();
        if octets.len() != OCTETS || !octets.iter().all(|o| is_digits(o)) {
            return None;
        }
        octets.reverse();
        Some(LookupKey(octets.join(".")))
    }

    /// Same as [LookupKey::from_name] for dotted domain names.
    pub fn from_query(name: &str, suffix: &str) -> Option<Self> {
        let name = Name::try_from(name).ok()?;
        let suffix = Name::try_from(suffix).ok()?;
        Self::from_name(&name, &suffix)
    }

    /// The key as a string, `1.2.3.4` for a query on `4.3.2.1.<domain>`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_digits(group: &str) -> bool {
    !group.is_empty() && group.bytes().all(|b| b.is_ascii_digit())
}
