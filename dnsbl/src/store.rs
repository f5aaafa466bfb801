// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use crate::lookup::LookupKey;

/// A read only set of listed addresses.
pub trait Blocklist {
    /// Check if `key` is listed.
    fn contains(&self, key: &LookupKey) -> bool;
}

/// A blocklist kept as a directory with one entry per listed address, named after
/// its key (`<root>/1.2.3.4`). The content of the entries is not read.
#[derive(Clone, Debug)]
pub struct Directory {
    root: PathBuf,
}

impl Directory {
    /// Use `root` as the blocklist directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The blocklist directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Blocklist for Directory {
    fn contains(&self, key: &LookupKey) -> bool {
        // Keys are only digits and dots, they can not leave the root
        self.root.join(key.as_str()).exists()
    }
}

impl Blocklist for HashSet<String> {
    fn contains(&self, key: &LookupKey) -> bool {
        HashSet::contains(self, key.as_str())
    }
}

impl Blocklist for BTreeSet<String> {
    fn contains(&self, key: &LookupKey) -> bool {
        BTreeSet::contains(self, key.as_str())
    }
}

impl<B: Blocklist + ?Sized> Blocklist for &B {
    fn contains(&self, key: &LookupKey) -> bool {
        (**self).contains(key)
    }
}
