//! Fixed-size lookup tables built from literal key/value lists.
//!
//! A [`Lut`] stores its entries inline in a sorted array, so lookups are a
//! binary search with no heap allocation. Tables keyed by `&'static str` or
//! `i32` can be built in a `const` context with [`Lut::from_sorted`] or
//! [`Lut::from_sorted_codes`]; an unsorted or duplicated literal then fails
//! compilation. Other key types are
//! sorted at load time by [`Lut::new`], which rejects duplicate keys.
//!
//! ```rust
//! use paddock::lut::Lut;
//!
//! const GEARS: Lut<&str, u8, 3> = Lut::from_sorted([("first", 1), ("second", 2), ("third", 3)]);
//!
//! assert_eq!(GEARS.get("second").ok(), Some(&2));
//! assert!(GEARS.get("reverse").is_err());
//! ```

use std::borrow::Borrow;
use std::fmt;

use crate::{Result, TelemetryError};

/// Immutable sorted key/value table with `N` entries.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Lut<K, V, const N: usize> {
    entries: [(K, V); N],
}

impl<V: Copy, const N: usize> Lut<&'static str, V, N> {
    /// Build a table from entries already in strictly ascending key order.
    ///
    /// Panics (at compile time when used in a `const`) if the keys are out of
    /// order or repeated.
    pub const fn from_sorted(entries: [(&'static str, V); N]) -> Self {
        let mut i = 1;
        while i < N {
            if !str_precedes(entries[i - 1].0, entries[i].0) {
                panic!("lookup table keys must be unique and in ascending order");
            }
            i += 1;
        }
        Self { entries }
    }
}

impl<V: Copy, const N: usize> Lut<i32, V, N> {
    /// Build a table keyed by integer codes in strictly ascending order.
    pub const fn from_sorted_codes(entries: [(i32, V); N]) -> Self {
        let mut i = 1;
        while i < N {
            if entries[i - 1].0 >= entries[i].0 {
                panic!("lookup table keys must be unique and in ascending order");
            }
            i += 1;
        }
        Self { entries }
    }
}

const fn str_precedes(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut i = 0;
    while i < a.len() && i < b.len() {
        if a[i] != b[i] {
            return a[i] < b[i];
        }
        i += 1;
    }
    a.len() < b.len()
}

impl<K: Ord + fmt::Debug, V, const N: usize> Lut<K, V, N> {
    /// Build a table from entries in any order, rejecting duplicate keys.
    pub fn new(mut entries: [(K, V); N]) -> Result<Self> {
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        if let Some(pair) = entries.windows(2).find(|pair| pair[0].0 == pair[1].0) {
            return Err(TelemetryError::DuplicateKey { key: format!("{:?}", pair[0].0) });
        }
        Ok(Self { entries })
    }
}

impl<K: Ord, V, const N: usize> Lut<K, V, N> {
    /// Look up a key, returning `None` if absent.
    pub fn lookup<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.entries
            .binary_search_by(|(candidate, _)| <K as Borrow<Q>>::borrow(candidate).cmp(key))
            .ok()
            .map(|index| &self.entries[index].1)
    }

    /// Look up a key, failing with [`TelemetryError::NotFound`] if absent.
    pub fn get<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: Ord + fmt::Display + ?Sized,
    {
        self.lookup(key).ok_or_else(|| TelemetryError::not_found(key))
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.lookup(key).is_some()
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

impl<K: fmt::Debug, V: fmt::Debug, const N: usize> fmt::Debug for Lut<K, V, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter().map(|(k, v)| (k, v))).finish()
    }
}
