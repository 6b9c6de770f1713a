//! Membership filters consulted by [`crate::Set`] before it scans its buffer.

pub mod bloom;
pub mod cuckoo;
pub mod cuckoo_table;
pub mod hash_set;
pub mod null;

use std::hash::{BuildHasherDefault, DefaultHasher};

/// Hasher used by filters built through `Default`. Deterministic across runs.
pub type DefaultBuildHasher = BuildHasherDefault<DefaultHasher>;

/// Outcome of a filter lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    /// The value is definitely present.
    Found,
    /// The value is definitely absent.
    NotFound,
    /// The value may be present; the caller has to check.
    Maybe,
}

pub trait SetMembership<T> {
    type InsertError;

    fn query(&self, item: &T) -> Query;
    fn insert(&mut self, item: &T) -> Result<(), Self::InsertError>;
    /// The caller guarantees `item` was previously inserted.
    fn remove(&mut self, item: &T);
    /// Forgets every value while keeping sizes, hashers and other settings.
    fn clear(&mut self);
}
