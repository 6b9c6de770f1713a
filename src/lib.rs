//! Insertion-ordered set with pluggable membership filters.
//!
//! [`Set`] keeps its values in insertion order with O(1) indexed access and
//! consults a [`SetMembership`] filter before falling back to a linear scan.
//! Available filters:
//!
//! | Filter | Answers | Notes |
//! |--------|---------|-------|
//! | [`NullFilter`] | `Maybe` | every check scans |
//! | [`BloomFilter`] | `NotFound` / `Maybe` | counting, supports removal |
//! | [`CuckooTable`] | `Found` / `NotFound` | stores values, stash + rehash |
//! | [`CuckooFilter`] | `NotFound` / `Maybe` | stores fingerprints |
//! | [`std::collections::HashSet`] | `Found` / `NotFound` | exact |

mod bit_vec;
mod buffer;
pub mod error;
pub mod hash;
pub mod set;
pub mod set_membership;

pub use error::{CapacityExhausted, Error, Result};
pub use set::{filter_out, Set};
pub use set_membership::bloom::BloomFilter;
pub use set_membership::cuckoo::CuckooFilter;
pub use set_membership::cuckoo_table::CuckooTable;
pub use set_membership::null::NullFilter;
pub use set_membership::{DefaultBuildHasher, Query, SetMembership};
