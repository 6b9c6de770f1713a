use crate::set_membership::{Query, SetMembership};
use std::collections::HashSet;
use std::convert::Infallible;
use std::hash::{BuildHasher, Hash};

/// Exact filter: keeps a second copy of every value, never answers `Maybe`.
impl<T, S> SetMembership<T> for HashSet<T, S>
where
    T: Clone + Eq + Hash,
    S: BuildHasher,
{
    type InsertError = Infallible;

    fn query(&self, item: &T) -> Query {
        if self.contains(item) {
            Query::Found
        } else {
            Query::NotFound
        }
    }

    fn insert(&mut self, item: &T) -> Result<(), Infallible> {
        HashSet::insert(self, item.clone());
        Ok(())
    }

    fn remove(&mut self, item: &T) {
        HashSet::remove(self, item);
    }

    fn clear(&mut self) {
        HashSet::clear(self);
    }
}
