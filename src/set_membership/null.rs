use crate::set_membership::{Query, SetMembership};
use std::convert::Infallible;

/// Filter that knows nothing: every lookup is [`Query::Maybe`], so the set
/// always scans.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFilter;

impl<T> SetMembership<T> for NullFilter {
    type InsertError = Infallible;

    fn query(&self, _item: &T) -> Query {
        Query::Maybe
    }

    fn insert(&mut self, _item: &T) -> Result<(), Infallible> {
        Ok(())
    }

    fn remove(&mut self, _item: &T) {}

    fn clear(&mut self) {}
}
