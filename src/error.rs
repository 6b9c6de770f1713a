use std::collections::TryReserveError;
use std::convert::Infallible;

pub type Result<T> = std::result::Result<T, Error>;

/// A cuckoo structure could not place a value within its eviction budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("not enough space")]
pub struct CapacityExhausted;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("element already in set")]
    Duplicate,
    #[error("element not found")]
    NotFound,
    #[error(transparent)]
    CapacityExhausted(#[from] CapacityExhausted),
    #[error("buffer allocation failed: {0}")]
    Allocation(#[from] TryReserveError),
}

impl From<Infallible> for Error {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}
