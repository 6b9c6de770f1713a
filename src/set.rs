//! Insertion-ordered set with O(1) random access.
//!
//! Values live in a contiguous buffer in the order they were inserted. A
//! [`SetMembership`] filter is kept in lock-step with the buffer so that most
//! duplicate checks and removals of absent values are answered without a
//! linear scan:
//!
//! - [`Query::NotFound`] is trusted outright,
//! - [`Query::Found`] is trusted outright (exact filters only),
//! - [`Query::Maybe`] falls back to scanning the buffer.
//!
//! ```
//! use filterset::{Error, Set};
//! use filterset::set_membership::bloom::BloomFilter;
//!
//! let mut set: Set<i32, BloomFilter<i32>> = Set::new();
//! for v in [4, 5, 8, 9, 10] {
//!     set.insert(v).unwrap();
//! }
//! set.remove(&5).unwrap();
//!
//! assert_eq!(set.as_slice(), &[4, 8, 9, 10]);
//! assert_eq!(set.get(1), Some(&8));
//! assert_eq!(set.insert(4), Err(Error::Duplicate));
//! assert_eq!(set.remove(&30), Err(Error::NotFound));
//! ```

use crate::buffer::Buffer;
use crate::error::{Error, Result};
use crate::set_membership::null::NullFilter;
use crate::set_membership::{Query, SetMembership};
use std::fmt::{Debug, Display, Formatter};
use std::ops::Index;

#[derive(Clone)]
pub struct Set<T, F = NullFilter> {
    items: Buffer<T>,
    filter: F,
}

impl<T, F> Set<T, F>
where
    F: Default,
{
    pub fn new() -> Self {
        Self::with_filter(F::default())
    }
}

impl<T, F> Set<T, F> {
    /// Creates an empty set consulting `filter`, which must itself be empty.
    pub fn with_filter(filter: F) -> Self {
        Self {
            items: Buffer::new(),
            filter,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }
}

impl<T, F> Set<T, F>
where
    T: Eq,
    F: SetMembership<T>,
    Error: From<F::InsertError>,
{
    fn position(&self, item: &T) -> Option<usize> {
        self.items.iter().position(|stored| stored == item)
    }

    pub fn contains(&self, item: &T) -> bool {
        match self.filter.query(item) {
            Query::Found => true,
            Query::NotFound => false,
            Query::Maybe => self.position(item).is_some(),
        }
    }

    /// Appends `item`, failing with [`Error::Duplicate`] if it is already a
    /// member. On error neither the buffer nor the filter changes.
    pub fn insert(&mut self, item: T) -> Result<()> {
        if self.contains(&item) {
            return Err(Error::Duplicate);
        }

        self.items.reserve_one()?;
        self.filter.insert(&item)?;
        self.items.push(item);
        Ok(())
    }

    /// Removes `item`, shifting every later element down one slot.
    pub fn remove(&mut self, item: &T) -> Result<T> {
        if self.filter.query(item) == Query::NotFound {
            return Err(Error::NotFound);
        }

        let index = self.position(item).ok_or(Error::NotFound)?;
        self.filter.remove(item);
        Ok(self.items.remove(index))
    }
}

impl<T, F> Set<T, F>
where
    T: Clone + Eq,
    F: SetMembership<T> + Clone,
    Error: From<F::InsertError>,
{
    /// Builds a new set without the elements matching `predicate`, in the
    /// same relative order. `self` is left untouched.
    ///
    /// The new set's filter is an emptied copy of this one, so it keeps the
    /// same sizes, hashers and growth policy. Fails only if that filter
    /// cannot take every kept element.
    pub fn filter_out<P>(&self, mut predicate: P) -> Result<Self>
    where
        P: FnMut(&T) -> bool,
    {
        let mut filter = self.filter.clone();
        filter.clear();
        let mut kept = Self::with_filter(filter);
        for item in self.iter().filter(|item| !predicate(*item)) {
            kept.items.reserve_one()?;
            kept.filter.insert(item)?;
            kept.items.push(item.clone());
        }
        Ok(kept)
    }
}

/// Free-function form of [`Set::filter_out`].
pub fn filter_out<T, F, P>(set: &Set<T, F>, predicate: P) -> Result<Set<T, F>>
where
    T: Clone + Eq,
    F: SetMembership<T> + Clone,
    Error: From<F::InsertError>,
    P: FnMut(&T) -> bool,
{
    set.filter_out(predicate)
}

impl<T, F> Default for Set<T, F>
where
    F: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, F> Index<usize> for Set<T, F> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<'a, T, F> IntoIterator for &'a Set<T, F> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, F> IntoIterator for Set<T, F> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Inserts every item, silently skipping duplicates.
///
/// # Panics
///
/// Panics if the filter runs out of space or the buffer cannot grow.
impl<T, F> Extend<T> for Set<T, F>
where
    T: Eq,
    F: SetMembership<T>,
    Error: From<F::InsertError>,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            match self.insert(item) {
                Ok(()) | Err(Error::Duplicate) => {}
                Err(err) => panic!("failed to extend set: {err}"),
            }
        }
    }
}

/// Keeps the first occurrence of every value.
impl<T, F> FromIterator<T> for Set<T, F>
where
    T: Eq,
    F: SetMembership<T> + Default,
    Error: From<F::InsertError>,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T: Debug, F: Debug> Debug for Set<T, F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Set")
            .field("items", &&*self.items)
            .field("filter", &self.filter)
            .finish()
    }
}

impl<T: Display, F> Display for Set<T, F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, item) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{item}")?;
        }
        Ok(())
    }
}
