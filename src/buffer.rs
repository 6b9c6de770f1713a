use crate::error::Result;
use std::ops::Deref;

/// Occupancy under which the buffer gives memory back, as a divisor of capacity.
const SHRINK_DIVISOR: usize = 4;

/// Ordered, exclusively owned backing storage for [`crate::Set`].
///
/// Capacity doubles when full and halves once fewer than a quarter of the
/// slots are in use. Growth goes through `try_reserve_exact`, so allocation
/// failure surfaces as an error instead of an abort.
#[derive(Clone)]
pub(crate) struct Buffer<T> {
    items: Vec<T>,
}

impl<T> Buffer<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Makes room for one more element without touching the contents.
    pub fn reserve_one(&mut self) -> Result<()> {
        if self.items.len() < self.items.capacity() {
            return Ok(());
        }
        let target = (self.items.capacity() * 2).max(1);
        self.items.try_reserve_exact(target - self.items.len())?;
        tracing::debug!(capacity = self.items.capacity(), "buffer grown");
        Ok(())
    }

    /// Appends after a successful [`Buffer::reserve_one`]; never reallocates.
    pub fn push(&mut self, item: T) {
        debug_assert!(self.items.len() < self.items.capacity());
        self.items.push(item);
    }

    /// Removes the element at `index`, shifting the tail left by one slot.
    pub fn remove(&mut self, index: usize) -> T {
        let item = self.items.remove(index);
        self.maybe_shrink();
        item
    }

    fn maybe_shrink(&mut self) {
        let capacity = self.items.capacity();
        if capacity > 1 && self.items.len() < capacity / SHRINK_DIVISOR {
            self.items.shrink_to(capacity / 2);
            tracing::debug!(capacity = self.items.capacity(), "buffer shrunk");
        }
    }
}

impl<T> Deref for Buffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T> IntoIterator for Buffer<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_doubles() {
        let mut buffer = Buffer::new();
        assert_eq!(buffer.capacity(), 0);

        let mut capacities = Vec::new();
        for i in 0..9 {
            buffer.reserve_one().unwrap();
            buffer.push(i);
            capacities.push(buffer.capacity());
        }

        assert_eq!(capacities, vec![1, 2, 4, 4, 8, 8, 8, 8, 16]);
        assert_eq!(&*buffer, &[0, 1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut buffer = Buffer::new();
        for i in 0..5 {
            buffer.reserve_one().unwrap();
            buffer.push(i);
        }

        assert_eq!(buffer.remove(1), 1);
        assert_eq!(&*buffer, &[0, 2, 3, 4]);
    }

    #[test]
    fn test_shrinks_when_sparse() {
        let mut buffer = Buffer::new();
        for i in 0..16 {
            buffer.reserve_one().unwrap();
            buffer.push(i);
        }
        assert_eq!(buffer.capacity(), 16);

        while buffer.len() > 3 {
            buffer.remove(0);
        }

        assert!(buffer.capacity() < 16);
        assert!(buffer.capacity() >= buffer.len());
        assert_eq!(&*buffer, &[13, 14, 15]);
    }
}
