use num_traits::{PrimInt, Unsigned};
use std::ops::Range;

/// Fixed number of `N`-bit unsigned slots packed into words of type `T`.
#[derive(Clone)]
pub(crate) struct BitVec<T, const N: usize> {
    buf: Vec<T>,
    size: usize,
}

impl<T, const N: usize> BitVec<T, N>
where
    T: PrimInt + Unsigned,
{
    const WORD_SIZE: usize = 8 * size_of::<T>();
    const PACKED_LENGTH_OK: () = assert!(0 < N && N < Self::WORD_SIZE);

    pub fn new(size: usize) -> Self {
        // Add a binding to enforce a compile-time assertion.
        #[allow(clippy::let_unit_value)]
        let _ = Self::PACKED_LENGTH_OK;

        assert!(size > 0, "size must be > 0");
        // Allocate 1 extra word for safe indexing word pairs.
        let num_words = (N * size).div_ceil(Self::WORD_SIZE) + 1;

        Self {
            buf: vec![T::zero(); num_words],
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Largest value a slot can hold.
    pub fn max_value() -> T {
        (T::one() << N) - T::one()
    }

    pub fn get(&self, index: usize) -> T {
        assert!(index < self.size, "index out of bounds");
        let (word, offset) = Self::word_and_offset(index);
        let low = self.buf[word] >> offset;
        // `offset` is 0 when the slot starts on a word boundary; shifting a
        // word by its full width would overflow.
        let high = if offset == 0 {
            T::zero()
        } else {
            self.buf[word + 1] << (Self::WORD_SIZE - offset)
        };
        (low | high) & Self::max_value()
    }

    pub fn set(&mut self, index: usize, value: T) {
        assert!(index < self.size, "index out of bounds");
        let (word, offset) = Self::word_and_offset(index);
        let mask = Self::max_value();
        let value = value & mask;

        self.buf[word] = (self.buf[word] & !(mask << offset)) | (value << offset);
        if offset + N > Self::WORD_SIZE {
            let spill = Self::WORD_SIZE - offset;
            self.buf[word + 1] = (self.buf[word + 1] & !(mask >> spill)) | (value >> spill);
        }
    }

    /// Resets every slot to zero.
    pub fn clear(&mut self) {
        self.buf.fill(T::zero());
    }

    /// First slot in `range` holding `value`.
    pub fn position(&self, range: Range<usize>, value: T) -> Option<usize> {
        range.into_iter().find(|&index| self.get(index) == value)
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.size).map(move |index| self.get(index))
    }

    fn word_and_offset(index: usize) -> (usize, usize) {
        (N * index / Self::WORD_SIZE, N * index % Self::WORD_SIZE)
    }
}
