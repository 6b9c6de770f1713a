use crate::hash::Hashes;
use crate::set_membership::{DefaultBuildHasher, Query, SetMembership};
use num_traits::{Bounded, SaturatingAdd, Unsigned, WrappingSub};
use std::convert::Infallible;
use std::f64::consts::LN_2;
use std::fmt::{Debug, Formatter};
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;

const DEFAULT_COUNTERS: usize = 1000;
const DEFAULT_HASHES: usize = 5;

/// Counting Bloom filter. Never reports a present value as absent, and
/// supports removal because each slot is a counter rather than a bit.
///
/// Counters saturate at `C::max_value()` and then stay there: once a slot
/// has overflowed its true count is unknown, so it is never decremented.
#[derive(Clone)]
pub struct BloomFilter<T, H = DefaultBuildHasher, C = u8> {
    counters: Vec<C>,
    num_hashes: usize,
    build_hasher: H,
    _phantom: PhantomData<T>,
}

impl<T, H, C> BloomFilter<T, H, C>
where
    C: Clone + Unsigned,
{
    pub fn new(num_counters: usize, num_hashes: usize, build_hasher: H) -> Self {
        assert!(num_counters > 0, "num_counters must be > 0");
        assert!(num_hashes > 0, "num_hashes must be > 0");
        Self {
            counters: vec![C::zero(); num_counters],
            num_hashes,
            build_hasher,
            _phantom: PhantomData,
        }
    }

    /// Sizes the filter for `num_items` values at false positive rate `probability`.
    pub fn with_probability(num_items: usize, probability: f64, build_hasher: H) -> Self {
        assert!(num_items > 0, "num_items must be > 0");
        assert!(
            0. < probability && probability < 1.,
            "probability must be in the range (0, 1)"
        );
        let counters = (-(num_items as f64) * probability.ln() / (LN_2 * LN_2)).ceil();
        let num_hashes = (counters / num_items as f64 * LN_2).round().max(1.);
        Self::new(counters as usize, num_hashes as usize, build_hasher)
    }

    pub fn num_counters(&self) -> usize {
        self.counters.len()
    }

    pub fn num_hashes(&self) -> usize {
        self.num_hashes
    }
}

impl<T, H, C> BloomFilter<T, H, C>
where
    T: Hash,
    H: BuildHasher,
{
    fn hashes(&self, item: &T) -> Hashes {
        Hashes::new(
            item,
            self.counters.len(),
            self.num_hashes,
            0,
            &self.build_hasher,
        )
    }
}

impl<T> Default for BloomFilter<T> {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTERS, DEFAULT_HASHES, DefaultBuildHasher::default())
    }
}

impl<T, H, C> SetMembership<T> for BloomFilter<T, H, C>
where
    T: Hash,
    H: BuildHasher,
    C: Clone + Bounded + Unsigned + SaturatingAdd + WrappingSub,
{
    type InsertError = Infallible;

    fn query(&self, item: &T) -> Query {
        if self.hashes(item).all(|index| !self.counters[index].is_zero()) {
            Query::Maybe
        } else {
            Query::NotFound
        }
    }

    fn insert(&mut self, item: &T) -> Result<(), Infallible> {
        for index in self.hashes(item) {
            self.counters[index] = self.counters[index].saturating_add(&C::one());
        }
        Ok(())
    }

    fn remove(&mut self, item: &T) {
        for index in self.hashes(item) {
            let counter = &mut self.counters[index];
            debug_assert!(!counter.is_zero(), "counter underflow");
            if *counter != C::max_value() {
                *counter = counter.wrapping_sub(&C::one());
            }
        }
    }

    fn clear(&mut self) {
        self.counters.fill(C::zero());
    }
}

impl<T, H, C> Debug for BloomFilter<T, H, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BloomFilter {{ num_counters: {}, num_hashes: {} }}",
            self.counters.len(),
            self.num_hashes
        )
    }
}
