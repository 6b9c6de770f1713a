use crate::bit_vec::BitVec;
use crate::error::CapacityExhausted;
use crate::hash::nth_hash;
use crate::set_membership::{DefaultBuildHasher, Query, SetMembership};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;

const DEFAULT_BUCKETS: usize = 128;
const DEFAULT_BUCKET_SIZE: usize = 4;
const DEFAULT_MAX_EVICTIONS: usize = 100;
const DEFAULT_RNG_SEED: u64 = 0xf11e;

/// Hash function index used to derive fingerprints.
const FINGERPRINT_FUNCTION: usize = 1000;
/// Hash function index used to derive the alternate bucket from a fingerprint.
const ALT_INDEX_FUNCTION: usize = 900;

/// Cuckoo filter storing `FINGERPRINT_SIZE`-bit fingerprints instead of values.
///
/// A fingerprint lives in one of two buckets, `i1` and
/// `i2 = i1 ^ hash(fingerprint)`. Because the relation is symmetric, an
/// evicted fingerprint finds its other bucket without knowing the value it
/// came from. The slot value 0 marks an empty slot.
pub struct CuckooFilter<
    T,
    const FINGERPRINT_SIZE: usize = 16,
    H = DefaultBuildHasher,
    R = StdRng,
> {
    table: BitVec<u32, FINGERPRINT_SIZE>,
    num_buckets: usize,
    bucket_size: usize,
    max_evictions: usize,
    seed: u64,
    build_hasher: H,
    rng: R,
    _phantom: PhantomData<T>,
}

impl<T, const FINGERPRINT_SIZE: usize, H, R> CuckooFilter<T, FINGERPRINT_SIZE, H, R> {
    pub fn new(num_buckets: usize, bucket_size: usize, build_hasher: H, rng: R) -> Self {
        assert!(num_buckets > 1, "num_buckets must be > 1");
        assert!(
            num_buckets.is_power_of_two(),
            "num_buckets must be a power of two"
        );
        assert!(bucket_size > 0, "bucket_size must be > 0");

        Self {
            table: BitVec::new(num_buckets * bucket_size),
            num_buckets,
            bucket_size,
            max_evictions: DEFAULT_MAX_EVICTIONS,
            seed: 0,
            build_hasher,
            rng,
            _phantom: PhantomData,
        }
    }

    pub fn with_max_evictions(mut self, max_evictions: usize) -> Self {
        self.max_evictions = max_evictions;
        self
    }

    pub fn num_buckets(&self) -> usize {
        self.num_buckets
    }

    pub fn bucket_size(&self) -> usize {
        self.bucket_size
    }

    /// Total number of fingerprint slots.
    pub fn capacity(&self) -> usize {
        self.table.size()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.table.iter().filter(|&tag| tag != 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.table.iter().all(|tag| tag == 0)
    }

    fn bucket(&self, index: usize) -> std::ops::Range<usize> {
        index * self.bucket_size..(index + 1) * self.bucket_size
    }

    fn try_insert(&mut self, index: usize, tag: u32) -> bool {
        match self.table.position(self.bucket(index), 0) {
            Some(address) => {
                self.table.set(address, tag);
                true
            }
            None => false,
        }
    }
}

impl<T> Default for CuckooFilter<T> {
    fn default() -> Self {
        Self::new(
            DEFAULT_BUCKETS,
            DEFAULT_BUCKET_SIZE,
            DefaultBuildHasher::default(),
            StdRng::seed_from_u64(DEFAULT_RNG_SEED),
        )
    }
}

impl<T, const FINGERPRINT_SIZE: usize, H, R> CuckooFilter<T, FINGERPRINT_SIZE, H, R>
where
    T: Hash,
    H: BuildHasher,
    R: Rng,
{
    fn index_and_tag(&self, item: &T) -> (usize, u32) {
        let index = nth_hash(item, self.num_buckets, 0, self.seed, &self.build_hasher);
        let tag_range = BitVec::<u32, FINGERPRINT_SIZE>::max_value() as usize + 1;
        let tag = nth_hash(
            item,
            tag_range,
            FINGERPRINT_FUNCTION,
            self.seed,
            &self.build_hasher,
        ) as u32;
        (index, tag + (tag == 0) as u32)
    }

    fn alt_index(&self, index: usize, tag: u32) -> usize {
        index ^ nth_hash(
            &tag,
            self.num_buckets,
            ALT_INDEX_FUNCTION,
            self.seed,
            &self.build_hasher,
        )
    }

    fn find(&self, item: &T) -> Option<usize> {
        let (i1, tag) = self.index_and_tag(item);
        let i2 = self.alt_index(i1, tag);
        debug_assert_eq!(i1, self.alt_index(i2, tag));

        self.table
            .position(self.bucket(i1), tag)
            .or_else(|| self.table.position(self.bucket(i2), tag))
    }

    pub fn contains(&self, item: &T) -> bool {
        self.find(item).is_some()
    }
}

impl<T, const FINGERPRINT_SIZE: usize, H, R> SetMembership<T>
    for CuckooFilter<T, FINGERPRINT_SIZE, H, R>
where
    T: Hash,
    H: BuildHasher,
    R: Rng,
{
    type InsertError = CapacityExhausted;

    fn query(&self, item: &T) -> Query {
        if self.contains(item) {
            Query::Maybe
        } else {
            Query::NotFound
        }
    }

    /// Stores one more copy of the item's fingerprint, even when an equal
    /// fingerprint is already present in one of its buckets.
    ///
    /// The filter is therefore a multiset of fingerprints: inserting the same
    /// value twice takes two slots and needs two [`SetMembership::remove`]
    /// calls before the value stops being reported. In exchange, two distinct
    /// values whose fingerprints collide each own a slot, so removing one of
    /// them never makes the other look absent. [`crate::Set`] inserts each
    /// member exactly once, so inside a set every copy belongs to one member.
    fn insert(&mut self, item: &T) -> Result<(), CapacityExhausted> {
        let (i1, tag) = self.index_and_tag(item);
        let i2 = self.alt_index(i1, tag);

        if self.try_insert(i1, tag) || self.try_insert(i2, tag) {
            return Ok(());
        }

        let mut tag = tag;
        let mut index = if self.rng.gen() { i1 } else { i2 };
        let mut path = Vec::with_capacity(self.max_evictions);

        for _ in 0..self.max_evictions {
            let address = index * self.bucket_size + self.rng.gen_range(0..self.bucket_size);
            let evicted = self.table.get(address);
            debug_assert_ne!(evicted, 0, "evicted entry was 0");

            self.table.set(address, tag);
            path.push((address, evicted));

            tag = evicted;
            index = self.alt_index(index, tag);
            if self.try_insert(index, tag) {
                return Ok(());
            }
        }

        tracing::trace!(
            max_evictions = self.max_evictions,
            "cuckoo filter full, undoing evictions"
        );
        for (address, evicted) in path.into_iter().rev() {
            self.table.set(address, evicted);
        }
        Err(CapacityExhausted)
    }

    fn remove(&mut self, item: &T) {
        if let Some(address) = self.find(item) {
            self.table.set(address, 0);
        }
    }

    fn clear(&mut self) {
        self.table.clear();
    }
}

impl<T, const FINGERPRINT_SIZE: usize, H, R> Clone for CuckooFilter<T, FINGERPRINT_SIZE, H, R>
where
    H: Clone,
    R: Clone,
{
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            num_buckets: self.num_buckets,
            bucket_size: self.bucket_size,
            max_evictions: self.max_evictions,
            seed: self.seed,
            build_hasher: self.build_hasher.clone(),
            rng: self.rng.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T, const FINGERPRINT_SIZE: usize, H, R> std::fmt::Debug
    for CuckooFilter<T, FINGERPRINT_SIZE, H, R>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CuckooFilter {{ fingerprint_size: {}, num_buckets: {}, bucket_size: {} }}",
            FINGERPRINT_SIZE, self.num_buckets, self.bucket_size
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_filter<const FINGERPRINT_SIZE: usize>(
        num_buckets: usize,
        bucket_size: usize,
    ) -> CuckooFilter<i32, FINGERPRINT_SIZE, DefaultBuildHasher, StdRng> {
        let build_hasher = DefaultBuildHasher::default();
        let rng = StdRng::seed_from_u64(7);
        CuckooFilter::<_, FINGERPRINT_SIZE, _, _>::new(num_buckets, bucket_size, build_hasher, rng)
    }

    #[test]
    #[should_panic(expected = "num_buckets must be > 1")]
    fn test_num_buckets_too_small() {
        make_filter::<4>(1, 10);
    }

    #[test]
    #[should_panic(expected = "num_buckets must be a power of two")]
    fn test_num_buckets_power_of_two() {
        make_filter::<4>(100, 10);
    }

    #[test]
    #[should_panic(expected = "bucket_size must be > 0")]
    fn test_bucket_size_too_small() {
        make_filter::<4>(32, 0);
    }

    #[test]
    fn test_alt_index_is_involution() {
        let cf = make_filter::<12>(64, 4);

        for item in 0..500 {
            let (i1, tag) = cf.index_and_tag(&item);
            let i2 = cf.alt_index(i1, tag);
            assert!(i2 < 64);
            assert_eq!(cf.alt_index(i2, tag), i1);
        }
    }

    #[test]
    fn test_query_empty() {
        let cf = CuckooFilter::<i32>::default();

        for i in 0..100 {
            assert_eq!(cf.query(&i), Query::NotFound);
        }
        assert!(cf.is_empty());
    }

    #[test]
    fn test_query_inserted() {
        let mut cf = make_filter::<16>(64, 4);

        for i in 0..150 {
            cf.insert(&i).unwrap();
            assert_eq!(cf.query(&i), Query::Maybe);
        }
        for i in 0..150 {
            assert_eq!(cf.query(&i), Query::Maybe, "false negative for {i}");
        }
        assert_eq!(cf.len(), 150);
    }

    #[test]
    fn test_remove() {
        let mut cf = make_filter::<16>(64, 4);
        for i in 0..100 {
            cf.insert(&i).unwrap();
        }

        for i in 0..50 {
            cf.remove(&i);
        }

        assert_eq!(cf.len(), 50);
        for i in 50..100 {
            assert_eq!(cf.query(&i), Query::Maybe);
        }
    }

    #[test]
    fn test_colliding_fingerprints_are_counted() {
        // 1-bit fingerprints over 2 buckets: every value collides.
        let mut cf = make_filter::<1>(2, 4);

        cf.insert(&10).unwrap();
        cf.insert(&20).unwrap();
        cf.remove(&10);

        assert_eq!(cf.query(&20), Query::Maybe);
        cf.remove(&20);
        assert!(cf.is_empty());
    }

    #[test]
    fn test_same_value_twice_needs_two_removals() {
        let mut cf = make_filter::<16>(64, 4);

        cf.insert(&5).unwrap();
        cf.insert(&5).unwrap();
        assert_eq!(cf.len(), 2);

        cf.remove(&5);
        assert_eq!(cf.query(&5), Query::Maybe);
        cf.remove(&5);
        assert_eq!(cf.query(&5), Query::NotFound);
    }

    #[test]
    fn test_clear_keeps_shape() {
        let mut cf = make_filter::<8>(32, 2);
        for i in 0..20 {
            cf.insert(&i).unwrap();
        }

        cf.clear();

        assert!(cf.is_empty());
        assert_eq!(cf.num_buckets(), 32);
        assert_eq!(cf.capacity(), 64);
        cf.insert(&1).unwrap();
        assert_eq!(cf.query(&1), Query::Maybe);
    }

    #[test]
    fn test_not_enough_space_keeps_contents() {
        let mut cf = make_filter::<16>(2, 1).with_max_evictions(10);
        let mut accepted = Vec::new();

        for i in 0..10 {
            if cf.insert(&i).is_ok() {
                accepted.push(i);
            }
        }

        assert!(!accepted.is_empty());
        assert!(accepted.len() <= 2);
        assert_eq!(cf.len(), accepted.len());
        for i in &accepted {
            assert_eq!(cf.query(i), Query::Maybe);
        }
    }
}
