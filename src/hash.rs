//! Seedable double hashing.
//!
//! Every filter derives its indices from two base hashes of a value,
//! `h1 = combine(value, seed)` and `h2 = combine(value, h1)`, and then
//! simulates the `i`-th independent hash function as `(h1 + i * h2) mod size`
//! (Kirsch & Mitzenmacher, "Less Hashing, Same Performance").
//!
//! Changing the seed changes every mapping; that is how cuckoo tables pick a
//! fresh layout when they rehash.

use std::hash::{BuildHasher, Hash};

/// 64-bit golden ratio, the avalanche constant of the classic hash combine.
pub const GOLDEN_RATIO: u64 = 0x9e37_79b9_7f4a_7c15;

/// Mixes the intrinsic hash of `item` into `seed`.
pub fn hash_combine<T, H>(item: &T, seed: u64, build_hasher: &H) -> u64
where
    T: Hash + ?Sized,
    H: BuildHasher,
{
    let hash = build_hasher.hash_one(item);
    seed ^ hash
        .wrapping_add(GOLDEN_RATIO)
        .wrapping_add(seed << 6)
        .wrapping_add(seed >> 2)
}

/// Index of `item` under the `i`-th hash function, in `0..size`.
pub fn nth_hash<T, H>(item: &T, size: usize, i: usize, seed: u64, build_hasher: &H) -> usize
where
    T: Hash + ?Sized,
    H: BuildHasher,
{
    let (h1, h2) = base_hashes(item, seed, build_hasher);
    reduce(h1, h2, i, size)
}

fn base_hashes<T, H>(item: &T, seed: u64, build_hasher: &H) -> (u64, u64)
where
    T: Hash + ?Sized,
    H: BuildHasher,
{
    let h1 = hash_combine(item, seed, build_hasher);
    let h2 = hash_combine(item, h1, build_hasher);
    (h1, h2)
}

fn reduce(h1: u64, h2: u64, i: usize, size: usize) -> usize {
    (h1.wrapping_add((i as u64).wrapping_mul(h2)) % size as u64) as usize
}

/// Iterator over the indices of a value under hash functions `0..count`.
///
/// The two base hashes are computed once up front.
#[derive(Debug, Clone)]
pub struct Hashes {
    h1: u64,
    h2: u64,
    size: usize,
    next: usize,
    count: usize,
}

impl Hashes {
    pub fn new<T, H>(item: &T, size: usize, count: usize, seed: u64, build_hasher: &H) -> Self
    where
        T: Hash + ?Sized,
        H: BuildHasher,
    {
        assert!(size > 0, "size must be > 0");
        let (h1, h2) = base_hashes(item, seed, build_hasher);
        Self {
            h1,
            h2,
            size,
            next: 0,
            count,
        }
    }
}

impl Iterator for Hashes {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.next == self.count {
            return None;
        }
        let index = reduce(self.h1, self.h2, self.next, self.size);
        self.next += 1;
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Hashes {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::hash::{BuildHasherDefault, DefaultHasher};

    fn build_hasher() -> BuildHasherDefault<DefaultHasher> {
        BuildHasherDefault::default()
    }

    #[test]
    fn test_combine_mixes_seed() {
        let bh = build_hasher();
        assert_eq!(hash_combine(&42, 7, &bh), hash_combine(&42, 7, &bh));
        assert_ne!(hash_combine(&42, 7, &bh), hash_combine(&42, 8, &bh));
    }

    #[test]
    fn test_nth_hash_in_range() {
        let bh = build_hasher();
        for item in 0..1000 {
            for i in 0..5 {
                assert!(nth_hash(&item, 17, i, 0, &bh) < 17);
            }
        }
    }

    #[test]
    fn test_nth_hash_is_double_hashing() {
        let bh = build_hasher();
        let h1 = hash_combine("value", 3, &bh);
        let h2 = hash_combine("value", h1, &bh);
        let expected = (h1.wrapping_add(2u64.wrapping_mul(h2)) % 1000) as usize;

        assert_eq!(nth_hash("value", 1000, 2, 3, &bh), expected);
    }

    #[test]
    fn test_hashes_match_nth_hash() {
        let bh = build_hasher();
        let hashes = Hashes::new(&"abc", 101, 4, 9, &bh);

        assert_eq!(hashes.len(), 4);
        assert_eq!(
            hashes.collect::<Vec<_>>(),
            (0..4)
                .map(|i| nth_hash(&"abc", 101, i, 9, &bh))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_reseeding_changes_mapping() {
        let bh = build_hasher();
        let a = Hashes::new(&1u64, 1 << 20, 3, 0, &bh).collect::<Vec<_>>();
        let b = Hashes::new(&1u64, 1 << 20, 3, 12345, &bh).collect::<Vec<_>>();
        assert_ne!(a, b);
    }
}
