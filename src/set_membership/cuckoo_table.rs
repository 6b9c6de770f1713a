use crate::error::CapacityExhausted;
use crate::hash::{hash_combine, nth_hash, Hashes};
use crate::set_membership::{DefaultBuildHasher, Query, SetMembership};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt::{Debug, Formatter};
use std::hash::{BuildHasher, Hash};
use std::iter;

const DEFAULT_NESTS: usize = 1000;
const DEFAULT_HASHES: usize = 2;
const DEFAULT_STASH_SIZE: usize = 2;
const DEFAULT_MAX_DEPTH: usize = 100;
const DEFAULT_RNG_SEED: u64 = 0x5eed;
/// Doubling rounds a single insertion may trigger before it gives up.
const MAX_REHASH_ROUNDS: usize = 8;

#[derive(Clone)]
struct Nest<T> {
    item: T,
    /// Hash function that maps `item` to this nest.
    function: usize,
}

/// Cuckoo hash table holding the values themselves, so lookups are exact.
///
/// Each value may live in one of `num_hashes` nests. When all of them are
/// taken, an occupant chosen by a random hash function is evicted and moved
/// to one of its own nests, up to `max_depth` times. A value still homeless
/// after that goes to a small stash; when the stash is full the table
/// doubles, reseeds and reinserts everything.
///
/// Growing cannot separate values that hash alike no matter the seed, so an
/// insertion stops after a few doubling rounds, restores the table as it was
/// and reports [`CapacityExhausted`].
#[derive(Clone)]
pub struct CuckooTable<T, H = DefaultBuildHasher, R = StdRng> {
    nests: Vec<Option<Nest<T>>>,
    stash: Vec<T>,
    stash_size: usize,
    num_hashes: usize,
    max_depth: usize,
    fixed: bool,
    seed: u64,
    len: usize,
    build_hasher: H,
    rng: R,
}

impl<T, H, R> CuckooTable<T, H, R> {
    pub fn new(
        num_nests: usize,
        num_hashes: usize,
        stash_size: usize,
        max_depth: usize,
        build_hasher: H,
        rng: R,
    ) -> Self {
        assert!(num_nests > 0, "num_nests must be > 0");
        assert!(num_hashes > 0, "num_hashes must be > 0");
        Self {
            nests: empty_nests(num_nests),
            stash: Vec::with_capacity(stash_size),
            stash_size,
            num_hashes,
            max_depth,
            fixed: false,
            seed: 0,
            len: 0,
            build_hasher,
            rng,
        }
    }

    /// Disables rehashing: once the stash is full, insertions that exceed
    /// the eviction budget fail with [`CapacityExhausted`].
    pub fn with_fixed_capacity(mut self) -> Self {
        self.fixed = true;
        self
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of nests, excluding the stash.
    pub fn capacity(&self) -> usize {
        self.nests.len()
    }

    pub fn stash_len(&self) -> usize {
        self.stash.len()
    }

    pub fn num_hashes(&self) -> usize {
        self.num_hashes
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl<T> Default for CuckooTable<T> {
    fn default() -> Self {
        Self::new(
            DEFAULT_NESTS,
            DEFAULT_HASHES,
            DEFAULT_STASH_SIZE,
            DEFAULT_MAX_DEPTH,
            DefaultBuildHasher::default(),
            StdRng::seed_from_u64(DEFAULT_RNG_SEED),
        )
    }
}

impl<T, H, R> CuckooTable<T, H, R>
where
    T: Clone + Eq + Hash,
    H: BuildHasher,
    R: Rng,
{
    pub fn contains(&self, item: &T) -> bool {
        self.nest_of(item).is_some() || self.stash.contains(item)
    }

    fn candidates(&self, item: &T) -> Hashes {
        Hashes::new(
            item,
            self.nests.len(),
            self.num_hashes,
            self.seed,
            &self.build_hasher,
        )
    }

    fn nest_of(&self, item: &T) -> Option<usize> {
        self.candidates(item)
            .find(|&index| matches!(&self.nests[index], Some(nest) if nest.item == *item))
    }

    /// Runs the eviction chain starting with `item`. Returns the value left
    /// without a nest once `max_depth` evictions are spent. When `path` is
    /// given, every eviction is recorded in it as
    /// `(nest index, evicted value's function)`.
    fn place(&mut self, item: T, mut path: Option<&mut Vec<(usize, usize)>>) -> Option<T> {
        let mut displaced = item;

        for depth in 0..=self.max_depth {
            let free = self
                .candidates(&displaced)
                .enumerate()
                .find(|&(_, index)| self.nests[index].is_none());
            if let Some((function, index)) = free {
                self.nests[index] = Some(Nest {
                    item: displaced,
                    function,
                });
                return None;
            }
            if depth == self.max_depth {
                break;
            }

            let function = self.rng.gen_range(0..self.num_hashes);
            let index = nth_hash(
                &displaced,
                self.nests.len(),
                function,
                self.seed,
                &self.build_hasher,
            );
            let incoming = Nest {
                item: displaced,
                function,
            };
            match self.nests[index].replace(incoming) {
                Some(evicted) => {
                    if let Some(path) = path.as_mut() {
                        path.push((index, evicted.function));
                    }
                    displaced = evicted.item;
                }
                None => return None,
            }
        }

        tracing::trace!(depth = self.max_depth, "eviction chain exhausted");
        Some(displaced)
    }

    /// Replays `path` backwards, returning the value that started the chain.
    fn unwind(&mut self, mut displaced: T, path: &[(usize, usize)]) -> T {
        for &(index, function) in path.iter().rev() {
            let restored = Nest {
                item: displaced,
                function,
            };
            match self.nests[index].replace(restored) {
                Some(nest) => displaced = nest.item,
                None => unreachable!("eviction path points at an empty nest"),
            }
        }
        displaced
    }

    /// Grows the table until `displaced` and every stored value have a place.
    /// On failure the table is left half rebuilt; the caller restores it.
    fn rehash(&mut self, displaced: T) -> Result<(), CapacityExhausted> {
        let mut pending = vec![displaced];

        for _ in 0..MAX_REHASH_ROUNDS {
            pending.extend(
                self.nests
                    .iter_mut()
                    .filter_map(|nest| nest.take())
                    .map(|nest| nest.item),
            );
            pending.append(&mut self.stash);

            // The most recently displaced value seeds the new layout.
            if let Some(last) = pending.first() {
                self.seed = hash_combine(last, self.seed, &self.build_hasher);
            }
            self.nests = empty_nests(self.nests.len() * 2);
            tracing::debug!(
                capacity = self.nests.len(),
                seed = self.seed,
                values = pending.len(),
                "rehashing cuckoo table"
            );

            let mut overflow = None;
            while let Some(item) = pending.pop() {
                if let Some(rest) = self.place(item, None) {
                    if self.stash.len() < self.stash_size {
                        self.stash.push(rest);
                    } else {
                        overflow = Some(rest);
                        break;
                    }
                }
            }

            match overflow {
                None => return Ok(()),
                Some(rest) => pending.insert(0, rest),
            }
        }

        tracing::debug!(rounds = MAX_REHASH_ROUNDS, "rehashing gave up");
        Err(CapacityExhausted)
    }
}

fn empty_nests<T>(count: usize) -> Vec<Option<Nest<T>>> {
    iter::repeat_with(|| None).take(count).collect()
}

impl<T, H, R> SetMembership<T> for CuckooTable<T, H, R>
where
    T: Clone + Eq + Hash,
    H: BuildHasher,
    R: Rng,
{
    type InsertError = CapacityExhausted;

    fn query(&self, item: &T) -> Query {
        if self.contains(item) {
            Query::Found
        } else {
            Query::NotFound
        }
    }

    fn insert(&mut self, item: &T) -> Result<(), CapacityExhausted> {
        if self.contains(item) {
            return Ok(());
        }

        let mut path = Vec::new();
        if let Some(rest) = self.place(item.clone(), Some(&mut path)) {
            if self.stash.len() < self.stash_size {
                tracing::debug!(stash_len = self.stash.len() + 1, "value moved to stash");
                self.stash.push(rest);
            } else if self.fixed {
                self.unwind(rest, &path);
                return Err(CapacityExhausted);
            } else {
                let item = self.unwind(rest, &path);
                let (nests, stash, seed) = (self.nests.clone(), self.stash.clone(), self.seed);
                if let Err(err) = self.rehash(item) {
                    self.nests = nests;
                    self.stash = stash;
                    self.seed = seed;
                    return Err(err);
                }
            }
        }

        self.len += 1;
        Ok(())
    }

    fn remove(&mut self, item: &T) {
        if let Some(index) = self.nest_of(item) {
            self.nests[index] = None;
            self.len -= 1;
        } else if let Some(position) = self.stash.iter().position(|stashed| stashed == item) {
            self.stash.swap_remove(position);
            self.len -= 1;
        }
    }

    fn clear(&mut self) {
        self.nests.iter_mut().for_each(|nest| *nest = None);
        self.stash.clear();
        self.len = 0;
    }
}

impl<T, H, R> Debug for CuckooTable<T, H, R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CuckooTable {{ len: {}, num_nests: {}, num_hashes: {}, stash: {}/{}, max_depth: {} }}",
            self.len,
            self.nests.len(),
            self.num_hashes,
            self.stash.len(),
            self.stash_size,
            self.max_depth
        )
    }
}
