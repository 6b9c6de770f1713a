use filterset::{
    BloomFilter, CuckooFilter, CuckooTable, DefaultBuildHasher, Error, NullFilter, Set,
    SetMembership,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

fn scenario<F>(mut set: Set<i32, F>)
where
    F: SetMembership<i32> + Clone,
    Error: From<F::InsertError>,
{
    for v in [4, 5, 8, 9, 10] {
        set.insert(v).unwrap();
    }
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![4, 5, 8, 9, 10]);

    set.remove(&5).unwrap();
    assert_eq!(set.as_slice(), &[4, 8, 9, 10]);
    assert_eq!(set.get(1), Some(&8));

    assert_eq!(set.insert(4), Err(Error::Duplicate));
    assert_eq!(set.remove(&30), Err(Error::NotFound));

    let filtered = set.filter_out(|&v| v == 4).unwrap();
    assert_eq!(filtered.as_slice(), &[8, 9, 10]);
    assert_eq!(set.as_slice(), &[4, 8, 9, 10]);
}

/// Drives `set` with random inserts and removes and checks it against a
/// plain vector.
fn random_workload<F>(mut set: Set<u32, F>, seed: u64)
where
    F: SetMembership<u32>,
    Error: From<F::InsertError>,
{
    let mut rng = StdRng::seed_from_u64(seed);
    let mut model: Vec<u32> = Vec::new();

    for _ in 0..2000 {
        let value = rng.gen_range(0..300);
        if rng.gen_bool(0.6) {
            let result = set.insert(value);
            if model.contains(&value) {
                assert_eq!(result, Err(Error::Duplicate));
            } else {
                assert_eq!(result, Ok(()));
                model.push(value);
            }
        } else {
            let result = set.remove(&value);
            match model.iter().position(|&v| v == value) {
                Some(index) => {
                    assert_eq!(result, Ok(value));
                    model.remove(index);
                }
                None => assert_eq!(result, Err(Error::NotFound)),
            }
        }
        assert_eq!(set.len(), model.len());
    }

    assert_eq!(set.as_slice(), model.as_slice());
    for (i, v) in model.iter().enumerate() {
        assert_eq!(set.get(i), Some(v));
        assert!(set.contains(v));
    }
}

#[test]
fn test_scenario_null_filter() {
    scenario(Set::<i32, NullFilter>::new());
}

#[test]
fn test_scenario_bloom_filter() {
    scenario(Set::<i32, BloomFilter<i32>>::new());
}

#[test]
fn test_scenario_cuckoo_table() {
    scenario(Set::<i32, CuckooTable<i32>>::new());
}

#[test]
fn test_scenario_cuckoo_filter() {
    scenario(Set::<i32, CuckooFilter<i32>>::new());
}

#[test]
fn test_scenario_hash_set() {
    scenario(Set::<i32, HashSet<i32>>::new());
}

#[test]
fn test_random_workload_null_filter() {
    random_workload(Set::<u32>::new(), 1);
}

#[test]
fn test_random_workload_small_bloom_filter() {
    // Few counters, so most lookups are false positives that must be scanned.
    let filter = BloomFilter::<u32>::new(16, 3, DefaultBuildHasher::default());
    random_workload(Set::with_filter(filter), 2);
}

#[test]
fn test_random_workload_small_cuckoo_table() {
    // Forces evictions, stash use and repeated rehashing.
    let filter = CuckooTable::new(
        4,
        2,
        1,
        6,
        DefaultBuildHasher::default(),
        StdRng::seed_from_u64(3),
    );
    random_workload(Set::with_filter(filter), 3);
}

#[test]
fn test_random_workload_cuckoo_filter() {
    let filter = CuckooFilter::<u32, 8, _, _>::new(
        256,
        4,
        DefaultBuildHasher::default(),
        StdRng::seed_from_u64(4),
    );
    random_workload(Set::with_filter(filter), 4);
}

#[test]
fn test_cuckoo_table_survives_growth() {
    let mut set = Set::with_filter(CuckooTable::<u64>::new(
        8,
        3,
        2,
        20,
        DefaultBuildHasher::default(),
        StdRng::seed_from_u64(5),
    ));

    for v in 0..5000 {
        set.insert(v).unwrap();
    }

    assert!(set.filter().capacity() > 8);
    assert_eq!(set.filter().len(), 5000);
    for v in 0..5000 {
        assert_eq!(set.remove(&v), Ok(v));
    }
    assert!(set.is_empty());
    assert!(set.filter().is_empty());
}

#[test]
fn test_collect_drops_duplicates() {
    let words = ["b", "a", "b", "c", "a"];

    let set: Set<&str, BloomFilter<&str>> = words.into_iter().collect();

    assert_eq!(set.as_slice(), &["b", "a", "c"]);
    assert_eq!(set.to_string(), "b a c");
}

#[test]
fn test_extend_skips_members() {
    let mut set: Set<i32, CuckooFilter<i32>> = (0..5).collect();

    set.extend([3, 4, 5, 6]);

    assert_eq!(set.as_slice(), &[0, 1, 2, 3, 4, 5, 6]);
}

#[test]
fn test_filter_out_keeps_relative_order() {
    let set: Set<u32, CuckooTable<u32>> = (0..100).rev().collect();

    let kept = filterset::filter_out(&set, |v| v % 3 == 0).unwrap();

    let expected = (0..100).rev().filter(|v| v % 3 != 0).collect::<Vec<_>>();
    assert_eq!(kept.as_slice(), expected.as_slice());
    assert_eq!(set.len(), 100);
}
