use proptest::prelude::*;
use pseudogene_rs::{Error, RangeMultimap};
use std::collections::BTreeSet;

fn sorted<V: Ord>(set: impl IntoIterator<Item = V>) -> Vec<V> {
    set.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}

#[test]
fn overlapping_puts_accumulate() {
    let mut map: RangeMultimap<i64, u32> = RangeMultimap::new();
    map.put(10, 20, 1).unwrap();
    map.put(15, 30, 2).unwrap();
    map.put(5, 12, 3).unwrap();

    assert_eq!(sorted(map.get(&4)), Vec::<u32>::new());
    assert_eq!(sorted(map.get(&5)), vec![3]);
    assert_eq!(sorted(map.get(&11)), vec![1, 3]);
    assert_eq!(sorted(map.get(&12)), vec![1]);
    assert_eq!(sorted(map.get(&15)), vec![1, 2]);
    assert_eq!(sorted(map.get(&19)), vec![1, 2]);
    assert_eq!(sorted(map.get(&20)), vec![2]);
    assert_eq!(sorted(map.get(&29)), vec![2]);
    assert_eq!(sorted(map.get(&30)), Vec::<u32>::new());
}

#[test]
fn range_lookup_is_a_union() {
    let mut map: RangeMultimap<i64, &str> = RangeMultimap::new();
    map.put(0, 10, "a").unwrap();
    map.put(20, 30, "b").unwrap();
    map.put(40, 50, "c").unwrap();

    assert_eq!(sorted(map.get_range(&9, &21)), vec!["a", "b"]);
    assert_eq!(sorted(map.get_range(&10, &20)), Vec::<&str>::new());
    assert_eq!(sorted(map.get_range(&0, &100)), vec!["a", "b", "c"]);
    assert!(map.get_range(&25, &25).is_empty());
}

#[test]
fn inverted_range_is_rejected() {
    let mut map: RangeMultimap<i64, u32> = RangeMultimap::new();
    let err = map.put(20, 10, 1).unwrap_err();
    assert!(matches!(err, Error::InvalidRange { .. }));
    assert!(map.is_empty());
}

#[test]
fn empty_range_is_a_no_op() {
    let mut map: RangeMultimap<i64, u32> = RangeMultimap::new();
    map.put(10, 10, 1).unwrap();
    assert!(map.is_empty());
}

#[test]
fn segments_stay_disjoint() {
    let mut map: RangeMultimap<i64, u32> = RangeMultimap::new();
    map.put(0, 100, 1).unwrap();
    map.put(40, 60, 2).unwrap();
    map.put(50, 150, 3).unwrap();

    let segments: Vec<(i64, i64, Vec<u32>)> = map
        .iter()
        .map(|(lo, hi, values)| (*lo, *hi, sorted(values.iter().copied())))
        .collect();
    assert_eq!(
        segments,
        vec![
            (0, 40, vec![1]),
            (40, 50, vec![1, 2]),
            (50, 60, vec![1, 2, 3]),
            (60, 100, vec![1, 3]),
            (100, 150, vec![3]),
        ]
    );
    for pair in segments.windows(2) {
        assert!(pair[0].1 <= pair[1].0);
    }
}

fn ranges() -> impl Strategy<Value = Vec<(i64, i64)>> {
    proptest::collection::vec((0i64..200, 0i64..50), 1..24)
        .prop_map(|v| v.into_iter().map(|(lo, len)| (lo, lo + len)).collect())
}

proptest! {
    #[test]
    fn point_lookup_matches_brute_force(inserted in ranges(), probe in 0i64..260) {
        let mut map: RangeMultimap<i64, usize> = RangeMultimap::new();
        for (value, &(lo, hi)) in inserted.iter().enumerate() {
            map.put(lo, hi, value).unwrap();
        }

        let expected: Vec<usize> = inserted
            .iter()
            .enumerate()
            .filter(|(_, (lo, hi))| *lo <= probe && probe < *hi)
            .map(|(value, _)| value)
            .collect();
        prop_assert_eq!(sorted(map.get(&probe)), expected);
    }

    #[test]
    fn later_puts_never_remove_values(inserted in ranges(), probe in 0i64..260) {
        let mut map: RangeMultimap<i64, usize> = RangeMultimap::new();
        let mut previous = BTreeSet::new();
        for (value, &(lo, hi)) in inserted.iter().enumerate() {
            map.put(lo, hi, value).unwrap();
            let current: BTreeSet<usize> = map.get(&probe).into_iter().collect();
            prop_assert!(current.is_superset(&previous));
            previous = current;
        }
    }

    #[test]
    fn put_then_range_get_contains_value(inserted in ranges(), lo in 0i64..200, len in 1i64..50) {
        let mut map: RangeMultimap<i64, usize> = RangeMultimap::new();
        for (value, &(a, b)) in inserted.iter().enumerate() {
            map.put(a, b, value).unwrap();
        }
        let marker = usize::MAX;
        map.put(lo, lo + len, marker).unwrap();
        prop_assert!(map.get_range(&lo, &(lo + len)).contains(&marker));
    }
}
