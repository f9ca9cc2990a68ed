use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rbcursor::{ContainerError, CursorError, MapCursor, OrderedMap, Rank, Reverse};

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 2_000;

/// Generates keys in a range that ensures collisions.
fn key_strategy() -> impl Strategy<Value = i32> {
    -500i32..500i32
}

fn value_strategy() -> impl Strategy<Value = u16> {
    any::<u16>()
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum MapOp {
    Upsert(i32, u16),
    Remove(i32),
    Discard(i32),
    Get(i32),
    ContainsKey(i32),
    RankOf(i32),
    First,
    Last,
    PopFirst,
    PopLast,
}

fn map_op_strategy() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        6 => (key_strategy(), value_strategy()).prop_map(|(k, v)| MapOp::Upsert(k, v)),
        2 => key_strategy().prop_map(MapOp::Remove),
        2 => key_strategy().prop_map(MapOp::Discard),
        2 => key_strategy().prop_map(MapOp::Get),
        1 => key_strategy().prop_map(MapOp::ContainsKey),
        1 => key_strategy().prop_map(MapOp::RankOf),
        1 => Just(MapOp::First),
        1 => Just(MapOp::Last),
        1 => Just(MapOp::PopFirst),
        1 => Just(MapOp::PopLast),
    ]
}

// ─── Core operations ─────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays random operations on both OrderedMap and BTreeMap and asserts identical results
    /// at every step.
    #[test]
    fn map_ops_match_btreemap(ops in proptest::collection::vec(map_op_strategy(), TEST_SIZE)) {
        let mut os_map: OrderedMap<i32, u16> = OrderedMap::new();
        let mut bt_map: BTreeMap<i32, u16> = BTreeMap::new();

        for op in &ops {
            match op {
                MapOp::Upsert(k, v) => {
                    prop_assert_eq!(os_map.upsert(*k, *v), bt_map.insert(*k, *v), "upsert({}, {})", k, v);
                }
                MapOp::Remove(k) => {
                    let expected = bt_map.remove(k).ok_or(ContainerError::NotFound);
                    prop_assert_eq!(os_map.remove(k), expected, "remove({})", k);
                }
                MapOp::Discard(k) => {
                    prop_assert_eq!(os_map.discard(k), bt_map.remove(k), "discard({})", k);
                }
                MapOp::Get(k) => {
                    prop_assert_eq!(os_map.get(k), bt_map.get(k).copied(), "get({})", k);
                }
                MapOp::ContainsKey(k) => {
                    prop_assert_eq!(os_map.contains_key(k), bt_map.contains_key(k), "contains_key({})", k);
                }
                MapOp::RankOf(k) => {
                    let expected = bt_map.contains_key(k).then(|| bt_map.range(..k).count());
                    prop_assert_eq!(os_map.rank_of(k), expected, "rank_of({})", k);
                }
                MapOp::First => {
                    let expected = bt_map.first_key_value().map(|(k, v)| (*k, *v)).ok_or(ContainerError::Empty);
                    prop_assert_eq!(os_map.first(), expected, "first()");
                }
                MapOp::Last => {
                    let expected = bt_map.last_key_value().map(|(k, v)| (*k, *v)).ok_or(ContainerError::Empty);
                    prop_assert_eq!(os_map.last(), expected, "last()");
                }
                MapOp::PopFirst => {
                    prop_assert_eq!(os_map.pop_first(), bt_map.pop_first().ok_or(ContainerError::Empty));
                }
                MapOp::PopLast => {
                    prop_assert_eq!(os_map.pop_last(), bt_map.pop_last().ok_or(ContainerError::Empty));
                }
            }
            prop_assert_eq!(os_map.len(), bt_map.len());
        }

        prop_assert!(os_map.iter().eq(bt_map.into_iter()));
    }

    #[test]
    fn iterators_match_btreemap(
        pairs in proptest::collection::vec((key_strategy(), value_strategy()), 0..TEST_SIZE),
    ) {
        let os_map: OrderedMap<i32, u16> = pairs.iter().copied().collect();
        let bt_map: BTreeMap<i32, u16> = pairs.iter().copied().collect();

        prop_assert_eq!(os_map.len(), bt_map.len());
        prop_assert!(os_map.keys().eq(bt_map.keys().copied()));
        prop_assert!(os_map.values().eq(bt_map.values().copied()));
        prop_assert!(os_map.keys().rev().eq(bt_map.keys().rev().copied()));
        prop_assert!(os_map.iter().rev().eq(bt_map.iter().rev().map(|(k, v)| (*k, *v))));
        prop_assert!(os_map.clone().into_iter().eq(bt_map.into_iter()));
    }

    /// Collecting keeps the last value of each key, like repeated upserts would.
    #[test]
    fn collect_matches_repeated_upserts(
        pairs in proptest::collection::vec((0i32..50, value_strategy()), 0..300),
    ) {
        let collected: OrderedMap<i32, u16> = pairs.iter().copied().collect();
        let mut upserted = OrderedMap::new();
        for (k, v) in &pairs {
            upserted.upsert(*k, *v);
        }
        prop_assert_eq!(collected, upserted);
    }

    #[test]
    fn get_by_rank_matches_btreemap(
        pairs in proptest::collection::vec((key_strategy(), value_strategy()), 1..TEST_SIZE),
    ) {
        let os_map: OrderedMap<i32, u16> = pairs.iter().copied().collect();
        let bt_map: BTreeMap<i32, u16> = pairs.iter().copied().collect();

        for (rank, (k, v)) in bt_map.iter().enumerate() {
            prop_assert_eq!(os_map.get_by_rank(rank), Some((*k, *v)));
            prop_assert_eq!((os_map.begin() + rank as isize).item(), Ok((*k, *v)));
            prop_assert_eq!((os_map.end() - (rank as isize + 1)).key(), Ok(*bt_map.iter().nth_back(rank).unwrap().0));
        }
        prop_assert_eq!(os_map.get_by_rank(bt_map.len()), None);
    }
}

// ─── Cursors and invalidation ────────────────────────────────────────────────

#[test]
fn upsert_scenario() {
    let mut scores = OrderedMap::new();
    scores.upsert("Alice", 100);
    scores.upsert("Bob", 85);
    scores.upsert("Carol", 92);

    let cursor = scores.begin() + 1;
    assert_eq!(cursor.item(), Ok(("Bob", 85)));

    assert_eq!(scores.upsert("Bob", 88), Some(85));
    assert_eq!(cursor.value(), Ok(88));
    assert_eq!(cursor.rank(), Ok(Rank(1)));

    assert_eq!(scores.upsert("Dave", 70), None);
    assert_eq!(cursor.value(), Err(CursorError::Invalidated));
    assert_eq!(scores.keys().collect::<Vec<_>>(), ["Alice", "Bob", "Carol", "Dave"]);
}

#[test]
fn reverse_cursor_walks_descending_keys() {
    let map: OrderedMap<u8, char> = (b'a'..=b'e').map(|b| (b, char::from(b))).collect();
    let mut cursor: MapCursor<u8, char, Reverse> = map.rbegin();
    let mut walked = String::new();
    while !cursor.is_end().unwrap() {
        walked.push(cursor.value().unwrap());
        cursor += 1;
    }
    assert_eq!(walked, "edcba");
    assert!(cursor == map.rend());

    cursor -= 2;
    assert_eq!(cursor.key(), Ok(b'b'));
    assert_eq!(cursor.offset(-3).and_then(|c| c.rank()), Ok(Rank(0)));
    assert_eq!(
        cursor.offset(-5).err(),
        Some(CursorError::OutOfRange {
            offset: -5,
            min: -3,
            max: 2,
        })
    );
}

#[test]
fn find_and_erase() {
    let mut map = OrderedMap::from([(3, "c"), (1, "a"), (2, "b")]);
    let cursor = map.find(&2).unwrap();
    assert_eq!(cursor.rank(), Ok(Rank(1)));
    assert!(map.find(&9).is_none());

    let stale = map.begin();
    assert_eq!(map.erase(&cursor), Ok((2, "b")));
    assert_eq!(map.erase(&cursor), Err(CursorError::Invalidated));
    assert_eq!(stale.key(), Err(CursorError::Invalidated));
    assert_eq!(map.iter().collect::<Vec<_>>(), [(1, "a"), (3, "c")]);
}

#[test]
fn no_op_mutations_keep_cursors() {
    let mut map = OrderedMap::from([(1, 10), (2, 20)]);
    let cursor = map.end() - 1;

    assert_eq!(map.discard(&5), None);
    assert_eq!(map.remove(&5), Err(ContainerError::NotFound));
    map.extend([(1, 11), (2, 21)]);
    assert_eq!(map.get(&1), Some(11));

    assert_eq!(cursor.item(), Ok((2, 21)));
}

#[test]
fn extend_invalidates_at_the_first_new_key() {
    let mut map = OrderedMap::from([(5, 'a'), (6, 'b')]);
    let cursor = map.begin();
    let mut pending = [(5, 'z'), (1, 'y')].into_iter();
    let mut observed = Vec::new();

    map.extend(std::iter::from_fn(|| {
        observed.push(cursor.item());
        pending.next()
    }));

    assert_eq!(observed, [Ok((5, 'a')), Ok((5, 'z')), Err(CursorError::Invalidated)]);
    assert_eq!(map.iter().collect::<Vec<_>>(), [(1, 'y'), (5, 'z'), (6, 'b')]);
}

#[test]
fn structural_mutations_invalidate() {
    let mutations: [fn(&mut OrderedMap<i32, i32>); 6] = [
        |map| assert_eq!(map.insert(0, 0), None),
        |map| assert_eq!(map.remove(&1), Ok(10)),
        |map| assert_eq!(map.pop_first(), Ok((1, 10))),
        |map| assert_eq!(map.pop_last(), Ok((2, 20))),
        |map| map.clear(),
        |map| map.extend([(1, 1), (3, 30)]),
    ];

    for mutate in mutations {
        let mut map = OrderedMap::from([(1, 10), (2, 20)]);
        let cursor = map.begin();
        mutate(&mut map);
        assert_eq!(cursor.is_end(), Err(CursorError::Invalidated));
    }
}

#[test]
#[should_panic(expected = "cursor is invalidated")]
fn adding_to_stale_cursor_panics() {
    let mut map = OrderedMap::from([(1, 1)]);
    let cursor = map.begin();
    map.upsert(2, 2);
    let _ = cursor + 1;
}

// ─── Trait implementations ───────────────────────────────────────────────────

#[test]
fn ordering_compares_pairs_lexicographically() {
    let a = OrderedMap::from([(1, 'a'), (2, 'b')]);
    let b = OrderedMap::from([(1, 'a'), (2, 'c')]);
    let c = OrderedMap::from([(1, 'a')]);

    assert!(a < b);
    assert!(c < a);
    assert_eq!(a, a.clone());
    assert_ne!(a, b);
}

#[test]
fn debug_lists_entries_in_order() {
    let map = OrderedMap::from([(2, "b"), (1, "a")]);
    assert_eq!(format!("{map:?}"), r#"OrderedMap([(1, "a"), (2, "b")])"#);
}
