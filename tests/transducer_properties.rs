//! Property-based tests for the push/flush contract

use std::convert::Infallible;

use proptest::prelude::*;
use weir::testing::{flush_twice, transduce};
use weir::transducer::{
    collect_all_n, collect_all_while, drop_while, fold, fold_left, identity, Input, Push,
    Transducer, TransducerExt,
};
use weir::{Chunk, Scope};

fn chunks() -> impl Strategy<Value = Vec<Vec<i32>>> {
    prop::collection::vec(prop::collection::vec(-50i32..50, 0..8), 0..8)
}

fn run<T>(t: T, input: &[Vec<i32>]) -> Vec<T::Out>
where
    T: Transducer<In = i32, Error = Infallible, Env = ()>,
{
    let input: Vec<Chunk<i32>> = input.iter().cloned().map(Chunk::from).collect();
    match tokio_test::block_on(transduce(t, &(), input)) {
        Ok(out) => out,
        Err(never) => match never {},
    }
}

/// Push every chunk, flush twice, and return the second flush.
fn second_flush<T>(t: T, input: &[Vec<i32>]) -> Chunk<T::Out>
where
    T: Transducer<In = i32, Error = Infallible, Env = ()>,
{
    tokio_test::block_on(async {
        let scope = Scope::new();
        let mut push = t.acquire(&(), &scope).await.unwrap();
        for chunk in input {
            push.push(&(), Input::data(chunk.clone())).await.unwrap();
        }
        let (_, second) = flush_twice(&mut push, &()).await.unwrap();
        scope.close();
        second
    })
}

fn flatten(input: &[Vec<i32>]) -> Vec<i32> {
    input.iter().flatten().copied().collect()
}

proptest! {
    #[test]
    fn prop_flush_is_idempotent(input in chunks(), n in 1usize..5) {
        prop_assert!(second_flush(collect_all_n::<i32, Infallible, ()>(n), &input).is_empty());
        prop_assert!(second_flush(fold::<i32, i32, _, _, Infallible, ()>(0, |a| *a < 20, |a, b| a + b), &input).is_empty());
        prop_assert!(second_flush(collect_all_while::<i32, _, Infallible, ()>(|x| x % 3 != 0), &input).is_empty());
        prop_assert!(second_flush(drop_while::<i32, _, Infallible, ()>(|x| *x < 0), &input).is_empty());
        prop_assert!(second_flush(
            collect_all_n::<i32, Infallible, ()>(n).then(collect_all_n(2)),
            &input
        ).is_empty());
    }

    #[test]
    fn prop_collect_all_n_round_trips(input in chunks(), n in 1usize..6) {
        let groups = run(collect_all_n::<i32, Infallible, ()>(n), &input);

        let rejoined: Vec<i32> = groups.iter().flat_map(|g| g.iter().copied()).collect();
        prop_assert_eq!(rejoined, flatten(&input));

        if let Some((last, full)) = groups.split_last() {
            prop_assert!(full.iter().all(|g| g.len() == n));
            prop_assert!(!last.is_empty() && last.len() <= n);
        }
    }

    #[test]
    fn prop_identity_preserves_order(input in chunks()) {
        let out = run(identity::<i32, Infallible, ()>().map(|x| x * 2), &input);
        let expected: Vec<i32> = flatten(&input).into_iter().map(|x| x * 2).collect();
        prop_assert_eq!(out, expected);
    }

    #[test]
    fn prop_filter_keeps_relative_order(input in chunks()) {
        let out = run(identity::<i32, Infallible, ()>().filter(|x| *x >= 0), &input);
        let expected: Vec<i32> = flatten(&input).into_iter().filter(|x| *x >= 0).collect();
        prop_assert_eq!(out, expected);
    }

    #[test]
    fn prop_then_neither_loses_nor_duplicates(input in chunks(), a in 1usize..4, b in 1usize..4) {
        let nested = run(
            collect_all_n::<i32, Infallible, ()>(a).then(collect_all_n(b)),
            &input,
        );
        let rejoined: Vec<i32> = nested
            .iter()
            .flat_map(|outer| outer.iter().flat_map(|inner| inner.iter().copied()))
            .collect();
        prop_assert_eq!(rejoined, flatten(&input));
    }

    #[test]
    fn prop_fold_left_matches_iterator_sum(input in chunks()) {
        let out = run(fold_left::<i32, i64, _, Infallible, ()>(0, |a, b| a + i64::from(b)), &input);
        let expected: i64 = flatten(&input).into_iter().map(i64::from).sum();
        prop_assert_eq!(out, vec![expected]);
    }

    #[test]
    fn prop_fold_groups_partition_the_input(input in prop::collection::vec(prop::collection::vec(1i32..10, 0..8), 0..8)) {
        // With positive elements every emitted group except the last has
        // crossed the threshold.
        let sums = run(fold::<i32, i32, _, _, Infallible, ()>(0, |a| *a < 10, |a, b| a + b), &input);
        prop_assert_eq!(sums.iter().sum::<i32>(), flatten(&input).iter().sum::<i32>());
        if let Some((_, full)) = sums.split_last() {
            prop_assert!(full.iter().all(|s| *s >= 10));
        }
    }
}
