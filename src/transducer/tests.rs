//! Behavioral tests for transducers and their combinators.

use std::collections::HashSet;
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::*;
use crate::chunk;
use crate::chunk::Chunk;
use crate::effect::{fail as fail_effect, from_fn, from_result, pure};
use crate::scope::Scope;
use crate::testing::{flush_twice, push_all, transduce};

/// Acquire `t`, push every chunk, then check the second flush is empty.
async fn assert_flush_idempotent<T>(t: T, env: &T::Env, data: Vec<Chunk<T::In>>)
where
    T: Transducer,
    T::Out: std::fmt::Debug,
    T::Error: std::fmt::Debug,
{
    let scope = Scope::new();
    let mut push = t.acquire(env, &scope).await.unwrap();
    for chunk in data {
        push.push(env, Input::Data(chunk)).await.unwrap();
    }
    let (_, second) = flush_twice(&mut push, env).await.unwrap();
    assert!(second.is_empty(), "second flush emitted {:?}", second);
    scope.close();
}

/// Identity transducer that registers a counting finalizer when acquired.
struct Tracked {
    released: Arc<AtomicUsize>,
}

fn tracked_branch(
    n: usize,
) -> (
    impl Transducer<In = i32, Out = i32, Error = &'static str, Env = ()>,
    Arc<AtomicUsize>,
) {
    let released = Arc::new(AtomicUsize::new(0));
    let counter = released.clone();
    let t = branch_after(n, move |_: Chunk<i32>| Tracked {
        released: counter.clone(),
    });
    (t, released)
}

impl Transducer for Tracked {
    type In = i32;
    type Out = i32;
    type Error = &'static str;
    type Env = ();
    type Push = Identity<i32, &'static str, ()>;

    async fn acquire(self, _env: &(), scope: &Scope) -> Result<Self::Push, &'static str> {
        let released = self.released;
        scope.add_finalizer(move || {
            released.fetch_add(1, Ordering::SeqCst);
        });
        Ok(identity())
    }
}

// ========== Flush contract ==========

#[tokio::test]
async fn every_constructor_drains_on_second_flush() {
    let data = || vec![chunk![5, 6, 1], chunk![1, 0, 7]];

    assert_flush_idempotent(identity::<i32, Infallible, ()>(), &(), data()).await;
    assert_flush_idempotent(prepend::<i32, Infallible, ()>([9]), &(), data()).await;
    assert_flush_idempotent(
        fold::<i32, i32, _, _, Infallible, ()>(0, |acc| *acc < 10, |a, b| a + b),
        &(),
        data(),
    )
    .await;
    assert_flush_idempotent(fold_left::<i32, i32, _, Infallible, ()>(0, |a, b| a + b), &(), data()).await;
    assert_flush_idempotent(fold_until::<i32, i32, _, Infallible, ()>(0, 2, |a, b| a + b), &(), data()).await;
    assert_flush_idempotent(head::<i32, Infallible, ()>(), &(), data()).await;
    assert_flush_idempotent(last::<i32, Infallible, ()>(), &(), data()).await;
    assert_flush_idempotent(
        fold_weighted::<i32, i32, _, _, Infallible, ()>(0, |_, x| *x as u64, 8, |a, b| a + b),
        &(),
        data(),
    )
    .await;
    assert_flush_idempotent(collect_all::<i32, Infallible, ()>(), &(), data()).await;
    assert_flush_idempotent(collect_all_n::<i32, Infallible, ()>(4), &(), data()).await;
    assert_flush_idempotent(collect_all_to_set_n::<i32, Infallible, ()>(2), &(), data()).await;
    assert_flush_idempotent(
        collect_all_while::<i32, _, Infallible, ()>(|x| *x != 0),
        &(),
        data(),
    )
    .await;
    assert_flush_idempotent(drop_while::<i32, _, Infallible, ()>(|x| *x > 4), &(), data()).await;
    assert_flush_idempotent(
        branch_after(2, |_: Chunk<i32>| collect_all_n::<i32, Infallible, ()>(2)),
        &(),
        data(),
    )
    .await;
}

#[tokio::test]
async fn every_combinator_drains_on_second_flush() {
    let data = || vec![chunk![1, 2, 3], chunk![4, 5]];
    let base = || collect_all_n::<i32, Infallible, ()>(2);

    assert_flush_idempotent(base().map(|c| c.len()), &(), data()).await;
    assert_flush_idempotent(base().map_chunks(|c| c.map(|g| g.len())), &(), data()).await;
    assert_flush_idempotent(base().map_m(|c| pure(c.len())), &(), data()).await;
    assert_flush_idempotent(base().map_chunks_m(|c| pure(c.concat(chunk![chunk![0]]))), &(), data()).await;
    assert_flush_idempotent(base().map_err(|e| e), &(), data()).await;
    assert_flush_idempotent(base().contramap(|x: u8| i32::from(x)), &(), vec![chunk![1u8, 2, 3]]).await;
    assert_flush_idempotent(base().contramap_chunks(|c: Chunk<i32>| c), &(), data()).await;
    assert_flush_idempotent(base().contramap_m(|x: i32| pure(x * 2)), &(), data()).await;
    assert_flush_idempotent(base().filter(|g| g.len() == 2), &(), data()).await;
    assert_flush_idempotent(base().filter_input(|x| x % 2 == 0), &(), data()).await;
    assert_flush_idempotent(base().filter_input_m(|x| pure(*x > 1)), &(), data()).await;
    assert_flush_idempotent(base().then(collect_all_n(2)), &(), data()).await;
    assert_flush_idempotent(base().boxed(), &(), data()).await;
}

#[tokio::test]
async fn map_chunks_does_not_see_repeated_flush() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    // Maps empty to non-empty: only the skip on repeated flush keeps the
    // contract.
    let t = collect_all_n::<i32, Infallible, ()>(2).map_chunks(move |c| {
        counter.fetch_add(1, Ordering::SeqCst);
        c.concat(chunk![chunk![]])
    });

    let outputs = push_all(t, &(), [Input::data([1]), Input::Flush, Input::Flush])
        .await
        .unwrap();

    assert_eq!(outputs[1], chunk![chunk![1], chunk![]]);
    assert!(outputs[2].is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn fold_restarts_after_flush() {
    let outputs = push_all(
        fold_left::<i32, i32, _, Infallible, ()>(0, |a, b| a + b),
        &(),
        [Input::data([1, 2]), Input::Flush, Input::data([10]), Input::Flush],
    )
    .await
    .unwrap();
    assert_eq!(outputs, vec![chunk![], chunk![3], chunk![], chunk![10]]);
}

// ========== Folds ==========

#[tokio::test]
async fn fold_closes_group_when_condition_fails() {
    let sum = || fold::<i32, i32, _, _, Infallible, ()>(0, |acc| *acc < 10, |a, b| a + b);

    let outputs = push_all(sum(), &(), [Input::data([5, 6]), Input::data([1; 8]), Input::Flush])
        .await
        .unwrap();
    assert_eq!(outputs, vec![chunk![11], chunk![], chunk![8]]);

    let outputs = push_all(sum(), &(), [Input::data([5, 6]), Input::data([1; 10]), Input::Flush])
        .await
        .unwrap();
    assert_eq!(outputs, vec![chunk![11], chunk![10], chunk![]]);
}

#[tokio::test]
async fn fold_on_empty_stream_emits_initial() {
    let out = transduce(
        fold_left::<i32, i32, _, Infallible, ()>(7, |a, b| a + b),
        &(),
        Vec::<Chunk<i32>>::new(),
    )
    .await;
    assert_eq!(out, Ok(vec![7]));
}

#[tokio::test]
async fn head_and_last() {
    let input = || [chunk![3, 4], chunk![5]];
    assert_eq!(
        transduce(head::<i32, Infallible, ()>(), &(), input()).await,
        Ok(vec![Some(3)])
    );
    assert_eq!(
        transduce(last::<i32, Infallible, ()>(), &(), input()).await,
        Ok(vec![Some(5)])
    );
    assert_eq!(
        transduce(head::<i32, Infallible, ()>(), &(), Vec::<Chunk<i32>>::new()).await,
        Ok(vec![None])
    );
}

#[tokio::test]
async fn fold_m_reads_environment() {
    #[derive(Clone)]
    struct Env {
        weight: i32,
    }

    let weighted = fold_left_m(0, |acc: i32, x: i32| {
        from_fn(move |env: &Env| Ok::<_, String>(acc + x * env.weight))
    });
    let out = transduce(weighted, &Env { weight: 3 }, [chunk![1, 2]]).await;
    assert_eq!(out, Ok(vec![9]));
}

#[tokio::test]
async fn fold_m_error_aborts_push() {
    let checked = fold_left_m(0, |acc: i32, x: i32| {
        from_result::<_, _, ()>(if x < 0 { Err("negative") } else { Ok(acc + x) })
    });
    let out = transduce(checked, &(), [chunk![1, -1, 2]]).await;
    assert_eq!(out, Err("negative"));
}

// ========== Weighted folds ==========

fn batches(max: u64) -> impl Transducer<In = u64, Out = Vec<u64>, Error = Infallible, Env = ()> {
    fold_weighted(Vec::new(), |_, x: &u64| *x, max, |mut batch: Vec<u64>, x| {
        batch.push(x);
        batch
    })
}

#[tokio::test]
async fn weighted_fold_fresh_flush_emits_nothing() {
    let outputs = push_all(batches(10), &(), [Input::Flush]).await.unwrap();
    assert_eq!(outputs, vec![chunk![]]);
}

#[tokio::test]
async fn weighted_fold_oversized_element_on_clean_accumulator() {
    let outputs = push_all(batches(10), &(), [Input::data([12]), Input::Flush])
        .await
        .unwrap();
    assert_eq!(outputs, vec![chunk![vec![12]], chunk![]]);
}

#[tokio::test]
async fn weighted_fold_dirty_accumulator_is_emitted_first() {
    let outputs = push_all(batches(10), &(), [Input::data([6, 5]), Input::Flush])
        .await
        .unwrap();
    assert_eq!(outputs, vec![chunk![vec![6]], chunk![vec![5]]]);
}

#[tokio::test]
async fn weighted_fold_decomposes_before_giving_up() {
    let sizes = fold_weighted_decompose::<u64, Vec<u64>, _, _, _, Infallible, ()>(
        Vec::new(),
        |_, x| *x,
        5,
        |x| match *x {
            0..=5 => Chunk::empty(),
            x => chunk![5, x - 5],
        },
        |mut batch, x| {
            batch.push(x);
            batch
        },
    );
    let out = transduce(sizes, &(), [chunk![2, 12]]).await.unwrap();
    assert_eq!(out, vec![vec![2], vec![5], vec![5], vec![2]]);
}

#[tokio::test]
async fn weighted_fold_m_propagates_cost_errors() {
    let t = fold_weighted_m(
        0u64,
        |_: &u64, x: &u64| {
            from_result::<u64, &'static str, ()>(if *x == 0 { Err("zero cost") } else { Ok(*x) })
        },
        10,
        |acc: u64, x: u64| pure(acc + x),
    );
    assert_eq!(transduce(t, &(), [chunk![1, 0]]).await, Err("zero cost"));
}

// ========== Grouping ==========

#[tokio::test]
async fn collect_all_n_ignores_chunk_boundaries() {
    let out = transduce(
        collect_all_n::<i32, Infallible, ()>(2),
        &(),
        [chunk![1], chunk![2, 3], chunk![4, 5]],
    )
    .await;
    assert_eq!(out, Ok(vec![chunk![1, 2], chunk![3, 4], chunk![5]]));
}

#[tokio::test]
async fn collect_all_n_zero_behaves_like_one() {
    let out = transduce(collect_all_n::<i32, Infallible, ()>(0), &(), [chunk![1, 2]]).await;
    assert_eq!(out, Ok(vec![chunk![1], chunk![2]]));
}

#[tokio::test]
async fn collect_all_on_empty_stream_yields_empty_group() {
    let out = transduce(collect_all::<i32, Infallible, ()>(), &(), Vec::<Chunk<i32>>::new()).await;
    assert_eq!(out, Ok(vec![Chunk::empty()]));
}

#[tokio::test]
async fn collect_all_to_set_n_starts_new_set_on_overflow() {
    let out = transduce(
        collect_all_to_set_n::<i32, Infallible, ()>(2),
        &(),
        [chunk![1, 1, 2], chunk![2, 3, 1]],
    )
    .await
    .unwrap();
    assert_eq!(out, vec![HashSet::from([1, 2]), HashSet::from([3, 1])]);
}

#[tokio::test]
async fn collect_all_to_set_n_empty_stream_emits_nothing() {
    let out = transduce(
        collect_all_to_set_n::<i32, Infallible, ()>(2),
        &(),
        Vec::<Chunk<i32>>::new(),
    )
    .await;
    assert_eq!(out, Ok(vec![]));
}

#[tokio::test]
async fn collect_all_while_across_chunks() {
    let out = transduce(
        collect_all_while::<i32, _, Infallible, ()>(|x| *x != 0),
        &(),
        [chunk![1, 2, 0, 3], chunk![4, 0, 5]],
    )
    .await;
    assert_eq!(out, Ok(vec![chunk![1, 2], chunk![3, 4], chunk![5]]));
}

#[tokio::test]
async fn collect_all_while_skips_empty_runs() {
    let out = transduce(
        collect_all_while::<i32, _, Infallible, ()>(|x| *x != 0),
        &(),
        [chunk![0, 0, 1, 0], chunk![0]],
    )
    .await;
    assert_eq!(out, Ok(vec![chunk![1]]));
}

#[tokio::test]
async fn collect_all_while_m_matches_pure_version() {
    let t = collect_all_while_m(|x: &i32| pure::<_, Infallible, ()>(*x != 0));
    let out = transduce(t, &(), [chunk![1, 2, 0, 3, 4, 0, 5]]).await;
    assert_eq!(out, Ok(vec![chunk![1, 2], chunk![3, 4], chunk![5]]));
}

// ========== drop_while ==========

#[tokio::test]
async fn drop_while_latch_is_permanent() {
    let outputs = push_all(
        drop_while::<i32, _, Infallible, ()>(|x| *x < 2),
        &(),
        [
            Input::data([1]),
            Input::data([1, 2, 1, 3]),
            Input::Flush,
            Input::data([1]),
        ],
    )
    .await
    .unwrap();
    assert_eq!(outputs, vec![chunk![], chunk![2, 1, 3], chunk![], chunk![1]]);
}

#[tokio::test]
async fn drop_while_m_stops_evaluating_after_latch() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let t = drop_while_m(move |x: &i32| {
        counter.fetch_add(1, Ordering::SeqCst);
        pure::<_, Infallible, ()>(*x < 2)
    });

    let out = transduce(t, &(), [chunk![0, 1, 2, 0, 0]]).await;

    assert_eq!(out, Ok(vec![2, 0, 0]));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

// ========== Composition ==========

#[tokio::test]
async fn then_loses_nothing_on_flush() {
    let t = collect_all_n::<i32, Infallible, ()>(2).then(collect_all_n(2));
    let outputs = push_all(t, &(), [Input::data([1, 2, 3, 4, 5]), Input::Flush])
        .await
        .unwrap();
    assert_eq!(
        outputs,
        vec![
            chunk![chunk![chunk![1, 2], chunk![3, 4]]],
            chunk![chunk![chunk![5]]],
        ]
    );
}

#[tokio::test]
async fn then_flushes_right_even_when_left_is_empty() {
    let t = identity::<i32, Infallible, ()>().then(collect_all_n(3));
    let out = transduce(t, &(), [chunk![1, 2]]).await;
    assert_eq!(out, Ok(vec![chunk![1, 2]]));
}

#[tokio::test]
async fn then_pushes_empty_left_output_through_right() {
    let t = identity::<i32, Infallible, ()>()
        .filter(|x| *x > 0)
        .then(prepend([0]));
    let outputs = push_all(t, &(), [Input::data([-1]), Input::data([5]), Input::Flush])
        .await
        .unwrap();
    assert_eq!(outputs, vec![chunk![0], chunk![5], chunk![]]);
}

#[tokio::test]
async fn combinators_preserve_order() {
    let t = identity::<i32, Infallible, ()>()
        .contramap(|s: String| s.len() as i32)
        .filter_input(|s| !s.is_empty())
        .map(|n| n * 10)
        .filter(|n| *n != 20);
    fn words(ws: &[&str]) -> Chunk<String> {
        ws.iter().map(|w| w.to_string()).collect()
    }
    let out = transduce(t, &(), [words(&["a", "", "bcd"]), words(&["ef", "g"])]).await;
    assert_eq!(out, Ok(vec![10, 30, 10]));
}

#[tokio::test]
async fn map_err_lines_up_error_types() {
    #[derive(Debug, PartialEq)]
    enum PipelineError {
        Parse(&'static str),
    }

    let parse = fail::<i32, i32, _, ()>("bad input").map_err(PipelineError::Parse);
    let t = parse.then(identity::<i32, PipelineError, ()>());
    let out = transduce(t, &(), [chunk![1]]).await;
    assert_eq!(out, Err(PipelineError::Parse("bad input")));
}

#[tokio::test]
async fn map_m_failure_aborts_push() {
    let t = identity::<i32, &'static str, ()>().map_m(|x| {
        from_result::<_, _, ()>(if x > 2 { Err("too big") } else { Ok(x) })
    });
    let out = transduce(t, &(), [chunk![1, 2], chunk![3]]).await;
    assert_eq!(out, Err("too big"));
}

#[tokio::test]
async fn filter_input_m_failure_aborts_push() {
    let t = identity::<i32, &'static str, ()>()
        .filter_input_m(|x| match *x {
            0 => from_result::<bool, &'static str, ()>(Err("zero")),
            x => from_result(Ok(x > 1)),
        });
    let out = transduce(t, &(), [chunk![1, 2, 0]]).await;
    assert_eq!(out, Err("zero"));
}

#[tokio::test]
async fn boxed_transducers_share_a_collection() {
    let pipelines: Vec<BoxedTransducer<i32, i32, Infallible, ()>> = vec![
        identity().boxed(),
        fold_left(0, |a: i32, b: i32| a + b).boxed(),
        identity().map(|x: i32| -x).boxed(),
    ];

    let mut results = Vec::new();
    for t in pipelines {
        results.push(transduce(t, &(), [chunk![1, 2, 3]]).await.unwrap());
    }
    assert_eq!(results, vec![vec![1, 2, 3], vec![6], vec![-1, -2, -3]]);
}

#[tokio::test]
async fn prepend_emits_prefix_once() {
    let outputs = push_all(
        prepend::<i32, Infallible, ()>([0]),
        &(),
        [Input::data([1]), Input::data([2]), Input::Flush],
    )
    .await
    .unwrap();
    assert_eq!(outputs, vec![chunk![0, 1], chunk![2], chunk![]]);
}

// ========== Text ==========

#[tokio::test]
async fn utf8_decode_joins_split_character() {
    let euro = "€".as_bytes();
    let outputs = push_all(
        utf8_decode::<Infallible, ()>(),
        &(),
        [
            Input::data([b'a', euro[0]]),
            Input::data([euro[1]]),
            Input::data([euro[2], b'b']),
            Input::Flush,
        ],
    )
    .await
    .unwrap();
    assert_eq!(
        outputs,
        vec![
            chunk!["a".to_string()],
            chunk![],
            chunk!["€b".to_string()],
            chunk![],
        ]
    );
}

#[tokio::test]
async fn utf8_decode_replaces_invalid_and_truncated_bytes() {
    let out = transduce(
        utf8_decode::<Infallible, ()>(),
        &(),
        [chunk![b'x', 0xFF, b'y', 0xE2, 0x82]],
    )
    .await
    .unwrap();
    assert_eq!(out.concat(), "x\u{FFFD}y\u{FFFD}");
}

#[tokio::test]
async fn utf8_decode_strips_split_bom() {
    let out = transduce(
        utf8_decode::<Infallible, ()>(),
        &(),
        [chunk![0xEF, 0xBB], chunk![0xBF, b'h', b'i']],
    )
    .await
    .unwrap();
    assert_eq!(out, vec!["hi".to_string()]);
}

#[tokio::test]
async fn split_on_delimiter_straddling_chunks() {
    let out = transduce(
        split_on::<Infallible, ()>("<>"),
        &(),
        [
            chunk!["one<".to_string()],
            chunk![">two<>".to_string()],
            chunk!["<>three".to_string()],
        ],
    )
    .await
    .unwrap();
    assert_eq!(out, vec!["one", "two", "", "three"]);
}

#[tokio::test]
async fn split_lines_drops_trailing_empty_line() {
    let out = transduce(
        split_lines::<Infallible, ()>(),
        &(),
        [chunk!["a\r\nb\n".to_string()]],
    )
    .await
    .unwrap();
    assert_eq!(out, vec!["a", "b"]);
}

#[tokio::test]
async fn split_on_multibyte_delimiter_after_multibyte_text() {
    let out = transduce(
        split_on::<Infallible, ()>("€€"),
        &(),
        [chunk!["aé€".to_string()], chunk!["€b".to_string()]],
    )
    .await
    .unwrap();
    assert_eq!(out, vec!["aé", "b"]);
}

#[tokio::test]
async fn split_lines_keeps_only_the_open_line() {
    let mut input: Vec<Chunk<String>> = (0..5000).map(|_| chunk!["x".to_string()]).collect();
    input.push(chunk!["\r".to_string(), "\nrest".to_string()]);

    let scope = Scope::new();
    let mut push = split_lines::<Infallible, ()>().acquire(&(), &scope).await.unwrap();
    let mut lines = Vec::new();
    for chunk in input {
        lines.extend(push.push(&(), Input::Data(chunk)).await.unwrap());
    }

    assert_eq!(lines, vec!["x".repeat(5000)]);
    assert_eq!(push.push(&(), Input::Flush).await.unwrap(), chunk!["rest".to_string()]);
    scope.close();
}

// ========== branch_after and scopes ==========

#[tokio::test]
async fn branch_after_passes_prefix_to_factory() {
    let t = branch_after(2, |prefix: Chunk<i32>| {
        let offset = prefix.iter().sum::<i32>();
        identity::<i32, Infallible, ()>().map(move |x| x + offset)
    });
    let out = transduce(t, &(), [chunk![1], chunk![2, 10], chunk![20]]).await;
    assert_eq!(out, Ok(vec![13, 23]));
}

#[tokio::test]
async fn branch_after_short_stream_flushes_partial_prefix() {
    let t = branch_after(3, |prefix: Chunk<i32>| prepend::<i32, Infallible, ()>(prefix));
    let out = transduce(t, &(), [chunk![1, 2]]).await;
    assert_eq!(out, Ok(vec![1, 2]));
}

#[tokio::test]
async fn branch_finalizer_released_on_flush() {
    let (t, released) = tracked_branch(1);
    let scope = Scope::new();
    let mut push = t.acquire(&(), &scope).await.unwrap();

    push.push(&(), Input::data([0, 1])).await.unwrap();
    assert_eq!(released.load(Ordering::SeqCst), 0);

    push.push(&(), Input::Flush).await.unwrap();
    assert_eq!(released.load(Ordering::SeqCst), 1);

    scope.close();
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn repeated_branches_do_not_grow_outer_scope() {
    let (t, released) = tracked_branch(1);
    let scope = Scope::new();
    let mut push = t.acquire(&(), &scope).await.unwrap();

    for _ in 0..1000 {
        push.push(&(), Input::data([0, 1])).await.unwrap();
        push.push(&(), Input::Flush).await.unwrap();
    }

    assert_eq!(released.load(Ordering::SeqCst), 1000);
    assert_eq!(scope.pending_finalizers(), 0);
    scope.close();
}

#[tokio::test]
async fn branch_finalizer_released_when_outer_scope_closes() {
    let (t, released) = tracked_branch(1);
    let scope = Scope::new();
    let mut push = t.acquire(&(), &scope).await.unwrap();
    push.push(&(), Input::data([0, 1])).await.unwrap();

    scope.close();
    assert_eq!(released.load(Ordering::SeqCst), 1);

    // Flushing afterwards does not release again.
    push.push(&(), Input::Flush).await.unwrap();
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn branch_finalizer_released_when_push_dropped() {
    let (t, released) = tracked_branch(1);
    let scope = Scope::new();
    let mut push = t.acquire(&(), &scope).await.unwrap();
    push.push(&(), Input::data([0, 1])).await.unwrap();

    drop(push);
    assert_eq!(released.load(Ordering::SeqCst), 1);

    scope.close();
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn branch_finalizer_released_for_partial_prefix() {
    let (t, released) = tracked_branch(5);
    let out = transduce(t, &(), [chunk![1, 2]]).await;
    assert_eq!(out, Ok(vec![]));
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_push_still_releases_scope() {
    let released = Arc::new(AtomicUsize::new(0));
    let t = Tracked {
        released: released.clone(),
    }
    .map_m(|x| fail_effect::<i32, _, ()>(if x > 0 { "positive" } else { "other" }));

    let out = push_all(t, &(), [Input::data([1])]).await;

    assert_eq!(out, Err("positive"));
    assert_eq!(released.load(Ordering::SeqCst), 1);
}
