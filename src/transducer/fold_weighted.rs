//! Cost-bounded folds.
//!
//! A weighted fold keeps a running cost next to its accumulator and closes an
//! aggregate before the cost would exceed `max`. An element that does not fit
//! is first offered to `decompose`:
//!
//! - more than one piece: each piece is retried in order, as if it had been
//!   the next input element;
//! - at most one piece, accumulator dirty: the accumulator is emitted and a
//!   new one is seeded with the piece (or the element itself);
//! - at most one piece, accumulator clean: the piece is folded in anyway and
//!   the result is emitted on its own, crossing `max`.
//!
//! "Dirty" means the accumulator has taken at least one element since it was
//! last reset. The clean case is the only way an aggregate exceeds `max`, and
//! it guarantees that no element is dropped or retried forever.

use std::collections::VecDeque;
use std::marker::PhantomData;

use crate::chunk::Chunk;
use crate::effect::{pure, Effect, Pure};
use crate::scope::Scope;
use crate::transducer::trait_def::{Input, Push, Transducer};

#[derive(Debug)]
struct Weighted<O> {
    result: O,
    cost: u64,
    dirty: bool,
}

/// Weighted fold with effectful cost, decomposition and step. Every weighted
/// constructor in this module returns one of these.
pub struct FoldWeightedM<I, O, Z, C, D, F, E, Env> {
    init: Z,
    cost: C,
    decompose: D,
    f: F,
    max: u64,
    state: Option<Weighted<O>>,
    _phantom: PhantomData<fn() -> (I, E, Env)>,
}

impl<I, O: std::fmt::Debug, Z, C, D, F, E, Env> std::fmt::Debug
    for FoldWeightedM<I, O, Z, C, D, F, E, Env>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FoldWeightedM")
            .field("max", &self.max)
            .field("state", &self.state)
            .field("f", &"<function>")
            .finish()
    }
}

pub(crate) fn fold_weighted_m_with<I, O, Z, C, D, F, CE, DE, FE, E, Env>(
    init: Z,
    cost: C,
    max: u64,
    decompose: D,
    f: F,
) -> FoldWeightedM<I, O, Z, C, D, F, E, Env>
where
    I: Send,
    O: Send,
    Z: Fn() -> O + Send + Sync,
    C: Fn(&O, &I) -> CE + Send + Sync,
    D: Fn(&I) -> DE + Send + Sync,
    F: Fn(O, I) -> FE + Send + Sync,
    CE: Effect<Output = u64, Error = E, Env = Env>,
    DE: Effect<Output = Chunk<I>, Error = E, Env = Env>,
    FE: Effect<Output = O, Error = E, Env = Env>,
    E: Send,
    Env: Clone + Send + Sync,
{
    FoldWeightedM {
        init,
        cost,
        decompose,
        f,
        max,
        state: None,
        _phantom: PhantomData,
    }
}

/// Fold elements while their summed cost stays within `max`.
///
/// Elements are never split: one whose cost alone exceeds `max` becomes a
/// group of its own.
///
/// ```rust
/// use std::convert::Infallible;
/// use weir::testing::transduce;
/// use weir::{chunk, transducer::fold_weighted};
///
/// # tokio_test::block_on(async {
/// let batches = fold_weighted::<u64, Vec<u64>, _, _, Infallible, ()>(
///     Vec::new(),
///     |_, size| *size,
///     10,
///     |mut batch, size| {
///         batch.push(size);
///         batch
///     },
/// );
/// let out = transduce(batches, &(), [chunk![4, 5, 3, 12, 1]]).await.unwrap();
/// assert_eq!(out, vec![vec![4, 5], vec![3], vec![12], vec![1]]);
/// # });
/// ```
pub fn fold_weighted<I, O, C, F, E, Env>(
    initial: O,
    cost: C,
    max: u64,
    f: F,
) -> impl Transducer<In = I, Out = O, Error = E, Env = Env>
where
    I: Send,
    O: Clone + Send + Sync,
    C: Fn(&O, &I) -> u64 + Send + Sync,
    F: Fn(O, I) -> O + Send + Sync,
    E: Send,
    Env: Clone + Send + Sync,
{
    fold_weighted_decompose(initial, cost, max, |_: &I| Chunk::empty(), f)
}

/// Like [`fold_weighted`], but elements that do not fit are first split by
/// `decompose`.
///
/// ```rust
/// use std::convert::Infallible;
/// use weir::testing::transduce;
/// use weir::{chunk, transducer::fold_weighted_decompose, Chunk};
///
/// # tokio_test::block_on(async {
/// // Split oversized numbers into halves until they fit.
/// let sums = fold_weighted_decompose::<u64, u64, _, _, _, Infallible, ()>(
///     0,
///     |_, x| *x,
///     4,
///     |x| {
///         if *x > 1 {
///             chunk![x / 2, x - x / 2]
///         } else {
///             Chunk::empty()
///         }
///     },
///     |acc, x| acc + x,
/// );
/// let out = transduce(sums, &(), [chunk![3, 6]]).await.unwrap();
/// assert_eq!(out, vec![4, 4, 1]);
/// # });
/// ```
pub fn fold_weighted_decompose<I, O, C, D, F, E, Env>(
    initial: O,
    cost: C,
    max: u64,
    decompose: D,
    f: F,
) -> impl Transducer<In = I, Out = O, Error = E, Env = Env>
where
    I: Send,
    O: Clone + Send + Sync,
    C: Fn(&O, &I) -> u64 + Send + Sync,
    D: Fn(&I) -> Chunk<I> + Send + Sync,
    F: Fn(O, I) -> O + Send + Sync,
    E: Send,
    Env: Clone + Send + Sync,
{
    fold_weighted_with(move || initial.clone(), cost, max, decompose, f)
}

/// Synchronous weighted fold seeded by a factory, so `O` need not be `Clone`.
pub(crate) fn fold_weighted_with<I, O, Z, C, D, F, E, Env>(
    init: Z,
    cost: C,
    max: u64,
    decompose: D,
    f: F,
) -> FoldWeightedM<
    I,
    O,
    Z,
    impl Fn(&O, &I) -> Pure<u64, E, Env> + Send + Sync,
    impl Fn(&I) -> Pure<Chunk<I>, E, Env> + Send + Sync,
    impl Fn(O, I) -> Pure<O, E, Env> + Send + Sync,
    E,
    Env,
>
where
    I: Send,
    O: Send,
    Z: Fn() -> O + Send + Sync,
    C: Fn(&O, &I) -> u64 + Send + Sync,
    D: Fn(&I) -> Chunk<I> + Send + Sync,
    F: Fn(O, I) -> O + Send + Sync,
    E: Send,
    Env: Clone + Send + Sync,
{
    fold_weighted_m_with(
        init,
        move |acc: &O, item: &I| pure(cost(acc, item)),
        max,
        move |item: &I| pure(decompose(item)),
        move |acc: O, item: I| pure(f(acc, item)),
    )
}

/// Like [`fold_weighted`], with effectful cost and step functions.
pub fn fold_weighted_m<I, O, C, F, CE, FE, E, Env>(
    initial: O,
    cost: C,
    max: u64,
    f: F,
) -> impl Transducer<In = I, Out = O, Error = E, Env = Env>
where
    I: Send,
    O: Clone + Send + Sync,
    C: Fn(&O, &I) -> CE + Send + Sync,
    F: Fn(O, I) -> FE + Send + Sync,
    CE: Effect<Output = u64, Error = E, Env = Env>,
    FE: Effect<Output = O, Error = E, Env = Env>,
    E: Send,
    Env: Clone + Send + Sync,
{
    fold_weighted_m_with(
        move || initial.clone(),
        cost,
        max,
        |_: &I| pure(Chunk::empty()),
        f,
    )
}

/// Like [`fold_weighted_decompose`], with effectful cost, decomposition and
/// step functions.
pub fn fold_weighted_decompose_m<I, O, C, D, F, CE, DE, FE, E, Env>(
    initial: O,
    cost: C,
    max: u64,
    decompose: D,
    f: F,
) -> impl Transducer<In = I, Out = O, Error = E, Env = Env>
where
    I: Send,
    O: Clone + Send + Sync,
    C: Fn(&O, &I) -> CE + Send + Sync,
    D: Fn(&I) -> DE + Send + Sync,
    F: Fn(O, I) -> FE + Send + Sync,
    CE: Effect<Output = u64, Error = E, Env = Env>,
    DE: Effect<Output = Chunk<I>, Error = E, Env = Env>,
    FE: Effect<Output = O, Error = E, Env = Env>,
    E: Send,
    Env: Clone + Send + Sync,
{
    fold_weighted_m_with(move || initial.clone(), cost, max, decompose, f)
}

impl<I, O, Z, C, D, F, CE, DE, FE, E, Env> FoldWeightedM<I, O, Z, C, D, F, E, Env>
where
    I: Send,
    O: Send,
    Z: Fn() -> O + Send + Sync,
    C: Fn(&O, &I) -> CE + Send + Sync,
    D: Fn(&I) -> DE + Send + Sync,
    F: Fn(O, I) -> FE + Send + Sync,
    CE: Effect<Output = u64, Error = E, Env = Env>,
    DE: Effect<Output = Chunk<I>, Error = E, Env = Env>,
    FE: Effect<Output = O, Error = E, Env = Env>,
    E: Send,
    Env: Clone + Send + Sync,
{
    fn clean(&self) -> Weighted<O> {
        Weighted {
            result: (self.init)(),
            cost: 0,
            dirty: false,
        }
    }

    async fn fold_chunk(&mut self, env: &Env, chunk: Chunk<I>) -> Result<Chunk<O>, E> {
        let mut acc = match self.state.take() {
            Some(acc) => acc,
            None => self.clean(),
        };
        let mut queue: VecDeque<I> = chunk.into_iter().collect();
        let mut out = Vec::new();

        while let Some(item) = queue.pop_front() {
            let cost = (self.cost)(&acc.result, &item);
            let total = acc.cost.saturating_add(cost.run(env).await?);

            if total <= self.max {
                let step = (self.f)(acc.result, item);
                acc = Weighted {
                    result: step.run(env).await?,
                    cost: total,
                    dirty: true,
                };
                continue;
            }

            let pieces = (self.decompose)(&item);
            let pieces = pieces.run(env).await?;
            if pieces.len() > 1 {
                for piece in pieces.into_vec().into_iter().rev() {
                    queue.push_front(piece);
                }
                continue;
            }

            let elem = pieces.into_iter().next().unwrap_or(item);
            if acc.dirty {
                out.push(acc.result);
                let seed = (self.init)();
                let cost = (self.cost)(&seed, &elem);
                let cost = cost.run(env).await?;
                let step = (self.f)(seed, elem);
                acc = Weighted {
                    result: step.run(env).await?,
                    cost,
                    dirty: true,
                };
            } else {
                let step = (self.f)(acc.result, elem);
                out.push(step.run(env).await?);
                acc = self.clean();
            }
        }

        if acc.dirty {
            self.state = Some(acc);
        }
        Ok(Chunk::from(out))
    }
}

impl<I, O, Z, C, D, F, CE, DE, FE, E, Env> Transducer for FoldWeightedM<I, O, Z, C, D, F, E, Env>
where
    I: Send,
    O: Send,
    Z: Fn() -> O + Send + Sync,
    C: Fn(&O, &I) -> CE + Send + Sync,
    D: Fn(&I) -> DE + Send + Sync,
    F: Fn(O, I) -> FE + Send + Sync,
    CE: Effect<Output = u64, Error = E, Env = Env>,
    DE: Effect<Output = Chunk<I>, Error = E, Env = Env>,
    FE: Effect<Output = O, Error = E, Env = Env>,
    E: Send,
    Env: Clone + Send + Sync,
{
    type In = I;
    type Out = O;
    type Error = E;
    type Env = Env;
    type Push = Self;

    async fn acquire(self, _env: &Env, _scope: &Scope) -> Result<Self, E> {
        Ok(self)
    }
}

impl<I, O, Z, C, D, F, CE, DE, FE, E, Env> Push for FoldWeightedM<I, O, Z, C, D, F, E, Env>
where
    I: Send,
    O: Send,
    Z: Fn() -> O + Send + Sync,
    C: Fn(&O, &I) -> CE + Send + Sync,
    D: Fn(&I) -> DE + Send + Sync,
    F: Fn(O, I) -> FE + Send + Sync,
    CE: Effect<Output = u64, Error = E, Env = Env>,
    DE: Effect<Output = Chunk<I>, Error = E, Env = Env>,
    FE: Effect<Output = O, Error = E, Env = Env>,
    E: Send,
    Env: Clone + Send + Sync,
{
    type In = I;
    type Out = O;
    type Error = E;
    type Env = Env;

    async fn push(&mut self, env: &Env, input: Input<I>) -> Result<Chunk<O>, E> {
        match input {
            Input::Data(chunk) => self.fold_chunk(env, chunk).await,
            Input::Flush => Ok(self
                .state
                .take()
                .map(|acc| Chunk::single(acc.result))
                .unwrap_or_default()),
        }
    }
}
