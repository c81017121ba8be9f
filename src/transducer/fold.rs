//! Folding transducers.
//!
//! A fold accumulates elements into a single value and emits that value
//! whenever the continuation predicate rejects it. Its state is
//! `Option<O>`:
//!
//! - a fresh fold holds `Some(initial)`, so flushing an untouched fold emits
//!   `initial` (this is what makes `fold_left` over an empty stream yield its
//!   seed);
//! - a fold that just emitted holds `None`, so a flush emits nothing;
//! - a flush always leaves `None` behind.

use std::marker::PhantomData;

use crate::chunk::Chunk;
use crate::effect::Effect;
use crate::scope::Scope;
use crate::transducer::trait_def::{Input, Push, Transducer};
use crate::transducer::TransducerExt;

/// Synchronous fold. Created by [`fold`] and friends.
pub struct Fold<I, O, Z, C, F, E, Env> {
    init: Z,
    cont: C,
    f: F,
    state: Option<O>,
    _phantom: PhantomData<fn() -> (I, E, Env)>,
}

impl<I, O: std::fmt::Debug, Z, C, F, E, Env> std::fmt::Debug for Fold<I, O, Z, C, F, E, Env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fold")
            .field("state", &self.state)
            .field("f", &"<function>")
            .finish()
    }
}

pub(crate) fn fold_with<I, O, Z, C, F, E, Env>(init: Z, cont: C, f: F) -> Fold<I, O, Z, C, F, E, Env>
where
    I: Send,
    O: Send,
    Z: Fn() -> O + Send + Sync,
    C: Fn(&O) -> bool + Send + Sync,
    F: Fn(O, I) -> O + Send + Sync,
    E: Send,
    Env: Clone + Send + Sync,
{
    Fold {
        init,
        cont,
        f,
        state: None,
        _phantom: PhantomData,
    }
}

/// Fold elements into `O`, emitting and restarting each time `cont` rejects
/// the accumulator.
///
/// The element that makes `cont` fail is part of the emitted value. Folding
/// resumes from `initial` with the next element of the same chunk.
///
/// ```rust
/// use std::convert::Infallible;
/// use weir::testing::transduce;
/// use weir::{chunk, transducer::fold};
///
/// # tokio_test::block_on(async {
/// let sums = fold::<i32, i32, _, _, Infallible, ()>(0, |acc| *acc < 10, |acc, x| acc + x);
/// let out = transduce(sums, &(), [chunk![5, 6, 1, 1], chunk![1, 1, 1, 1, 1, 1]])
///     .await
///     .unwrap();
/// assert_eq!(out, vec![11, 8]);
/// # });
/// ```
pub fn fold<I, O, C, F, E, Env>(
    initial: O,
    cont: C,
    f: F,
) -> impl Transducer<In = I, Out = O, Error = E, Env = Env>
where
    I: Send,
    O: Clone + Send + Sync,
    C: Fn(&O) -> bool + Send + Sync,
    F: Fn(O, I) -> O + Send + Sync,
    E: Send,
    Env: Clone + Send + Sync,
{
    fold_with(move || initial.clone(), cont, f)
}

/// Fold every element into one value, emitted on flush.
pub fn fold_left<I, O, F, E, Env>(
    initial: O,
    f: F,
) -> impl Transducer<In = I, Out = O, Error = E, Env = Env>
where
    I: Send,
    O: Clone + Send + Sync,
    F: Fn(O, I) -> O + Send + Sync,
    E: Send,
    Env: Clone + Send + Sync,
{
    fold(initial, |_: &O| true, f)
}

/// Fold at most `max` elements into each emitted value.
///
/// ```rust
/// use std::convert::Infallible;
/// use weir::testing::transduce;
/// use weir::{chunk, transducer::fold_until};
///
/// # tokio_test::block_on(async {
/// let pairs = fold_until::<i32, i32, _, Infallible, ()>(0, 2, |acc, x| acc + x);
/// let out = transduce(pairs, &(), [chunk![1, 2, 3, 4, 5]]).await.unwrap();
/// assert_eq!(out, vec![3, 7, 5]);
/// # });
/// ```
pub fn fold_until<I, O, F, E, Env>(
    initial: O,
    max: usize,
    f: F,
) -> impl Transducer<In = I, Out = O, Error = E, Env = Env>
where
    I: Send,
    O: Clone + Send + Sync,
    F: Fn(O, I) -> O + Send + Sync,
    E: Send,
    Env: Clone + Send + Sync,
{
    fold_with(
        move || (initial.clone(), 0usize),
        move |(_, count): &(O, usize)| *count < max,
        move |(acc, count): (O, usize), item: I| (f(acc, item), count + 1),
    )
    .map(|(acc, _)| acc)
}

/// Emit the first element of the stream, or `None` if it was empty.
pub fn head<I, E, Env>() -> impl Transducer<In = I, Out = Option<I>, Error = E, Env = Env>
where
    I: Send,
    E: Send,
    Env: Clone + Send + Sync,
{
    fold_with(
        || None,
        |_: &Option<I>| true,
        |acc: Option<I>, item: I| acc.or(Some(item)),
    )
}

/// Emit the last element of the stream, or `None` if it was empty.
pub fn last<I, E, Env>() -> impl Transducer<In = I, Out = Option<I>, Error = E, Env = Env>
where
    I: Send,
    E: Send,
    Env: Clone + Send + Sync,
{
    fold_with(|| None, |_: &Option<I>| true, |_: Option<I>, item: I| Some(item))
}

impl<I, O, Z, C, F, E, Env> Fold<I, O, Z, C, F, E, Env>
where
    Z: Fn() -> O,
    C: Fn(&O) -> bool,
    F: Fn(O, I) -> O,
{
    fn fold_chunk(&mut self, chunk: Chunk<I>) -> Chunk<O> {
        let mut progress = self.state.is_some();
        let mut acc = match self.state.take() {
            Some(acc) => acc,
            None => (self.init)(),
        };
        let mut out = Vec::new();

        for item in chunk {
            let next = (self.f)(acc, item);
            if (self.cont)(&next) {
                acc = next;
                progress = true;
            } else {
                out.push(next);
                acc = (self.init)();
                progress = false;
            }
        }

        if progress {
            self.state = Some(acc);
        }
        Chunk::from(out)
    }
}

impl<I, O, Z, C, F, E, Env> Transducer for Fold<I, O, Z, C, F, E, Env>
where
    I: Send,
    O: Send,
    Z: Fn() -> O + Send + Sync,
    C: Fn(&O) -> bool + Send + Sync,
    F: Fn(O, I) -> O + Send + Sync,
    E: Send,
    Env: Clone + Send + Sync,
{
    type In = I;
    type Out = O;
    type Error = E;
    type Env = Env;
    type Push = Self;

    async fn acquire(mut self, _env: &Env, _scope: &Scope) -> Result<Self, E> {
        self.state = Some((self.init)());
        Ok(self)
    }
}

impl<I, O, Z, C, F, E, Env> Push for Fold<I, O, Z, C, F, E, Env>
where
    I: Send,
    O: Send,
    Z: Fn() -> O + Send + Sync,
    C: Fn(&O) -> bool + Send + Sync,
    F: Fn(O, I) -> O + Send + Sync,
    E: Send,
    Env: Clone + Send + Sync,
{
    type In = I;
    type Out = O;
    type Error = E;
    type Env = Env;

    async fn push(&mut self, _env: &Env, input: Input<I>) -> Result<Chunk<O>, E> {
        Ok(match input {
            Input::Data(chunk) => self.fold_chunk(chunk),
            Input::Flush => self.state.take().map(Chunk::single).unwrap_or_default(),
        })
    }
}

/// Effectful fold. Created by [`fold_m`] and [`fold_left_m`].
pub struct FoldM<I, O, Z, C, F, E, Env> {
    init: Z,
    cont: C,
    f: F,
    state: Option<O>,
    _phantom: PhantomData<fn() -> (I, E, Env)>,
}

impl<I, O: std::fmt::Debug, Z, C, F, E, Env> std::fmt::Debug for FoldM<I, O, Z, C, F, E, Env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FoldM")
            .field("state", &self.state)
            .field("f", &"<function>")
            .finish()
    }
}

pub(crate) fn fold_m_with<I, O, Z, C, F, Eff, E, Env>(
    init: Z,
    cont: C,
    f: F,
) -> FoldM<I, O, Z, C, F, E, Env>
where
    I: Send,
    O: Send,
    Z: Fn() -> O + Send + Sync,
    C: Fn(&O) -> bool + Send + Sync,
    F: Fn(O, I) -> Eff + Send + Sync,
    Eff: Effect<Output = O, Error = E, Env = Env>,
    E: Send,
    Env: Clone + Send + Sync,
{
    FoldM {
        init,
        cont,
        f,
        state: None,
        _phantom: PhantomData,
    }
}

/// Like [`fold`], with an effectful step.
///
/// If a step fails, the push fails and the partial accumulator is lost.
pub fn fold_m<I, O, C, F, Eff>(
    initial: O,
    cont: C,
    f: F,
) -> impl Transducer<In = I, Out = O, Error = Eff::Error, Env = Eff::Env>
where
    I: Send,
    O: Clone + Send + Sync,
    C: Fn(&O) -> bool + Send + Sync,
    F: Fn(O, I) -> Eff + Send + Sync,
    Eff: Effect<Output = O>,
{
    fold_m_with(move || initial.clone(), cont, f)
}

/// Like [`fold_left`], with an effectful step.
pub fn fold_left_m<I, O, F, Eff>(
    initial: O,
    f: F,
) -> impl Transducer<In = I, Out = O, Error = Eff::Error, Env = Eff::Env>
where
    I: Send,
    O: Clone + Send + Sync,
    F: Fn(O, I) -> Eff + Send + Sync,
    Eff: Effect<Output = O>,
{
    fold_m(initial, |_: &O| true, f)
}

impl<I, O, Z, C, F, Eff, E, Env> Transducer for FoldM<I, O, Z, C, F, E, Env>
where
    I: Send,
    O: Send,
    Z: Fn() -> O + Send + Sync,
    C: Fn(&O) -> bool + Send + Sync,
    F: Fn(O, I) -> Eff + Send + Sync,
    Eff: Effect<Output = O, Error = E, Env = Env>,
    E: Send,
    Env: Clone + Send + Sync,
{
    type In = I;
    type Out = O;
    type Error = E;
    type Env = Env;
    type Push = Self;

    async fn acquire(mut self, _env: &Env, _scope: &Scope) -> Result<Self, E> {
        self.state = Some((self.init)());
        Ok(self)
    }
}

impl<I, O, Z, C, F, Eff, E, Env> Push for FoldM<I, O, Z, C, F, E, Env>
where
    I: Send,
    O: Send,
    Z: Fn() -> O + Send + Sync,
    C: Fn(&O) -> bool + Send + Sync,
    F: Fn(O, I) -> Eff + Send + Sync,
    Eff: Effect<Output = O, Error = E, Env = Env>,
    E: Send,
    Env: Clone + Send + Sync,
{
    type In = I;
    type Out = O;
    type Error = E;
    type Env = Env;

    async fn push(&mut self, env: &Env, input: Input<I>) -> Result<Chunk<O>, E> {
        let chunk = match input {
            Input::Data(chunk) => chunk,
            Input::Flush => return Ok(self.state.take().map(Chunk::single).unwrap_or_default()),
        };

        let mut progress = self.state.is_some();
        let mut acc = match self.state.take() {
            Some(acc) => acc,
            None => (self.init)(),
        };
        let mut out = Vec::new();

        for item in chunk {
            let step = (self.f)(acc, item);
            let next = step.run(env).await?;
            if (self.cont)(&next) {
                acc = next;
                progress = true;
            } else {
                out.push(next);
                acc = (self.init)();
                progress = false;
            }
        }

        if progress {
            self.state = Some(acc);
        }
        Ok(Chunk::from(out))
    }
}
