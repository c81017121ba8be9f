//! Transducers without aggregation state: identity, prepend, user push
//! functions and failure.

use std::marker::PhantomData;

use crate::chunk::Chunk;
use crate::scope::Scope;
use crate::transducer::trait_def::{Input, Push, Transducer};

/// Passes every chunk through unchanged. Created by [`identity`].
pub struct Identity<I, E, Env> {
    _phantom: PhantomData<fn() -> (I, E, Env)>,
}

impl<I, E, Env> std::fmt::Debug for Identity<I, E, Env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Identity")
    }
}

/// A transducer that emits its input unchanged and nothing on flush.
///
/// ```rust
/// use std::convert::Infallible;
/// use weir::testing::transduce;
/// use weir::{chunk, transducer::identity};
///
/// # tokio_test::block_on(async {
/// let out = transduce(identity::<_, Infallible, ()>(), &(), [chunk![1, 2], chunk![3]])
///     .await
///     .unwrap();
/// assert_eq!(out, vec![1, 2, 3]);
/// # });
/// ```
pub fn identity<I, E, Env>() -> Identity<I, E, Env>
where
    I: Send,
    E: Send,
    Env: Clone + Send + Sync,
{
    Identity {
        _phantom: PhantomData,
    }
}

impl<I, E, Env> Transducer for Identity<I, E, Env>
where
    I: Send,
    E: Send,
    Env: Clone + Send + Sync,
{
    type In = I;
    type Out = I;
    type Error = E;
    type Env = Env;
    type Push = Self;

    async fn acquire(self, _env: &Env, _scope: &Scope) -> Result<Self, E> {
        Ok(self)
    }
}

impl<I, E, Env> Push for Identity<I, E, Env>
where
    I: Send,
    E: Send,
    Env: Clone + Send + Sync,
{
    type In = I;
    type Out = I;
    type Error = E;
    type Env = Env;

    async fn push(&mut self, _env: &Env, input: Input<I>) -> Result<Chunk<I>, E> {
        Ok(input.into_chunk().unwrap_or_default())
    }
}

/// Emits a fixed prefix ahead of the first output. Created by [`prepend`].
pub struct Prepend<I, E, Env> {
    pending: Option<Chunk<I>>,
    _phantom: PhantomData<fn() -> (E, Env)>,
}

impl<I: std::fmt::Debug, E, Env> std::fmt::Debug for Prepend<I, E, Env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prepend")
            .field("pending", &self.pending)
            .finish()
    }
}

/// Emit `values` before anything else, then pass input through.
///
/// The prefix is emitted exactly once, with the first push, even when that
/// push is a flush on an empty stream.
pub fn prepend<I, E, Env>(values: impl Into<Chunk<I>>) -> Prepend<I, E, Env>
where
    I: Send,
    E: Send,
    Env: Clone + Send + Sync,
{
    Prepend {
        pending: Some(values.into()),
        _phantom: PhantomData,
    }
}

impl<I, E, Env> Transducer for Prepend<I, E, Env>
where
    I: Send,
    E: Send,
    Env: Clone + Send + Sync,
{
    type In = I;
    type Out = I;
    type Error = E;
    type Env = Env;
    type Push = Self;

    async fn acquire(self, _env: &Env, _scope: &Scope) -> Result<Self, E> {
        Ok(self)
    }
}

impl<I, E, Env> Push for Prepend<I, E, Env>
where
    I: Send,
    E: Send,
    Env: Clone + Send + Sync,
{
    type In = I;
    type Out = I;
    type Error = E;
    type Env = Env;

    async fn push(&mut self, _env: &Env, input: Input<I>) -> Result<Chunk<I>, E> {
        let prefix = self.pending.take().unwrap_or_default();
        Ok(match input {
            Input::Data(chunk) => prefix.concat(chunk),
            Input::Flush => prefix,
        })
    }
}

/// A push function written by hand. Created by [`from_push`].
pub struct FromPush<F, I, O, E, Env> {
    f: F,
    _phantom: PhantomData<fn() -> (I, O, E, Env)>,
}

impl<F, I, O, E, Env> std::fmt::Debug for FromPush<F, I, O, E, Env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FromPush")
            .field("f", &"<function>")
            .finish()
    }
}

/// Lift a stateful closure into a transducer.
///
/// The closure owns its state and must honor the flush contract itself.
///
/// ```rust
/// use std::convert::Infallible;
/// use weir::transducer::{from_push, Input};
/// use weir::testing::transduce;
/// use weir::{chunk, Chunk};
///
/// # tokio_test::block_on(async {
/// let mut total = 0;
/// let running_sum = from_push::<_, i32, i32, Infallible, ()>(move |input| {
///     Ok(match input {
///         Input::Data(chunk) => chunk.map(|x| {
///             total += x;
///             total
///         }),
///         Input::Flush => Chunk::empty(),
///     })
/// });
///
/// let out = transduce(running_sum, &(), [chunk![1, 2], chunk![3]]).await.unwrap();
/// assert_eq!(out, vec![1, 3, 6]);
/// # });
/// ```
pub fn from_push<F, I, O, E, Env>(f: F) -> FromPush<F, I, O, E, Env>
where
    F: FnMut(Input<I>) -> Result<Chunk<O>, E> + Send,
    I: Send,
    O: Send,
    E: Send,
    Env: Clone + Send + Sync,
{
    FromPush {
        f,
        _phantom: PhantomData,
    }
}

impl<F, I, O, E, Env> Transducer for FromPush<F, I, O, E, Env>
where
    F: FnMut(Input<I>) -> Result<Chunk<O>, E> + Send,
    I: Send,
    O: Send,
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

impl<F, I, O, E, Env> Push for FromPush<F, I, O, E, Env>
where
    F: FnMut(Input<I>) -> Result<Chunk<O>, E> + Send,
    I: Send,
    O: Send,
    E: Send,
    Env: Clone + Send + Sync,
{
    type In = I;
    type Out = O;
    type Error = E;
    type Env = Env;

    async fn push(&mut self, _env: &Env, input: Input<I>) -> Result<Chunk<O>, E> {
        (self.f)(input)
    }
}

/// Fails every push. Created by [`fail`].
pub struct FailWith<I, O, E, Env> {
    error: E,
    _phantom: PhantomData<fn() -> (I, O, Env)>,
}

impl<I, O, E: std::fmt::Debug, Env> std::fmt::Debug for FailWith<I, O, E, Env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailWith")
            .field("error", &self.error)
            .finish()
    }
}

/// A transducer whose every push fails with `error`.
pub fn fail<I, O, E, Env>(error: E) -> FailWith<I, O, E, Env>
where
    I: Send,
    O: Send,
    E: Clone + Send + Sync,
    Env: Clone + Send + Sync,
{
    FailWith {
        error,
        _phantom: PhantomData,
    }
}

impl<I, O, E, Env> Transducer for FailWith<I, O, E, Env>
where
    I: Send,
    O: Send,
    E: Clone + Send + Sync,
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

impl<I, O, E, Env> Push for FailWith<I, O, E, Env>
where
    I: Send,
    O: Send,
    E: Clone + Send + Sync,
    Env: Clone + Send + Sync,
{
    type In = I;
    type Out = O;
    type Error = E;
    type Env = Env;

    async fn push(&mut self, _env: &Env, _input: Input<I>) -> Result<Chunk<O>, E> {
        Err(self.error.clone())
    }
}
