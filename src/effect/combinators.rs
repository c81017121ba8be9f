//! Concrete effect types returned by the constructors and by [`EffectExt`].
//!
//! [`EffectExt`]: crate::effect::EffectExt

use std::future::Future;
use std::marker::PhantomData;

use crate::effect::trait_def::Effect;

/// Succeeds with a value. Created by [`pure`](crate::effect::pure).
pub struct Pure<T, E, Env> {
    pub(crate) value: T,
    pub(crate) _phantom: PhantomData<fn() -> (E, Env)>,
}

impl<T: std::fmt::Debug, E, Env> std::fmt::Debug for Pure<T, E, Env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pure").field("value", &self.value).finish()
    }
}

impl<T, E, Env> Effect for Pure<T, E, Env>
where
    T: Send,
    E: Send,
    Env: Clone + Send + Sync,
{
    type Output = T;
    type Error = E;
    type Env = Env;

    async fn run(self, _env: &Env) -> Result<T, E> {
        Ok(self.value)
    }
}

/// Fails with an error. Created by [`fail`](crate::effect::fail).
pub struct Fail<T, E, Env> {
    pub(crate) error: E,
    pub(crate) _phantom: PhantomData<fn() -> (T, Env)>,
}

impl<T, E: std::fmt::Debug, Env> std::fmt::Debug for Fail<T, E, Env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fail").field("error", &self.error).finish()
    }
}

impl<T, E, Env> Effect for Fail<T, E, Env>
where
    T: Send,
    E: Send,
    Env: Clone + Send + Sync,
{
    type Output = T;
    type Error = E;
    type Env = Env;

    async fn run(self, _env: &Env) -> Result<T, E> {
        Err(self.error)
    }
}

/// Lifts an already computed `Result`. Created by
/// [`from_result`](crate::effect::from_result).
#[derive(Debug)]
pub struct FromResult<T, E, Env> {
    pub(crate) result: Result<T, E>,
    pub(crate) _phantom: PhantomData<fn() -> Env>,
}

impl<T, E, Env> Effect for FromResult<T, E, Env>
where
    T: Send,
    E: Send,
    Env: Clone + Send + Sync,
{
    type Output = T;
    type Error = E;
    type Env = Env;

    async fn run(self, _env: &Env) -> Result<T, E> {
        self.result
    }
}

/// Synchronous function of the environment. Created by
/// [`from_fn`](crate::effect::from_fn).
pub struct FromFn<F, Env> {
    pub(crate) f: F,
    pub(crate) _phantom: PhantomData<fn() -> Env>,
}

impl<F, Env> std::fmt::Debug for FromFn<F, Env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FromFn").field("f", &"<function>").finish()
    }
}

impl<F, T, E, Env> Effect for FromFn<F, Env>
where
    F: FnOnce(&Env) -> Result<T, E> + Send,
    T: Send,
    E: Send,
    Env: Clone + Send + Sync,
{
    type Output = T;
    type Error = E;
    type Env = Env;

    async fn run(self, env: &Env) -> Result<T, E> {
        (self.f)(env)
    }
}

/// Asynchronous function of the environment. Created by
/// [`from_async`](crate::effect::from_async).
pub struct FromAsync<F, Env> {
    pub(crate) f: F,
    pub(crate) _phantom: PhantomData<fn() -> Env>,
}

impl<F, Env> std::fmt::Debug for FromAsync<F, Env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FromAsync").field("f", &"<function>").finish()
    }
}

impl<F, Fut, T, E, Env> Effect for FromAsync<F, Env>
where
    F: FnOnce(&Env) -> Fut + Send,
    Fut: Future<Output = Result<T, E>> + Send,
    T: Send,
    E: Send,
    Env: Clone + Send + Sync,
{
    type Output = T;
    type Error = E;
    type Env = Env;

    fn run(self, env: &Env) -> impl Future<Output = Result<T, E>> + Send {
        (self.f)(env)
    }
}

/// Transforms the success value. Created by
/// [`EffectExt::map`](crate::effect::EffectExt::map).
pub struct Map<Inner, F> {
    pub(crate) inner: Inner,
    pub(crate) f: F,
}

impl<Inner, F> std::fmt::Debug for Map<Inner, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Map")
            .field("inner", &"<effect>")
            .field("f", &"<function>")
            .finish()
    }
}

impl<Inner, F, U> Effect for Map<Inner, F>
where
    Inner: Effect,
    F: FnOnce(Inner::Output) -> U + Send,
    U: Send,
{
    type Output = U;
    type Error = Inner::Error;
    type Env = Inner::Env;

    async fn run(self, env: &Self::Env) -> Result<U, Self::Error> {
        let value = self.inner.run(env).await?;
        Ok((self.f)(value))
    }
}

/// Transforms the error value. Created by
/// [`EffectExt::map_err`](crate::effect::EffectExt::map_err).
pub struct MapErr<Inner, F> {
    pub(crate) inner: Inner,
    pub(crate) f: F,
}

impl<Inner, F> std::fmt::Debug for MapErr<Inner, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapErr")
            .field("inner", &"<effect>")
            .field("f", &"<function>")
            .finish()
    }
}

impl<Inner, F, E2> Effect for MapErr<Inner, F>
where
    Inner: Effect,
    F: FnOnce(Inner::Error) -> E2 + Send,
    E2: Send,
{
    type Output = Inner::Output;
    type Error = E2;
    type Env = Inner::Env;

    async fn run(self, env: &Self::Env) -> Result<Self::Output, E2> {
        self.inner.run(env).await.map_err(self.f)
    }
}

/// Runs a dependent effect on success. Created by
/// [`EffectExt::and_then`](crate::effect::EffectExt::and_then).
pub struct AndThen<Inner, F> {
    pub(crate) inner: Inner,
    pub(crate) f: F,
}

impl<Inner, F> std::fmt::Debug for AndThen<Inner, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AndThen")
            .field("inner", &"<effect>")
            .field("f", &"<function>")
            .finish()
    }
}

impl<Inner, F, Next> Effect for AndThen<Inner, F>
where
    Inner: Effect,
    Next: Effect<Error = Inner::Error, Env = Inner::Env>,
    F: FnOnce(Inner::Output) -> Next + Send,
{
    type Output = Next::Output;
    type Error = Inner::Error;
    type Env = Inner::Env;

    async fn run(self, env: &Self::Env) -> Result<Self::Output, Self::Error> {
        let value = self.inner.run(env).await?;
        (self.f)(value).run(env).await
    }
}
