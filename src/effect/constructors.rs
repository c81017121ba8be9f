//! Functions that build effects without naming the combinator types.

use std::future::Future;
use std::marker::PhantomData;

use crate::effect::combinators::{Fail, FromAsync, FromFn, FromResult, Pure};

/// An effect that succeeds with `value`.
///
/// ```rust
/// use weir::effect::prelude::*;
///
/// # tokio_test::block_on(async {
/// assert_eq!(pure::<_, String, ()>(3).run(&()).await, Ok(3));
/// # });
/// ```
pub fn pure<T, E, Env>(value: T) -> Pure<T, E, Env>
where
    T: Send,
    E: Send,
    Env: Clone + Send + Sync,
{
    Pure {
        value,
        _phantom: PhantomData,
    }
}

/// An effect that fails with `error`.
pub fn fail<T, E, Env>(error: E) -> Fail<T, E, Env>
where
    T: Send,
    E: Send,
    Env: Clone + Send + Sync,
{
    Fail {
        error,
        _phantom: PhantomData,
    }
}

/// An effect that yields an existing `Result`.
pub fn from_result<T, E, Env>(result: Result<T, E>) -> FromResult<T, E, Env>
where
    T: Send,
    E: Send,
    Env: Clone + Send + Sync,
{
    FromResult {
        result,
        _phantom: PhantomData,
    }
}

/// An effect computed synchronously from the environment.
pub fn from_fn<T, E, Env, F>(f: F) -> FromFn<F, Env>
where
    F: FnOnce(&Env) -> Result<T, E> + Send,
    T: Send,
    E: Send,
    Env: Clone + Send + Sync,
{
    FromFn {
        f,
        _phantom: PhantomData,
    }
}

/// An effect computed asynchronously from the environment.
///
/// ```rust
/// use weir::effect::prelude::*;
///
/// # tokio_test::block_on(async {
/// let effect = from_async(|_: &()| async { Ok::<_, String>(5) });
/// assert_eq!(effect.run(&()).await, Ok(5));
/// # });
/// ```
pub fn from_async<T, E, Env, F, Fut>(f: F) -> FromAsync<F, Env>
where
    F: FnOnce(&Env) -> Fut + Send,
    Fut: Future<Output = Result<T, E>> + Send,
    T: Send,
    E: Send,
    Env: Clone + Send + Sync,
{
    FromAsync {
        f,
        _phantom: PhantomData,
    }
}
