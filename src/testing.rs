//! Testing utilities for transducers.
//!
//! Helpers that acquire a transducer in a throwaway [`Scope`], drive it, and
//! hand back what it emitted, plus assertion macros for the flush contract.
//!
//! # Examples
//!
//! ## Driving a transducer
//!
//! ```rust
//! use std::convert::Infallible;
//! use weir::testing::transduce;
//! use weir::{chunk, transducer::collect_all_n};
//!
//! # tokio_test::block_on(async {
//! let out = transduce(collect_all_n::<i32, Infallible, ()>(2), &(), [chunk![1, 2, 3]]).await;
//! assert_eq!(out, Ok(vec![chunk![1, 2], chunk![3]]));
//! # });
//! ```
//!
//! ## Per-push outputs
//!
//! ```rust
//! use std::convert::Infallible;
//! use weir::testing::push_all;
//! use weir::transducer::{fold_left, Input};
//! use weir::chunk;
//!
//! # tokio_test::block_on(async {
//! let sum = fold_left::<i32, i32, _, Infallible, ()>(0, |a, b| a + b);
//! let outputs = push_all(sum, &(), [Input::data([1, 2]), Input::Flush, Input::Flush])
//!     .await
//!     .unwrap();
//! assert_eq!(outputs, vec![chunk![], chunk![3], chunk![]]);
//! # });
//! ```

use crate::chunk::Chunk;
use crate::scope::Scope;
use crate::transducer::{Input, Push, Transducer};

/// Acquire `transducer`, push every chunk of `inputs`, flush once, and
/// return everything emitted in order.
///
/// The scope used for acquisition is closed before returning, on success
/// and on error.
pub async fn transduce<T, C>(
    transducer: T,
    env: &T::Env,
    inputs: impl IntoIterator<Item = C>,
) -> Result<Vec<T::Out>, T::Error>
where
    T: Transducer,
    C: Into<Chunk<T::In>>,
{
    let signals = inputs
        .into_iter()
        .map(|chunk| Input::Data(chunk.into()))
        .chain(std::iter::once(Input::Flush));
    let outputs = push_all(transducer, env, signals).await?;
    Ok(outputs.into_iter().flatten().collect())
}

/// Acquire `transducer` and push `signals` in order, returning the chunk
/// each push produced.
///
/// No flush is added; include `Input::Flush` where the test wants one.
pub async fn push_all<T>(
    transducer: T,
    env: &T::Env,
    signals: impl IntoIterator<Item = Input<T::In>>,
) -> Result<Vec<Chunk<T::Out>>, T::Error>
where
    T: Transducer,
{
    let scope = Scope::new();
    let result: Result<Vec<Chunk<T::Out>>, T::Error> = async {
        let mut push = transducer.acquire(env, &scope).await?;
        let mut outputs = Vec::new();
        for signal in signals {
            outputs.push(push.push(env, signal).await?);
        }
        Ok(outputs)
    }
    .await;
    scope.close();
    result
}

/// Flush `push` twice and return both outputs.
///
/// The second output is empty for every push honoring the flush contract.
pub async fn flush_twice<P: Push>(
    push: &mut P,
    env: &P::Env,
) -> Result<(Chunk<P::Out>, Chunk<P::Out>), P::Error> {
    let first = push.push(env, Input::Flush).await?;
    let second = push.push(env, Input::Flush).await?;
    Ok((first, second))
}

/// Assert that flushing a push yields nothing.
///
/// Must be used in an async context. Panics if the flush fails or emits
/// anything.
///
/// # Example
///
/// ```rust
/// use std::convert::Infallible;
/// use weir::transducer::{collect_all_n, Input, Push, Transducer};
/// use weir::{assert_drained, Scope};
///
/// # tokio_test::block_on(async {
/// let scope = Scope::new();
/// let mut push = collect_all_n::<i32, Infallible, ()>(3)
///     .acquire(&(), &scope)
///     .await
///     .unwrap();
/// push.push(&(), Input::data([1])).await.unwrap();
/// push.push(&(), Input::Flush).await.unwrap();
/// assert_drained!(push, &());
/// # });
/// ```
#[macro_export]
macro_rules! assert_drained {
    ($push:expr, $env:expr) => {
        match $crate::transducer::Push::push(&mut $push, $env, $crate::transducer::Input::Flush)
            .await
        {
            Ok(out) if out.is_empty() => {}
            Ok(out) => panic!("Expected an empty flush, got {:?}", out),
            Err(e) => panic!("Expected an empty flush, got error {:?}", e),
        }
    };
}

/// Assert that a push emits exactly `expected` for `input`.
///
/// Must be used in an async context.
#[macro_export]
macro_rules! assert_emits {
    ($push:expr, $env:expr, $input:expr, $expected:expr) => {
        match $crate::transducer::Push::push(&mut $push, $env, $input).await {
            Ok(out) => assert_eq!(out, $crate::Chunk::from($expected)),
            Err(e) => panic!("Expected {:?}, got error {:?}", $expected, e),
        }
    };
}
