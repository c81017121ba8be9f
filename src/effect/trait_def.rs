//! The `Effect` trait.

use std::future::Future;

/// A computation that reads an environment and produces a value or an error.
///
/// Effects are consumed when run. Every combinator in this crate that accepts
/// an effectful function calls it once per element and runs the returned
/// effect against the environment the driver was given.
///
/// # Example
///
/// ```rust
/// use weir::effect::prelude::*;
///
/// fn lookup(id: u32) -> impl Effect<Output = String, Error = String, Env = ()> {
///     from_fn(move |_: &()| {
///         if id > 0 {
///             Ok(format!("user-{}", id))
///         } else {
///             Err("no such user".to_string())
///         }
///     })
/// }
///
/// # tokio_test::block_on(async {
/// assert_eq!(lookup(7).run(&()).await, Ok("user-7".to_string()));
/// # });
/// ```
pub trait Effect: Sized + Send {
    /// The success type.
    type Output: Send;

    /// The error type.
    type Error: Send;

    /// The environment the effect reads.
    type Env: Clone + Send + Sync;

    /// Run this effect against `env`.
    fn run(self, env: &Self::Env)
        -> impl Future<Output = Result<Self::Output, Self::Error>> + Send;
}
