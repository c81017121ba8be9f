//! Zero-cost effects for effectful transducer steps.
//!
//! Combinators such as [`map_m`](crate::transducer::TransducerExt::map_m),
//! [`fold_m`](crate::transducer::fold_m) or
//! [`filter_input_m`](crate::transducer::TransducerExt::filter_input_m) take a
//! user function that returns an [`Effect`]: a description of work that may
//! read an environment, perform I/O, and fail. The transducer runs that effect
//! once per element, inside its push.
//!
//! Combinators return concrete types, the same way `Iterator` adapters do, so
//! building an effect allocates nothing.
//!
//! ```rust
//! use weir::effect::prelude::*;
//!
//! # tokio_test::block_on(async {
//! #[derive(Clone)]
//! struct Env {
//!     factor: i32,
//! }
//!
//! let effect = from_fn(|env: &Env| Ok::<_, String>(env.factor))
//!     .map(|f| f * 2)
//!     .and_then(|x| pure(x + 1));
//!
//! assert_eq!(effect.run(&Env { factor: 20 }).await, Ok(41));
//! # });
//! ```
//!
//! # Environment
//!
//! `Env` must be `Clone + Send + Sync`. Stream drivers own one environment and
//! lend it to every push, so it is typically a handful of `Arc`s.

mod combinators;
mod constructors;
mod ext;
pub mod prelude;
mod trait_def;

pub use combinators::{AndThen, Fail, FromAsync, FromFn, FromResult, Map, MapErr, Pure};
pub use constructors::{fail, from_async, from_fn, from_result, pure};
pub use ext::{EffectExt, RunStandalone};
pub use trait_def::Effect;

#[cfg(test)]
mod tests;
