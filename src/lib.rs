//! # Weir
//!
//! > *Hold the stream back, let it pile up, release it in batches.*
//!
//! Composable, effectful stream transducers with a strict push/flush
//! contract.
//!
//! A [`Transducer`](transducer::Transducer) consumes [`Chunk`]s and emits
//! chunks of aggregates: sums, fixed-size groups, cost-bounded batches,
//! lines of text. Transducers compose with `map`, `filter`, `then` and friends,
//! and are driven over `futures` streams by [`ChunkStreamExt`]. That driver
//! either flushes at end of input or, with [`Schedule`], whenever a timer
//! window elapses.
//!
//! ## Quick Example
//!
//! ```rust
//! use std::convert::Infallible;
//! use futures::{stream, StreamExt};
//! use weir::prelude::*;
//! use weir::transducer::{collect_all_n, identity};
//!
//! # tokio_test::block_on(async {
//! let batches = identity::<i32, Infallible, ()>()
//!     .filter(|x| *x > 0)
//!     .then(collect_all_n(3));
//!
//! let upstream = stream::iter(vec![Ok(chunk![1, -2, 3]), Ok(chunk![4, 5, 6, 7])]);
//! let out: Vec<_> = upstream.aggregate(batches, ()).collect().await;
//!
//! assert_eq!(out, vec![Ok(chunk![chunk![1, 3, 4], chunk![5, 6, 7]])]);
//! # });
//! ```
//!
//! ## Modules
//!
//! - [`chunk`]: the batch type everything consumes and produces
//! - [`transducer`]: the `Push`/`Transducer` traits, constructors and combinators
//! - [`stream`]: drivers over `futures::Stream`
//! - [`schedule`]: timer windows for `aggregate_async_within`
//! - [`scope`]: finalizers released when a driver finishes
//! - [`effect`]: effectful steps for the `_m` combinators
//! - [`testing`]: helpers for testing transducers

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod chunk;
pub mod effect;
pub mod either;
pub mod schedule;
pub mod scope;
pub mod stream;
pub mod testing;
pub mod transducer;

// Re-exports
pub use chunk::Chunk;
pub use effect::{Effect, EffectExt, RunStandalone};
pub use either::Either;
pub use schedule::Schedule;
pub use scope::Scope;
pub use stream::ChunkStreamExt;
pub use transducer::{BoxedTransducer, Input, Push, Transducer, TransducerExt};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::chunk;
    pub use crate::chunk::Chunk;
    pub use crate::effect::{Effect, EffectExt};
    pub use crate::either::Either;
    pub use crate::schedule::Schedule;
    pub use crate::scope::Scope;
    pub use crate::stream::ChunkStreamExt;
    pub use crate::transducer::{Input, Push, Transducer, TransducerExt};
}
