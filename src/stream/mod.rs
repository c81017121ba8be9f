//! Driving transducers over `futures` streams.
//!
//! [`ChunkStreamExt`] is implemented for every stream of
//! `Result<Chunk<I>, E>`. Each driver acquires its transducer lazily, the
//! first time the output stream is polled, in a scope of its own. The scope is
//! closed when upstream ends, when an error stops the stream, or when the
//! output stream is dropped.
//!
//! Empty chunks are never forwarded in either direction.
//!
//! ```rust
//! use std::convert::Infallible;
//! use futures::{stream, StreamExt};
//! use weir::stream::ChunkStreamExt;
//! use weir::transducer::fold_left;
//! use weir::chunk;
//!
//! # tokio_test::block_on(async {
//! let upstream = stream::iter(vec![Ok::<_, Infallible>(chunk![1, 2]), Ok(chunk![3])]);
//! let totals: Vec<_> = upstream
//!     .aggregate(fold_left(0, |acc, x: i32| acc + x), ())
//!     .collect()
//!     .await;
//! assert_eq!(totals, vec![Ok(chunk![6])]);
//! # });
//! ```

mod aggregate;
#[cfg(feature = "async")]
mod within;

use futures::Stream;

use crate::chunk::Chunk;
#[cfg(feature = "async")]
use crate::either::Either;
#[cfg(feature = "async")]
use crate::schedule::Schedule;
use crate::transducer::{collect_all_n, Transducer};

/// Aggregation drivers for chunked, fallible streams. Implemented
/// automatically.
pub trait ChunkStreamExt<I, E>: Stream<Item = Result<Chunk<I>, E>> + Sized {
    /// Run every chunk through `transducer`.
    ///
    /// Whatever each push emits is forwarded as one chunk. When upstream
    /// ends, the transducer is flushed once. The first error, from upstream
    /// or from the transducer, is forwarded and ends the stream without a
    /// flush.
    fn aggregate<T>(
        self,
        transducer: T,
        env: T::Env,
    ) -> impl Stream<Item = Result<Chunk<T::Out>, E>> + Send
    where
        Self: Send,
        T: Transducer<In = I, Error = E>,
        I: Send,
        E: Send,
    {
        aggregate::aggregate(self, transducer, env)
    }

    /// Regroup elements into chunks of `n`; the last group may be shorter.
    ///
    /// ```rust
    /// use futures::{stream, StreamExt};
    /// use weir::stream::ChunkStreamExt;
    /// use weir::chunk;
    ///
    /// # tokio_test::block_on(async {
    /// let upstream = stream::iter(vec![Ok::<_, String>(chunk![1, 2, 3]), Ok(chunk![4, 5])]);
    /// let pushes: Vec<_> = upstream.grouped(2).map(Result::unwrap).collect().await;
    /// let groups: Vec<_> = pushes.into_iter().flatten().collect();
    /// assert_eq!(groups, vec![chunk![1, 2], chunk![3, 4], chunk![5]]);
    /// # });
    /// ```
    fn grouped(self, n: usize) -> impl Stream<Item = Result<Chunk<Chunk<I>>, E>> + Send
    where
        Self: Send,
        I: Send,
        E: Send,
    {
        aggregate::aggregate(self, collect_all_n::<I, E, ()>(n), ())
    }

    /// Like [`aggregate`](Self::aggregate), but the transducer is also
    /// flushed whenever a window set by `schedule` elapses.
    ///
    /// A window opens when a chunk arrives while none is open, and lasts
    /// `schedule.delay_for(recurrence)`. If upstream and the deadline are
    /// ready together, upstream wins.
    #[cfg(feature = "async")]
    fn aggregate_async_within<T>(
        self,
        transducer: T,
        env: T::Env,
        schedule: Schedule,
    ) -> impl Stream<Item = Result<Chunk<T::Out>, E>> + Send
    where
        Self: Send,
        T: Transducer<In = I, Error = E>,
        I: Send,
        E: Send,
    {
        within::aggregate_within(self, transducer, env, schedule)
    }

    /// Like [`aggregate_async_within`](Self::aggregate_async_within), with
    /// transducer output tagged `Right`.
    ///
    /// Each time the schedule runs out, `Left(n)` follows the output of the
    /// `n`th timer-forced flush and the recurrence count starts over.
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use futures::{stream, StreamExt};
    /// use weir::stream::ChunkStreamExt;
    /// use weir::transducer::collect_all;
    /// use weir::{chunk, Either, Schedule};
    ///
    /// # tokio_test::block_on(async {
    /// let upstream = stream::iter(vec![Ok::<_, String>(chunk![1, 2])]);
    /// let out: Vec<_> = upstream
    ///     .aggregate_async_within_either(
    ///         collect_all(),
    ///         (),
    ///         Schedule::constant(Duration::from_secs(1)).with_max_recurrences(1),
    ///     )
    ///     .collect()
    ///     .await;
    /// // Upstream ended before the window elapsed.
    /// assert_eq!(out, vec![Ok(chunk![Either::Right(chunk![1, 2])])]);
    /// # });
    /// ```
    #[cfg(feature = "async")]
    fn aggregate_async_within_either<T>(
        self,
        transducer: T,
        env: T::Env,
        schedule: Schedule,
    ) -> impl Stream<Item = Result<Chunk<Either<u32, T::Out>>, E>> + Send
    where
        Self: Send,
        T: Transducer<In = I, Error = E>,
        I: Send,
        E: Send,
    {
        within::aggregate_within_either(self, transducer, env, schedule)
    }
}

impl<S, I, E> ChunkStreamExt<I, E> for S where S: Stream<Item = Result<Chunk<I>, E>> {}
