//! Timer schedules for windowed aggregation.
//!
//! A [`Schedule`] is pure data: it describes how long each aggregation window
//! stays open, and after how many timer-forced flushes it runs out. It never
//! sleeps by itself; [`aggregate_async_within`] asks it for the next deadline.
//!
//! # Strategies
//!
//! - **Constant**: every window has the same length
//! - **Linear**: window `n` lasts `base * (n + 1)`
//! - **Exponential**: window `n` lasts `base * 2^n`
//! - **Fibonacci**: window `n` lasts `base * fib(n + 1)`
//!
//! ```rust
//! use std::time::Duration;
//! use weir::Schedule;
//!
//! let schedule = Schedule::exponential(Duration::from_millis(10))
//!     .with_max_recurrences(3)
//!     .with_max_delay(Duration::from_millis(25));
//!
//! assert_eq!(schedule.delay_for(0), Some(Duration::from_millis(10)));
//! assert_eq!(schedule.delay_for(1), Some(Duration::from_millis(20)));
//! assert_eq!(schedule.delay_for(2), Some(Duration::from_millis(25)));
//! assert_eq!(schedule.delay_for(3), None);
//! ```
//!
//! # Jitter
//!
//! With the `jitter` feature, [`Schedule::next_delay`] randomizes each window
//! so that many aggregators started together do not flush in lockstep.
//! Without it, the jitter builders are accepted and ignored.
//!
//! [`aggregate_async_within`]: crate::stream::ChunkStreamExt::aggregate_async_within

mod policy;

pub use policy::{Jitter, Schedule, Strategy};
