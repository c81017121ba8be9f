//! Transducers: stateful chunk processors with a push/flush contract.
//!
//! A [`Transducer`] is a recipe. Acquiring it in a [`Scope`] yields a
//! [`Push`], the live push function that owns all of the transducer's state.
//! A driver feeds the push `Input::Data` chunks, then exactly one meaningful
//! `Input::Flush`:
//!
//! ```text
//! acquire ──> push(Data) ──> push(Data) ──> ... ──> push(Flush) ──> push(Flush) == []
//! ```
//!
//! Every transducer in this module keeps the flush contract: a second flush
//! with no data in between yields an empty chunk.
//!
//! # Building transducers
//!
//! Constructors start a pipeline:
//!
//! | Constructor | Emits |
//! |---|---|
//! | [`identity`] | every element unchanged |
//! | [`fold`], [`fold_left`], [`fold_until`] | running aggregates |
//! | [`fold_weighted`], [`fold_weighted_decompose`] | cost-bounded aggregates |
//! | [`collect_all`], [`collect_all_n`] | groups of elements |
//! | [`collect_all_to_map_n`], [`collect_all_to_set_n`] | keyed groups |
//! | [`collect_all_while`] | runs delimited by a predicate |
//! | [`drop_while`] | everything after a dropped prefix |
//! | [`branch_after`] | whatever the transducer chosen from a prefix emits |
//! | [`head`], [`last`] | the first or last element |
//! | [`split_on`], [`split_lines`], [`utf8_decode`] | text |
//!
//! Methods on [`TransducerExt`] transform and compose them.
//!
//! ```rust
//! use std::convert::Infallible;
//! use weir::testing::transduce;
//! use weir::transducer::{fold_left, split_lines, TransducerExt};
//! use weir::chunk;
//!
//! # tokio_test::block_on(async {
//! let longest = split_lines::<Infallible, ()>()
//!     .map(|line| line.len())
//!     .then(fold_left(0, usize::max));
//!
//! let input = [chunk!["a\nabc\n".to_string(), "ab".to_string()]];
//! assert_eq!(transduce(longest, &(), input).await, Ok(vec![3]));
//! # });
//! ```
//!
//! # Effects
//!
//! The `_m` variants take functions returning an [`Effect`], which runs
//! against the driver's environment and may fail. A failed effect aborts the
//! push with that error.
//!
//! [`Scope`]: crate::Scope
//! [`Effect`]: crate::Effect

mod basic;
mod boxed;
mod branch_after;
mod collect;
pub mod combinators;
mod drop_while;
mod ext;
mod fold;
mod fold_weighted;
mod text;
mod trait_def;

#[cfg(feature = "tracing")]
pub mod tracing;

pub use basic::{fail, from_push, identity, prepend, FailWith, FromPush, Identity, Prepend};
pub use boxed::{BoxFuture, BoxedPush, BoxedTransducer};
pub use branch_after::{branch_after, BranchAfter, BranchAfterPush};
pub use collect::{
    collect_all, collect_all_n, collect_all_to_map_n, collect_all_to_set_n, collect_all_while,
    collect_all_while_m, CollectAllN, CollectAllWhile, CollectAllWhileM,
};
pub use drop_while::{drop_while, drop_while_m, DropWhile, DropWhileM};
pub use ext::TransducerExt;
pub use fold::{fold, fold_left, fold_left_m, fold_m, fold_until, head, last, Fold, FoldM};
pub use fold_weighted::{
    fold_weighted, fold_weighted_decompose, fold_weighted_decompose_m, fold_weighted_m,
    FoldWeightedM,
};
pub use text::{split_lines, split_on, utf8_decode, SplitOn, Utf8Decode};
pub use trait_def::{Input, Push, Transducer};

#[cfg(test)]
mod tests;
