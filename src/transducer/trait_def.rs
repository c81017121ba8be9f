//! The `Input` signal and the `Push` / `Transducer` traits.

use std::future::Future;

use crate::chunk::Chunk;
use crate::scope::Scope;

/// The sole input to a push function.
///
/// `Data` hands the transducer another chunk. `Flush` announces that no more
/// input will arrive and asks for whatever the transducer still holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input<I> {
    /// More input.
    Data(Chunk<I>),
    /// End of input: emit any pending aggregate.
    Flush,
}

impl<I> Input<I> {
    /// Wrap anything convertible into a chunk as `Input::Data`.
    pub fn data(chunk: impl Into<Chunk<I>>) -> Self {
        Input::Data(chunk.into())
    }

    /// Returns `true` for `Input::Flush`.
    pub fn is_flush(&self) -> bool {
        matches!(self, Input::Flush)
    }

    /// The carried chunk, or `None` for a flush.
    pub fn into_chunk(self) -> Option<Chunk<I>> {
        match self {
            Input::Data(chunk) => Some(chunk),
            Input::Flush => None,
        }
    }
}

impl<I> From<Option<Chunk<I>>> for Input<I> {
    fn from(signal: Option<Chunk<I>>) -> Self {
        match signal {
            Some(chunk) => Input::Data(chunk),
            None => Input::Flush,
        }
    }
}

#[cfg(feature = "proptest")]
impl<I> proptest::arbitrary::Arbitrary for Input<I>
where
    I: proptest::arbitrary::Arbitrary + 'static,
{
    type Parameters = I::Parameters;
    type Strategy = proptest::strategy::BoxedStrategy<Self>;

    fn arbitrary_with(args: Self::Parameters) -> Self::Strategy {
        use proptest::prelude::*;
        use proptest::strategy::LazyJust;

        prop_oneof![
            4 => any_with::<Chunk<I>>(args).prop_map(Input::Data),
            1 => LazyJust::new(|| Input::Flush),
        ]
        .boxed()
    }
}

/// A live push function: the only handle on a transducer's state.
///
/// `push` takes `&mut self`, so one instance can never be driven by two
/// callers at once, and each call must finish before the next one starts.
///
/// # The flush contract
///
/// After `push(Input::Flush)` returns, another `push(Input::Flush)` with no
/// `Data` in between must return an empty chunk. A flush hands back any
/// pending aggregate and returns the push to its initial state, so later
/// `Data` starts a fresh aggregate.
pub trait Push: Send {
    /// Element type consumed.
    type In: Send;

    /// Element type produced.
    type Out: Send;

    /// Error type of a failed push.
    type Error: Send;

    /// Environment read by effectful steps.
    type Env: Clone + Send + Sync;

    /// Feed one signal and collect the output it releases.
    fn push(
        &mut self,
        env: &Self::Env,
        input: Input<Self::In>,
    ) -> impl Future<Output = Result<Chunk<Self::Out>, Self::Error>> + Send;
}

/// A recipe for a push function.
///
/// Acquisition may allocate resources. Anything that must be released
/// registers a finalizer on the scope passed to [`acquire`](Self::acquire).
/// The push itself never cleans up after itself; the scope does.
///
/// # Example
///
/// ```rust
/// use std::convert::Infallible;
/// use weir::transducer::{collect_all_n, Input, Push, Transducer};
/// use weir::{chunk, Scope};
///
/// # tokio_test::block_on(async {
/// let scope = Scope::new();
/// let mut push = collect_all_n::<i32, Infallible, ()>(2)
///     .acquire(&(), &scope)
///     .await
///     .unwrap();
///
/// let out = push.push(&(), Input::data([1, 2, 3])).await.unwrap();
/// assert_eq!(out, chunk![chunk![1, 2]]);
///
/// let out = push.push(&(), Input::Flush).await.unwrap();
/// assert_eq!(out, chunk![chunk![3]]);
///
/// assert!(push.push(&(), Input::Flush).await.unwrap().is_empty());
/// scope.close();
/// # });
/// ```
pub trait Transducer: Sized + Send {
    /// Element type consumed.
    type In: Send;

    /// Element type produced.
    type Out: Send;

    /// Error type of acquisition and of every push.
    type Error: Send;

    /// Environment read by effectful steps.
    type Env: Clone + Send + Sync;

    /// The push function produced by acquisition.
    type Push: Push<In = Self::In, Out = Self::Out, Error = Self::Error, Env = Self::Env>;

    /// Acquire a fresh push function, registering finalizers on `scope`.
    fn acquire(
        self,
        env: &Self::Env,
        scope: &Scope,
    ) -> impl Future<Output = Result<Self::Push, Self::Error>> + Send;
}

#[cfg(all(test, feature = "proptest"))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_arbitrary_inputs_have_both_signals(inputs in prop::collection::vec(any::<Input<u8>>(), 64)) {
            // A flush is chosen one time in five, so 64 draws all landing on
            // one side is vanishingly unlikely.
            prop_assume!(inputs.iter().any(Input::is_flush));
            prop_assert!(inputs.iter().any(|input| !input.is_flush()));
        }
    }
}
