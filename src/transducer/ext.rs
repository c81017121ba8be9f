//! Combinator methods available on every [`Transducer`].

use std::marker::PhantomData;

use crate::chunk::Chunk;
use crate::effect::Effect;
use crate::transducer::boxed::BoxedTransducer;
use crate::transducer::combinators::{
    Contramap, ContramapChunks, ContramapM, Filter, FilterInput, FilterInputM, Map, MapChunks,
    MapChunksM, MapErr, MapM, Then,
};
use crate::transducer::trait_def::Transducer;

/// Combinator methods for all transducers. Implemented automatically.
///
/// Every combinator keeps the flush contract of the transducer it wraps.
///
/// ```rust
/// use std::convert::Infallible;
/// use weir::testing::transduce;
/// use weir::transducer::{collect_all_n, identity, TransducerExt};
/// use weir::chunk;
///
/// # tokio_test::block_on(async {
/// let t = identity::<i32, Infallible, ()>()
///     .filter(|x| x % 2 == 1)
///     .then(collect_all_n(2))
///     .map(|pair| pair.iter().sum::<i32>());
///
/// let out = transduce(t, &(), [chunk![1, 2, 3, 4, 5]]).await.unwrap();
/// assert_eq!(out, vec![4, 5]);
/// # });
/// ```
pub trait TransducerExt: Transducer {
    /// Transform every output element.
    fn map<U, F>(self, f: F) -> Map<Self, F>
    where
        F: Fn(Self::Out) -> U + Send + Sync,
        U: Send,
    {
        Map { inner: self, f }
    }

    /// Transform every output chunk as a whole.
    ///
    /// A repeated flush returns an empty chunk without calling `f`, so `f`
    /// need not map empty to empty.
    fn map_chunks<U, F>(self, f: F) -> MapChunks<Self, F>
    where
        F: Fn(Chunk<Self::Out>) -> Chunk<U> + Send + Sync,
        U: Send,
    {
        MapChunks {
            inner: self,
            f,
            flushed: false,
        }
    }

    /// Transform every output element with an effect, one at a time.
    fn map_m<F, Eff>(self, f: F) -> MapM<Self, F>
    where
        F: Fn(Self::Out) -> Eff + Send + Sync,
        Eff: Effect<Error = Self::Error, Env = Self::Env>,
    {
        MapM { inner: self, f }
    }

    /// Transform every output chunk with an effect.
    fn map_chunks_m<U, F, Eff>(self, f: F) -> MapChunksM<Self, F>
    where
        F: Fn(Chunk<Self::Out>) -> Eff + Send + Sync,
        Eff: Effect<Output = Chunk<U>, Error = Self::Error, Env = Self::Env>,
        U: Send,
    {
        MapChunksM {
            inner: self,
            f,
            flushed: false,
        }
    }

    /// Convert the error type, for acquisition and every push.
    ///
    /// This is how two transducers with different error types are lined up
    /// before [`then`](Self::then).
    fn map_err<E2, F>(self, f: F) -> MapErr<Self, F>
    where
        F: Fn(Self::Error) -> E2 + Send + Sync,
        E2: Send,
    {
        MapErr { inner: self, f }
    }

    /// Convert input elements before they reach this transducer.
    fn contramap<J, F>(self, f: F) -> Contramap<Self, F, J>
    where
        F: Fn(J) -> Self::In + Send + Sync,
        J: Send,
    {
        Contramap {
            inner: self,
            f,
            _phantom: PhantomData,
        }
    }

    /// Convert whole input chunks before they reach this transducer.
    fn contramap_chunks<J, F>(self, f: F) -> ContramapChunks<Self, F, J>
    where
        F: Fn(Chunk<J>) -> Chunk<Self::In> + Send + Sync,
        J: Send,
    {
        ContramapChunks {
            inner: self,
            f,
            _phantom: PhantomData,
        }
    }

    /// Convert input elements with an effect before they reach this
    /// transducer.
    fn contramap_m<J, F, Eff>(self, f: F) -> ContramapM<Self, F, J>
    where
        F: Fn(J) -> Eff + Send + Sync,
        Eff: Effect<Output = Self::In, Error = Self::Error, Env = Self::Env>,
        J: Send,
    {
        ContramapM {
            inner: self,
            f,
            _phantom: PhantomData,
        }
    }

    /// Keep only output elements satisfying `predicate`.
    fn filter<F>(self, predicate: F) -> Filter<Self, F>
    where
        F: Fn(&Self::Out) -> bool + Send + Sync,
    {
        Filter {
            inner: self,
            predicate,
        }
    }

    /// Keep only input elements satisfying `predicate`.
    fn filter_input<F>(self, predicate: F) -> FilterInput<Self, F>
    where
        F: Fn(&Self::In) -> bool + Send + Sync,
    {
        FilterInput {
            inner: self,
            predicate,
        }
    }

    /// Keep only input elements for which the effect yields `true`.
    fn filter_input_m<F, Eff>(self, predicate: F) -> FilterInputM<Self, F>
    where
        F: Fn(&Self::In) -> Eff + Send + Sync,
        Eff: Effect<Output = bool, Error = Self::Error, Env = Self::Env>,
    {
        FilterInputM {
            inner: self,
            predicate,
        }
    }

    /// Feed this transducer's output into `next`.
    ///
    /// On flush, this transducer is flushed first. Its final output is pushed
    /// into `next`, and then `next` is flushed too; the two results are
    /// concatenated. Both sides are acquired in the same scope.
    fn then<R>(self, next: R) -> Then<Self, R>
    where
        R: Transducer<In = Self::Out, Error = Self::Error, Env = Self::Env>,
    {
        Then {
            left: self,
            right: next,
        }
    }

    /// Erase this transducer's type.
    fn boxed(self) -> BoxedTransducer<Self::In, Self::Out, Self::Error, Self::Env>
    where
        Self: 'static,
        Self::Push: 'static,
        Self::In: 'static,
        Self::Out: 'static,
        Self::Error: 'static,
        Self::Env: 'static,
    {
        BoxedTransducer::new(self)
    }

    /// Run acquisition and every push inside `span`.
    #[cfg(feature = "tracing")]
    fn instrument(self, span: tracing::Span) -> crate::transducer::tracing::Instrumented<Self> {
        crate::transducer::tracing::Instrumented { inner: self, span }
    }
}

impl<T: Transducer> TransducerExt for T {}
