//! Combinator methods available on every [`Effect`].

use std::future::Future;

use crate::effect::combinators::{AndThen, Map, MapErr};
use crate::effect::trait_def::Effect;

/// Combinator methods for all effects. Implemented automatically.
pub trait EffectExt: Effect {
    /// Transform the success value.
    fn map<U, F>(self, f: F) -> Map<Self, F>
    where
        F: FnOnce(Self::Output) -> U + Send,
        U: Send,
    {
        Map { inner: self, f }
    }

    /// Transform the error value.
    ///
    /// Use this to line up error types before [`and_then`](Self::and_then), or
    /// before handing the effect to a transducer with a different error type.
    fn map_err<E2, F>(self, f: F) -> MapErr<Self, F>
    where
        F: FnOnce(Self::Error) -> E2 + Send,
        E2: Send,
    {
        MapErr { inner: self, f }
    }

    /// Run `f`'s effect after this one succeeds.
    fn and_then<Next, F>(self, f: F) -> AndThen<Self, F>
    where
        Next: Effect<Error = Self::Error, Env = Self::Env>,
        F: FnOnce(Self::Output) -> Next + Send,
    {
        AndThen { inner: self, f }
    }
}

impl<E: Effect> EffectExt for E {}

/// Run effects that need no environment.
pub trait RunStandalone: Effect<Env = ()> {
    /// Run with the unit environment.
    fn run_standalone(self) -> impl Future<Output = Result<Self::Output, Self::Error>> + Send;
}

impl<E: Effect<Env = ()>> RunStandalone for E {
    fn run_standalone(self) -> impl Future<Output = Result<Self::Output, Self::Error>> + Send {
        async move { self.run(&()).await }
    }
}
