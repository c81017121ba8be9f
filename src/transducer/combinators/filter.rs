//! Filtering on either side of a transducer.

use crate::chunk::Chunk;
use crate::effect::Effect;
use crate::scope::Scope;
use crate::transducer::trait_def::{Input, Push, Transducer};

/// Drops output elements failing a predicate. Created by
/// [`TransducerExt::filter`](crate::transducer::TransducerExt::filter).
pub struct Filter<T, F> {
    pub(crate) inner: T,
    pub(crate) predicate: F,
}

impl<T: std::fmt::Debug, F> std::fmt::Debug for Filter<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Filter")
            .field("inner", &self.inner)
            .field("predicate", &"<function>")
            .finish()
    }
}

impl<T, F> Transducer for Filter<T, F>
where
    T: Transducer,
    F: Fn(&T::Out) -> bool + Send + Sync,
{
    type In = T::In;
    type Out = T::Out;
    type Error = T::Error;
    type Env = T::Env;
    type Push = Filter<T::Push, F>;

    async fn acquire(self, env: &T::Env, scope: &Scope) -> Result<Self::Push, T::Error> {
        let inner = self.inner.acquire(env, scope).await?;
        Ok(Filter {
            inner,
            predicate: self.predicate,
        })
    }
}

impl<P, F> Push for Filter<P, F>
where
    P: Push,
    F: Fn(&P::Out) -> bool + Send + Sync,
{
    type In = P::In;
    type Out = P::Out;
    type Error = P::Error;
    type Env = P::Env;

    async fn push(
        &mut self,
        env: &P::Env,
        input: Input<P::In>,
    ) -> Result<Chunk<P::Out>, P::Error> {
        let out = self.inner.push(env, input).await?;
        Ok(out.filter(&self.predicate))
    }
}

/// Drops input elements failing a predicate. Created by
/// [`TransducerExt::filter_input`](crate::transducer::TransducerExt::filter_input).
pub struct FilterInput<T, F> {
    pub(crate) inner: T,
    pub(crate) predicate: F,
}

impl<T: std::fmt::Debug, F> std::fmt::Debug for FilterInput<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterInput")
            .field("inner", &self.inner)
            .field("predicate", &"<function>")
            .finish()
    }
}

impl<T, F> Transducer for FilterInput<T, F>
where
    T: Transducer,
    F: Fn(&T::In) -> bool + Send + Sync,
{
    type In = T::In;
    type Out = T::Out;
    type Error = T::Error;
    type Env = T::Env;
    type Push = FilterInput<T::Push, F>;

    async fn acquire(self, env: &T::Env, scope: &Scope) -> Result<Self::Push, T::Error> {
        let inner = self.inner.acquire(env, scope).await?;
        Ok(FilterInput {
            inner,
            predicate: self.predicate,
        })
    }
}

impl<P, F> Push for FilterInput<P, F>
where
    P: Push,
    F: Fn(&P::In) -> bool + Send + Sync,
{
    type In = P::In;
    type Out = P::Out;
    type Error = P::Error;
    type Env = P::Env;

    async fn push(
        &mut self,
        env: &P::Env,
        input: Input<P::In>,
    ) -> Result<Chunk<P::Out>, P::Error> {
        let input = match input {
            Input::Data(chunk) => Input::Data(chunk.filter(&self.predicate)),
            Input::Flush => Input::Flush,
        };
        self.inner.push(env, input).await
    }
}

/// Drops input elements failing an effectful predicate. Created by
/// [`TransducerExt::filter_input_m`](crate::transducer::TransducerExt::filter_input_m).
pub struct FilterInputM<T, F> {
    pub(crate) inner: T,
    pub(crate) predicate: F,
}

impl<T: std::fmt::Debug, F> std::fmt::Debug for FilterInputM<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterInputM")
            .field("inner", &self.inner)
            .field("predicate", &"<function>")
            .finish()
    }
}

impl<T, F, Eff> Transducer for FilterInputM<T, F>
where
    T: Transducer,
    F: Fn(&T::In) -> Eff + Send + Sync,
    Eff: Effect<Output = bool, Error = T::Error, Env = T::Env>,
{
    type In = T::In;
    type Out = T::Out;
    type Error = T::Error;
    type Env = T::Env;
    type Push = FilterInputM<T::Push, F>;

    async fn acquire(self, env: &T::Env, scope: &Scope) -> Result<Self::Push, T::Error> {
        let inner = self.inner.acquire(env, scope).await?;
        Ok(FilterInputM {
            inner,
            predicate: self.predicate,
        })
    }
}

impl<P, F, Eff> Push for FilterInputM<P, F>
where
    P: Push,
    F: Fn(&P::In) -> Eff + Send + Sync,
    Eff: Effect<Output = bool, Error = P::Error, Env = P::Env>,
{
    type In = P::In;
    type Out = P::Out;
    type Error = P::Error;
    type Env = P::Env;

    async fn push(
        &mut self,
        env: &P::Env,
        input: Input<P::In>,
    ) -> Result<Chunk<P::Out>, P::Error> {
        let chunk = match input {
            Input::Data(chunk) => chunk,
            Input::Flush => return self.inner.push(env, Input::Flush).await,
        };

        let mut kept = Vec::with_capacity(chunk.len());
        for item in chunk {
            let keep = (self.predicate)(&item);
            if keep.run(env).await? {
                kept.push(item);
            }
        }
        self.inner.push(env, Input::Data(Chunk::from(kept))).await
    }
}
