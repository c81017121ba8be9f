//! Input-side mapping.

use std::marker::PhantomData;

use crate::chunk::Chunk;
use crate::effect::Effect;
use crate::scope::Scope;
use crate::transducer::trait_def::{Input, Push, Transducer};

/// Converts input elements before they reach the inner transducer. Created by
/// [`TransducerExt::contramap`](crate::transducer::TransducerExt::contramap).
pub struct Contramap<T, F, J> {
    pub(crate) inner: T,
    pub(crate) f: F,
    pub(crate) _phantom: PhantomData<fn(J)>,
}

impl<T: std::fmt::Debug, F, J> std::fmt::Debug for Contramap<T, F, J> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Contramap")
            .field("inner", &self.inner)
            .field("f", &"<function>")
            .finish()
    }
}

impl<T, F, J> Transducer for Contramap<T, F, J>
where
    T: Transducer,
    F: Fn(J) -> T::In + Send + Sync,
    J: Send,
{
    type In = J;
    type Out = T::Out;
    type Error = T::Error;
    type Env = T::Env;
    type Push = Contramap<T::Push, F, J>;

    async fn acquire(self, env: &T::Env, scope: &Scope) -> Result<Self::Push, T::Error> {
        let inner = self.inner.acquire(env, scope).await?;
        Ok(Contramap {
            inner,
            f: self.f,
            _phantom: PhantomData,
        })
    }
}

impl<P, F, J> Push for Contramap<P, F, J>
where
    P: Push,
    F: Fn(J) -> P::In + Send + Sync,
    J: Send,
{
    type In = J;
    type Out = P::Out;
    type Error = P::Error;
    type Env = P::Env;

    async fn push(&mut self, env: &P::Env, input: Input<J>) -> Result<Chunk<P::Out>, P::Error> {
        let input = match input {
            Input::Data(chunk) => Input::Data(chunk.map(&self.f)),
            Input::Flush => Input::Flush,
        };
        self.inner.push(env, input).await
    }
}

/// Converts whole input chunks before they reach the inner transducer.
/// Created by
/// [`TransducerExt::contramap_chunks`](crate::transducer::TransducerExt::contramap_chunks).
pub struct ContramapChunks<T, F, J> {
    pub(crate) inner: T,
    pub(crate) f: F,
    pub(crate) _phantom: PhantomData<fn(J)>,
}

impl<T: std::fmt::Debug, F, J> std::fmt::Debug for ContramapChunks<T, F, J> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContramapChunks")
            .field("inner", &self.inner)
            .field("f", &"<function>")
            .finish()
    }
}

impl<T, F, J> Transducer for ContramapChunks<T, F, J>
where
    T: Transducer,
    F: Fn(Chunk<J>) -> Chunk<T::In> + Send + Sync,
    J: Send,
{
    type In = J;
    type Out = T::Out;
    type Error = T::Error;
    type Env = T::Env;
    type Push = ContramapChunks<T::Push, F, J>;

    async fn acquire(self, env: &T::Env, scope: &Scope) -> Result<Self::Push, T::Error> {
        let inner = self.inner.acquire(env, scope).await?;
        Ok(ContramapChunks {
            inner,
            f: self.f,
            _phantom: PhantomData,
        })
    }
}

impl<P, F, J> Push for ContramapChunks<P, F, J>
where
    P: Push,
    F: Fn(Chunk<J>) -> Chunk<P::In> + Send + Sync,
    J: Send,
{
    type In = J;
    type Out = P::Out;
    type Error = P::Error;
    type Env = P::Env;

    async fn push(&mut self, env: &P::Env, input: Input<J>) -> Result<Chunk<P::Out>, P::Error> {
        let input = match input {
            Input::Data(chunk) => Input::Data((self.f)(chunk)),
            Input::Flush => Input::Flush,
        };
        self.inner.push(env, input).await
    }
}

/// Converts input elements through an effect. Created by
/// [`TransducerExt::contramap_m`](crate::transducer::TransducerExt::contramap_m).
pub struct ContramapM<T, F, J> {
    pub(crate) inner: T,
    pub(crate) f: F,
    pub(crate) _phantom: PhantomData<fn(J)>,
}

impl<T: std::fmt::Debug, F, J> std::fmt::Debug for ContramapM<T, F, J> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContramapM")
            .field("inner", &self.inner)
            .field("f", &"<function>")
            .finish()
    }
}

impl<T, F, J, Eff> Transducer for ContramapM<T, F, J>
where
    T: Transducer,
    F: Fn(J) -> Eff + Send + Sync,
    Eff: Effect<Output = T::In, Error = T::Error, Env = T::Env>,
    J: Send,
{
    type In = J;
    type Out = T::Out;
    type Error = T::Error;
    type Env = T::Env;
    type Push = ContramapM<T::Push, F, J>;

    async fn acquire(self, env: &T::Env, scope: &Scope) -> Result<Self::Push, T::Error> {
        let inner = self.inner.acquire(env, scope).await?;
        Ok(ContramapM {
            inner,
            f: self.f,
            _phantom: PhantomData,
        })
    }
}

impl<P, F, J, Eff> Push for ContramapM<P, F, J>
where
    P: Push,
    F: Fn(J) -> Eff + Send + Sync,
    Eff: Effect<Output = P::In, Error = P::Error, Env = P::Env>,
    J: Send,
{
    type In = J;
    type Out = P::Out;
    type Error = P::Error;
    type Env = P::Env;

    async fn push(&mut self, env: &P::Env, input: Input<J>) -> Result<Chunk<P::Out>, P::Error> {
        let chunk = match input {
            Input::Data(chunk) => chunk,
            Input::Flush => return self.inner.push(env, Input::Flush).await,
        };

        let mut converted = Vec::with_capacity(chunk.len());
        for item in chunk {
            let effect = (self.f)(item);
            converted.push(effect.run(env).await?);
        }
        self.inner.push(env, Input::Data(Chunk::from(converted))).await
    }
}
