//! Output-side mapping.

use crate::chunk::Chunk;
use crate::effect::Effect;
use crate::scope::Scope;
use crate::transducer::trait_def::{Input, Push, Transducer};

/// Maps every output element. Created by
/// [`TransducerExt::map`](crate::transducer::TransducerExt::map).
pub struct Map<T, F> {
    pub(crate) inner: T,
    pub(crate) f: F,
}

impl<T: std::fmt::Debug, F> std::fmt::Debug for Map<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Map")
            .field("inner", &self.inner)
            .field("f", &"<function>")
            .finish()
    }
}

impl<T, F, U> Transducer for Map<T, F>
where
    T: Transducer,
    F: Fn(T::Out) -> U + Send + Sync,
    U: Send,
{
    type In = T::In;
    type Out = U;
    type Error = T::Error;
    type Env = T::Env;
    type Push = Map<T::Push, F>;

    async fn acquire(self, env: &T::Env, scope: &Scope) -> Result<Self::Push, T::Error> {
        let inner = self.inner.acquire(env, scope).await?;
        Ok(Map { inner, f: self.f })
    }
}

impl<P, F, U> Push for Map<P, F>
where
    P: Push,
    F: Fn(P::Out) -> U + Send + Sync,
    U: Send,
{
    type In = P::In;
    type Out = U;
    type Error = P::Error;
    type Env = P::Env;

    async fn push(&mut self, env: &P::Env, input: Input<P::In>) -> Result<Chunk<U>, P::Error> {
        let out = self.inner.push(env, input).await?;
        Ok(out.map(&self.f))
    }
}

/// Maps every output chunk as a whole. Created by
/// [`TransducerExt::map_chunks`](crate::transducer::TransducerExt::map_chunks).
pub struct MapChunks<T, F> {
    pub(crate) inner: T,
    pub(crate) f: F,
    pub(crate) flushed: bool,
}

impl<T: std::fmt::Debug, F> std::fmt::Debug for MapChunks<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapChunks")
            .field("inner", &self.inner)
            .field("flushed", &self.flushed)
            .field("f", &"<function>")
            .finish()
    }
}

impl<T, F, U> Transducer for MapChunks<T, F>
where
    T: Transducer,
    F: Fn(Chunk<T::Out>) -> Chunk<U> + Send + Sync,
    U: Send,
{
    type In = T::In;
    type Out = U;
    type Error = T::Error;
    type Env = T::Env;
    type Push = MapChunks<T::Push, F>;

    async fn acquire(self, env: &T::Env, scope: &Scope) -> Result<Self::Push, T::Error> {
        let inner = self.inner.acquire(env, scope).await?;
        Ok(MapChunks {
            inner,
            f: self.f,
            flushed: false,
        })
    }
}

impl<P, F, U> Push for MapChunks<P, F>
where
    P: Push,
    F: Fn(Chunk<P::Out>) -> Chunk<U> + Send + Sync,
    U: Send,
{
    type In = P::In;
    type Out = U;
    type Error = P::Error;
    type Env = P::Env;

    async fn push(&mut self, env: &P::Env, input: Input<P::In>) -> Result<Chunk<U>, P::Error> {
        // `f(empty)` may be non-empty, so a repeated flush must not reach `f`.
        if input.is_flush() && self.flushed {
            return Ok(Chunk::empty());
        }
        self.flushed = input.is_flush();
        let out = self.inner.push(env, input).await?;
        Ok((self.f)(out))
    }
}

/// Maps every output element through an effect. Created by
/// [`TransducerExt::map_m`](crate::transducer::TransducerExt::map_m).
pub struct MapM<T, F> {
    pub(crate) inner: T,
    pub(crate) f: F,
}

impl<T: std::fmt::Debug, F> std::fmt::Debug for MapM<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapM")
            .field("inner", &self.inner)
            .field("f", &"<function>")
            .finish()
    }
}

impl<T, F, Eff> Transducer for MapM<T, F>
where
    T: Transducer,
    F: Fn(T::Out) -> Eff + Send + Sync,
    Eff: Effect<Error = T::Error, Env = T::Env>,
{
    type In = T::In;
    type Out = Eff::Output;
    type Error = T::Error;
    type Env = T::Env;
    type Push = MapM<T::Push, F>;

    async fn acquire(self, env: &T::Env, scope: &Scope) -> Result<Self::Push, T::Error> {
        let inner = self.inner.acquire(env, scope).await?;
        Ok(MapM { inner, f: self.f })
    }
}

impl<P, F, Eff> Push for MapM<P, F>
where
    P: Push,
    F: Fn(P::Out) -> Eff + Send + Sync,
    Eff: Effect<Error = P::Error, Env = P::Env>,
{
    type In = P::In;
    type Out = Eff::Output;
    type Error = P::Error;
    type Env = P::Env;

    async fn push(
        &mut self,
        env: &P::Env,
        input: Input<P::In>,
    ) -> Result<Chunk<Eff::Output>, P::Error> {
        let out = self.inner.push(env, input).await?;
        let mut mapped = Vec::with_capacity(out.len());
        for item in out {
            let effect = (self.f)(item);
            mapped.push(effect.run(env).await?);
        }
        Ok(Chunk::from(mapped))
    }
}

/// Maps every output chunk through an effect. Created by
/// [`TransducerExt::map_chunks_m`](crate::transducer::TransducerExt::map_chunks_m).
pub struct MapChunksM<T, F> {
    pub(crate) inner: T,
    pub(crate) f: F,
    pub(crate) flushed: bool,
}

impl<T: std::fmt::Debug, F> std::fmt::Debug for MapChunksM<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapChunksM")
            .field("inner", &self.inner)
            .field("flushed", &self.flushed)
            .field("f", &"<function>")
            .finish()
    }
}

impl<T, F, Eff, U> Transducer for MapChunksM<T, F>
where
    T: Transducer,
    F: Fn(Chunk<T::Out>) -> Eff + Send + Sync,
    Eff: Effect<Output = Chunk<U>, Error = T::Error, Env = T::Env>,
    U: Send,
{
    type In = T::In;
    type Out = U;
    type Error = T::Error;
    type Env = T::Env;
    type Push = MapChunksM<T::Push, F>;

    async fn acquire(self, env: &T::Env, scope: &Scope) -> Result<Self::Push, T::Error> {
        let inner = self.inner.acquire(env, scope).await?;
        Ok(MapChunksM {
            inner,
            f: self.f,
            flushed: false,
        })
    }
}

impl<P, F, Eff, U> Push for MapChunksM<P, F>
where
    P: Push,
    F: Fn(Chunk<P::Out>) -> Eff + Send + Sync,
    Eff: Effect<Output = Chunk<U>, Error = P::Error, Env = P::Env>,
    U: Send,
{
    type In = P::In;
    type Out = U;
    type Error = P::Error;
    type Env = P::Env;

    async fn push(&mut self, env: &P::Env, input: Input<P::In>) -> Result<Chunk<U>, P::Error> {
        if input.is_flush() && self.flushed {
            return Ok(Chunk::empty());
        }
        self.flushed = input.is_flush();
        let out = self.inner.push(env, input).await?;
        let effect = (self.f)(out);
        effect.run(env).await
    }
}
