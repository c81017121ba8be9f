use crate::chunk::Chunk;
use crate::scope::Scope;
use crate::transducer::trait_def::{Input, Push, Transducer};

/// Converts acquisition and push errors. Created by
/// [`TransducerExt::map_err`](crate::transducer::TransducerExt::map_err).
pub struct MapErr<T, F> {
    pub(crate) inner: T,
    pub(crate) f: F,
}

impl<T: std::fmt::Debug, F> std::fmt::Debug for MapErr<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapErr")
            .field("inner", &self.inner)
            .field("f", &"<function>")
            .finish()
    }
}

impl<T, F, E2> Transducer for MapErr<T, F>
where
    T: Transducer,
    F: Fn(T::Error) -> E2 + Send + Sync,
    E2: Send,
{
    type In = T::In;
    type Out = T::Out;
    type Error = E2;
    type Env = T::Env;
    type Push = MapErr<T::Push, F>;

    async fn acquire(self, env: &T::Env, scope: &Scope) -> Result<Self::Push, E2> {
        match self.inner.acquire(env, scope).await {
            Ok(inner) => Ok(MapErr { inner, f: self.f }),
            Err(error) => Err((self.f)(error)),
        }
    }
}

impl<P, F, E2> Push for MapErr<P, F>
where
    P: Push,
    F: Fn(P::Error) -> E2 + Send + Sync,
    E2: Send,
{
    type In = P::In;
    type Out = P::Out;
    type Error = E2;
    type Env = P::Env;

    async fn push(&mut self, env: &P::Env, input: Input<P::In>) -> Result<Chunk<P::Out>, E2> {
        self.inner.push(env, input).await.map_err(&self.f)
    }
}
