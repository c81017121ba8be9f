//! Tracing support for transducers.
//!
//! Feature-gated behind `#[cfg(feature = "tracing")]`.

use crate::chunk::Chunk;
use crate::scope::Scope;
use crate::transducer::trait_def::{Input, Push, Transducer};

/// A transducer whose acquisition and pushes run inside a tracing span.
///
/// Created by [`TransducerExt::instrument`](crate::transducer::TransducerExt::instrument).
#[derive(Debug)]
pub struct Instrumented<T> {
    pub(crate) inner: T,
    pub(crate) span: tracing::Span,
}

impl<T> Transducer for Instrumented<T>
where
    T: Transducer,
{
    type In = T::In;
    type Out = T::Out;
    type Error = T::Error;
    type Env = T::Env;
    type Push = Instrumented<T::Push>;

    async fn acquire(self, env: &T::Env, scope: &Scope) -> Result<Self::Push, T::Error> {
        use tracing::Instrument as _;
        let span = self.span;
        let inner = self.inner.acquire(env, scope).instrument(span.clone()).await?;
        Ok(Instrumented { inner, span })
    }
}

impl<P> Push for Instrumented<P>
where
    P: Push,
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
        use tracing::Instrument as _;
        let span = self.span.clone();
        self.inner.push(env, input).instrument(span).await
    }
}
