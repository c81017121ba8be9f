use crate::chunk::Chunk;
use crate::scope::Scope;
use crate::transducer::trait_def::{Input, Push, Transducer};

/// Two transducers in sequence. Created by
/// [`TransducerExt::then`](crate::transducer::TransducerExt::then).
#[derive(Debug)]
pub struct Then<L, R> {
    pub(crate) left: L,
    pub(crate) right: R,
}

impl<L, R> Transducer for Then<L, R>
where
    L: Transducer,
    R: Transducer<In = L::Out, Error = L::Error, Env = L::Env>,
{
    type In = L::In;
    type Out = R::Out;
    type Error = L::Error;
    type Env = L::Env;
    type Push = Then<L::Push, R::Push>;

    async fn acquire(self, env: &L::Env, scope: &Scope) -> Result<Self::Push, L::Error> {
        let left = self.left.acquire(env, scope).await?;
        let right = self.right.acquire(env, scope).await?;
        Ok(Then { left, right })
    }
}

impl<L, R> Push for Then<L, R>
where
    L: Push,
    R: Push<In = L::Out, Error = L::Error, Env = L::Env>,
{
    type In = L::In;
    type Out = R::Out;
    type Error = L::Error;
    type Env = L::Env;

    async fn push(&mut self, env: &L::Env, input: Input<L::In>) -> Result<Chunk<R::Out>, L::Error> {
        match input {
            Input::Data(chunk) => {
                let mid = self.left.push(env, Input::Data(chunk)).await?;
                self.right.push(env, Input::Data(mid)).await
            }
            Input::Flush => {
                let mid = self.left.push(env, Input::Flush).await?;
                if mid.is_empty() {
                    return self.right.push(env, Input::Flush).await;
                }
                // The right side still needs its own flush after the
                // left side's final output.
                let out = self.right.push(env, Input::Data(mid)).await?;
                let rest = self.right.push(env, Input::Flush).await?;
                Ok(out.concat(rest))
            }
        }
    }
}
