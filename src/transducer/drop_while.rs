//! One-shot prefix dropping.

use std::marker::PhantomData;

use crate::chunk::Chunk;
use crate::effect::Effect;
use crate::scope::Scope;
use crate::transducer::trait_def::{Input, Push, Transducer};

/// Drops a leading run of elements. Created by [`drop_while`].
pub struct DropWhile<I, P, E, Env> {
    predicate: P,
    dropping: bool,
    _phantom: PhantomData<fn() -> (I, E, Env)>,
}

impl<I, P, E, Env> std::fmt::Debug for DropWhile<I, P, E, Env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DropWhile")
            .field("dropping", &self.dropping)
            .field("predicate", &"<function>")
            .finish()
    }
}

/// Drop elements while `predicate` holds, then pass everything through.
///
/// The first element failing the predicate opens the latch for good: later
/// elements pass even when they satisfy the predicate, and a flush does not
/// re-arm it.
///
/// ```rust
/// use std::convert::Infallible;
/// use weir::testing::transduce;
/// use weir::{chunk, transducer::drop_while};
///
/// # tokio_test::block_on(async {
/// let t = drop_while::<i32, _, Infallible, ()>(|x| *x < 2);
/// let out = transduce(t, &(), [chunk![1, 1], chunk![2, 1, 3]]).await.unwrap();
/// assert_eq!(out, vec![2, 1, 3]);
/// # });
/// ```
pub fn drop_while<I, P, E, Env>(predicate: P) -> DropWhile<I, P, E, Env>
where
    I: Send,
    P: Fn(&I) -> bool + Send + Sync,
    E: Send,
    Env: Clone + Send + Sync,
{
    DropWhile {
        predicate,
        dropping: true,
        _phantom: PhantomData,
    }
}

impl<I, P, E, Env> Transducer for DropWhile<I, P, E, Env>
where
    I: Send,
    P: Fn(&I) -> bool + Send + Sync,
    E: Send,
    Env: Clone + Send + Sync,
{
    type In = I;
    type Out = I;
    type Error = E;
    type Env = Env;
    type Push = Self;

    async fn acquire(self, _env: &Env, _scope: &Scope) -> Result<Self, E> {
        Ok(self)
    }
}

impl<I, P, E, Env> Push for DropWhile<I, P, E, Env>
where
    I: Send,
    P: Fn(&I) -> bool + Send + Sync,
    E: Send,
    Env: Clone + Send + Sync,
{
    type In = I;
    type Out = I;
    type Error = E;
    type Env = Env;

    async fn push(&mut self, _env: &Env, input: Input<I>) -> Result<Chunk<I>, E> {
        let Input::Data(chunk) = input else {
            return Ok(Chunk::empty());
        };
        if !self.dropping {
            return Ok(chunk);
        }

        let kept: Vec<I> = chunk
            .into_iter()
            .skip_while(|item| (self.predicate)(item))
            .collect();
        if !kept.is_empty() {
            self.dropping = false;
        }
        Ok(Chunk::from(kept))
    }
}

/// Drops a leading run of elements, deciding effectfully. Created by
/// [`drop_while_m`].
pub struct DropWhileM<I, P, E, Env> {
    predicate: P,
    dropping: bool,
    _phantom: PhantomData<fn() -> (I, E, Env)>,
}

impl<I, P, E, Env> std::fmt::Debug for DropWhileM<I, P, E, Env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DropWhileM")
            .field("dropping", &self.dropping)
            .field("predicate", &"<function>")
            .finish()
    }
}

/// Like [`drop_while`], with an effectful predicate.
///
/// The predicate is not evaluated again once the latch has opened.
pub fn drop_while_m<I, P, Eff>(predicate: P) -> DropWhileM<I, P, Eff::Error, Eff::Env>
where
    I: Send,
    P: Fn(&I) -> Eff + Send + Sync,
    Eff: Effect<Output = bool>,
{
    DropWhileM {
        predicate,
        dropping: true,
        _phantom: PhantomData,
    }
}

impl<I, P, Eff, E, Env> Transducer for DropWhileM<I, P, E, Env>
where
    I: Send,
    P: Fn(&I) -> Eff + Send + Sync,
    Eff: Effect<Output = bool, Error = E, Env = Env>,
    E: Send,
    Env: Clone + Send + Sync,
{
    type In = I;
    type Out = I;
    type Error = E;
    type Env = Env;
    type Push = Self;

    async fn acquire(self, _env: &Env, _scope: &Scope) -> Result<Self, E> {
        Ok(self)
    }
}

impl<I, P, Eff, E, Env> Push for DropWhileM<I, P, E, Env>
where
    I: Send,
    P: Fn(&I) -> Eff + Send + Sync,
    Eff: Effect<Output = bool, Error = E, Env = Env>,
    E: Send,
    Env: Clone + Send + Sync,
{
    type In = I;
    type Out = I;
    type Error = E;
    type Env = Env;

    async fn push(&mut self, env: &Env, input: Input<I>) -> Result<Chunk<I>, E> {
        let Input::Data(chunk) = input else {
            return Ok(Chunk::empty());
        };
        if !self.dropping {
            return Ok(chunk);
        }

        let mut kept = Vec::new();
        for item in chunk {
            if self.dropping {
                let drop = (self.predicate)(&item);
                if drop.run(env).await? {
                    continue;
                }
                self.dropping = false;
            }
            kept.push(item);
        }
        Ok(Chunk::from(kept))
    }
}
