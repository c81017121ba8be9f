//! Type-erased transducers.
//!
//! Use [`BoxedTransducer`] when you need to:
//! - return different transducers from match arms
//! - store transducers of different types in one collection
//! - name a transducer type in a struct field
//!
//! Boxing clones the environment and the scope handle at acquisition so the
//! boxed future is `'static`. Both are cheap to clone.

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;

use crate::chunk::Chunk;
use crate::scope::Scope;
use crate::transducer::trait_def::{Input, Push, Transducer};

/// A boxed future that is `Send`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

type AcquireFn<I, O, E, Env> =
    Box<dyn FnOnce(Env, Scope) -> BoxFuture<'static, Result<BoxedPush<I, O, E, Env>, E>> + Send>;

/// A transducer with its concrete type erased.
///
/// ```rust
/// use std::convert::Infallible;
/// use weir::testing::transduce;
/// use weir::transducer::{collect_all_n, identity, BoxedTransducer, TransducerExt};
/// use weir::{chunk, Chunk};
///
/// # tokio_test::block_on(async {
/// fn batching(size: usize) -> BoxedTransducer<i32, Chunk<i32>, Infallible, ()> {
///     match size {
///         0 => identity().map(Chunk::single).boxed(),
///         n => collect_all_n(n).boxed(),
///     }
/// }
///
/// let out = transduce(batching(0), &(), [chunk![1, 2]]).await.unwrap();
/// assert_eq!(out, vec![chunk![1], chunk![2]]);
/// # });
/// ```
pub struct BoxedTransducer<I, O, E, Env> {
    acquire_fn: AcquireFn<I, O, E, Env>,
}

impl<I, O, E, Env> std::fmt::Debug for BoxedTransducer<I, O, E, Env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxedTransducer")
            .field("acquire_fn", &"<function>")
            .finish()
    }
}

impl<I, O, E, Env> BoxedTransducer<I, O, E, Env>
where
    I: Send + 'static,
    O: Send + 'static,
    E: Send + 'static,
    Env: Clone + Send + Sync + 'static,
{
    /// Erase the type of `transducer`.
    pub fn new<T>(transducer: T) -> Self
    where
        T: Transducer<In = I, Out = O, Error = E, Env = Env> + 'static,
        T::Push: 'static,
    {
        BoxedTransducer {
            acquire_fn: Box::new(move |env: Env, scope: Scope| {
                Box::pin(async move {
                    let push = transducer.acquire(&env, &scope).await?;
                    Ok(BoxedPush::new(push))
                })
            }),
        }
    }
}

impl<I, O, E, Env> Transducer for BoxedTransducer<I, O, E, Env>
where
    I: Send + 'static,
    O: Send + 'static,
    E: Send + 'static,
    Env: Clone + Send + Sync + 'static,
{
    type In = I;
    type Out = O;
    type Error = E;
    type Env = Env;
    type Push = BoxedPush<I, O, E, Env>;

    fn acquire(
        self,
        env: &Env,
        scope: &Scope,
    ) -> impl Future<Output = Result<Self::Push, E>> + Send {
        (self.acquire_fn)(env.clone(), scope.clone())
    }
}

trait DynPush<I, O, E, Env>: Send {
    fn push_boxed<'a>(
        &'a mut self,
        env: &'a Env,
        input: Input<I>,
    ) -> BoxFuture<'a, Result<Chunk<O>, E>>;
}

impl<P: Push> DynPush<P::In, P::Out, P::Error, P::Env> for P {
    fn push_boxed<'a>(
        &'a mut self,
        env: &'a P::Env,
        input: Input<P::In>,
    ) -> BoxFuture<'a, Result<Chunk<P::Out>, P::Error>> {
        Box::pin(self.push(env, input))
    }
}

/// A push function with its concrete type erased.
pub struct BoxedPush<I, O, E, Env> {
    inner: Box<dyn DynPush<I, O, E, Env>>,
    _phantom: PhantomData<fn() -> Env>,
}

impl<I, O, E, Env> std::fmt::Debug for BoxedPush<I, O, E, Env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxedPush")
            .field("inner", &"<push>")
            .finish()
    }
}

impl<I, O, E, Env> BoxedPush<I, O, E, Env>
where
    I: Send + 'static,
    O: Send + 'static,
    E: Send + 'static,
    Env: Clone + Send + Sync + 'static,
{
    /// Erase the type of `push`.
    pub fn new<P>(push: P) -> Self
    where
        P: Push<In = I, Out = O, Error = E, Env = Env> + 'static,
    {
        BoxedPush {
            inner: Box::new(push),
            _phantom: PhantomData,
        }
    }
}

impl<I, O, E, Env> Push for BoxedPush<I, O, E, Env>
where
    I: Send + 'static,
    O: Send + 'static,
    E: Send + 'static,
    Env: Clone + Send + Sync + 'static,
{
    type In = I;
    type Out = O;
    type Error = E;
    type Env = Env;

    async fn push(&mut self, env: &Env, input: Input<I>) -> Result<Chunk<O>, E> {
        self.inner.push_boxed(env, input).await
    }
}
