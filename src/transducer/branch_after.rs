//! Choosing a transducer from a stream's prefix.

use std::marker::PhantomData;

use crate::chunk::Chunk;
use crate::scope::Scope;
use crate::transducer::trait_def::{Input, Push, Transducer};

/// Recipe for [`branch_after`].
pub struct BranchAfter<I, F, T> {
    n: usize,
    f: F,
    _phantom: PhantomData<fn() -> (I, T)>,
}

impl<I, F, T> std::fmt::Debug for BranchAfter<I, F, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BranchAfter")
            .field("n", &self.n)
            .field("f", &"<function>")
            .finish()
    }
}

/// Read the first `n` elements, then hand the rest of the stream to the
/// transducer `f` builds from them.
///
/// The prefix is only given to `f`; it is not emitted unless the branch
/// emits it. The branch is acquired in a child of the acquisition scope and
/// that child is closed when the branch is flushed, when the outer scope
/// closes, or when the push is dropped, whichever comes first.
///
/// If the stream ends before `n` elements arrive, `f` is called with the
/// partial prefix and its transducer is flushed once in a scope that closes
/// right away.
///
/// ```rust
/// use std::convert::Infallible;
/// use weir::testing::transduce;
/// use weir::transducer::{branch_after, collect_all_n};
/// use weir::{chunk, Chunk};
///
/// # tokio_test::block_on(async {
/// // The first element says how large the following groups are.
/// let framed = branch_after(1, |header: Chunk<usize>| {
///     collect_all_n::<usize, Infallible, ()>(header.first().copied().unwrap_or(1))
/// });
/// let out = transduce(framed, &(), [chunk![2, 10, 11, 12]]).await.unwrap();
/// assert_eq!(out, vec![chunk![10, 11], chunk![12]]);
/// # });
/// ```
pub fn branch_after<I, F, T>(n: usize, f: F) -> BranchAfter<I, F, T>
where
    I: Send,
    F: Fn(Chunk<I>) -> T + Send + Sync,
    T: Transducer<In = I>,
{
    BranchAfter {
        n,
        f,
        _phantom: PhantomData,
    }
}

impl<I, F, T> Transducer for BranchAfter<I, F, T>
where
    I: Send,
    F: Fn(Chunk<I>) -> T + Send + Sync,
    T: Transducer<In = I>,
{
    type In = I;
    type Out = T::Out;
    type Error = T::Error;
    type Env = T::Env;
    type Push = BranchAfterPush<F, T>;

    async fn acquire(self, _env: &T::Env, scope: &Scope) -> Result<Self::Push, T::Error> {
        Ok(BranchAfterPush {
            n: self.n,
            f: self.f,
            scope: scope.clone(),
            state: State::Collecting(Vec::new()),
        })
    }
}

enum State<I, P> {
    Collecting(Vec<I>),
    Emitting { scope: Scope, push: P },
    Drained,
}

/// Live push of [`branch_after`].
pub struct BranchAfterPush<F, T: Transducer> {
    n: usize,
    f: F,
    scope: Scope,
    state: State<T::In, T::Push>,
}

impl<F, T: Transducer> std::fmt::Debug for BranchAfterPush<F, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.state {
            State::Collecting(buffer) => format!("Collecting({})", buffer.len()),
            State::Emitting { .. } => "Emitting".to_string(),
            State::Drained => "Drained".to_string(),
        };
        f.debug_struct("BranchAfterPush")
            .field("n", &self.n)
            .field("state", &state)
            .finish()
    }
}

impl<F, T> BranchAfterPush<F, T>
where
    F: Fn(Chunk<T::In>) -> T + Send + Sync,
    T: Transducer,
{
    async fn collect(
        &mut self,
        env: &T::Env,
        chunk: Chunk<T::In>,
    ) -> Result<Chunk<T::Out>, T::Error> {
        let mut buffer = match std::mem::replace(&mut self.state, State::Drained) {
            State::Collecting(buffer) => buffer,
            _ => Vec::new(),
        };

        let missing = self.n.saturating_sub(buffer.len());
        if chunk.len() < missing {
            buffer.extend(chunk);
            self.state = State::Collecting(buffer);
            return Ok(Chunk::empty());
        }

        let (head, rest) = chunk.split_at(missing);
        buffer.extend(head);

        #[cfg(feature = "tracing")]
        tracing::debug!(prefix = buffer.len(), "branch_after switching to branch");

        let branch = (self.f)(Chunk::from(buffer));
        let scope = self.scope.child();
        let mut push = branch.acquire(env, &scope).await?;
        let out = push.push(env, Input::Data(rest)).await;
        self.state = State::Emitting { scope, push };
        out
    }

    async fn flush(&mut self, env: &T::Env) -> Result<Chunk<T::Out>, T::Error> {
        match std::mem::replace(&mut self.state, State::Drained) {
            State::Collecting(partial) => {
                let branch = (self.f)(Chunk::from(partial));
                Scope::using(|scope| async move {
                    let mut push = branch.acquire(env, &scope).await?;
                    push.push(env, Input::Flush).await
                })
                .await
            }
            State::Emitting { scope, mut push } => {
                let out = push.push(env, Input::Flush).await;
                scope.close();
                out
            }
            State::Drained => Ok(Chunk::empty()),
        }
    }
}

impl<F, T> Push for BranchAfterPush<F, T>
where
    F: Fn(Chunk<T::In>) -> T + Send + Sync,
    T: Transducer,
{
    type In = T::In;
    type Out = T::Out;
    type Error = T::Error;
    type Env = T::Env;

    async fn push(
        &mut self,
        env: &T::Env,
        input: Input<T::In>,
    ) -> Result<Chunk<T::Out>, T::Error> {
        match input {
            Input::Data(chunk) => {
                if let State::Emitting { push, .. } = &mut self.state {
                    return push.push(env, Input::Data(chunk)).await;
                }
                self.collect(env, chunk).await
            }
            Input::Flush => self.flush(env).await,
        }
    }
}
