//! The pull → push → forward driver behind `aggregate` and `grouped`.

use std::pin::Pin;

use futures::{Stream, StreamExt};

use crate::chunk::Chunk;
use crate::scope::Scope;
use crate::transducer::{Input, Push, Transducer};

/// An acquired transducer together with the upstream it drains.
///
/// Dropping it drops the scope handle, which releases everything acquired
/// for the push when the driving stream is dropped mid-flight.
pub(super) struct Active<S, P: Push> {
    pub(super) upstream: Pin<Box<S>>,
    pub(super) push: P,
    pub(super) env: P::Env,
    pub(super) scope: Scope,
}

/// What pulling upstream once produced.
pub(super) enum Pulled<O, E> {
    /// Emit this chunk.
    Emit(Chunk<O>),
    /// Nothing to emit yet; pull again.
    Skip,
    /// Upstream ended; the push has been flushed and the scope closed.
    Finished(Chunk<O>),
    /// Upstream or the push failed; the scope has been closed.
    Failed(E),
}

impl<S, P, I, E> Active<S, P>
where
    S: Stream<Item = Result<Chunk<I>, E>>,
    P: Push<In = I, Error = E>,
{
    /// Acquire `transducer` in a fresh scope. On failure the scope is closed
    /// before the error is returned.
    pub(super) async fn start<T>(upstream: Pin<Box<S>>, transducer: T, env: P::Env) -> Result<Self, E>
    where
        T: Transducer<In = I, Out = P::Out, Error = E, Env = P::Env, Push = P>,
    {
        let scope = Scope::new();
        match transducer.acquire(&env, &scope).await {
            Ok(push) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("transducer acquired");

                Ok(Active {
                    upstream,
                    push,
                    env,
                    scope,
                })
            }
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("transducer acquisition failed");

                scope.close();
                Err(e)
            }
        }
    }

    /// Pull one upstream item and push it.
    pub(super) async fn pull(&mut self) -> Pulled<P::Out, E> {
        let item = self.upstream.next().await;
        self.handle(item).await
    }

    /// Push an upstream item already pulled by the caller.
    pub(super) async fn handle(&mut self, item: Option<Result<Chunk<I>, E>>) -> Pulled<P::Out, E> {
        match item {
            Some(Ok(chunk)) if chunk.is_empty() => Pulled::Skip,
            Some(Ok(chunk)) => match self.push.push(&self.env, Input::Data(chunk)).await {
                Ok(out) if out.is_empty() => Pulled::Skip,
                Ok(out) => Pulled::Emit(out),
                Err(e) => self.fail(e),
            },
            Some(Err(e)) => self.fail(e),
            None => {
                #[cfg(feature = "tracing")]
                tracing::debug!("upstream ended, flushing");

                let flushed = self.push.push(&self.env, Input::Flush).await;
                self.scope.close();
                match flushed {
                    Ok(out) => Pulled::Finished(out),
                    Err(e) => Pulled::Failed(e),
                }
            }
        }
    }

    fn fail<O>(&self, e: E) -> Pulled<O, E> {
        #[cfg(feature = "tracing")]
        tracing::debug!("stopping on error");

        self.scope.close();
        Pulled::Failed(e)
    }
}

enum Driver<S, T: Transducer> {
    Pending {
        upstream: Pin<Box<S>>,
        transducer: T,
        env: T::Env,
    },
    Running(Active<S, T::Push>),
    Done,
}

pub(super) fn aggregate<S, T, I, E>(
    upstream: S,
    transducer: T,
    env: T::Env,
) -> impl Stream<Item = Result<Chunk<T::Out>, E>> + Send
where
    S: Stream<Item = Result<Chunk<I>, E>> + Send,
    T: Transducer<In = I, Error = E>,
    I: Send,
    E: Send,
{
    let driver: Driver<S, T> = Driver::Pending {
        upstream: Box::pin(upstream),
        transducer,
        env,
    };

    futures::stream::unfold(driver, |mut driver| async move {
        loop {
            match std::mem::replace(&mut driver, Driver::Done) {
                Driver::Done => return None,
                Driver::Pending {
                    upstream,
                    transducer,
                    env,
                } => match Active::start(upstream, transducer, env).await {
                    Ok(active) => driver = Driver::Running(active),
                    Err(e) => return Some((Err(e), Driver::Done)),
                },
                Driver::Running(mut active) => match active.pull().await {
                    Pulled::Emit(out) => return Some((Ok(out), Driver::Running(active))),
                    Pulled::Skip => driver = Driver::Running(active),
                    Pulled::Finished(out) if out.is_empty() => return None,
                    Pulled::Finished(out) => return Some((Ok(out), Driver::Done)),
                    Pulled::Failed(e) => return Some((Err(e), Driver::Done)),
                },
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk;
    use crate::transducer::{collect_all_n, fail, fold_left, identity, TransducerExt};
    use futures::stream;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn chunks<I>(items: Vec<Vec<I>>) -> impl Stream<Item = Result<Chunk<I>, &'static str>> + Send
    where
        I: Send,
    {
        stream::iter(items.into_iter().map(|v| Ok(Chunk::from(v))))
    }

    #[tokio::test]
    async fn forwards_pushes_then_final_flush() {
        let out: Vec<_> = aggregate(
            chunks(vec![vec![1, 2, 3], vec![4, 5]]),
            collect_all_n::<i32, &'static str, ()>(2),
            (),
        )
        .collect()
        .await;

        assert_eq!(
            out,
            vec![
                Ok(chunk![chunk![1, 2]]),
                Ok(chunk![chunk![3, 4]]),
                Ok(chunk![chunk![5]]),
            ]
        );
    }

    #[tokio::test]
    async fn empty_outputs_are_not_forwarded() {
        let sum = fold_left::<i32, i32, _, &'static str, ()>(0, |a, b| a + b);
        let out: Vec<_> = aggregate(chunks(vec![vec![1], vec![], vec![2, 3]]), sum, ())
            .collect()
            .await;
        assert_eq!(out, vec![Ok(chunk![6])]);
    }

    #[tokio::test]
    async fn empty_upstream_emits_nothing() {
        let out: Vec<_> = aggregate(
            chunks::<i32>(vec![]),
            collect_all_n::<i32, &'static str, ()>(2),
            (),
        )
        .collect()
        .await;
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn upstream_error_ends_without_flush() {
        let flushed = Arc::new(AtomicUsize::new(0));
        let counter = flushed.clone();
        let upstream = stream::iter(vec![Ok(chunk![1]), Err("boom"), Ok(chunk![2])]);
        let t = collect_all_n::<i32, &'static str, ()>(5).map(move |group| {
            counter.fetch_add(1, Ordering::SeqCst);
            group
        });

        let out: Vec<_> = aggregate(upstream, t, ()).collect().await;

        assert_eq!(out, vec![Err("boom")]);
        assert_eq!(flushed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn push_error_is_forwarded_once() {
        let out: Vec<_> = aggregate(
            chunks(vec![vec![1], vec![2]]),
            fail::<i32, i32, _, ()>("nope"),
            (),
        )
        .collect()
        .await;
        assert_eq!(out, vec![Err("nope")]);
    }

    struct CountAcquires(Arc<AtomicUsize>);

    impl Transducer for CountAcquires {
        type In = i32;
        type Out = i32;
        type Error = Infallible;
        type Env = ();
        type Push = crate::transducer::Identity<i32, Infallible, ()>;

        async fn acquire(self, _env: &(), _scope: &Scope) -> Result<Self::Push, Infallible> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(identity())
        }
    }

    #[tokio::test]
    async fn acquisition_waits_for_first_poll() {
        let acquired = Arc::new(AtomicUsize::new(0));
        let upstream = stream::iter(vec![Ok::<_, Infallible>(chunk![1, 2])]);
        let mut out = Box::pin(aggregate(upstream, CountAcquires(acquired.clone()), ()));
        assert_eq!(acquired.load(Ordering::SeqCst), 0);

        assert_eq!(out.next().await, Some(Ok(chunk![1, 2])));
        assert_eq!(acquired.load(Ordering::SeqCst), 1);
        assert_eq!(out.next().await, None);
    }

    #[cfg(feature = "tracing")]
    #[tokio::test]
    #[tracing_test::traced_test]
    async fn logs_driver_lifecycle() {
        let out: Vec<_> = aggregate(chunks(vec![vec![1]]), identity::<i32, &'static str, ()>(), ())
            .collect()
            .await;
        assert_eq!(out, vec![Ok(chunk![1])]);
        assert!(logs_contain("transducer acquired"));
        assert!(logs_contain("upstream ended, flushing"));
    }
}
