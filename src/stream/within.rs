//! The timed driver behind `aggregate_async_within`.
//!
//! Once a chunk arrives and no window is open, a window opens with the
//! schedule's next delay. When the deadline passes before upstream has ended,
//! the transducer is flushed early. That flush counts as one recurrence.

use std::pin::Pin;
use std::time::Duration;

use futures::{Stream, StreamExt};
use tokio::time::{sleep_until, Instant};

use crate::chunk::Chunk;
use crate::either::Either;
use crate::schedule::Schedule;
use crate::stream::aggregate::{Active, Pulled};
use crate::transducer::{Input, Push, Transducer};

struct Window {
    schedule: Schedule,
    recurrence: u32,
    deadline: Option<Instant>,
    prev_delay: Option<Duration>,
}

impl Window {
    fn new(schedule: Schedule) -> Self {
        Window {
            schedule,
            recurrence: 0,
            deadline: None,
            prev_delay: None,
        }
    }

    fn open(&mut self) {
        if self.deadline.is_some() {
            return;
        }
        if let Some(delay) = self.schedule.next_delay(self.recurrence, self.prev_delay) {
            self.prev_delay = Some(delay);
            self.deadline = Some(Instant::now() + delay);
        }
    }

    /// Record a timer-forced flush. Returns the recurrence count if the
    /// schedule just ran out, after resetting it.
    fn recur(&mut self) -> Option<u32> {
        self.deadline = None;
        self.recurrence = self.recurrence.saturating_add(1);
        if !self.schedule.is_exhausted(self.recurrence) {
            return None;
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(recurrences = self.recurrence, "schedule exhausted");

        let done = self.recurrence;
        self.recurrence = 0;
        self.prev_delay = None;
        Some(done)
    }
}

enum Event<T> {
    Upstream(Option<T>),
    Deadline,
}

enum Driver<S, T: Transducer> {
    Pending {
        upstream: Pin<Box<S>>,
        transducer: T,
        env: T::Env,
        window: Window,
    },
    Running(Active<S, T::Push>, Window),
    Done,
}

fn rights<O>(out: Chunk<O>) -> Chunk<Either<u32, O>> {
    out.map(Either::Right)
}

pub(super) fn aggregate_within_either<S, T, I, E>(
    upstream: S,
    transducer: T,
    env: T::Env,
    schedule: Schedule,
) -> impl Stream<Item = Result<Chunk<Either<u32, T::Out>>, E>> + Send
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
        window: Window::new(schedule),
    };

    futures::stream::unfold(driver, |mut driver| async move {
        loop {
            match std::mem::replace(&mut driver, Driver::Done) {
                Driver::Done => return None,
                Driver::Pending {
                    upstream,
                    transducer,
                    env,
                    window,
                } => match Active::start(upstream, transducer, env).await {
                    Ok(active) => driver = Driver::Running(active, window),
                    Err(e) => return Some((Err(e), Driver::Done)),
                },
                Driver::Running(mut active, mut window) => {
                    let event = match window.deadline {
                        Some(deadline) => tokio::select! {
                            biased;
                            item = active.upstream.next() => Event::Upstream(item),
                            _ = sleep_until(deadline) => Event::Deadline,
                        },
                        None => Event::Upstream(active.upstream.next().await),
                    };

                    match event {
                        Event::Upstream(item) => {
                            if matches!(&item, Some(Ok(chunk)) if !chunk.is_empty()) {
                                window.open();
                            }
                            match active.handle(item).await {
                                Pulled::Emit(out) => {
                                    return Some((Ok(rights(out)), Driver::Running(active, window)))
                                }
                                Pulled::Skip => driver = Driver::Running(active, window),
                                Pulled::Finished(out) if out.is_empty() => return None,
                                Pulled::Finished(out) => return Some((Ok(rights(out)), Driver::Done)),
                                Pulled::Failed(e) => return Some((Err(e), Driver::Done)),
                            }
                        }
                        Event::Deadline => {
                            #[cfg(feature = "tracing")]
                            tracing::trace!(recurrence = window.recurrence, "window elapsed, flushing");

                            let flushed = active.push.push(&active.env, Input::Flush).await;
                            let out = match flushed {
                                Ok(out) => rights(out),
                                Err(e) => {
                                    active.scope.close();
                                    return Some((Err(e), Driver::Done));
                                }
                            };
                            let out = match window.recur() {
                                Some(recurrences) => out.concat(Chunk::single(Either::Left(recurrences))),
                                None => out,
                            };
                            if out.is_empty() {
                                driver = Driver::Running(active, window);
                            } else {
                                return Some((Ok(out), Driver::Running(active, window)));
                            }
                        }
                    }
                }
            }
        }
    })
}

pub(super) fn aggregate_within<S, T, I, E>(
    upstream: S,
    transducer: T,
    env: T::Env,
    schedule: Schedule,
) -> impl Stream<Item = Result<Chunk<T::Out>, E>> + Send
where
    S: Stream<Item = Result<Chunk<I>, E>> + Send,
    T: Transducer<In = I, Error = E>,
    I: Send,
    E: Send,
{
    aggregate_within_either(upstream, transducer, env, schedule).filter_map(|item| async move {
        match item {
            Ok(chunk) => {
                let data: Chunk<T::Out> = chunk.into_iter().filter_map(Either::into_right).collect();
                (!data.is_empty()).then_some(Ok(data))
            }
            Err(e) => Some(Err(e)),
        }
    })
}
