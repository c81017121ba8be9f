//! Grouping transducers: fixed-size groups, keyed maps and sets, and
//! predicate-delimited runs.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::chunk::Chunk;
use crate::effect::Effect;
use crate::scope::Scope;
use crate::transducer::fold::fold_with;
use crate::transducer::fold_weighted::fold_weighted_with;
use crate::transducer::trait_def::{Input, Push, Transducer};
use crate::transducer::TransducerExt;

/// Collect the whole stream into one chunk, emitted on flush.
///
/// An empty stream still yields one (empty) group.
pub fn collect_all<I, E, Env>() -> impl Transducer<In = I, Out = Chunk<I>, Error = E, Env = Env>
where
    I: Send,
    E: Send,
    Env: Clone + Send + Sync,
{
    fold_with(
        Vec::new,
        |_: &Vec<I>| true,
        |mut items: Vec<I>, item: I| {
            items.push(item);
            items
        },
    )
    .map(|items: Vec<I>| Chunk::from(items))
}

/// Groups of exactly `n` elements. Created by [`collect_all_n`].
pub struct CollectAllN<I, E, Env> {
    n: usize,
    buffer: Vec<I>,
    _phantom: PhantomData<fn() -> (E, Env)>,
}

impl<I: std::fmt::Debug, E, Env> std::fmt::Debug for CollectAllN<I, E, Env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectAllN")
            .field("n", &self.n)
            .field("buffer", &self.buffer)
            .finish()
    }
}

/// Collect elements into groups of `n`.
///
/// Every group has exactly `n` elements except the last, which is emitted on
/// flush with whatever is left over (never empty). `n` is raised to 1 if
/// zero is given.
///
/// ```rust
/// use std::convert::Infallible;
/// use weir::testing::transduce;
/// use weir::{chunk, transducer::collect_all_n};
///
/// # tokio_test::block_on(async {
/// let pairs = collect_all_n::<i32, Infallible, ()>(2);
/// let out = transduce(pairs, &(), [chunk![1, 2, 3], chunk![4, 5]]).await.unwrap();
/// assert_eq!(out, vec![chunk![1, 2], chunk![3, 4], chunk![5]]);
/// # });
/// ```
pub fn collect_all_n<I, E, Env>(n: usize) -> CollectAllN<I, E, Env>
where
    I: Send,
    E: Send,
    Env: Clone + Send + Sync,
{
    let n = n.max(1);
    CollectAllN {
        n,
        buffer: Vec::with_capacity(n),
        _phantom: PhantomData,
    }
}

impl<I, E, Env> Transducer for CollectAllN<I, E, Env>
where
    I: Send,
    E: Send,
    Env: Clone + Send + Sync,
{
    type In = I;
    type Out = Chunk<I>;
    type Error = E;
    type Env = Env;
    type Push = Self;

    async fn acquire(self, _env: &Env, _scope: &Scope) -> Result<Self, E> {
        Ok(self)
    }
}

impl<I, E, Env> Push for CollectAllN<I, E, Env>
where
    I: Send,
    E: Send,
    Env: Clone + Send + Sync,
{
    type In = I;
    type Out = Chunk<I>;
    type Error = E;
    type Env = Env;

    async fn push(&mut self, _env: &Env, input: Input<I>) -> Result<Chunk<Chunk<I>>, E> {
        match input {
            Input::Data(chunk) => {
                let mut groups = Vec::new();
                for item in chunk {
                    self.buffer.push(item);
                    if self.buffer.len() == self.n {
                        let full = std::mem::replace(&mut self.buffer, Vec::with_capacity(self.n));
                        groups.push(Chunk::from(full));
                    }
                }
                Ok(Chunk::from(groups))
            }
            Input::Flush if self.buffer.is_empty() => Ok(Chunk::empty()),
            Input::Flush => Ok(Chunk::single(Chunk::from(std::mem::take(&mut self.buffer)))),
        }
    }
}

/// Collect elements into maps of at most `n` distinct keys.
///
/// Elements sharing a key are combined with `merge`, oldest first. A map is
/// emitted as soon as an element with a new key would make it exceed `n`
/// keys; that element starts the next map.
///
/// ```rust
/// use std::collections::HashMap;
/// use std::convert::Infallible;
/// use weir::testing::transduce;
/// use weir::{chunk, transducer::collect_all_to_map_n};
///
/// # tokio_test::block_on(async {
/// let by_parity = collect_all_to_map_n::<i32, i32, _, _, Infallible, ()>(
///     2,
///     |x| x % 2,
///     |a, b| a + b,
/// );
/// let out = transduce(by_parity, &(), [chunk![1, 2, 3, 4]]).await.unwrap();
/// assert_eq!(out, vec![HashMap::from([(1, 4), (0, 6)])]);
/// # });
/// ```
pub fn collect_all_to_map_n<I, K, KF, M, E, Env>(
    n: usize,
    key: KF,
    merge: M,
) -> impl Transducer<In = I, Out = HashMap<K, I>, Error = E, Env = Env>
where
    I: Send,
    K: Eq + Hash + Send,
    KF: Fn(&I) -> K + Send + Sync,
    M: Fn(I, I) -> I + Send + Sync,
    E: Send,
    Env: Clone + Send + Sync,
{
    let key = Arc::new(key);
    let cost_key = Arc::clone(&key);

    fold_weighted_with(
        HashMap::new,
        move |map: &HashMap<K, I>, item: &I| u64::from(!map.contains_key(&cost_key(item))),
        n.max(1) as u64,
        |_: &I| Chunk::empty(),
        move |mut map: HashMap<K, I>, item: I| {
            let k = key(&item);
            let merged = match map.remove(&k) {
                Some(existing) => merge(existing, item),
                None => item,
            };
            map.insert(k, merged);
            map
        },
    )
    .filter(|map: &HashMap<K, I>| !map.is_empty())
}

/// Collect elements into sets of at most `n` distinct values.
pub fn collect_all_to_set_n<I, E, Env>(
    n: usize,
) -> impl Transducer<In = I, Out = HashSet<I>, Error = E, Env = Env>
where
    I: Eq + Hash + Send,
    E: Send,
    Env: Clone + Send + Sync,
{
    fold_weighted_with(
        HashSet::new,
        |set: &HashSet<I>, item: &I| u64::from(!set.contains(item)),
        n.max(1) as u64,
        |_: &I| Chunk::empty(),
        |mut set: HashSet<I>, item: I| {
            set.insert(item);
            set
        },
    )
    .filter(|set: &HashSet<I>| !set.is_empty())
}

/// Runs of elements satisfying a predicate. Created by [`collect_all_while`].
pub struct CollectAllWhile<I, P, E, Env> {
    predicate: P,
    buffer: Vec<I>,
    _phantom: PhantomData<fn() -> (E, Env)>,
}

impl<I: std::fmt::Debug, P, E, Env> std::fmt::Debug for CollectAllWhile<I, P, E, Env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectAllWhile")
            .field("buffer", &self.buffer)
            .field("predicate", &"<function>")
            .finish()
    }
}

/// Collect runs of elements satisfying `predicate`.
///
/// An element failing the predicate closes the current run and is itself
/// discarded. The rest of the chunk keeps accumulating into the next run.
/// Empty runs are never emitted.
///
/// ```rust
/// use std::convert::Infallible;
/// use weir::testing::transduce;
/// use weir::{chunk, transducer::collect_all_while};
///
/// # tokio_test::block_on(async {
/// let words = collect_all_while::<i32, _, Infallible, ()>(|x| *x != 0);
/// let out = transduce(words, &(), [chunk![1, 2, 0, 3, 4, 0, 5]]).await.unwrap();
/// assert_eq!(out, vec![chunk![1, 2], chunk![3, 4], chunk![5]]);
/// # });
/// ```
pub fn collect_all_while<I, P, E, Env>(predicate: P) -> CollectAllWhile<I, P, E, Env>
where
    I: Send,
    P: Fn(&I) -> bool + Send + Sync,
    E: Send,
    Env: Clone + Send + Sync,
{
    CollectAllWhile {
        predicate,
        buffer: Vec::new(),
        _phantom: PhantomData,
    }
}

fn close_run<I>(buffer: &mut Vec<I>, runs: &mut Vec<Chunk<I>>) {
    if !buffer.is_empty() {
        runs.push(Chunk::from(std::mem::take(buffer)));
    }
}

fn flush_run<I>(buffer: &mut Vec<I>) -> Chunk<Chunk<I>> {
    let mut runs = Vec::new();
    close_run(buffer, &mut runs);
    Chunk::from(runs)
}

impl<I, P, E, Env> Transducer for CollectAllWhile<I, P, E, Env>
where
    I: Send,
    P: Fn(&I) -> bool + Send + Sync,
    E: Send,
    Env: Clone + Send + Sync,
{
    type In = I;
    type Out = Chunk<I>;
    type Error = E;
    type Env = Env;
    type Push = Self;

    async fn acquire(self, _env: &Env, _scope: &Scope) -> Result<Self, E> {
        Ok(self)
    }
}

impl<I, P, E, Env> Push for CollectAllWhile<I, P, E, Env>
where
    I: Send,
    P: Fn(&I) -> bool + Send + Sync,
    E: Send,
    Env: Clone + Send + Sync,
{
    type In = I;
    type Out = Chunk<I>;
    type Error = E;
    type Env = Env;

    async fn push(&mut self, _env: &Env, input: Input<I>) -> Result<Chunk<Chunk<I>>, E> {
        let chunk = match input {
            Input::Data(chunk) => chunk,
            Input::Flush => return Ok(flush_run(&mut self.buffer)),
        };

        let mut runs = Vec::new();
        for item in chunk {
            if (self.predicate)(&item) {
                self.buffer.push(item);
            } else {
                close_run(&mut self.buffer, &mut runs);
            }
        }
        Ok(Chunk::from(runs))
    }
}

/// Runs of elements satisfying an effectful predicate. Created by
/// [`collect_all_while_m`].
pub struct CollectAllWhileM<I, P, E, Env> {
    predicate: P,
    buffer: Vec<I>,
    _phantom: PhantomData<fn() -> (E, Env)>,
}

impl<I: std::fmt::Debug, P, E, Env> std::fmt::Debug for CollectAllWhileM<I, P, E, Env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectAllWhileM")
            .field("buffer", &self.buffer)
            .field("predicate", &"<function>")
            .finish()
    }
}

/// Like [`collect_all_while`], with an effectful predicate.
///
/// A failing predicate aborts the push; elements buffered so far stay
/// buffered.
pub fn collect_all_while_m<I, P, Eff>(
    predicate: P,
) -> CollectAllWhileM<I, P, Eff::Error, Eff::Env>
where
    I: Send,
    P: Fn(&I) -> Eff + Send + Sync,
    Eff: Effect<Output = bool>,
{
    CollectAllWhileM {
        predicate,
        buffer: Vec::new(),
        _phantom: PhantomData,
    }
}

impl<I, P, Eff, E, Env> Transducer for CollectAllWhileM<I, P, E, Env>
where
    I: Send,
    P: Fn(&I) -> Eff + Send + Sync,
    Eff: Effect<Output = bool, Error = E, Env = Env>,
    E: Send,
    Env: Clone + Send + Sync,
{
    type In = I;
    type Out = Chunk<I>;
    type Error = E;
    type Env = Env;
    type Push = Self;

    async fn acquire(self, _env: &Env, _scope: &Scope) -> Result<Self, E> {
        Ok(self)
    }
}

impl<I, P, Eff, E, Env> Push for CollectAllWhileM<I, P, E, Env>
where
    I: Send,
    P: Fn(&I) -> Eff + Send + Sync,
    Eff: Effect<Output = bool, Error = E, Env = Env>,
    E: Send,
    Env: Clone + Send + Sync,
{
    type In = I;
    type Out = Chunk<I>;
    type Error = E;
    type Env = Env;

    async fn push(&mut self, env: &Env, input: Input<I>) -> Result<Chunk<Chunk<I>>, E> {
        let chunk = match input {
            Input::Data(chunk) => chunk,
            Input::Flush => return Ok(flush_run(&mut self.buffer)),
        };

        let mut runs = Vec::new();
        for item in chunk {
            let keep = (self.predicate)(&item);
            if keep.run(env).await? {
                self.buffer.push(item);
            } else {
                close_run(&mut self.buffer, &mut runs);
            }
        }
        Ok(Chunk::from(runs))
    }
}
