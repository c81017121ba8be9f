//! A two-case tag for timed aggregation output.
//!
//! [`aggregate_async_within_either`] tags every element it emits: `Right(o)`
//! carries transducer output, `Left(n)` reports that the window schedule ran
//! out after `n` timer-forced flushes. Neither side is an error, which is why
//! this is not a `Result`.
//!
//! By convention `Either` is right-biased: [`map`](Either::map) and
//! [`rights`] work on the `Right` side, which holds the data.
//!
//! ```rust
//! use weir::either::{partition, Either};
//!
//! let tagged = vec![Either::right("a"), Either::left(2u32), Either::right("b")];
//! let (markers, data) = partition(tagged);
//! assert_eq!(markers, vec![2]);
//! assert_eq!(data, vec!["a", "b"]);
//! ```
//!
//! [`aggregate_async_within_either`]: crate::stream::ChunkStreamExt::aggregate_async_within_either

/// A value that is either `Left(L)` or `Right(R)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Either<L, R> {
    /// The left variant
    Left(L),
    /// The right variant
    Right(R),
}

impl<L, R> Either<L, R> {
    /// Create a Left value.
    #[inline]
    pub fn left(value: L) -> Self {
        Either::Left(value)
    }

    /// Create a Right value.
    #[inline]
    pub fn right(value: R) -> Self {
        Either::Right(value)
    }

    /// Returns `true` if this is a `Left` value.
    #[inline]
    pub fn is_left(&self) -> bool {
        matches!(self, Either::Left(_))
    }

    /// Returns `true` if this is a `Right` value.
    #[inline]
    pub fn is_right(&self) -> bool {
        matches!(self, Either::Right(_))
    }

    /// The Left value, if any.
    pub fn into_left(self) -> Option<L> {
        match self {
            Either::Left(l) => Some(l),
            Either::Right(_) => None,
        }
    }

    /// The Right value, if any.
    pub fn into_right(self) -> Option<R> {
        match self {
            Either::Left(_) => None,
            Either::Right(r) => Some(r),
        }
    }

    /// Borrow the contents.
    pub fn as_ref(&self) -> Either<&L, &R> {
        match self {
            Either::Left(l) => Either::Left(l),
            Either::Right(r) => Either::Right(r),
        }
    }

    /// Transform the Right value.
    ///
    /// ```rust
    /// use weir::Either;
    ///
    /// let e: Either<u32, i32> = Either::right(20);
    /// assert_eq!(e.map(|x| x + 1), Either::right(21));
    /// ```
    pub fn map<R2, F>(self, f: F) -> Either<L, R2>
    where
        F: FnOnce(R) -> R2,
    {
        match self {
            Either::Left(l) => Either::Left(l),
            Either::Right(r) => Either::Right(f(r)),
        }
    }

    /// Transform the Left value.
    pub fn map_left<L2, F>(self, f: F) -> Either<L2, R>
    where
        F: FnOnce(L) -> L2,
    {
        match self {
            Either::Left(l) => Either::Left(f(l)),
            Either::Right(r) => Either::Right(r),
        }
    }

    /// Collapse both sides into one value.
    ///
    /// ```rust
    /// use weir::Either;
    ///
    /// let marker: Either<u32, &str> = Either::left(3);
    /// let text = marker.fold(|n| format!("{} forced flushes", n), |s| s.to_string());
    /// assert_eq!(text, "3 forced flushes");
    /// ```
    pub fn fold<T, F, G>(self, left_fn: F, right_fn: G) -> T
    where
        F: FnOnce(L) -> T,
        G: FnOnce(R) -> T,
    {
        match self {
            Either::Left(l) => left_fn(l),
            Either::Right(r) => right_fn(r),
        }
    }

    /// Exchange the sides.
    pub fn swap(self) -> Either<R, L> {
        match self {
            Either::Left(l) => Either::Right(l),
            Either::Right(r) => Either::Left(r),
        }
    }
}

impl<L, R> From<Result<R, L>> for Either<L, R> {
    fn from(result: Result<R, L>) -> Self {
        match result {
            Ok(r) => Either::Right(r),
            Err(l) => Either::Left(l),
        }
    }
}

/// Split an iterator of `Either`s into its Left and Right values, keeping
/// the order within each side.
pub fn partition<L, R, I>(iter: I) -> (Vec<L>, Vec<R>)
where
    I: IntoIterator<Item = Either<L, R>>,
{
    let mut lefts = Vec::new();
    let mut rights = Vec::new();

    for item in iter {
        match item {
            Either::Left(l) => lefts.push(l),
            Either::Right(r) => rights.push(r),
        }
    }

    (lefts, rights)
}

/// Only the Right values of an iterator.
///
/// ```rust
/// use weir::either::{rights, Either};
///
/// let data: Vec<_> = rights(vec![Either::left(1u32), Either::right("a")]).collect();
/// assert_eq!(data, vec!["a"]);
/// ```
pub fn rights<L, R, I>(iter: I) -> impl Iterator<Item = R>
where
    I: IntoIterator<Item = Either<L, R>>,
{
    iter.into_iter().filter_map(Either::into_right)
}
