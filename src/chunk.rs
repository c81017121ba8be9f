//! Ordered, finite batches of elements.
//!
//! A [`Chunk`] is the unit every transducer consumes and produces. Chunks are
//! passed by value from stage to stage, so a chunk handed downstream can never
//! be mutated by the stage that produced it.
//!
//! # Examples
//!
//! ```
//! use weir::{chunk, Chunk};
//!
//! let c = chunk![1, 2, 3, 4, 5];
//! let (front, back) = c.split_at(2);
//! assert_eq!(front, chunk![1, 2]);
//! assert_eq!(back, chunk![3, 4, 5]);
//!
//! let joined = front.concat(back);
//! assert_eq!(joined.len(), 5);
//! assert_eq!(Chunk::<i32>::empty().len(), 0);
//! ```

use std::ops::Deref;

/// An ordered, finite batch of elements processed atomically.
///
/// `Chunk` derefs to a slice, so indexing, `first`, `last`, `iter` and the
/// rest of the slice API are available directly.
///
/// # Example
///
/// ```
/// use weir::Chunk;
///
/// let c = Chunk::from(vec!["a", "b"]);
/// assert_eq!(c[0], "a");
/// assert_eq!(c.last(), Some(&"b"));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Chunk<T> {
    items: Vec<T>,
}

impl<T> Chunk<T> {
    /// The empty chunk.
    #[inline]
    pub fn empty() -> Self {
        Chunk { items: Vec::new() }
    }

    /// A chunk holding exactly one element.
    #[inline]
    pub fn single(value: T) -> Self {
        Chunk { items: vec![value] }
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the chunk has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// View the elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Unwrap into the backing `Vec`.
    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    /// Split into the first `at` elements and the rest.
    ///
    /// `at` is clamped to the chunk length, so splitting past the end yields
    /// the whole chunk and an empty remainder.
    ///
    /// ```
    /// use weir::chunk;
    ///
    /// let (a, b) = chunk![1, 2, 3].split_at(10);
    /// assert_eq!(a, chunk![1, 2, 3]);
    /// assert!(b.is_empty());
    /// ```
    pub fn split_at(self, at: usize) -> (Chunk<T>, Chunk<T>) {
        let mut head = self.items;
        let at = at.min(head.len());
        let tail = head.split_off(at);
        (Chunk { items: head }, Chunk { items: tail })
    }

    /// Append `other` after this chunk's elements.
    pub fn concat(self, other: Chunk<T>) -> Chunk<T> {
        if self.items.is_empty() {
            return other;
        }
        let mut items = self.items;
        items.extend(other.items);
        Chunk { items }
    }

    /// Transform every element, preserving order.
    pub fn map<U, F>(self, f: F) -> Chunk<U>
    where
        F: FnMut(T) -> U,
    {
        Chunk {
            items: self.items.into_iter().map(f).collect(),
        }
    }

    /// Keep the elements satisfying `predicate`, preserving order.
    pub fn filter<F>(self, mut predicate: F) -> Chunk<T>
    where
        F: FnMut(&T) -> bool,
    {
        let mut items = self.items;
        items.retain(|item| predicate(item));
        Chunk { items }
    }
}

impl<T> Default for Chunk<T> {
    fn default() -> Self {
        Chunk::empty()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Chunk<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(&self.items).finish()
    }
}

impl<T> Deref for Chunk<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T> From<Vec<T>> for Chunk<T> {
    fn from(items: Vec<T>) -> Self {
        Chunk { items }
    }
}

impl<T, const N: usize> From<[T; N]> for Chunk<T> {
    fn from(items: [T; N]) -> Self {
        Chunk {
            items: Vec::from(items),
        }
    }
}

impl<T> From<Chunk<T>> for Vec<T> {
    fn from(chunk: Chunk<T>) -> Self {
        chunk.items
    }
}

impl<T> FromIterator<T> for Chunk<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Chunk {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T> IntoIterator for Chunk<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Chunk<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Build a [`Chunk`] from a list of elements, like `vec!`.
///
/// ```
/// use weir::{chunk, Chunk};
///
/// let c: Chunk<u8> = chunk![];
/// assert!(c.is_empty());
/// assert_eq!(chunk![7; 3], Chunk::from(vec![7, 7, 7]));
/// ```
#[macro_export]
macro_rules! chunk {
    () => {
        $crate::Chunk::empty()
    };
    ($elem:expr; $n:expr) => {
        $crate::Chunk::from(vec![$elem; $n])
    };
    ($($x:expr),+ $(,)?) => {
        $crate::Chunk::from(vec![$($x),+])
    };
}

#[cfg(feature = "proptest")]
use proptest::prelude::*;

#[cfg(feature = "proptest")]
impl<T> Arbitrary for Chunk<T>
where
    T: Arbitrary + 'static,
{
    type Parameters = T::Parameters;
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(args: Self::Parameters) -> Self::Strategy {
        prop::collection::vec(any_with::<T>(args), 0..16)
            .prop_map(Chunk::from)
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_at_inside_bounds() {
        let (a, b) = chunk![1, 2, 3, 4].split_at(1);
        assert_eq!(a, chunk![1]);
        assert_eq!(b, chunk![2, 3, 4]);
    }

    #[test]
    fn split_at_zero_gives_empty_front() {
        let (a, b) = chunk![1, 2].split_at(0);
        assert!(a.is_empty());
        assert_eq!(b, chunk![1, 2]);
    }

    #[test]
    fn concat_preserves_order() {
        let c = chunk![1, 2].concat(chunk![3]).concat(Chunk::empty());
        assert_eq!(c.into_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn concat_onto_empty_reuses_other() {
        let c = Chunk::<i32>::empty().concat(chunk![9]);
        assert_eq!(c, Chunk::single(9));
    }

    #[test]
    fn map_and_filter() {
        let c = chunk![1, 2, 3, 4].map(|x| x * 10).filter(|x| *x > 15);
        assert_eq!(c, chunk![20, 30, 40]);
    }

    #[test]
    fn debug_renders_as_list() {
        assert_eq!(format!("{:?}", chunk![1, 2]), "[1, 2]");
    }

    #[test]
    fn collects_from_iterator() {
        let c: Chunk<usize> = (0..3).collect();
        assert_eq!(c, chunk![0, 1, 2]);
        let borrowed: Vec<&usize> = (&c).into_iter().collect();
        assert_eq!(borrowed, vec![&0, &1, &2]);
    }

    #[test]
    fn default_is_empty() {
        let c: Chunk<String> = Chunk::default();
        assert!(c.is_empty());
    }
}
