use alloc::rc::Rc;
use alloc::vec::{self, Vec};
use core::cell::RefCell;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::mem;
use core::ops::{Bound, Range, RangeBounds};

use crate::cursor::{Direction, Forward, Reverse, SequenceCursor, SharedVec};
use crate::tokenization::Tokenizer;
use crate::{ContainerError, CursorError, Rank};

/// A growable array whose cursors detect structural mutation.
///
/// Which calls invalidate cursors:
///
/// | operation                          | invalidates                                   |
/// |------------------------------------|-----------------------------------------------|
/// | [`set`], [`SequenceCursor::set_value`] | never                                     |
/// | [`push`]                           | only if the storage was reallocated           |
/// | [`reserve`]                        | only if the storage was reallocated           |
/// | [`pop`], [`insert`], [`remove`]    | always (when they succeed)                    |
/// | [`splice`]                         | unless both the range and the input are empty |
/// | [`drain_range`]                    | unless the range is empty                     |
/// | [`resize`]                         | only if the length changes                    |
/// | [`reverse`]                        | only with two or more elements                |
/// | [`clear`]                          | unless already empty                          |
///
/// [`set`]: Sequence::set
/// [`push`]: Sequence::push
/// [`reserve`]: Sequence::reserve
/// [`pop`]: Sequence::pop
/// [`insert`]: Sequence::insert
/// [`remove`]: Sequence::remove
/// [`splice`]: Sequence::splice
/// [`drain_range`]: Sequence::drain_range
/// [`resize`]: Sequence::resize
/// [`reverse`]: Sequence::reverse
/// [`clear`]: Sequence::clear
///
/// # Examples
///
/// ```
/// use rbcursor::{CursorError, Sequence};
///
/// let mut sequence = Sequence::with_capacity(4);
/// sequence.push(1);
/// let cursor = sequence.begin();
///
/// sequence.push(2);
/// assert_eq!(cursor.value(), Ok(1));
///
/// sequence.insert(0, 0).unwrap();
/// assert_eq!(cursor.value(), Err(CursorError::Invalidated));
/// ```
pub struct Sequence<T> {
    elements: SharedVec<T>,
    tokenizer: Tokenizer,
}

/// An iterator over the elements of a `Sequence`.
///
/// This `struct` is created by the [`iter`] method on [`Sequence`].
///
/// [`iter`]: Sequence::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T> {
    elements: &'a RefCell<Vec<T>>,
    front: usize,
    back: usize,
}

/// Resolves `range` against `len`.
fn checked_range(range: impl RangeBounds<usize>, len: usize) -> Result<Range<usize>, ContainerError> {
    let start = match range.start_bound() {
        Bound::Included(&start) => start,
        Bound::Excluded(&start) => start.saturating_add(1),
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&end) => end.saturating_add(1),
        Bound::Excluded(&end) => end,
        Bound::Unbounded => len,
    };
    if end > len {
        return Err(ContainerError::IndexOutOfRange {
            index: end,
            len,
        });
    }
    if start > end {
        return Err(ContainerError::IndexOutOfRange {
            index: start,
            len,
        });
    }
    Ok(start..end)
}

impl<T> Sequence<T> {
    /// Makes a new, empty `Sequence`. Does not allocate.
    #[must_use]
    pub fn new() -> Self {
        Sequence::from(Vec::new())
    }

    /// Creates an empty sequence with room for at least `capacity` elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::Sequence;
    ///
    /// let sequence: Sequence<u8> = Sequence::with_capacity(8);
    /// assert!(sequence.is_empty());
    /// assert!(sequence.capacity() >= 8);
    /// ```
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Sequence::from(Vec::with_capacity(capacity))
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.borrow().len()
    }

    /// Returns `true` if the sequence holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.borrow().is_empty()
    }

    /// Returns the number of elements the sequence can hold without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.elements.borrow().capacity()
    }

    fn check_index(&self, index: usize) -> Result<(), ContainerError> {
        let len = self.len();
        if index < len {
            Ok(())
        } else {
            Err(ContainerError::IndexOutOfRange {
                index,
                len,
            })
        }
    }

    /// Overwrites the element at `index` and returns the previous one. Never invalidates cursors.
    ///
    /// # Errors
    ///
    /// [`ContainerError::IndexOutOfRange`] if `index >= len`.
    pub fn set(&mut self, index: usize, value: T) -> Result<T, ContainerError> {
        self.check_index(index)?;
        Ok(mem::replace(&mut self.elements.borrow_mut()[index], value))
    }

    /// Appends an element. Cursors stay valid unless the storage had to grow.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::Sequence;
    ///
    /// let mut sequence = Sequence::new();
    /// sequence.push(1);
    /// sequence.push(2);
    /// assert_eq!(sequence.iter().collect::<Vec<_>>(), [1, 2]);
    /// ```
    ///
    /// # Complexity
    ///
    /// Amortized O(1)
    pub fn push(&mut self, value: T) {
        let reallocated = {
            let mut elements = self.elements.borrow_mut();
            let capacity = elements.capacity();
            elements.push(value);
            elements.capacity() != capacity
        };
        if reallocated {
            self.tokenizer.reset();
        }
    }

    /// Same as [`push`](Self::push).
    pub fn push_back(&mut self, value: T) {
        self.push(value);
    }

    /// Removes the last element and returns it.
    ///
    /// # Errors
    ///
    /// [`ContainerError::Empty`] for an empty sequence.
    pub fn pop(&mut self) -> Result<T, ContainerError> {
        let value = self.elements.borrow_mut().pop().ok_or(ContainerError::Empty)?;
        self.tokenizer.reset();
        Ok(value)
    }

    /// Same as [`pop`](Self::pop).
    ///
    /// # Errors
    ///
    /// [`ContainerError::Empty`] for an empty sequence.
    pub fn pop_back(&mut self) -> Result<T, ContainerError> {
        self.pop()
    }

    /// Inserts an element at `index`, shifting all elements after it.
    ///
    /// # Errors
    ///
    /// [`ContainerError::IndexOutOfRange`] if `index > len`.
    pub fn insert(&mut self, index: usize, value: T) -> Result<(), ContainerError> {
        let len = self.len();
        if index > len {
            return Err(ContainerError::IndexOutOfRange {
                index,
                len,
            });
        }
        self.elements.borrow_mut().insert(index, value);
        self.tokenizer.reset();
        Ok(())
    }

    /// Removes and returns the element at `index`, shifting all elements after it.
    ///
    /// # Errors
    ///
    /// [`ContainerError::IndexOutOfRange`] if `index >= len`.
    pub fn remove(&mut self, index: usize) -> Result<T, ContainerError> {
        self.check_index(index)?;
        let value = self.elements.borrow_mut().remove(index);
        self.tokenizer.reset();
        Ok(value)
    }

    /// Removes the element under `cursor` and returns it.
    ///
    /// # Errors
    ///
    /// [`CursorError::Invalidated`] for a stale cursor, [`CursorError::ForeignContainer`] for a
    /// cursor of another sequence, [`CursorError::DereferenceEnd`] for an end cursor.
    pub fn erase<D: Direction>(&mut self, cursor: &SequenceCursor<T, D>) -> Result<T, CursorError> {
        let index = cursor.index_in(&self.elements)?.ok_or(CursorError::DereferenceEnd)?;
        let value = self.elements.borrow_mut().remove(index);
        self.tokenizer.reset();
        Ok(value)
    }

    /// Replaces the elements in `range` with `replace_with` and returns the removed elements.
    ///
    /// Replacing an empty range with nothing changes nothing and keeps cursors valid.
    ///
    /// # Errors
    ///
    /// [`ContainerError::IndexOutOfRange`] if the range does not fit in `0..len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::Sequence;
    ///
    /// let mut sequence = Sequence::from([1, 2, 3, 4]);
    /// let removed = sequence.splice(1..3, [7, 8, 9]).unwrap();
    /// assert_eq!(removed, [2, 3]);
    /// assert_eq!(sequence, Sequence::from([1, 7, 8, 9, 4]));
    /// ```
    pub fn splice<I>(&mut self, range: impl RangeBounds<usize>, replace_with: I) -> Result<Vec<T>, ContainerError>
    where
        I: IntoIterator<Item = T>,
    {
        let range = checked_range(range, self.len())?;
        let replacement: Vec<T> = replace_with.into_iter().collect();
        if range.is_empty() && replacement.is_empty() {
            return Ok(Vec::new());
        }
        let removed = self.elements.borrow_mut().splice(range, replacement).collect();
        self.tokenizer.reset();
        Ok(removed)
    }

    /// Removes the elements in `range` and returns them. An empty range keeps cursors valid.
    ///
    /// # Errors
    ///
    /// [`ContainerError::IndexOutOfRange`] if the range does not fit in `0..len`.
    pub fn drain_range(&mut self, range: impl RangeBounds<usize>) -> Result<Vec<T>, ContainerError> {
        let range = checked_range(range, self.len())?;
        if range.is_empty() {
            return Ok(Vec::new());
        }
        let removed = self.elements.borrow_mut().drain(range).collect();
        self.tokenizer.reset();
        Ok(removed)
    }

    /// Reserves capacity for at least `additional` more elements. Cursors are invalidated only if
    /// the storage was reallocated.
    pub fn reserve(&mut self, additional: usize) {
        let reallocated = {
            let mut elements = self.elements.borrow_mut();
            let capacity = elements.capacity();
            elements.reserve(additional);
            elements.capacity() != capacity
        };
        if reallocated {
            self.tokenizer.reset();
        }
    }

    /// Reverses the order of elements in place.
    pub fn reverse(&mut self) {
        if self.len() < 2 {
            return;
        }
        self.elements.borrow_mut().reverse();
        self.tokenizer.reset();
    }

    /// Removes all elements. Clearing an empty sequence leaves cursors valid.
    pub fn clear(&mut self) {
        if self.is_empty() {
            return;
        }
        self.elements.borrow_mut().clear();
        self.tokenizer.reset();
    }

    /// Gets an iterator over the elements, front to back.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            elements: &self.elements,
            front: 0,
            back: self.len(),
        }
    }

    /// Returns a cursor at the first element, or at end for an empty sequence.
    #[must_use]
    pub fn begin(&self) -> SequenceCursor<T> {
        SequenceCursor::at_rank(&self.elements, self.tokenizer.create(), 0)
    }

    /// Returns a cursor one past the last element.
    #[must_use]
    pub fn end(&self) -> SequenceCursor<T> {
        SequenceCursor::at_rank(&self.elements, self.tokenizer.create(), self.len())
    }

    /// Returns a reverse cursor at the last element, or at end for an empty sequence.
    #[must_use]
    pub fn rbegin(&self) -> SequenceCursor<T, Reverse> {
        SequenceCursor::at_rank(&self.elements, self.tokenizer.create(), 0)
    }

    /// Returns a reverse cursor one before the first element.
    #[must_use]
    pub fn rend(&self) -> SequenceCursor<T, Reverse> {
        SequenceCursor::at_rank(&self.elements, self.tokenizer.create(), self.len())
    }

    /// Returns a cursor at index `rank`. `Rank(len)` is the end cursor; anything beyond it gives
    /// `None`.
    #[must_use]
    pub fn cursor_at(&self, rank: Rank) -> Option<SequenceCursor<T, Forward>> {
        (rank.0 <= self.len()).then(|| SequenceCursor::at_rank(&self.elements, self.tokenizer.create(), rank.0))
    }
}

impl<T: Clone> Sequence<T> {
    /// Returns a clone of the element at `index`.
    ///
    /// # Errors
    ///
    /// [`ContainerError::IndexOutOfRange`] if `index >= len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::{ContainerError, Sequence};
    ///
    /// let sequence = Sequence::from(['a', 'b']);
    /// assert_eq!(sequence.get(1), Ok('b'));
    /// assert_eq!(sequence.get(2), Err(ContainerError::IndexOutOfRange { index: 2, len: 2 }));
    /// ```
    pub fn get(&self, index: usize) -> Result<T, ContainerError> {
        self.check_index(index)?;
        Ok(self.elements.borrow()[index].clone())
    }

    /// Returns the elements in `range` as a new sequence.
    ///
    /// # Errors
    ///
    /// [`ContainerError::IndexOutOfRange`] if the range does not fit in `0..len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::Sequence;
    ///
    /// let sequence = Sequence::from([1, 2, 3, 4]);
    /// assert_eq!(sequence.slice(1..=2), Ok(Sequence::from([2, 3])));
    /// assert!(sequence.slice(3..6).is_err());
    /// ```
    pub fn slice(&self, range: impl RangeBounds<usize>) -> Result<Sequence<T>, ContainerError> {
        let range = checked_range(range, self.len())?;
        Ok(Sequence::from(self.elements.borrow()[range].to_vec()))
    }

    /// Resizes the sequence to `new_len`, filling new slots with clones of `value`. Cursors are
    /// invalidated only if the length changes.
    pub fn resize(&mut self, new_len: usize, value: T) {
        if new_len == self.len() {
            return;
        }
        self.elements.borrow_mut().resize(new_len, value);
        self.tokenizer.reset();
    }
}

impl<T: PartialEq> Sequence<T> {
    /// Removes the first element equal to `value`.
    ///
    /// # Errors
    ///
    /// [`ContainerError::NotFound`] if no element is equal to `value`; cursors stay valid.
    pub fn remove_value(&mut self, value: &T) -> Result<T, ContainerError> {
        let index = self.position(value).ok_or(ContainerError::NotFound)?;
        self.remove(index)
    }

    /// Returns the index of the first element equal to `value`.
    #[must_use]
    pub fn position(&self, value: &T) -> Option<usize> {
        self.elements.borrow().iter().position(|element| element == value)
    }

    /// Returns `true` if some element is equal to `value`.
    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        self.elements.borrow().contains(value)
    }

    /// Returns the number of elements equal to `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::Sequence;
    ///
    /// let sequence = Sequence::from([1, 2, 1, 1]);
    /// assert_eq!(sequence.count(&1), 3);
    /// assert_eq!(sequence.count(&5), 0);
    /// ```
    #[must_use]
    pub fn count(&self, value: &T) -> usize {
        self.elements.borrow().iter().filter(|&element| element == value).count()
    }
}

impl<T> From<Vec<T>> for Sequence<T> {
    fn from(elements: Vec<T>) -> Self {
        Sequence {
            elements: Rc::new(RefCell::new(elements)),
            tokenizer: Tokenizer::new(),
        }
    }
}

impl<T, const N: usize> From<[T; N]> for Sequence<T> {
    fn from(arr: [T; N]) -> Self {
        Sequence::from(Vec::from(arr))
    }
}

impl<T> FromIterator<T> for Sequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Sequence::from(iter.into_iter().collect::<Vec<_>>())
    }
}

/// Appends every element; cursors are invalidated once if the storage was reallocated.
impl<T> Extend<T> for Sequence<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let incoming: Vec<T> = iter.into_iter().collect();
        let reallocated = {
            let mut elements = self.elements.borrow_mut();
            let capacity = elements.capacity();
            elements.extend(incoming);
            elements.capacity() != capacity
        };
        if reallocated {
            self.tokenizer.reset();
        }
    }
}

impl<T> Default for Sequence<T> {
    fn default() -> Self {
        Sequence::new()
    }
}

/// The clone gets its own tokenizer: cursors of the original never apply to it.
impl<T: Clone> Clone for Sequence<T> {
    fn clone(&self) -> Self {
        Sequence::from(self.elements.borrow().clone())
    }
}

impl<T: PartialEq> PartialEq for Sequence<T> {
    fn eq(&self, other: &Sequence<T>) -> bool {
        *self.elements.borrow() == *other.elements.borrow()
    }
}

impl<T: Eq> Eq for Sequence<T> {}

/// Lexicographic comparison; a proper prefix is smaller.
impl<T: PartialOrd> PartialOrd for Sequence<T> {
    fn partial_cmp(&self, other: &Sequence<T>) -> Option<Ordering> {
        self.elements.borrow().partial_cmp(&*other.elements.borrow())
    }
}

impl<T: Ord> Ord for Sequence<T> {
    fn cmp(&self, other: &Sequence<T>) -> Ordering {
        self.elements.borrow().cmp(&*other.elements.borrow())
    }
}

impl<T: Hash> Hash for Sequence<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.elements.borrow().hash(state);
    }
}

/// Formats as `Sequence([1, 2, 3])`.
impl<T: fmt::Debug> fmt::Debug for Sequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Sequence").field(&*self.elements.borrow()).finish()
    }
}

impl<T> IntoIterator for Sequence<T> {
    type Item = T;
    type IntoIter = vec::IntoIter<T>;

    fn into_iter(self) -> vec::IntoIter<T> {
        mem::take(&mut *self.elements.borrow_mut()).into_iter()
    }
}

impl<'a, T: Clone> IntoIterator for &'a Sequence<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T: Clone> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        let value = self.elements.borrow()[self.front].clone();
        self.front += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T: Clone> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(self.elements.borrow()[self.back].clone())
    }
}

impl<T: Clone> ExactSizeIterator for Iter<'_, T> {}

impl<T: Clone> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            elements: self.elements,
            front: self.front,
            back: self.back,
        }
    }
}

impl<T> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").field("front", &self.front).field("back", &self.back).finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::format;
    use static_assertions::assert_not_impl_any;

    assert_not_impl_any!(Sequence<i32>: Send, Sync);

    #[test]
    fn range_resolution() {
        assert_eq!(checked_range(.., 3), Ok(0..3));
        assert_eq!(checked_range(1..=1, 3), Ok(1..2));
        assert_eq!(checked_range(3.., 3), Ok(3..3));
        assert_eq!(
            checked_range(2..5, 3),
            Err(ContainerError::IndexOutOfRange {
                index: 5,
                len: 3
            })
        );
        #[allow(clippy::reversed_empty_ranges)]
        let reversed = checked_range(2..1, 3);
        assert_eq!(
            reversed,
            Err(ContainerError::IndexOutOfRange {
                index: 2,
                len: 3
            })
        );
    }

    #[test]
    fn push_within_capacity_keeps_cursors() {
        let mut sequence = Sequence::with_capacity(8);
        sequence.extend([1, 2, 3]);
        let capacity = sequence.capacity();
        let first = sequence.begin();
        let last = sequence.rbegin();

        while sequence.len() < capacity {
            sequence.push(0);
        }
        assert_eq!(first.value(), Ok(1));
        assert_eq!(last.value(), Ok(3));

        sequence.push(0);
        assert_eq!(first.value(), Err(CursorError::Invalidated));
    }

    #[test]
    fn no_op_mutations_keep_cursors() {
        let mut sequence = Sequence::from([1, 2, 3]);
        let cursor = sequence.begin() + 1;

        sequence.set(1, 20).unwrap();
        assert_eq!(sequence.splice(1..1, []).unwrap(), Vec::<i32>::new());
        assert_eq!(sequence.drain_range(2..2).unwrap(), Vec::<i32>::new());
        sequence.resize(3, 0);
        assert_eq!(sequence.remove_value(&9), Err(ContainerError::NotFound));
        assert!(sequence.remove(3).is_err());
        assert_eq!(cursor.value(), Ok(20));

        sequence.resize(4, 0);
        assert_eq!(cursor.value(), Err(CursorError::Invalidated));
    }

    #[test]
    fn reverse_of_single_element_keeps_cursors() {
        let mut sequence = Sequence::from([1]);
        let cursor = sequence.begin();
        sequence.reverse();
        assert_eq!(cursor.value(), Ok(1));

        sequence.push(2);
        let cursor = sequence.begin();
        sequence.reverse();
        assert!(cursor.value().is_err());
        assert_eq!(sequence, Sequence::from([2, 1]));
    }

    #[test]
    fn erase_through_cursor() {
        let mut sequence = Sequence::from(['a', 'b', 'c']);
        let other = Sequence::from(['a']);
        assert_eq!(sequence.erase(&other.begin()), Err(CursorError::ForeignContainer));
        assert_eq!(sequence.erase(&sequence.end()), Err(CursorError::DereferenceEnd));
        assert_eq!(sequence.erase(&(sequence.rbegin() + 1)), Ok('b'));
        assert_eq!(sequence, Sequence::from(['a', 'c']));
    }

    #[test]
    fn debug_form() {
        assert_eq!(format!("{:?}", Sequence::from([1, 2])), "Sequence([1, 2])");
    }
}
