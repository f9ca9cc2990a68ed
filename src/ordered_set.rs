use alloc::rc::Rc;
use alloc::vec::{self, Vec};
use core::cell::RefCell;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Sub, SubAssign};

use crate::cursor::{Direction, Forward, Reverse, SharedTree, TreeCursor};
use crate::raw::{Insertion, RawRbTree, SetOperation, Walk};
use crate::tokenization::Tokenizer;
use crate::{ContainerError, CursorError, Rank};

mod capacity;
mod order_statistic;

/// A cursor into an [`OrderedSet`].
pub type SetCursor<T, D = Forward> = TreeCursor<T, (), D>;

/// An ordered set based on a red-black tree with subtree sizes.
///
/// Besides the usual set operations the set vends [cursors](SetCursor): positions that can be
/// stepped, offset by any distance in O(log n) and compared. Any call that changes membership
/// invalidates every cursor obtained before it; calls that change nothing (inserting a present
/// element, discarding an absent one) leave cursors valid.
///
/// Elements are returned by value (cloned), since the tree is shared with the cursors.
///
/// It is a logic error for an element to be modified in such a way that its ordering relative to
/// any other element, as determined by the [`Ord`] trait, changes while it is in the set.
///
/// # Examples
///
/// ```
/// use rbcursor::OrderedSet;
///
/// let mut set = OrderedSet::from([3, 1, 4, 1, 5, 9, 2, 6]);
/// assert_eq!(set.len(), 7);
/// assert_eq!(set.iter().collect::<Vec<_>>(), [1, 2, 3, 4, 5, 6, 9]);
/// assert_eq!(set.iter().rev().collect::<Vec<_>>(), [9, 6, 5, 4, 3, 2, 1]);
///
/// let cursor = set.begin() + 3;
/// assert_eq!(cursor.element(), Ok(4));
///
/// assert!(set.discard(&4));
/// assert!(cursor.element().is_err());
/// assert_eq!((set.begin() + 3).element(), Ok(5));
/// ```
pub struct OrderedSet<T> {
    tree: SharedTree<T, ()>,
    tokenizer: Tokenizer,
}

/// An iterator over the elements of an `OrderedSet`, in ascending order.
///
/// This `struct` is created by the [`iter`] method on [`OrderedSet`].
///
/// [`iter`]: OrderedSet::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T> {
    tree: &'a RefCell<RawRbTree<T, ()>>,
    walk: Walk,
}

/// An owning iterator over the elements of an `OrderedSet` in ascending order.
///
/// This `struct` is created by the [`into_iter`] method on [`OrderedSet`]
/// (provided by the [`IntoIterator`] trait).
///
/// [`into_iter`]: OrderedSet#method.into_iter
#[derive(Debug)]
pub struct IntoIter<T> {
    inner: vec::IntoIter<(T, ())>,
}

impl<T> OrderedSet<T> {
    /// Makes a new, empty `OrderedSet`.
    ///
    /// Does not allocate tree nodes on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::OrderedSet;
    ///
    /// let set: OrderedSet<i32> = OrderedSet::new();
    /// assert!(set.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        OrderedSet::from_tree(RawRbTree::new())
    }

    fn from_tree(tree: RawRbTree<T, ()>) -> Self {
        OrderedSet {
            tree: Rc::new(RefCell::new(tree)),
            tokenizer: Tokenizer::new(),
        }
    }

    /// Returns the number of elements in the set.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.borrow().len()
    }

    /// Returns `true` if the set contains no elements.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.borrow().is_empty()
    }

    /// Clears the set, removing all elements. Clearing an empty set leaves cursors valid.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::OrderedSet;
    ///
    /// let mut set = OrderedSet::from([1, 2]);
    /// let cursor = set.begin();
    /// set.clear();
    /// assert!(set.is_empty());
    /// assert!(cursor.is_end().is_err());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn clear(&mut self) {
        if self.is_empty() {
            return;
        }
        self.tree.borrow_mut().clear();
        self.tokenizer.reset();
    }

    /// Gets an iterator that visits the elements in the set in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::OrderedSet;
    ///
    /// let set = OrderedSet::from([3, 1, 2]);
    /// let mut iter = set.iter();
    /// assert_eq!(iter.next(), Some(1));
    /// assert_eq!(iter.next_back(), Some(3));
    /// assert_eq!(iter.next(), Some(2));
    /// assert_eq!(iter.next(), None);
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            walk: self.tree.borrow().walk(),
            tree: &self.tree,
        }
    }

    /// Returns a cursor at the smallest element, or at end for an empty set.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn begin(&self) -> SetCursor<T> {
        TreeCursor::at_rank(&self.tree, self.tokenizer.create(), 0)
    }

    /// Returns a cursor one past the largest element.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::OrderedSet;
    ///
    /// let set = OrderedSet::from([1, 2, 3]);
    /// let mut cursor = set.end();
    /// assert_eq!(cursor.is_end(), Ok(true));
    /// cursor.retreat().unwrap();
    /// assert_eq!(cursor.element(), Ok(3));
    /// ```
    #[must_use]
    pub fn end(&self) -> SetCursor<T> {
        TreeCursor::at_rank(&self.tree, self.tokenizer.create(), self.len())
    }

    /// Returns a reverse cursor at the largest element, or at end for an empty set.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::OrderedSet;
    ///
    /// let set = OrderedSet::from([1, 2, 3]);
    /// let cursor = set.rbegin() + 1;
    /// assert_eq!(cursor.element(), Ok(2));
    /// ```
    #[must_use]
    pub fn rbegin(&self) -> SetCursor<T, Reverse> {
        TreeCursor::at_rank(&self.tree, self.tokenizer.create(), 0)
    }

    /// Returns a reverse cursor one before the smallest element.
    #[must_use]
    pub fn rend(&self) -> SetCursor<T, Reverse> {
        TreeCursor::at_rank(&self.tree, self.tokenizer.create(), self.len())
    }

    /// Returns a cursor at `rank` in ascending order. `Rank(len)` is the end cursor; anything
    /// beyond it gives `None`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn cursor_at(&self, rank: Rank) -> Option<SetCursor<T>> {
        (rank.0 <= self.len()).then(|| TreeCursor::at_rank(&self.tree, self.tokenizer.create(), rank.0))
    }

    /// Removes the element under `cursor` and returns it. Invalidates all cursors.
    ///
    /// # Errors
    ///
    /// [`CursorError::Invalidated`] for a stale cursor, [`CursorError::ForeignContainer`] for a
    /// cursor of another set, [`CursorError::DereferenceEnd`] for an end cursor.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::OrderedSet;
    ///
    /// let mut set = OrderedSet::from([1, 2, 3]);
    /// let cursor = set.begin() + 1;
    /// assert_eq!(set.erase(&cursor), Ok(2));
    /// assert_eq!(set.iter().collect::<Vec<_>>(), [1, 3]);
    /// ```
    pub fn erase<D: Direction>(&mut self, cursor: &SetCursor<T, D>) -> Result<T, CursorError> {
        let node = cursor.node_in(&self.tree)?.ok_or(CursorError::DereferenceEnd)?;
        let (value, ()) = self.tree.borrow_mut().remove(node);
        self.tokenizer.reset();
        Ok(value)
    }
}

impl<T: Ord> OrderedSet<T> {
    /// Returns `true` if the set contains an element equal to the value.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::OrderedSet;
    ///
    /// let set = OrderedSet::from([1, 2, 3]);
    /// assert!(set.contains(&1));
    /// assert!(!set.contains(&4));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: core::borrow::Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.borrow().find(value).is_some()
    }

    /// Returns a cursor at the element equal to `value`, or `None` if it is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::{OrderedSet, Rank};
    ///
    /// let set = OrderedSet::from([10, 20, 30]);
    /// let cursor = set.find(&20).unwrap();
    /// assert_eq!(cursor.rank(), Ok(Rank(1)));
    /// assert!(set.find(&25).is_none());
    /// ```
    #[must_use]
    pub fn find<Q>(&self, value: &Q) -> Option<SetCursor<T>>
    where
        T: core::borrow::Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let node = self.tree.borrow().find(value)?;
        Some(TreeCursor::at_node(&self.tree, self.tokenizer.create(), node))
    }

    /// Adds a value to the set.
    ///
    /// Returns whether the value was newly inserted. If an equal element is already present, the
    /// set keeps the stored element and cursors stay valid.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::OrderedSet;
    ///
    /// let mut set = OrderedSet::new();
    /// assert!(set.insert(2));
    /// assert!(!set.insert(2));
    /// assert_eq!(set.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, value: T) -> bool {
        let inserted = self.insert_quietly(value);
        if inserted {
            self.tokenizer.reset();
        }
        inserted
    }

    // An equal element already in the tree keeps its place; only the unit value is swapped.
    fn insert_quietly(&mut self, value: T) -> bool {
        matches!(self.tree.borrow_mut().insert(value, ()), Insertion::Inserted)
    }

    /// Removes the element equal to `value` and returns it.
    ///
    /// # Errors
    ///
    /// [`ContainerError::NotFound`] if no such element exists. The set and its cursors are
    /// untouched in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::{ContainerError, OrderedSet};
    ///
    /// let mut set = OrderedSet::from([1, 2]);
    /// assert_eq!(set.remove(&2), Ok(2));
    /// assert_eq!(set.remove(&2), Err(ContainerError::NotFound));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove<Q>(&mut self, value: &Q) -> Result<T, ContainerError>
    where
        T: core::borrow::Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut tree = self.tree.borrow_mut();
        let node = tree.find(value).ok_or(ContainerError::NotFound)?;
        let (value, ()) = tree.remove(node);
        drop(tree);
        self.tokenizer.reset();
        Ok(value)
    }

    /// Removes the element equal to `value` if present. Returns whether anything was removed;
    /// discarding an absent value leaves cursors valid.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::OrderedSet;
    ///
    /// let mut set = OrderedSet::from([1]);
    /// let cursor = set.begin();
    /// assert!(!set.discard(&7));
    /// assert_eq!(cursor.element(), Ok(1));
    /// assert!(set.discard(&1));
    /// assert!(cursor.element().is_err());
    /// ```
    pub fn discard<Q>(&mut self, value: &Q) -> bool
    where
        T: core::borrow::Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.remove(value).is_ok()
    }

    /// Returns `true` if `self` has no elements in common with `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::OrderedSet;
    ///
    /// let a = OrderedSet::from([1, 2, 3]);
    /// let mut b = OrderedSet::new();
    /// b.insert(4);
    /// assert!(a.is_disjoint(&b));
    /// b.insert(1);
    /// assert!(!a.is_disjoint(&b));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(min(m, n) log max(m, n)) where m and n are the sizes of the two sets.
    #[must_use]
    pub fn is_disjoint(&self, other: &OrderedSet<T>) -> bool
    where
        T: Clone,
    {
        if self.len() <= other.len() {
            self.iter().all(|v| !other.contains(&v))
        } else {
            other.iter().all(|v| !self.contains(&v))
        }
    }

    /// Returns `true` if `other` contains at least all the values in `self`.
    ///
    /// # Complexity
    ///
    /// O(m log n) where m is the size of `self` and n is the size of `other`.
    #[must_use]
    pub fn is_subset(&self, other: &OrderedSet<T>) -> bool
    where
        T: Clone,
    {
        self.len() <= other.len() && self.iter().all(|v| other.contains(&v))
    }

    /// Returns `true` if `self` contains at least all the values in `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::OrderedSet;
    ///
    /// let sup = OrderedSet::from([1, 2, 3]);
    /// let mut sub = OrderedSet::new();
    /// assert!(sup.is_superset(&sub));
    /// sub.insert(2);
    /// assert!(sup.is_superset(&sub));
    /// sub.insert(4);
    /// assert!(!sup.is_superset(&sub));
    /// ```
    #[must_use]
    pub fn is_superset(&self, other: &OrderedSet<T>) -> bool
    where
        T: Clone,
    {
        other.is_subset(self)
    }
}

impl<T: Clone> OrderedSet<T> {
    /// Returns the smallest element.
    ///
    /// # Errors
    ///
    /// [`ContainerError::Empty`] for an empty set.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::{ContainerError, OrderedSet};
    ///
    /// let mut set = OrderedSet::new();
    /// assert_eq!(set.first(), Err(ContainerError::Empty));
    /// set.insert(2);
    /// set.insert(1);
    /// assert_eq!(set.first(), Ok(1));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn first(&self) -> Result<T, ContainerError> {
        let tree = self.tree.borrow();
        tree.min().map(|node| tree.key(node).clone()).ok_or(ContainerError::Empty)
    }

    /// Returns the largest element.
    ///
    /// # Errors
    ///
    /// [`ContainerError::Empty`] for an empty set.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn last(&self) -> Result<T, ContainerError> {
        let tree = self.tree.borrow();
        tree.max().map(|node| tree.key(node).clone()).ok_or(ContainerError::Empty)
    }
}

impl<T> OrderedSet<T> {
    /// Removes and returns the smallest element.
    ///
    /// # Errors
    ///
    /// [`ContainerError::Empty`] for an empty set.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::OrderedSet;
    ///
    /// let mut set = OrderedSet::from([2, 1]);
    /// assert_eq!(set.pop(), Ok(1));
    /// assert_eq!(set.pop(), Ok(2));
    /// assert!(set.pop().is_err());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn pop(&mut self) -> Result<T, ContainerError> {
        let node = self.tree.borrow().min().ok_or(ContainerError::Empty)?;
        let (value, ()) = self.tree.borrow_mut().remove(node);
        self.tokenizer.reset();
        Ok(value)
    }

    /// Removes and returns the largest element.
    ///
    /// # Errors
    ///
    /// [`ContainerError::Empty`] for an empty set.
    pub fn pop_last(&mut self) -> Result<T, ContainerError> {
        let node = self.tree.borrow().max().ok_or(ContainerError::Empty)?;
        let (value, ()) = self.tree.borrow_mut().remove(node);
        self.tokenizer.reset();
        Ok(value)
    }
}

impl<T: Clone + Ord> OrderedSet<T> {
    fn merged(&self, other: &OrderedSet<T>, operation: SetOperation) -> RawRbTree<T, ()> {
        self.tree.borrow().merged(&other.tree.borrow(), operation)
    }

    /// Replaces the contents with the merge of `self` and `other`. Cursors are invalidated only if
    /// membership changed.
    fn merge_in_place(&mut self, other: &OrderedSet<T>, operation: SetOperation) {
        let merged = self.merged(other, operation);
        let changed = match operation {
            SetOperation::SymmetricDifference => !other.is_empty(),
            SetOperation::Union | SetOperation::Intersection | SetOperation::Difference => {
                merged.len() != self.len()
            }
        };
        if changed {
            *self.tree.borrow_mut() = merged;
            self.tokenizer.reset();
        }
    }

    /// Returns the elements in `self` or `other` as a new set.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::OrderedSet;
    ///
    /// let a = OrderedSet::from([1, 2]);
    /// let b = OrderedSet::from([2, 3]);
    /// assert_eq!(a.union(&b), OrderedSet::from([1, 2, 3]));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(m + n)
    #[must_use]
    pub fn union(&self, other: &OrderedSet<T>) -> OrderedSet<T> {
        OrderedSet::from_tree(self.merged(other, SetOperation::Union))
    }

    /// Returns the elements in both `self` and `other` as a new set.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::OrderedSet;
    ///
    /// let a = OrderedSet::from([1, 2, 3]);
    /// let b = OrderedSet::from([2, 3, 4]);
    /// assert_eq!(a.intersection(&b), OrderedSet::from([2, 3]));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(m + n)
    #[must_use]
    pub fn intersection(&self, other: &OrderedSet<T>) -> OrderedSet<T> {
        OrderedSet::from_tree(self.merged(other, SetOperation::Intersection))
    }

    /// Returns the elements in `self` but not in `other` as a new set.
    ///
    /// # Complexity
    ///
    /// O(m + n)
    #[must_use]
    pub fn difference(&self, other: &OrderedSet<T>) -> OrderedSet<T> {
        OrderedSet::from_tree(self.merged(other, SetOperation::Difference))
    }

    /// Returns the elements in exactly one of `self` and `other` as a new set.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::OrderedSet;
    ///
    /// let a = OrderedSet::from([1, 2, 3]);
    /// let b = OrderedSet::from([3, 4]);
    /// assert_eq!(a.symmetric_difference(&b), OrderedSet::from([1, 2, 4]));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(m + n)
    #[must_use]
    pub fn symmetric_difference(&self, other: &OrderedSet<T>) -> OrderedSet<T> {
        OrderedSet::from_tree(self.merged(other, SetOperation::SymmetricDifference))
    }
}

impl<T: Hash> Hash for OrderedSet<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let tree = self.tree.borrow();
        state.write_usize(tree.len());
        let mut walk = tree.walk();
        while let Some(node) = walk.next_front(&tree) {
            tree.key(node).hash(state);
        }
    }
}

impl<T: PartialEq> PartialEq for OrderedSet<T> {
    fn eq(&self, other: &OrderedSet<T>) -> bool {
        let (a, b) = (self.tree.borrow(), other.tree.borrow());
        if a.len() != b.len() {
            return false;
        }
        let (mut left, mut right) = (a.walk(), b.walk());
        while let (Some(x), Some(y)) = (left.next_front(&a), right.next_front(&b)) {
            if a.key(x) != b.key(y) {
                return false;
            }
        }
        true
    }
}

impl<T: Eq> Eq for OrderedSet<T> {}

/// Lexicographic comparison in ascending order; a proper prefix is smaller.
impl<T: PartialOrd + Clone> PartialOrd for OrderedSet<T> {
    fn partial_cmp(&self, other: &OrderedSet<T>) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord + Clone> Ord for OrderedSet<T> {
    fn cmp(&self, other: &OrderedSet<T>) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

/// The clone gets its own tokenizer: cursors of the original never apply to it.
impl<T: Clone + Ord> Clone for OrderedSet<T> {
    fn clone(&self) -> Self {
        OrderedSet::from_tree(self.tree.borrow().clone())
    }
}

/// Formats as `OrderedSet([1, 2, 3])`.
impl<T: fmt::Debug> fmt::Debug for OrderedSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.tree.borrow();
        let mut walk = tree.walk();
        let mut elements = Vec::with_capacity(tree.len());
        while let Some(node) = walk.next_front(&tree) {
            elements.push(tree.key(node));
        }
        f.debug_tuple("OrderedSet").field(&elements).finish()
    }
}

impl<T> Default for OrderedSet<T> {
    fn default() -> Self {
        OrderedSet::new()
    }
}

/// Collects into a set. Of several equal elements, the first one is kept.
impl<T: Ord> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut elements: Vec<T> = iter.into_iter().collect();
        // The sort is stable and `dedup` keeps the first of each run.
        elements.sort();
        elements.dedup();
        OrderedSet::from_tree(RawRbTree::from_sorted(elements.into_iter().map(|e| (e, ())).collect()))
    }
}

/// Inserts every element; cursors are invalidated once if anything was added.
impl<T: Ord> Extend<T> for OrderedSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let mut reset = false;
        for value in iter {
            if self.insert_quietly(value) && !reset {
                self.tokenizer.reset();
                reset = true;
            }
        }
    }
}

impl<'a, T: 'a + Ord + Copy> Extend<&'a T> for OrderedSet<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for OrderedSet<T> {
    /// Converts a `[T; N]` into an `OrderedSet<T>`.
    ///
    /// ```
    /// use rbcursor::OrderedSet;
    ///
    /// let set1 = OrderedSet::from([1, 2, 3, 4]);
    /// let set2: OrderedSet<_> = [1, 2, 3, 4].into();
    /// assert_eq!(set1, set2);
    /// ```
    fn from(arr: [T; N]) -> Self {
        OrderedSet::from_iter(arr)
    }
}

impl<T: Clone + Ord> BitAnd<&OrderedSet<T>> for &OrderedSet<T> {
    type Output = OrderedSet<T>;

    /// Returns the intersection of `self` and `rhs` as a new `OrderedSet<T>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::OrderedSet;
    ///
    /// let a = OrderedSet::from([1, 2, 3]);
    /// let b = OrderedSet::from([2, 3, 4]);
    /// assert_eq!(&a & &b, OrderedSet::from([2, 3]));
    /// ```
    fn bitand(self, rhs: &OrderedSet<T>) -> OrderedSet<T> {
        self.intersection(rhs)
    }
}

impl<T: Clone + Ord> BitOr<&OrderedSet<T>> for &OrderedSet<T> {
    type Output = OrderedSet<T>;

    /// Returns the union of `self` and `rhs` as a new `OrderedSet<T>`.
    fn bitor(self, rhs: &OrderedSet<T>) -> OrderedSet<T> {
        self.union(rhs)
    }
}

impl<T: Clone + Ord> Sub<&OrderedSet<T>> for &OrderedSet<T> {
    type Output = OrderedSet<T>;

    /// Returns the difference of `self` and `rhs` as a new `OrderedSet<T>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::OrderedSet;
    ///
    /// let a = OrderedSet::from([1, 2, 3]);
    /// let b = OrderedSet::from([2]);
    /// assert_eq!(&a - &b, OrderedSet::from([1, 3]));
    /// ```
    fn sub(self, rhs: &OrderedSet<T>) -> OrderedSet<T> {
        self.difference(rhs)
    }
}

impl<T: Clone + Ord> BitXor<&OrderedSet<T>> for &OrderedSet<T> {
    type Output = OrderedSet<T>;

    /// Returns the symmetric difference of `self` and `rhs` as a new `OrderedSet<T>`.
    fn bitxor(self, rhs: &OrderedSet<T>) -> OrderedSet<T> {
        self.symmetric_difference(rhs)
    }
}

/// Keeps only the elements also in `rhs`.
impl<T: Clone + Ord> BitAndAssign<&OrderedSet<T>> for OrderedSet<T> {
    fn bitand_assign(&mut self, rhs: &OrderedSet<T>) {
        self.merge_in_place(rhs, SetOperation::Intersection);
    }
}

/// Adds the elements of `rhs`.
impl<T: Clone + Ord> BitOrAssign<&OrderedSet<T>> for OrderedSet<T> {
    fn bitor_assign(&mut self, rhs: &OrderedSet<T>) {
        self.merge_in_place(rhs, SetOperation::Union);
    }
}

/// Removes the elements of `rhs`.
impl<T: Clone + Ord> SubAssign<&OrderedSet<T>> for OrderedSet<T> {
    fn sub_assign(&mut self, rhs: &OrderedSet<T>) {
        self.merge_in_place(rhs, SetOperation::Difference);
    }
}

/// Keeps the elements in exactly one of `self` and `rhs`.
///
/// # Examples
///
/// ```
/// use rbcursor::OrderedSet;
///
/// let mut a = OrderedSet::from([1, 2, 3]);
/// let cursor = a.begin();
/// a ^= &OrderedSet::new();
/// assert_eq!(cursor.element(), Ok(1));
/// a ^= &OrderedSet::from([3, 4]);
/// assert_eq!(a, OrderedSet::from([1, 2, 4]));
/// assert!(cursor.element().is_err());
/// ```
impl<T: Clone + Ord> BitXorAssign<&OrderedSet<T>> for OrderedSet<T> {
    fn bitxor_assign(&mut self, rhs: &OrderedSet<T>) {
        self.merge_in_place(rhs, SetOperation::SymmetricDifference);
    }
}

impl<T> IntoIterator for OrderedSet<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    /// Gets an iterator for moving out the `OrderedSet`'s contents in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::OrderedSet;
    ///
    /// let set = OrderedSet::from([1, 2, 3, 4]);
    /// let v: Vec<_> = set.into_iter().collect();
    /// assert_eq!(v, [1, 2, 3, 4]);
    /// ```
    fn into_iter(self) -> IntoIter<T> {
        let entries = self.tree.borrow_mut().drain_to_vec();
        IntoIter {
            inner: entries.into_iter(),
        }
    }
}

impl<'a, T: Clone> IntoIterator for &'a OrderedSet<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T: Clone> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let tree = self.tree.borrow();
        self.walk.next_front(&tree).map(|node| tree.key(node).clone())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.walk.remaining(), Some(self.walk.remaining()))
    }
}

impl<T: Clone> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<T> {
        let tree = self.tree.borrow();
        self.walk.next_back(&tree).map(|node| tree.key(node).clone())
    }
}

impl<T: Clone> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.walk.remaining()
    }
}

impl<T: Clone> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            walk: self.walk.clone(),
        }
    }
}

impl<T> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").field("remaining", &self.walk.remaining()).finish()
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next().map(|(value, ())| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.inner.next_back().map(|(value, ())| value)
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T> FusedIterator for IntoIter<T> {}

impl<T: Clone, D: Direction> TreeCursor<T, (), D> {
    /// Returns a clone of the set element under the cursor.
    ///
    /// # Errors
    ///
    /// [`CursorError::Invalidated`] for a stale cursor, [`CursorError::DereferenceEnd`] at end.
    pub fn element(&self) -> Result<T, CursorError> {
        self.key()
    }
}
