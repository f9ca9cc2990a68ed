use alloc::rc::Rc;
use alloc::vec::{self, Vec};
use core::cell::RefCell;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;

use crate::cursor::{Direction, Forward, Reverse, SharedTree, TreeCursor};
use crate::raw::{Insertion, RawRbTree, Walk};
use crate::tokenization::Tokenizer;
use crate::{ContainerError, CursorError, Rank};

mod capacity;
mod order_statistic;

/// A cursor into an [`OrderedMap`].
pub type MapCursor<K, V, D = Forward> = TreeCursor<K, V, D>;

/// An ordered map based on a red-black tree with subtree sizes.
///
/// Inserting a new key or removing one invalidates every cursor obtained before the call.
/// Overwriting the value of an existing key does not: the node stays where it is, and existing
/// cursors read the new value.
///
/// Keys and values are returned by value (cloned), since the tree is shared with the cursors.
///
/// # Examples
///
/// ```
/// use rbcursor::{CursorError, OrderedMap};
///
/// let mut map = OrderedMap::from([(1, "a"), (2, "b")]);
/// let cursor = map.begin();
///
/// assert_eq!(map.upsert(1, "z"), Some("a"));
/// assert_eq!(cursor.value(), Ok("z"));
///
/// assert_eq!(map.upsert(3, "c"), None);
/// assert_eq!(cursor.value(), Err(CursorError::Invalidated));
/// ```
pub struct OrderedMap<K, V> {
    tree: SharedTree<K, V>,
    tokenizer: Tokenizer,
}

struct Entries<'a, K, V> {
    tree: &'a RefCell<RawRbTree<K, V>>,
    walk: Walk,
}

impl<K, V> Entries<'_, K, V> {
    fn front<R>(&mut self, read: impl FnOnce(&K, &V) -> R) -> Option<R> {
        let tree = self.tree.borrow();
        self.walk.next_front(&tree).map(|node| read(tree.key(node), tree.value(node)))
    }

    fn back<R>(&mut self, read: impl FnOnce(&K, &V) -> R) -> Option<R> {
        let tree = self.tree.borrow();
        self.walk.next_back(&tree).map(|node| read(tree.key(node), tree.value(node)))
    }
}

impl<K, V> Clone for Entries<'_, K, V> {
    fn clone(&self) -> Self {
        Entries {
            tree: self.tree,
            walk: self.walk.clone(),
        }
    }
}

/// An iterator over the entries of an `OrderedMap`, sorted by key.
///
/// This `struct` is created by the [`iter`] method on [`OrderedMap`].
///
/// [`iter`]: OrderedMap::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    inner: Entries<'a, K, V>,
}

/// An iterator over the keys of an `OrderedMap`.
///
/// This `struct` is created by the [`keys`] method on [`OrderedMap`].
///
/// [`keys`]: OrderedMap::keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V> {
    inner: Entries<'a, K, V>,
}

/// An iterator over the values of an `OrderedMap`, in key order.
///
/// This `struct` is created by the [`values`] method on [`OrderedMap`].
///
/// [`values`]: OrderedMap::values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V> {
    inner: Entries<'a, K, V>,
}

/// An owning iterator over the entries of an `OrderedMap`, sorted by key.
#[derive(Debug)]
pub struct IntoIter<K, V> {
    inner: vec::IntoIter<(K, V)>,
}

impl<K, V> OrderedMap<K, V> {
    /// Makes a new, empty `OrderedMap`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.len(), 1);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        OrderedMap::from_tree(RawRbTree::new())
    }

    fn from_tree(tree: RawRbTree<K, V>) -> Self {
        OrderedMap {
            tree: Rc::new(RefCell::new(tree)),
            tokenizer: Tokenizer::new(),
        }
    }

    /// Returns the number of entries in the map.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.borrow().len()
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.borrow().is_empty()
    }

    /// Clears the map, removing all entries. Clearing an empty map leaves cursors valid.
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

    fn entries(&self) -> Entries<'_, K, V> {
        Entries {
            walk: self.tree.borrow().walk(),
            tree: &self.tree,
        }
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::OrderedMap;
    ///
    /// let map = OrderedMap::from([(3, "c"), (2, "b"), (1, "a")]);
    /// let mut iter = map.iter();
    /// assert_eq!(iter.next(), Some((1, "a")));
    /// assert_eq!(iter.next_back(), Some((3, "c")));
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.entries(),
        }
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::OrderedMap;
    ///
    /// let map = OrderedMap::from([(2, "b"), (1, "a")]);
    /// assert_eq!(map.keys().collect::<Vec<_>>(), [1, 2]);
    /// ```
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys {
            inner: self.entries(),
        }
    }

    /// Gets an iterator over the values of the map, in key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::OrderedMap;
    ///
    /// let map = OrderedMap::from([(2, "b"), (1, "a")]);
    /// assert_eq!(map.values().collect::<Vec<_>>(), ["a", "b"]);
    /// ```
    pub fn values(&self) -> Values<'_, K, V> {
        Values {
            inner: self.entries(),
        }
    }

    /// Returns a cursor at the entry with the smallest key, or at end for an empty map.
    #[must_use]
    pub fn begin(&self) -> MapCursor<K, V> {
        TreeCursor::at_rank(&self.tree, self.tokenizer.create(), 0)
    }

    /// Returns a cursor one past the entry with the largest key.
    #[must_use]
    pub fn end(&self) -> MapCursor<K, V> {
        TreeCursor::at_rank(&self.tree, self.tokenizer.create(), self.len())
    }

    /// Returns a reverse cursor at the entry with the largest key.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::OrderedMap;
    ///
    /// let map = OrderedMap::from([(1, 'a'), (2, 'b'), (3, 'c')]);
    /// let mut cursor = map.rbegin();
    /// assert_eq!(cursor.item(), Ok((3, 'c')));
    /// cursor += 2;
    /// assert_eq!(cursor.key(), Ok(1));
    /// cursor.advance().unwrap();
    /// assert_eq!(cursor, map.rend());
    /// ```
    #[must_use]
    pub fn rbegin(&self) -> MapCursor<K, V, Reverse> {
        TreeCursor::at_rank(&self.tree, self.tokenizer.create(), 0)
    }

    /// Returns a reverse cursor one before the entry with the smallest key.
    #[must_use]
    pub fn rend(&self) -> MapCursor<K, V, Reverse> {
        TreeCursor::at_rank(&self.tree, self.tokenizer.create(), self.len())
    }

    /// Returns a cursor at `rank` in key order. `Rank(len)` is the end cursor; anything beyond it
    /// gives `None`.
    #[must_use]
    pub fn cursor_at(&self, rank: Rank) -> Option<MapCursor<K, V>> {
        (rank.0 <= self.len()).then(|| TreeCursor::at_rank(&self.tree, self.tokenizer.create(), rank.0))
    }

    /// Removes the entry under `cursor` and returns it. Invalidates all cursors.
    ///
    /// # Errors
    ///
    /// [`CursorError::Invalidated`] for a stale cursor, [`CursorError::ForeignContainer`] for a
    /// cursor of another map, [`CursorError::DereferenceEnd`] for an end cursor.
    pub fn erase<D: Direction>(&mut self, cursor: &MapCursor<K, V, D>) -> Result<(K, V), CursorError> {
        let node = cursor.node_in(&self.tree)?.ok_or(CursorError::DereferenceEnd)?;
        let entry = self.tree.borrow_mut().remove(node);
        self.tokenizer.reset();
        Ok(entry)
    }

    /// Removes and returns the entry with the smallest key.
    ///
    /// # Errors
    ///
    /// [`ContainerError::Empty`] for an empty map.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::OrderedMap;
    ///
    /// let mut map = OrderedMap::from([(1, "a"), (2, "b")]);
    /// assert_eq!(map.pop_first(), Ok((1, "a")));
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn pop_first(&mut self) -> Result<(K, V), ContainerError> {
        let node = self.tree.borrow().min().ok_or(ContainerError::Empty)?;
        let entry = self.tree.borrow_mut().remove(node);
        self.tokenizer.reset();
        Ok(entry)
    }

    /// Removes and returns the entry with the largest key.
    ///
    /// # Errors
    ///
    /// [`ContainerError::Empty`] for an empty map.
    pub fn pop_last(&mut self) -> Result<(K, V), ContainerError> {
        let node = self.tree.borrow().max().ok_or(ContainerError::Empty)?;
        let entry = self.tree.borrow_mut().remove(node);
        self.tokenizer.reset();
        Ok(entry)
    }
}

impl<K: Clone, V: Clone> OrderedMap<K, V> {
    /// Returns the entry with the smallest key.
    ///
    /// # Errors
    ///
    /// [`ContainerError::Empty`] for an empty map.
    pub fn first(&self) -> Result<(K, V), ContainerError> {
        let tree = self.tree.borrow();
        let node = tree.min().ok_or(ContainerError::Empty)?;
        Ok((tree.key(node).clone(), tree.value(node).clone()))
    }

    /// Returns the entry with the largest key.
    ///
    /// # Errors
    ///
    /// [`ContainerError::Empty`] for an empty map.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::{ContainerError, OrderedMap};
    ///
    /// let mut map = OrderedMap::new();
    /// assert_eq!(map.last(), Err(ContainerError::Empty));
    /// map.insert(1, "b");
    /// map.insert(2, "a");
    /// assert_eq!(map.last(), Ok((2, "a")));
    /// ```
    pub fn last(&self) -> Result<(K, V), ContainerError> {
        let tree = self.tree.borrow();
        let node = tree.max().ok_or(ContainerError::Empty)?;
        Ok((tree.key(node).clone(), tree.value(node).clone()))
    }
}

impl<K: Ord, V> OrderedMap<K, V> {
    /// Returns a clone of the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::OrderedMap;
    ///
    /// let map = OrderedMap::from([(1, "a")]);
    /// assert_eq!(map.get(&1), Some("a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: core::borrow::Borrow<Q>,
        Q: ?Sized + Ord,
        V: Clone,
    {
        let tree = self.tree.borrow();
        tree.find(key).map(|node| tree.value(node).clone())
    }

    /// Returns `true` if the map contains a value for the specified key.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: core::borrow::Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.borrow().find(key).is_some()
    }

    /// Returns a cursor at the entry for `key`, or `None` if the key is absent.
    #[must_use]
    pub fn find<Q>(&self, key: &Q) -> Option<MapCursor<K, V>>
    where
        K: core::borrow::Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let node = self.tree.borrow().find(key)?;
        Some(TreeCursor::at_node(&self.tree, self.tokenizer.create(), node))
    }

    /// Inserts a key-value pair, or overwrites the value of an existing key in place.
    ///
    /// Returns the previous value, if any. Only inserting a new key invalidates cursors.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// assert_eq!(map.upsert(37, "a"), None);
    /// assert_eq!(map.upsert(37, "b"), Some("a"));
    /// assert_eq!(map.get(&37), Some("b"));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn upsert(&mut self, key: K, value: V) -> Option<V> {
        let previous = self.upsert_quietly(key, value);
        if previous.is_none() {
            self.tokenizer.reset();
        }
        previous
    }

    fn upsert_quietly(&mut self, key: K, value: V) -> Option<V> {
        match self.tree.borrow_mut().insert(key, value) {
            Insertion::Inserted => None,
            Insertion::Replaced(previous) => Some(previous),
        }
    }

    /// Same as [`upsert`](Self::upsert), under the name the standard maps use.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.upsert(key, value)
    }

    /// Removes a key from the map, returning its value.
    ///
    /// # Errors
    ///
    /// [`ContainerError::NotFound`] if the key is absent. The map and its cursors are untouched in
    /// that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::{ContainerError, OrderedMap};
    ///
    /// let mut map = OrderedMap::from([(1, "a")]);
    /// assert_eq!(map.remove(&1), Ok("a"));
    /// assert_eq!(map.remove(&1), Err(ContainerError::NotFound));
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Result<V, ContainerError>
    where
        K: core::borrow::Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut tree = self.tree.borrow_mut();
        let node = tree.find(key).ok_or(ContainerError::NotFound)?;
        let (_, value) = tree.remove(node);
        drop(tree);
        self.tokenizer.reset();
        Ok(value)
    }

    /// Removes a key from the map if present, returning its value. An absent key leaves cursors
    /// valid.
    pub fn discard<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: core::borrow::Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.remove(key).ok()
    }
}

impl<K: Hash, V: Hash> Hash for OrderedMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let tree = self.tree.borrow();
        state.write_usize(tree.len());
        let mut walk = tree.walk();
        while let Some(node) = walk.next_front(&tree) {
            tree.key(node).hash(state);
            tree.value(node).hash(state);
        }
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for OrderedMap<K, V> {
    fn eq(&self, other: &OrderedMap<K, V>) -> bool {
        let (a, b) = (self.tree.borrow(), other.tree.borrow());
        if a.len() != b.len() {
            return false;
        }
        let (mut left, mut right) = (a.walk(), b.walk());
        while let (Some(x), Some(y)) = (left.next_front(&a), right.next_front(&b)) {
            if a.key(x) != b.key(y) || a.value(x) != b.value(y) {
                return false;
            }
        }
        true
    }
}

impl<K: Eq, V: Eq> Eq for OrderedMap<K, V> {}

/// Lexicographic comparison of `(key, value)` pairs in key order; a proper prefix is smaller.
impl<K: PartialOrd + Clone, V: PartialOrd + Clone> PartialOrd for OrderedMap<K, V> {
    fn partial_cmp(&self, other: &OrderedMap<K, V>) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<K: Ord + Clone, V: Ord + Clone> Ord for OrderedMap<K, V> {
    fn cmp(&self, other: &OrderedMap<K, V>) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

/// The clone gets its own tokenizer: cursors of the original never apply to it.
impl<K: Clone + Ord, V: Clone> Clone for OrderedMap<K, V> {
    fn clone(&self) -> Self {
        OrderedMap::from_tree(self.tree.borrow().clone())
    }
}

/// Formats as `OrderedMap([(1, "a"), (2, "b")])`.
impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for OrderedMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.tree.borrow();
        let mut walk = tree.walk();
        let mut entries = Vec::with_capacity(tree.len());
        while let Some(node) = walk.next_front(&tree) {
            entries.push((tree.key(node), tree.value(node)));
        }
        f.debug_tuple("OrderedMap").field(&entries).finish()
    }
}

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        OrderedMap::new()
    }
}

/// Collects into a map. Of several entries with equal keys, the last value wins.
impl<K: Ord, V> FromIterator<(K, V)> for OrderedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut pairs: Vec<(K, V)> = iter.into_iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));

        let mut entries: Vec<(K, V)> = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            match entries.last_mut() {
                Some(last) if last.0 == key => last.1 = value,
                _ => entries.push((key, value)),
            }
        }
        OrderedMap::from_tree(RawRbTree::from_sorted(entries))
    }
}

/// Upserts every entry; cursors are invalidated once if any key was new.
impl<K: Ord, V> Extend<(K, V)> for OrderedMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let mut reset = false;
        for (key, value) in iter {
            if self.upsert_quietly(key, value).is_none() && !reset {
                self.tokenizer.reset();
                reset = true;
            }
        }
    }
}

impl<'a, K: Ord + Copy, V: Copy> Extend<(&'a K, &'a V)> for OrderedMap<K, V> {
    fn extend<I: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: I) {
        self.extend(iter.into_iter().map(|(&key, &value)| (key, value)));
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for OrderedMap<K, V> {
    /// Converts a `[(K, V); N]` into an `OrderedMap<K, V>`.
    ///
    /// ```
    /// use rbcursor::OrderedMap;
    ///
    /// let map1 = OrderedMap::from([(1, 2), (3, 4)]);
    /// let map2: OrderedMap<_, _> = [(1, 2), (3, 4)].into();
    /// assert_eq!(map1, map2);
    /// ```
    fn from(arr: [(K, V); N]) -> Self {
        OrderedMap::from_iter(arr)
    }
}

impl<K, V> IntoIterator for OrderedMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter {
            inner: self.tree.borrow_mut().drain_to_vec().into_iter(),
        }
    }
}

impl<'a, K: Clone, V: Clone> IntoIterator for &'a OrderedMap<K, V> {
    type Item = (K, V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<K: Clone, V: Clone> Iterator for Iter<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.inner.front(|key, value| (key.clone(), value.clone()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.inner.walk.remaining();
        (remaining, Some(remaining))
    }
}

impl<K: Clone, V: Clone> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<(K, V)> {
        self.inner.back(|key, value| (key.clone(), value.clone()))
    }
}

impl<K: Clone, V: Clone> ExactSizeIterator for Iter<'_, K, V> {}

impl<K: Clone, V: Clone> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").field("remaining", &self.inner.walk.remaining()).finish()
    }
}

impl<K: Clone, V> Iterator for Keys<'_, K, V> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        self.inner.front(|key, _| key.clone())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.inner.walk.remaining();
        (remaining, Some(remaining))
    }
}

impl<K: Clone, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<K> {
        self.inner.back(|key, _| key.clone())
    }
}

impl<K: Clone, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K: Clone, V> FusedIterator for Keys<'_, K, V> {}

impl<K, V> fmt::Debug for Keys<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keys").field("remaining", &self.inner.walk.remaining()).finish()
    }
}

impl<K, V: Clone> Iterator for Values<'_, K, V> {
    type Item = V;

    fn next(&mut self) -> Option<V> {
        self.inner.front(|_, value| value.clone())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.inner.walk.remaining();
        (remaining, Some(remaining))
    }
}

impl<K, V: Clone> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<V> {
        self.inner.back(|_, value| value.clone())
    }
}

impl<K, V: Clone> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V: Clone> FusedIterator for Values<'_, K, V> {}

impl<K, V> fmt::Debug for Values<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Values").field("remaining", &self.inner.walk.remaining()).finish()
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<(K, V)> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> FusedIterator for IntoIter<K, V> {}
