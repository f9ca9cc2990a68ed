use super::OrderedMap;

impl<K: Clone, V: Clone> OrderedMap<K, V> {
    /// Returns the key-value pair at position `rank` in key order.
    ///
    /// The rank is zero-based. Returns `None` if `rank` is out of bounds.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::OrderedMap;
    ///
    /// let map = OrderedMap::from([(1, "a"), (2, "b"), (3, "c")]);
    /// assert_eq!(map.get_by_rank(1), Some((2, "b")));
    /// assert_eq!(map.get_by_rank(3), None);
    /// ```
    #[must_use]
    pub fn get_by_rank(&self, rank: usize) -> Option<(K, V)> {
        let tree = self.tree.borrow();
        tree.node_at(rank).map(|node| (tree.key(node).clone(), tree.value(node).clone()))
    }
}

impl<K: Ord, V> OrderedMap<K, V> {
    /// Returns the zero-based rank of `key` in key order, or `None` if the key is not present.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::OrderedMap;
    ///
    /// let map = OrderedMap::from([(10, 'x'), (20, 'y')]);
    /// assert_eq!(map.rank_of(&20), Some(1));
    /// assert_eq!(map.rank_of(&15), None);
    /// ```
    #[must_use]
    pub fn rank_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: core::borrow::Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let tree = self.tree.borrow();
        tree.find(key).map(|node| tree.rank_of(node))
    }
}
