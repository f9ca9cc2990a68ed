use super::OrderedSet;

impl<T: Clone> OrderedSet<T> {
    /// Returns the element at position `rank` in ascending order.
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
    /// use rbcursor::OrderedSet;
    ///
    /// let set = OrderedSet::from([10, 20, 30]);
    /// assert_eq!(set.get_by_rank(1), Some(20));
    /// assert!(set.get_by_rank(3).is_none());
    /// ```
    #[must_use]
    pub fn get_by_rank(&self, rank: usize) -> Option<T> {
        let tree = self.tree.borrow();
        tree.node_at(rank).map(|node| tree.key(node).clone())
    }
}

impl<T: Ord> OrderedSet<T> {
    /// Returns the zero-based rank of `value` in ascending order, or `None` if the value is not
    /// present.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::OrderedSet;
    ///
    /// let set = OrderedSet::from([10, 20]);
    /// assert_eq!(set.rank_of(&20), Some(1));
    /// assert_eq!(set.rank_of(&15), None);
    /// ```
    #[must_use]
    pub fn rank_of<Q>(&self, value: &Q) -> Option<usize>
    where
        T: core::borrow::Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let tree = self.tree.borrow();
        tree.find(value).map(|node| tree.rank_of(node))
    }
}
