use alloc::rc::Rc;
use core::cell::RefCell;

use super::OrderedSet;
use crate::raw::RawRbTree;
use crate::tokenization::Tokenizer;

impl<T> OrderedSet<T> {
    /// Creates an empty set with node storage for at least `capacity` elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::OrderedSet;
    ///
    /// let set: OrderedSet<i32> = OrderedSet::with_capacity(16);
    /// assert!(set.is_empty());
    /// assert!(set.capacity() >= 16);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        OrderedSet {
            tree: Rc::new(RefCell::new(RawRbTree::with_capacity(capacity))),
            tokenizer: Tokenizer::new(),
        }
    }

    /// Returns the number of elements the set can hold without reallocating its node storage.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.tree.borrow().capacity()
    }
}
