use alloc::rc::Rc;
use core::cell::RefCell;

use super::OrderedMap;
use crate::raw::RawRbTree;
use crate::tokenization::Tokenizer;

impl<K, V> OrderedMap<K, V> {
    /// Creates an empty map with node storage for at least `capacity` entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbcursor::OrderedMap;
    ///
    /// let map: OrderedMap<i32, i32> = OrderedMap::with_capacity(10);
    /// assert!(map.capacity() >= 10);
    /// ```
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        OrderedMap {
            tree: Rc::new(RefCell::new(RawRbTree::with_capacity(capacity))),
            tokenizer: Tokenizer::new(),
        }
    }

    /// Returns the number of entries the map can hold without reallocating its node storage.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.tree.borrow().capacity()
    }
}
