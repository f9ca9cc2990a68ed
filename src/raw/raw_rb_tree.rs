use alloc::vec::Vec;
use core::borrow::Borrow;
use core::cmp::Ordering::{Equal, Greater, Less};

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Color, Node, Side};

/// The red-black tree backing `OrderedSet`, `OrderedMap` and their cursors.
///
/// Every node stores the size of its subtree, which turns rank lookups in both directions into a
/// single root-to-leaf (or leaf-to-root) walk.
pub(crate) struct RawRbTree<K, V> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<K, V>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Total number of entries in the tree.
    len: usize,
}

/// Outcome of [`RawRbTree::insert`].
pub(crate) enum Insertion<V> {
    /// A new node was linked into the tree.
    Inserted,
    /// The key was already present; its value was swapped in place and the old one returned.
    Replaced(V),
}

/// Which entries a tree-level merge keeps.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum SetOperation {
    Union,
    Intersection,
    Difference,
    SymmetricDifference,
}

impl SetOperation {
    const fn keeps_left_only(self) -> bool {
        matches!(self, Self::Union | Self::Difference | Self::SymmetricDifference)
    }

    const fn keeps_right_only(self) -> bool {
        matches!(self, Self::Union | Self::SymmetricDifference)
    }

    const fn keeps_both(self) -> bool {
        matches!(self, Self::Union | Self::Intersection)
    }
}

/// A double-ended in-order walk over node handles.
///
/// The walk does not borrow the tree; every step is handed the tree explicitly so that callers can
/// keep it next to a `Ref` of the same tree.
#[derive(Clone, Debug)]
pub(crate) struct Walk {
    front: Option<Handle>,
    back: Option<Handle>,
    remaining: usize,
}

impl Walk {
    pub(crate) fn next_front<K, V>(&mut self, tree: &RawRbTree<K, V>) -> Option<Handle> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.front?;
        self.remaining -= 1;
        self.front = tree.successor(current);
        Some(current)
    }

    pub(crate) fn next_back<K, V>(&mut self, tree: &RawRbTree<K, V>) -> Option<Handle> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.back?;
        self.remaining -= 1;
        self.back = tree.predecessor(current);
        Some(current)
    }

    pub(crate) const fn remaining(&self) -> usize {
        self.remaining
    }
}

impl<K, V> RawRbTree<K, V> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            len: 0,
        }
    }

    /// Creates a new, empty tree with room for `capacity` nodes.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
            len: 0,
        }
    }

    /// Returns the number of entries in the tree.
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the tree contains no entries.
    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Releases every node.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    #[inline]
    fn node(&self, handle: Handle) -> &Node<K, V> {
        self.nodes.get(handle)
    }

    #[inline]
    fn node_mut(&mut self, handle: Handle) -> &mut Node<K, V> {
        self.nodes.get_mut(handle)
    }

    #[inline]
    pub(crate) fn key(&self, handle: Handle) -> &K {
        &self.node(handle).key
    }

    #[inline]
    pub(crate) fn value(&self, handle: Handle) -> &V {
        &self.node(handle).value
    }

    #[inline]
    pub(crate) fn value_mut(&mut self, handle: Handle) -> &mut V {
        &mut self.node_mut(handle).value
    }

    #[inline]
    fn size_of(&self, handle: Option<Handle>) -> usize {
        handle.map_or(0, |h| self.node(h).size)
    }

    #[inline]
    fn is_red(&self, handle: Option<Handle>) -> bool {
        handle.is_some_and(|h| self.node(h).is_red())
    }

    #[inline]
    fn set_color(&mut self, handle: Option<Handle>, color: Color) {
        if let Some(h) = handle {
            self.node_mut(h).color = color;
        }
    }

    #[inline]
    fn parent_of(&self, handle: Handle) -> Option<Handle> {
        self.node(handle).parent
    }

    /// Walks from `handle` towards `side` as far as possible.
    fn extreme(&self, mut handle: Handle, side: Side) -> Handle {
        while let Some(child) = self.node(handle).child(side) {
            handle = child;
        }
        handle
    }

    /// Returns the leftmost node, or `None` on an empty tree.
    pub(crate) fn min(&self) -> Option<Handle> {
        self.root.map(|root| self.extreme(root, Side::Left))
    }

    /// Returns the rightmost node, or `None` on an empty tree.
    pub(crate) fn max(&self) -> Option<Handle> {
        self.root.map(|root| self.extreme(root, Side::Right))
    }

    /// Steps one position in key order: towards larger keys for `Side::Right`, smaller keys for
    /// `Side::Left`. Returns `None` when stepping off either end.
    fn step(&self, handle: Handle, side: Side) -> Option<Handle> {
        if let Some(child) = self.node(handle).child(side) {
            return Some(self.extreme(child, side.opposite()));
        }
        let mut current = handle;
        while let Some(parent) = self.parent_of(current) {
            if self.node(parent).child(side.opposite()) == Some(current) {
                return Some(parent);
            }
            current = parent;
        }
        None
    }

    /// The next node in key order; the successor of the maximum is end (`None`).
    pub(crate) fn successor(&self, handle: Handle) -> Option<Handle> {
        self.step(handle, Side::Right)
    }

    /// The previous node in key order; the predecessor of the minimum is `None`.
    pub(crate) fn predecessor(&self, handle: Handle) -> Option<Handle> {
        self.step(handle, Side::Left)
    }

    /// Zero-based position of `handle` in key order.
    pub(crate) fn rank_of(&self, handle: Handle) -> usize {
        let mut rank = self.size_of(self.node(handle).left());
        let mut current = handle;
        while let Some(parent) = self.parent_of(current) {
            if self.node(parent).right() == Some(current) {
                rank += self.size_of(self.node(parent).left()) + 1;
            }
            current = parent;
        }
        rank
    }

    /// The node at zero-based position `rank` in key order, or `None` if `rank >= len`.
    pub(crate) fn node_at(&self, mut rank: usize) -> Option<Handle> {
        if rank >= self.len {
            return None;
        }
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.node(handle);
            let left_size = self.size_of(node.left());
            match rank.cmp(&left_size) {
                Less => current = node.left(),
                Equal => return Some(handle),
                Greater => {
                    rank -= left_size + 1;
                    current = node.right();
                }
            }
        }
        debug_assert!(false, "node_at: subtree sizes disagree with len {}", self.len);
        None
    }

    /// An in-order walk over every node.
    pub(crate) fn walk(&self) -> Walk {
        Walk {
            front: self.min(),
            back: self.max(),
            remaining: self.len,
        }
    }

    /// Replaces `old` in its parent's child slot (or the root slot) with `new`.
    fn replace_child(&mut self, parent: Option<Handle>, old: Handle, new: Option<Handle>) {
        match parent {
            None => self.root = new,
            Some(p) => {
                if self.node(p).left() == Some(old) {
                    self.node_mut(p).set_child(Side::Left, new);
                } else {
                    self.node_mut(p).set_child(Side::Right, new);
                }
            }
        }
    }

    /// Rotates `x` down towards `side`; its child on the opposite side takes its place.
    fn rotate(&mut self, x: Handle, side: Side) {
        let other = side.opposite();
        let y = self.node(x).child(other).expect("rotation pivot must have a child on the rising side");
        let inner = self.node(y).child(side);

        self.node_mut(x).set_child(other, inner);
        if let Some(inner) = inner {
            self.node_mut(inner).parent = Some(x);
        }

        let parent = self.parent_of(x);
        self.node_mut(y).parent = parent;
        self.replace_child(parent, x, Some(y));

        self.node_mut(y).set_child(side, Some(x));
        self.node_mut(x).parent = Some(y);

        // `y` now roots exactly the subtree `x` used to root.
        self.node_mut(y).size = self.node(x).size;
        let x_size = 1 + self.size_of(self.node(x).left()) + self.size_of(self.node(x).right());
        self.node_mut(x).size = x_size;
    }

    fn insert_fixup(&mut self, mut z: Handle) {
        while let Some(parent) = self.parent_of(z)
            && self.node(parent).is_red()
        {
            let grandparent = self.parent_of(parent).expect("a red node is never the root");
            let side = if self.node(grandparent).left() == Some(parent) {
                Side::Left
            } else {
                Side::Right
            };
            let uncle = self.node(grandparent).child(side.opposite());

            if self.is_red(uncle) {
                self.set_color(Some(parent), Color::Black);
                self.set_color(uncle, Color::Black);
                self.set_color(Some(grandparent), Color::Red);
                z = grandparent;
            } else {
                let mut parent = parent;
                if self.node(parent).child(side.opposite()) == Some(z) {
                    z = parent;
                    self.rotate(z, side);
                    parent = self.parent_of(z).expect("rotation keeps a parent above `z`");
                }
                self.set_color(Some(parent), Color::Black);
                self.set_color(Some(grandparent), Color::Red);
                self.rotate(grandparent, side.opposite());
            }
        }
        self.set_color(self.root, Color::Black);
    }

    /// Puts `new` where `old` hangs, fixing the parent link of `new`.
    fn transplant(&mut self, old: Handle, new: Option<Handle>) {
        let parent = self.parent_of(old);
        self.replace_child(parent, old, new);
        if let Some(new) = new {
            self.node_mut(new).parent = parent;
        }
    }

    fn decrement_sizes_from(&mut self, mut handle: Option<Handle>) {
        while let Some(h) = handle {
            let node = self.node_mut(h);
            node.size -= 1;
            handle = node.parent;
        }
    }

    /// Unlinks `handle` and returns its entry.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is not a live node of this tree (already removed, or from another tree
    /// whose slot no longer matches).
    pub(crate) fn remove(&mut self, handle: Handle) -> (K, V) {
        assert!(self.nodes.contains(handle), "`RawRbTree::remove()` - `handle` is not a live node of this tree!");

        let z = handle;
        let (z_left, z_right) = (self.node(z).left(), self.node(z).right());
        let removed_color;
        let x;
        let x_parent;

        if let (Some(z_left), Some(z_right)) = (z_left, z_right) {
            // Two children: the in-order successor `y` takes `z`'s place.
            let y = self.extreme(z_right, Side::Left);
            removed_color = self.node(y).color;
            x = self.node(y).right();
            let y_parent = self.parent_of(y).expect("the successor of a two-child node has a parent");
            self.decrement_sizes_from(Some(y_parent));

            if y_parent == z {
                x_parent = Some(y);
            } else {
                x_parent = Some(y_parent);
                self.transplant(y, x);
                self.node_mut(y).set_child(Side::Right, Some(z_right));
                self.node_mut(z_right).parent = Some(y);
            }

            self.transplant(z, Some(y));
            self.node_mut(y).set_child(Side::Left, Some(z_left));
            self.node_mut(z_left).parent = Some(y);
            let (z_color, z_size) = (self.node(z).color, self.node(z).size);
            let y_node = self.node_mut(y);
            y_node.color = z_color;
            y_node.size = z_size;
        } else {
            removed_color = self.node(z).color;
            x = z_left.or(z_right);
            x_parent = self.parent_of(z);
            self.decrement_sizes_from(x_parent);
            self.transplant(z, x);
        }

        self.len -= 1;
        if removed_color == Color::Black {
            self.remove_fixup(x, x_parent);
        }

        let node = self.nodes.take(z);
        (node.key, node.value)
    }

    fn remove_fixup(&mut self, mut x: Option<Handle>, mut parent: Option<Handle>) {
        while x != self.root && !self.is_red(x) {
            let p = parent.expect("a doubly black non-root position has a parent");
            let side = if self.node(p).left() == x {
                Side::Left
            } else {
                Side::Right
            };
            let other = side.opposite();
            let mut sibling = self.node(p).child(other).expect("a doubly black position has a sibling");

            if self.node(sibling).is_red() {
                self.set_color(Some(sibling), Color::Black);
                self.set_color(Some(p), Color::Red);
                self.rotate(p, side);
                sibling = self.node(p).child(other).expect("rotation leaves a sibling");
            }

            let near = self.node(sibling).child(side);
            let far = self.node(sibling).child(other);
            if !self.is_red(near) && !self.is_red(far) {
                self.set_color(Some(sibling), Color::Red);
                x = Some(p);
                parent = self.parent_of(p);
            } else {
                if !self.is_red(far) {
                    self.set_color(near, Color::Black);
                    self.set_color(Some(sibling), Color::Red);
                    self.rotate(sibling, other);
                    sibling = self.node(p).child(other).expect("rotation leaves a sibling");
                }
                let p_color = self.node(p).color;
                self.set_color(Some(sibling), p_color);
                self.set_color(Some(p), Color::Black);
                let far = self.node(sibling).child(other);
                self.set_color(far, Color::Black);
                self.rotate(p, side);
                x = self.root;
                parent = None;
            }
        }
        self.set_color(x, Color::Black);
    }

    /// Removes and returns every entry in key order.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<(K, V)> {
        let mut walk = self.walk();
        let mut handles = Vec::with_capacity(self.len);
        while let Some(handle) = walk.next_front(self) {
            handles.push(handle);
        }
        let entries = handles
            .into_iter()
            .map(|handle| {
                let node = self.nodes.take(handle);
                (node.key, node.value)
            })
            .collect();
        self.clear();
        entries
    }

    /// Builds a balanced tree from entries whose keys are strictly increasing.
    ///
    /// The tree is size-balanced, so every nil sits at depth `d` or `d + 1`; coloring the
    /// incomplete deepest level red and everything else black satisfies all red-black invariants.
    pub(crate) fn from_sorted(entries: Vec<(K, V)>) -> Self {
        let len = entries.len();
        let mut tree = Self::with_capacity(len);
        if len == 0 {
            return tree;
        }
        log::debug!("building balanced red-black tree from {len} sorted entries");

        let red_depth = if (len + 1).is_power_of_two() {
            None
        } else {
            Some(len.ilog2() as usize)
        };
        let mut entries = entries.into_iter();
        let root = tree.build(&mut entries, len, 0, red_depth);
        tree.root = Some(root);
        tree.len = len;
        tree
    }

    fn build(
        &mut self,
        entries: &mut impl Iterator<Item = (K, V)>,
        count: usize,
        depth: usize,
        red_depth: Option<usize>,
    ) -> Handle {
        let left_count = (count - 1) / 2;
        let right_count = count - 1 - left_count;

        let left = (left_count > 0).then(|| self.build(entries, left_count, depth + 1, red_depth));
        let (key, value) = entries.next().expect("entry count matches subtree size");
        let handle = self.nodes.alloc(Node::new(key, value));
        let right = (right_count > 0).then(|| self.build(entries, right_count, depth + 1, red_depth));

        for (side, child) in [(Side::Left, left), (Side::Right, right)] {
            if let Some(child) = child {
                self.node_mut(child).parent = Some(handle);
            }
            self.node_mut(handle).set_child(side, child);
        }
        let node = self.node_mut(handle);
        node.size = count;
        node.color = if red_depth == Some(depth) {
            Color::Red
        } else {
            Color::Black
        };
        handle
    }
}

impl<K: Ord, V> RawRbTree<K, V> {
    /// Finds the node holding `key`.
    pub(crate) fn find<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.node(handle);
            match key.cmp(node.key.borrow()) {
                Less => current = node.left(),
                Equal => return Some(handle),
                Greater => current = node.right(),
            }
        }
        None
    }

    /// Inserts `key` with `value`, or swaps the value of an existing equal key in place.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Insertion<V> {
        let mut parent = None;
        let mut side = Side::Left;
        let mut current = self.root;

        while let Some(handle) = current {
            let node = self.node(handle);
            match key.cmp(&node.key) {
                Less => {
                    side = Side::Left;
                    current = node.left();
                }
                Greater => {
                    side = Side::Right;
                    current = node.right();
                }
                Equal => {
                    let old = core::mem::replace(self.value_mut(handle), value);
                    return Insertion::Replaced(old);
                }
            }
            parent = Some(handle);
        }

        let handle = self.nodes.alloc(Node::new(key, value));
        self.node_mut(handle).parent = parent;
        match parent {
            None => self.root = Some(handle),
            Some(p) => self.node_mut(p).set_child(side, Some(handle)),
        }

        let mut ancestor = parent;
        while let Some(a) = ancestor {
            let node = self.node_mut(a);
            node.size += 1;
            ancestor = node.parent;
        }
        self.len += 1;

        self.insert_fixup(handle);
        Insertion::Inserted
    }
}

impl<K: Clone + Ord, V: Clone> RawRbTree<K, V> {
    /// Merges the in-order walks of two trees into a new balanced tree.
    ///
    /// Entries present in both trees take their value from `self`.
    pub(crate) fn merged(&self, other: &Self, operation: SetOperation) -> Self {
        log::debug!("merging trees of {} and {} entries ({operation:?})", self.len, other.len);

        let mut left = self.walk();
        let mut right = other.walk();
        let mut entries = Vec::new();
        let mut a = left.next_front(self);
        let mut b = right.next_front(other);

        loop {
            match (a, b) {
                (Some(x), Some(y)) => match self.key(x).cmp(other.key(y)) {
                    Less => {
                        if operation.keeps_left_only() {
                            entries.push(self.entry(x));
                        }
                        a = left.next_front(self);
                    }
                    Greater => {
                        if operation.keeps_right_only() {
                            entries.push(other.entry(y));
                        }
                        b = right.next_front(other);
                    }
                    Equal => {
                        if operation.keeps_both() {
                            entries.push(self.entry(x));
                        }
                        a = left.next_front(self);
                        b = right.next_front(other);
                    }
                },
                (Some(x), None) => {
                    if !operation.keeps_left_only() {
                        break;
                    }
                    entries.push(self.entry(x));
                    a = left.next_front(self);
                }
                (None, Some(y)) => {
                    if !operation.keeps_right_only() {
                        break;
                    }
                    entries.push(other.entry(y));
                    b = right.next_front(other);
                }
                (None, None) => break,
            }
        }

        Self::from_sorted(entries)
    }

    fn entry(&self, handle: Handle) -> (K, V) {
        let node = self.node(handle);
        (node.key.clone(), node.value.clone())
    }

    /// Clones every entry in key order.
    pub(crate) fn to_vec(&self) -> Vec<(K, V)> {
        let mut walk = self.walk();
        let mut entries = Vec::with_capacity(self.len);
        while let Some(handle) = walk.next_front(self) {
            entries.push(self.entry(handle));
        }
        entries
    }
}

impl<K: Clone + Ord, V: Clone> Clone for RawRbTree<K, V> {
    fn clone(&self) -> Self {
        Self::from_sorted(self.to_vec())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
mod tests {
    use super::*;
    use alloc::collections::BTreeSet;
    use alloc::string::String;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    impl<K: Ord, V> RawRbTree<K, V> {
        /// Validates all red-black and order-statistic invariants. Panics with a descriptive
        /// message if any are violated.
        pub(crate) fn validate_invariants(&self) {
            let mut errors: Vec<String> = Vec::new();

            match self.root {
                None => {
                    if self.len != 0 {
                        errors.push(alloc::format!("empty tree has len {}", self.len));
                    }
                }
                Some(root) => {
                    if self.node(root).is_red() {
                        errors.push("root is red".into());
                    }
                    if self.parent_of(root).is_some() {
                        errors.push("root has a parent".into());
                    }
                    let (size, _) = self.validate_node(root, &mut errors);
                    if size != self.len {
                        errors.push(alloc::format!("len mismatch: self.len={}, counted={size}", self.len));
                    }
                }
            }

            if self.nodes.len() != self.len {
                errors.push(alloc::format!("arena holds {} nodes, len is {}", self.nodes.len(), self.len));
            }

            assert!(errors.is_empty(), "Tree invariant violations:\n{}", errors.join("\n"));
        }

        // Returns (subtree size, black height).
        fn validate_node(&self, handle: Handle, errors: &mut Vec<String>) -> (usize, usize) {
            let node = self.node(handle);
            let mut sizes = [0usize; 2];
            let mut heights = [0usize; 2];

            for (i, side) in [Side::Left, Side::Right].into_iter().enumerate() {
                let Some(child) = node.child(side) else {
                    continue;
                };
                if self.parent_of(child) != Some(handle) {
                    errors.push(alloc::format!("{child:?} does not point back to parent {handle:?}"));
                }
                if node.is_red() && self.node(child).is_red() {
                    errors.push(alloc::format!("red {handle:?} has red child {child:?}"));
                }
                let in_order = match side {
                    Side::Left => self.node(child).key < node.key,
                    Side::Right => self.node(child).key > node.key,
                };
                if !in_order {
                    errors.push(alloc::format!("{child:?} is on the wrong side of {handle:?}"));
                }
                (sizes[i], heights[i]) = self.validate_node(child, errors);
            }

            if heights[0] != heights[1] {
                errors.push(alloc::format!(
                    "black height mismatch under {handle:?}: left={}, right={}",
                    heights[0],
                    heights[1]
                ));
            }
            let size = 1 + sizes[0] + sizes[1];
            if node.size != size {
                errors.push(alloc::format!("size mismatch at {handle:?}: stored={}, actual={size}", node.size));
            }
            (size, heights[0] + usize::from(!node.is_red()))
        }

        fn keys(&self) -> Vec<&K> {
            let mut walk = self.walk();
            let mut keys = Vec::new();
            while let Some(handle) = walk.next_front(self) {
                keys.push(self.key(handle));
            }
            keys
        }
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(i32),
        Remove(i32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0i32..1000).prop_map(Op::Insert),
            2 => (0i32..1000).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn tree_invariants_maintained_after_operations(ops in prop::collection::vec(op_strategy(), 0..500)) {
            let mut tree: RawRbTree<i32, i32> = RawRbTree::new();
            let mut expected: BTreeSet<i32> = BTreeSet::new();

            for op in ops {
                match op {
                    Op::Insert(key) => {
                        let inserted = matches!(tree.insert(key, key * 2), Insertion::Inserted);
                        prop_assert_eq!(inserted, expected.insert(key));
                    }
                    Op::Remove(key) => {
                        let found = tree.find(&key);
                        prop_assert_eq!(found.is_some(), expected.remove(&key));
                        if let Some(handle) = found {
                            prop_assert_eq!(tree.remove(handle), (key, key * 2));
                        }
                    }
                }
                tree.validate_invariants();
            }

            let keys: Vec<i32> = tree.keys().into_iter().copied().collect();
            let model: Vec<i32> = expected.into_iter().collect();
            prop_assert_eq!(keys, model);
        }

        #[test]
        fn rank_roundtrip(ops in prop::collection::vec(op_strategy(), 1..300)) {
            let mut tree: RawRbTree<i32, ()> = RawRbTree::new();
            for op in ops {
                match op {
                    Op::Insert(key) => {
                        tree.insert(key, ());
                    }
                    Op::Remove(key) => {
                        if let Some(handle) = tree.find(&key) {
                            tree.remove(handle);
                        }
                    }
                }
            }
            tree.validate_invariants();

            for rank in 0..tree.len() {
                let handle = tree.node_at(rank).expect("rank below len resolves");
                prop_assert_eq!(tree.rank_of(handle), rank);
            }
            prop_assert!(tree.node_at(tree.len()).is_none());

            let mut walk = tree.walk();
            while let Some(handle) = walk.next_front(&tree) {
                prop_assert_eq!(tree.node_at(tree.rank_of(handle)), Some(handle));
            }
        }

        #[test]
        fn from_sorted_is_valid(len in 0usize..600) {
            let entries: Vec<(usize, usize)> = (0..len).map(|i| (i * 3, i)).collect();
            let tree = RawRbTree::from_sorted(entries);
            tree.validate_invariants();
            prop_assert_eq!(tree.len(), len);
            for rank in 0..len {
                let handle = tree.node_at(rank).expect("rank below len resolves");
                prop_assert_eq!(*tree.key(handle), rank * 3);
                prop_assert_eq!(*tree.value(handle), rank);
            }
        }

        #[test]
        fn merged_matches_btreeset(
            a in prop::collection::btree_set(0i32..200, 0..100),
            b in prop::collection::btree_set(0i32..200, 0..100),
        ) {
            let left = RawRbTree::from_sorted(a.iter().map(|&k| (k, ())).collect());
            let right = RawRbTree::from_sorted(b.iter().map(|&k| (k, ())).collect());

            let cases = [
                (SetOperation::Union, a.union(&b).copied().collect::<Vec<_>>()),
                (SetOperation::Intersection, a.intersection(&b).copied().collect()),
                (SetOperation::Difference, a.difference(&b).copied().collect()),
                (SetOperation::SymmetricDifference, a.symmetric_difference(&b).copied().collect()),
            ];
            for (operation, expected) in cases {
                let merged = left.merged(&right, operation);
                merged.validate_invariants();
                let keys: Vec<i32> = merged.keys().into_iter().copied().collect();
                prop_assert_eq!(keys, expected, "{:?}", operation);
            }
        }
    }

    #[test]
    fn empty_tree_navigation() {
        let tree: RawRbTree<i32, ()> = RawRbTree::new();
        tree.validate_invariants();
        assert!(tree.min().is_none());
        assert!(tree.max().is_none());
        assert!(tree.node_at(0).is_none());
        assert!(tree.find(&1).is_none());
        assert_eq!(tree.walk().remaining(), 0);
    }

    #[test]
    fn successor_and_predecessor_walk_the_whole_tree() {
        let mut tree: RawRbTree<i32, ()> = RawRbTree::new();
        for key in [50, 20, 80, 10, 30, 70, 90, 60, 40] {
            tree.insert(key, ());
        }
        tree.validate_invariants();

        let mut forward = Vec::new();
        let mut current = tree.min();
        while let Some(handle) = current {
            forward.push(*tree.key(handle));
            current = tree.successor(handle);
        }
        assert_eq!(forward, [10, 20, 30, 40, 50, 60, 70, 80, 90]);

        let mut backward = Vec::new();
        let mut current = tree.max();
        while let Some(handle) = current {
            backward.push(*tree.key(handle));
            current = tree.predecessor(handle);
        }
        assert_eq!(backward, [90, 80, 70, 60, 50, 40, 30, 20, 10]);

        let max = tree.max().expect("non-empty");
        assert!(tree.successor(max).is_none());
        let min = tree.min().expect("non-empty");
        assert!(tree.predecessor(min).is_none());
    }

    #[test]
    fn insert_existing_key_replaces_value_in_place() {
        let mut tree: RawRbTree<i32, &str> = RawRbTree::new();
        assert!(matches!(tree.insert(1, "a"), Insertion::Inserted));
        let first = tree.find(&1).expect("just inserted");
        match tree.insert(1, "z") {
            Insertion::Replaced(old) => assert_eq!(old, "a"),
            Insertion::Inserted => panic!("existing key must be replaced"),
        }
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.find(&1), Some(first));
        assert_eq!(*tree.value(first), "z");
    }

    #[test]
    #[should_panic(expected = "`RawRbTree::remove()` - `handle` is not a live node of this tree!")]
    fn removing_a_stale_handle_panics() {
        let mut tree: RawRbTree<i32, ()> = RawRbTree::new();
        tree.insert(7, ());
        let handle = tree.find(&7).expect("just inserted");
        tree.remove(handle);
        tree.remove(handle);
    }

    #[test]
    fn ascending_and_descending_inserts_stay_balanced() {
        let mut tree: RawRbTree<u32, ()> = RawRbTree::new();
        for key in 0..1024 {
            tree.insert(key, ());
        }
        for key in (2000..3024).rev() {
            tree.insert(key, ());
        }
        tree.validate_invariants();

        // A red-black tree of n nodes has height at most 2 log2(n + 1).
        let bound = 2 * ((tree.len() + 1).ilog2() as usize + 1);
        let mut walk = tree.walk();
        while let Some(handle) = walk.next_front(&tree) {
            let mut depth = 0;
            let mut current = handle;
            while let Some(parent) = tree.parent_of(current) {
                depth += 1;
                current = parent;
            }
            assert!(depth <= bound, "depth {depth} exceeds {bound}");
        }
    }

    #[test]
    fn drain_returns_entries_in_order() {
        let mut tree: RawRbTree<i32, char> = RawRbTree::new();
        for (key, value) in [(3, 'c'), (1, 'a'), (2, 'b')] {
            tree.insert(key, value);
        }
        assert_eq!(tree.drain_to_vec(), [(1, 'a'), (2, 'b'), (3, 'c')]);
        assert!(tree.is_empty());
        tree.validate_invariants();
    }
}
