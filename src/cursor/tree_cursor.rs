use alloc::rc::{Rc, Weak};
use core::cell::RefCell;
use core::cmp::Ordering;
use core::fmt;
use core::marker::PhantomData;
use core::ops::{Add, AddAssign, Sub, SubAssign};

use super::{Direction, Forward, checked_destination, negated};
use crate::raw::{Handle, RawRbTree};
use crate::tokenization::Token;
use crate::{CursorError, Rank};

pub(crate) type SharedTree<K, V> = Rc<RefCell<RawRbTree<K, V>>>;

/// A cursor into an [`OrderedSet`](crate::OrderedSet) or [`OrderedMap`](crate::OrderedMap).
///
/// The cursor stores its rank along `D` together with the node it rests on, so stepping costs one
/// successor or predecessor lookup and offsetting costs one rank descent. It holds only a weak
/// reference to the tree and never keeps the container alive.
///
/// Reading through a cursor returns clones: the tree lives behind a `RefCell` owned by the
/// container, so no reference can outlive the call.
///
/// # Examples
///
/// ```
/// use rbcursor::{CursorError, OrderedSet};
///
/// let mut set = OrderedSet::from([3, 1, 4, 1, 5, 9, 2, 6]);
/// let cursor = set.begin() + 3;
/// assert_eq!(cursor.element(), Ok(4));
///
/// set.discard(&4);
/// assert_eq!(cursor.element(), Err(CursorError::Invalidated));
/// assert_eq!((set.begin() + 3).element(), Ok(5));
/// ```
pub struct TreeCursor<K, V, D: Direction = Forward> {
    tree: Weak<RefCell<RawRbTree<K, V>>>,
    token: Token,
    rank: usize,
    node: Option<Handle>,
    direction: PhantomData<D>,
}

/// Node at `rank` along `D`; `None` is end.
fn node_along<K, V, D: Direction>(tree: &RawRbTree<K, V>, rank: usize) -> Option<Handle> {
    if D::REVERSED {
        let len = tree.len();
        if rank < len { tree.node_at(len - 1 - rank) } else { None }
    } else {
        tree.node_at(rank)
    }
}

impl<K, V, D: Direction> TreeCursor<K, V, D> {
    /// A cursor at `rank` along `D`, which must be in `[0, len]`.
    pub(crate) fn at_rank(tree: &SharedTree<K, V>, token: Token, rank: usize) -> Self {
        let node = node_along::<K, V, D>(&tree.borrow(), rank);
        TreeCursor {
            tree: Rc::downgrade(tree),
            token,
            rank,
            node,
            direction: PhantomData,
        }
    }

    /// A cursor resting on `node`, which must be live in `tree`.
    pub(crate) fn at_node(tree: &SharedTree<K, V>, token: Token, node: Handle) -> Self {
        let rank = {
            let tree = tree.borrow();
            let rank = tree.rank_of(node);
            if D::REVERSED { tree.len() - 1 - rank } else { rank }
        };
        TreeCursor {
            tree: Rc::downgrade(tree),
            token,
            rank,
            node: Some(node),
            direction: PhantomData,
        }
    }

    fn storage(&self) -> Result<SharedTree<K, V>, CursorError> {
        if self.token.expired() {
            return Err(CursorError::Invalidated);
        }
        self.tree.upgrade().ok_or(CursorError::Invalidated)
    }

    /// The node this cursor rests on, after checking that it belongs to `tree` and is still valid.
    /// `None` is end.
    pub(crate) fn node_in(&self, tree: &SharedTree<K, V>) -> Result<Option<Handle>, CursorError> {
        let storage = self.storage()?;
        if !Rc::ptr_eq(&storage, tree) {
            return Err(CursorError::ForeignContainer);
        }
        Ok(self.node)
    }

    fn read<R>(&self, read: impl FnOnce(&RawRbTree<K, V>, Handle) -> R) -> Result<R, CursorError> {
        let storage = self.storage()?;
        let node = self.node.ok_or(CursorError::DereferenceEnd)?;
        let tree = storage.borrow();
        Ok(read(&tree, node))
    }

    /// Returns the rank of this cursor along its direction. The end cursor's rank is `len`.
    ///
    /// # Errors
    ///
    /// [`CursorError::Invalidated`] if the container changed structurally since the cursor was
    /// created.
    pub fn rank(&self) -> Result<Rank, CursorError> {
        self.storage()?;
        Ok(Rank(self.rank))
    }

    /// Returns true if this cursor is at the end position.
    ///
    /// # Errors
    ///
    /// [`CursorError::Invalidated`] for a stale cursor.
    pub fn is_end(&self) -> Result<bool, CursorError> {
        self.storage()?;
        Ok(self.node.is_none())
    }

    /// Moves one position along the direction.
    ///
    /// # Errors
    ///
    /// [`CursorError::Invalidated`] for a stale cursor, [`CursorError::AdvanceEnd`] at end.
    ///
    /// # Complexity
    ///
    /// O(log n) worst case, amortized O(1) over a full traversal.
    pub fn advance(&mut self) -> Result<(), CursorError> {
        let storage = self.storage()?;
        let node = self.node.ok_or(CursorError::AdvanceEnd)?;
        let tree = storage.borrow();
        self.node = if D::REVERSED { tree.predecessor(node) } else { tree.successor(node) };
        self.rank += 1;
        Ok(())
    }

    /// Moves one position against the direction. Retreating from end lands on the last element.
    ///
    /// # Errors
    ///
    /// [`CursorError::Invalidated`] for a stale cursor, [`CursorError::RetreatBegin`] at rank 0.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn retreat(&mut self) -> Result<(), CursorError> {
        let storage = self.storage()?;
        if self.rank == 0 {
            return Err(CursorError::RetreatBegin);
        }
        let tree = storage.borrow();
        self.node = match (self.node, D::REVERSED) {
            (Some(node), false) => tree.predecessor(node),
            (Some(node), true) => tree.successor(node),
            (None, false) => tree.max(),
            (None, true) => tree.min(),
        };
        self.rank -= 1;
        Ok(())
    }

    /// Returns a new cursor `offset` positions away along the direction.
    ///
    /// # Errors
    ///
    /// [`CursorError::Invalidated`] for a stale cursor, [`CursorError::OutOfRange`] when the
    /// destination leaves `[0, len]`, or [`CursorError::EmptyContainer`] for a non-zero offset on an
    /// empty container.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn offset(&self, offset: isize) -> Result<Self, CursorError> {
        let storage = self.storage()?;
        let tree = storage.borrow();
        let rank = checked_destination(self.rank, offset, tree.len())?;
        Ok(TreeCursor {
            tree: self.tree.clone(),
            token: self.token.clone(),
            rank,
            node: node_along::<K, V, D>(&tree, rank),
            direction: PhantomData,
        })
    }

    /// Moves this cursor `offset` positions along the direction. On error the cursor is unchanged.
    ///
    /// # Errors
    ///
    /// See [`offset`](Self::offset).
    pub fn offset_by(&mut self, offset: isize) -> Result<(), CursorError> {
        *self = self.offset(offset)?;
        Ok(())
    }

    /// Compares the positions of two cursors of the same container.
    ///
    /// # Errors
    ///
    /// [`CursorError::Invalidated`] if either cursor is stale, [`CursorError::ForeignContainer`]
    /// if they belong to different containers.
    pub fn try_cmp(&self, other: &Self) -> Result<Ordering, CursorError> {
        self.storage()?;
        other.storage()?;
        if !Weak::ptr_eq(&self.tree, &other.tree) {
            return Err(CursorError::ForeignContainer);
        }
        Ok(self.rank.cmp(&other.rank))
    }

    /// Returns true if both cursors rest on the same position of the same container.
    ///
    /// # Errors
    ///
    /// See [`try_cmp`](Self::try_cmp).
    pub fn try_eq(&self, other: &Self) -> Result<bool, CursorError> {
        self.try_cmp(other).map(Ordering::is_eq)
    }
}

impl<K: Clone, V, D: Direction> TreeCursor<K, V, D> {
    /// Returns a clone of the key under the cursor.
    ///
    /// # Errors
    ///
    /// [`CursorError::Invalidated`] for a stale cursor, [`CursorError::DereferenceEnd`] at end.
    pub fn key(&self) -> Result<K, CursorError> {
        self.read(|tree, node| tree.key(node).clone())
    }
}

impl<K, V: Clone, D: Direction> TreeCursor<K, V, D> {
    /// Returns a clone of the value under the cursor.
    ///
    /// The value is read at call time, so an in-place overwrite through
    /// [`OrderedMap::upsert`](crate::OrderedMap::upsert) is visible to an existing cursor.
    ///
    /// # Errors
    ///
    /// [`CursorError::Invalidated`] for a stale cursor, [`CursorError::DereferenceEnd`] at end.
    pub fn value(&self) -> Result<V, CursorError> {
        self.read(|tree, node| tree.value(node).clone())
    }
}

impl<K: Clone, V: Clone, D: Direction> TreeCursor<K, V, D> {
    /// Returns clones of the key and value under the cursor.
    ///
    /// # Errors
    ///
    /// [`CursorError::Invalidated`] for a stale cursor, [`CursorError::DereferenceEnd`] at end.
    pub fn item(&self) -> Result<(K, V), CursorError> {
        self.read(|tree, node| (tree.key(node).clone(), tree.value(node).clone()))
    }
}

impl<K, V, D: Direction> Clone for TreeCursor<K, V, D> {
    fn clone(&self) -> Self {
        TreeCursor {
            tree: self.tree.clone(),
            token: self.token.clone(),
            rank: self.rank,
            node: self.node,
            direction: PhantomData,
        }
    }
}

impl<K, V, D: Direction> fmt::Debug for TreeCursor<K, V, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeCursor")
            .field("rank", &self.rank)
            .field("end", &self.node.is_none())
            .field("reversed", &D::REVERSED)
            .field("expired", &self.token.expired())
            .finish()
    }
}

/// Compares positions.
///
/// # Panics
///
/// Panics if either cursor is invalidated or the cursors belong to different containers. Use
/// [`TreeCursor::try_eq`] to handle those cases.
impl<K, V, D: Direction> PartialEq for TreeCursor<K, V, D> {
    fn eq(&self, other: &Self) -> bool {
        self.try_eq(other).unwrap_or_else(|error| panic!("{error}"))
    }
}

/// Orders positions by rank along the direction.
///
/// # Panics
///
/// Panics under the same conditions as [`PartialEq`]. Use [`TreeCursor::try_cmp`] to handle them.
impl<K, V, D: Direction> PartialOrd for TreeCursor<K, V, D> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.try_cmp(other).unwrap_or_else(|error| panic!("{error}")))
    }
}

/// Offsets the cursor along its direction.
///
/// # Panics
///
/// Panics if [`TreeCursor::offset`] fails.
impl<K, V, D: Direction> Add<isize> for TreeCursor<K, V, D> {
    type Output = Self;

    fn add(self, offset: isize) -> Self {
        self.offset(offset).unwrap_or_else(|error| panic!("{error}"))
    }
}

/// Offsets the cursor against its direction, as `offset(-n)` would.
///
/// # Panics
///
/// Panics if [`TreeCursor::offset`] fails. `isize::MIN` is always out of range and is reported as an
/// offset of `isize::MAX`.
impl<K, V, D: Direction> Sub<isize> for TreeCursor<K, V, D> {
    type Output = Self;

    fn sub(self, offset: isize) -> Self {
        self.offset(negated(offset)).unwrap_or_else(|error| panic!("{error}"))
    }
}

impl<K, V, D: Direction> AddAssign<isize> for TreeCursor<K, V, D> {
    fn add_assign(&mut self, offset: isize) {
        self.offset_by(offset).unwrap_or_else(|error| panic!("{error}"));
    }
}

impl<K, V, D: Direction> SubAssign<isize> for TreeCursor<K, V, D> {
    fn sub_assign(&mut self, offset: isize) {
        self.offset_by(negated(offset)).unwrap_or_else(|error| panic!("{error}"));
    }
}
