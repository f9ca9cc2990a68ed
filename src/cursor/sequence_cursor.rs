use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::cmp::Ordering;
use core::fmt;
use core::marker::PhantomData;
use core::ops::{Add, AddAssign, Sub, SubAssign};

use super::{Direction, Forward, checked_destination, negated};
use crate::tokenization::Token;
use crate::{CursorError, Rank};

pub(crate) type SharedVec<T> = Rc<RefCell<Vec<T>>>;

/// A cursor into a [`Sequence`](crate::Sequence).
///
/// The cursor remembers a boundary between elements rather than a rank: a forward cursor rests
/// before element `boundary`, a reverse cursor after element `boundary - 1`. Pushing onto a
/// sequence without reallocating keeps existing cursors valid, and their boundaries keep
/// naming the same elements; a forward end cursor then rests on the pushed element.
///
/// # Examples
///
/// ```
/// use rbcursor::Sequence;
///
/// let sequence = Sequence::from([10, 20, 30]);
/// let mut cursor = sequence.rbegin();
/// assert_eq!(cursor.value(), Ok(30));
///
/// cursor.set_value(31).unwrap();
/// cursor.advance().unwrap();
/// assert_eq!(cursor.value(), Ok(20));
/// assert_eq!(sequence.get(2), Ok(31));
/// ```
pub struct SequenceCursor<T, D: Direction = Forward> {
    storage: Weak<RefCell<Vec<T>>>,
    token: Token,
    boundary: usize,
    direction: PhantomData<D>,
}

const fn rank_of<D: Direction>(boundary: usize, len: usize) -> usize {
    if D::REVERSED { len - boundary } else { boundary }
}

const fn boundary_of<D: Direction>(rank: usize, len: usize) -> usize {
    if D::REVERSED { len - rank } else { rank }
}

impl<T, D: Direction> SequenceCursor<T, D> {
    /// A cursor at `rank` along `D`, which must be in `[0, len]`.
    pub(crate) fn at_rank(storage: &SharedVec<T>, token: Token, rank: usize) -> Self {
        let len = storage.borrow().len();
        SequenceCursor {
            storage: Rc::downgrade(storage),
            token,
            boundary: boundary_of::<D>(rank, len),
            direction: PhantomData,
        }
    }

    fn storage(&self) -> Result<SharedVec<T>, CursorError> {
        if self.token.expired() {
            return Err(CursorError::Invalidated);
        }
        self.storage.upgrade().ok_or(CursorError::Invalidated)
    }

    /// Index of the element under the cursor, or `None` at end.
    const fn index(&self, len: usize) -> Option<usize> {
        if D::REVERSED {
            self.boundary.checked_sub(1)
        } else if self.boundary < len {
            Some(self.boundary)
        } else {
            None
        }
    }

    /// The index this cursor rests on in `storage`, after checking ownership and validity.
    /// `None` is end.
    pub(crate) fn index_in(&self, storage: &SharedVec<T>) -> Result<Option<usize>, CursorError> {
        let own = self.storage()?;
        if !Rc::ptr_eq(&own, storage) {
            return Err(CursorError::ForeignContainer);
        }
        let len = own.borrow().len();
        Ok(self.index(len))
    }

    /// Returns the rank of this cursor along its direction. The end cursor's rank is `len`.
    ///
    /// # Errors
    ///
    /// [`CursorError::Invalidated`] for a stale cursor.
    pub fn rank(&self) -> Result<Rank, CursorError> {
        let storage = self.storage()?;
        let len = storage.borrow().len();
        Ok(Rank(rank_of::<D>(self.boundary, len)))
    }

    /// Returns true if this cursor is at the end position.
    ///
    /// # Errors
    ///
    /// [`CursorError::Invalidated`] for a stale cursor.
    pub fn is_end(&self) -> Result<bool, CursorError> {
        let storage = self.storage()?;
        let len = storage.borrow().len();
        Ok(self.index(len).is_none())
    }

    /// Moves one position along the direction.
    ///
    /// # Errors
    ///
    /// [`CursorError::Invalidated`] for a stale cursor, [`CursorError::AdvanceEnd`] at end.
    pub fn advance(&mut self) -> Result<(), CursorError> {
        let storage = self.storage()?;
        let len = storage.borrow().len();
        if self.index(len).is_none() {
            return Err(CursorError::AdvanceEnd);
        }
        if D::REVERSED {
            self.boundary -= 1;
        } else {
            self.boundary += 1;
        }
        Ok(())
    }

    /// Moves one position against the direction. Retreating from end lands on the last element.
    ///
    /// # Errors
    ///
    /// [`CursorError::Invalidated`] for a stale cursor, [`CursorError::RetreatBegin`] at rank 0.
    pub fn retreat(&mut self) -> Result<(), CursorError> {
        let storage = self.storage()?;
        let len = storage.borrow().len();
        if rank_of::<D>(self.boundary, len) == 0 {
            return Err(CursorError::RetreatBegin);
        }
        if D::REVERSED {
            self.boundary += 1;
        } else {
            self.boundary -= 1;
        }
        Ok(())
    }

    /// Returns a new cursor `offset` positions away along the direction.
    ///
    /// # Errors
    ///
    /// [`CursorError::Invalidated`] for a stale cursor, [`CursorError::OutOfRange`] when the
    /// destination leaves `[0, len]`, or [`CursorError::EmptyContainer`] for a non-zero offset on an
    /// empty sequence.
    pub fn offset(&self, offset: isize) -> Result<Self, CursorError> {
        let storage = self.storage()?;
        let len = storage.borrow().len();
        let rank = checked_destination(rank_of::<D>(self.boundary, len), offset, len)?;
        Ok(SequenceCursor {
            storage: self.storage.clone(),
            token: self.token.clone(),
            boundary: boundary_of::<D>(rank, len),
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

    /// Compares the positions of two cursors of the same sequence.
    ///
    /// # Errors
    ///
    /// [`CursorError::Invalidated`] if either cursor is stale, [`CursorError::ForeignContainer`]
    /// if they belong to different sequences.
    pub fn try_cmp(&self, other: &Self) -> Result<Ordering, CursorError> {
        self.storage()?;
        other.storage()?;
        if !Weak::ptr_eq(&self.storage, &other.storage) {
            return Err(CursorError::ForeignContainer);
        }
        let ordering = self.boundary.cmp(&other.boundary);
        Ok(if D::REVERSED { ordering.reverse() } else { ordering })
    }

    /// Returns true if both cursors rest on the same position of the same sequence.
    ///
    /// # Errors
    ///
    /// See [`try_cmp`](Self::try_cmp).
    pub fn try_eq(&self, other: &Self) -> Result<bool, CursorError> {
        self.try_cmp(other).map(Ordering::is_eq)
    }

    /// Overwrites the element under the cursor. This never invalidates cursors.
    ///
    /// # Errors
    ///
    /// [`CursorError::Invalidated`] for a stale cursor, [`CursorError::DereferenceEnd`] at end.
    pub fn set_value(&self, value: T) -> Result<(), CursorError> {
        let storage = self.storage()?;
        let mut elements = storage.borrow_mut();
        let index = self.index(elements.len()).ok_or(CursorError::DereferenceEnd)?;
        elements[index] = value;
        Ok(())
    }
}

impl<T: Clone, D: Direction> SequenceCursor<T, D> {
    /// Returns a clone of the element under the cursor.
    ///
    /// # Errors
    ///
    /// [`CursorError::Invalidated`] for a stale cursor, [`CursorError::DereferenceEnd`] at end.
    pub fn value(&self) -> Result<T, CursorError> {
        let storage = self.storage()?;
        let elements = storage.borrow();
        let index = self.index(elements.len()).ok_or(CursorError::DereferenceEnd)?;
        Ok(elements[index].clone())
    }
}

impl<T, D: Direction> Clone for SequenceCursor<T, D> {
    fn clone(&self) -> Self {
        SequenceCursor {
            storage: self.storage.clone(),
            token: self.token.clone(),
            boundary: self.boundary,
            direction: PhantomData,
        }
    }
}

impl<T, D: Direction> fmt::Debug for SequenceCursor<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceCursor")
            .field("boundary", &self.boundary)
            .field("reversed", &D::REVERSED)
            .field("expired", &self.token.expired())
            .finish()
    }
}

/// Compares positions.
///
/// # Panics
///
/// Panics if either cursor is invalidated or the cursors belong to different sequences.
impl<T, D: Direction> PartialEq for SequenceCursor<T, D> {
    fn eq(&self, other: &Self) -> bool {
        self.try_eq(other).unwrap_or_else(|error| panic!("{error}"))
    }
}

impl<T, D: Direction> PartialOrd for SequenceCursor<T, D> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.try_cmp(other).unwrap_or_else(|error| panic!("{error}")))
    }
}

impl<T, D: Direction> Add<isize> for SequenceCursor<T, D> {
    type Output = Self;

    fn add(self, offset: isize) -> Self {
        self.offset(offset).unwrap_or_else(|error| panic!("{error}"))
    }
}

impl<T, D: Direction> Sub<isize> for SequenceCursor<T, D> {
    type Output = Self;

    fn sub(self, offset: isize) -> Self {
        self.offset(negated(offset)).unwrap_or_else(|error| panic!("{error}"))
    }
}

impl<T, D: Direction> AddAssign<isize> for SequenceCursor<T, D> {
    fn add_assign(&mut self, offset: isize) {
        self.offset_by(offset).unwrap_or_else(|error| panic!("{error}"));
    }
}

impl<T, D: Direction> SubAssign<isize> for SequenceCursor<T, D> {
    fn sub_assign(&mut self, offset: isize) {
        self.offset_by(negated(offset)).unwrap_or_else(|error| panic!("{error}"));
    }
}
