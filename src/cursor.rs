//! Cursors: positions into a container that detect structural mutation.
//!
//! A cursor is a rank in `0..=len` along its [`Direction`] plus a [`Token`] from the container's
//! tokenizer. Rank `len` is the end position. Every operation first checks the token and fails
//! with [`CursorError::Invalidated`] once the container has been structurally modified (or
//! dropped) since the cursor was created.
//!
//! [`Token`]: crate::tokenization::Token

use crate::CursorError;

mod sequence_cursor;
mod tree_cursor;

pub(crate) use sequence_cursor::SharedVec;
pub use sequence_cursor::SequenceCursor;
pub(crate) use tree_cursor::SharedTree;
pub use tree_cursor::TreeCursor;

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Forward {}
    impl Sealed for super::Reverse {}
}

/// Iteration direction of a cursor, resolved at compile time.
///
/// This trait is sealed; [`Forward`] and [`Reverse`] are its only implementors.
pub trait Direction: sealed::Sealed + 'static {
    /// True when rank 0 is the last element of the container.
    const REVERSED: bool;
}

/// Ascending order for trees, increasing index for sequences.
#[derive(Debug)]
pub enum Forward {}

/// Descending order for trees, decreasing index for sequences.
#[derive(Debug)]
pub enum Reverse {}

impl Direction for Forward {
    const REVERSED: bool = false;
}

impl Direction for Reverse {
    const REVERSED: bool = true;
}

/// Resolves `rank + offset`, which must land in `[0, len]`.
#[allow(clippy::cast_possible_wrap)] // container lengths never exceed `isize::MAX`
pub(crate) fn checked_destination(rank: usize, offset: isize, len: usize) -> Result<usize, CursorError> {
    rank.checked_add_signed(offset).filter(|&destination| destination <= len).ok_or(if len == 0 {
        CursorError::EmptyContainer
    } else {
        CursorError::OutOfRange {
            offset,
            min: -(rank as isize),
            max: (len - rank) as isize,
        }
    })
}

/// Negates an offset for subtraction. `isize::MIN` saturates to `isize::MAX`, which no container
/// can reach either.
pub(crate) const fn negated(offset: isize) -> isize {
    match offset.checked_neg() {
        Some(negated) => negated,
        None => isize::MAX,
    }
}
