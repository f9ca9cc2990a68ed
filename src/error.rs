use thiserror::Error;

/// Errors raised by cursor operations.
///
/// Apart from [`Invalidated`](CursorError::Invalidated), these are usage errors: the caller asked
/// for something a cursor at that position can never do.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Error)]
pub enum CursorError {
    /// The container was structurally modified after the cursor was created, or dropped.
    #[error("cursor is invalidated")]
    Invalidated,
    /// The two cursors belong to different container instances.
    #[error("comparing cursors from different containers is undefined")]
    ForeignContainer,
    /// The destination of an offset lies outside `[0, len]`.
    ///
    /// `offset` is the step along the cursor's direction. Subtracting `n` reports `-n`, and
    /// subtracting `isize::MIN` reports `isize::MAX`.
    #[error("offset should be in range [{min}, {max}], but found {offset}")]
    OutOfRange {
        offset: isize,
        min: isize,
        max: isize,
    },
    /// An offset other than zero was requested on an empty container.
    #[error("container is empty")]
    EmptyContainer,
    /// The cursor is positioned at end and has no element to read or write.
    #[error("dereferencing an end cursor is undefined")]
    DereferenceEnd,
    /// The cursor is positioned at end and cannot step forward.
    #[error("advancing an end cursor is undefined")]
    AdvanceEnd,
    /// The cursor is positioned at the first element and cannot step backward.
    #[error("retreating a cursor at the first position is undefined")]
    RetreatBegin,
}

/// Errors raised by container operations the caller can reasonably recover from.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Error)]
pub enum ContainerError {
    /// The requested key, element or value is not present.
    #[error("value not found")]
    NotFound,
    /// The operation needs at least one element.
    #[error("container is empty")]
    Empty,
    /// A sequence index is not below the sequence length.
    #[error("index should be less than {len}, but found {index}")]
    IndexOutOfRange { index: usize, len: usize },
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn messages_name_the_valid_interval() {
        let error = CursorError::OutOfRange {
            offset: 9,
            min: -2,
            max: 5,
        };
        assert_eq!(error.to_string(), "offset should be in range [-2, 5], but found 9");
        assert_eq!(
            ContainerError::IndexOutOfRange {
                index: 4,
                len: 4
            }
            .to_string(),
            "index should be less than 4, but found 4"
        );
    }
}
