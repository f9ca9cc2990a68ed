/// A zero-based position in the iteration order of a container.
///
/// For ordered sets and maps this is the position in sorted order; for a [`Sequence`] it is the
/// index. Reverse cursors count ranks from the back.
///
/// [`Sequence`]: crate::Sequence
///
/// # Examples
///
/// ```
/// use rbcursor::{OrderedSet, Rank};
///
/// let set = OrderedSet::from([30, 10, 20]);
/// let cursor = set.cursor_at(Rank(1)).unwrap();
/// assert_eq!(cursor.element(), Ok(20));
/// assert_eq!(cursor.rank(), Ok(Rank(1)));
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Rank(pub usize);
