//! Ordered collections with invalidation-checked cursors.
//!
//! This crate provides [`OrderedSet`], [`OrderedMap`] and [`Sequence`]. Besides iterators, each
//! container hands out cursors: positions that can be stepped in either direction, offset by an
//! arbitrary distance and compared, in the manner of systems-language container iterators.
//!
//! Cursors never dangle. Every container owns a [`Tokenizer`](tokenization::Tokenizer), and every
//! cursor carries a token from it. A call that structurally modifies the container resets the
//! tokenizer once, which expires all outstanding tokens in O(1); any later use of an old cursor
//! fails with [`CursorError::Invalidated`]. Calls that move nothing (overwriting a map value,
//! inserting an element already present, discarding an absent one) leave cursors valid.
//!
//! # Example
//!
//! ```
//! use rbcursor::{CursorError, OrderedMap, Rank};
//!
//! let mut scores = OrderedMap::new();
//! scores.insert("Alice", 100);
//! scores.insert("Bob", 85);
//! scores.insert("Carol", 92);
//!
//! // Cursors offset in O(log n).
//! let median = scores.begin() + 1;
//! assert_eq!(median.item(), Ok(("Bob", 85)));
//! assert_eq!(median.rank(), Ok(Rank(1)));
//!
//! // Overwriting a value keeps the cursor.
//! scores.upsert("Bob", 88);
//! assert_eq!(median.value(), Ok(88));
//!
//! // Inserting a key does not.
//! scores.upsert("Dave", 70);
//! assert_eq!(median.value(), Err(CursorError::Invalidated));
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **O(log n) rank operations** - Red-black tree with subtree size augmentation
//! - **O(1) invalidation** - No registry of live cursors, no per-cursor bookkeeping
//! - **Direction as a type** - [`Forward`] and [`Reverse`] cursors share one implementation
//!
//! # Implementation
//!
//! Tree nodes live in an arena and link to their children and parent through generational
//! handles, so parent links never own anything and stale handles are caught. Containers keep
//! their storage behind `Rc<RefCell<_>>` and cursors hold a `Weak` reference to it, so a cursor
//! never keeps a container alive. Consequently the containers are neither `Send` nor `Sync`, and
//! elements are read out by cloning.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod order_statistic;
mod raw;

pub mod cursor;
pub mod ordered_map;
pub mod ordered_set;
pub mod sequence;
pub mod tokenization;

pub use cursor::{Direction, Forward, Reverse, SequenceCursor, TreeCursor};
pub use error::{ContainerError, CursorError};
pub use order_statistic::Rank;
pub use ordered_map::{MapCursor, OrderedMap};
pub use ordered_set::{OrderedSet, SetCursor};
pub use sequence::Sequence;
