//! Generation tokens used to detect cursors that outlived a structural mutation.
//!
//! Every container owns a [`Tokenizer`]. Cursors hold a [`Token`] created from it, which observes
//! the tokenizer's current epoch without keeping it alive. Resetting the tokenizer swaps in a new
//! epoch, so all tokens handed out before the reset report [`expired`](Token::expired) at once,
//! no matter how many there are.
//!
//! Epochs are compared by allocation identity, not by a counter value, so a stale token can never
//! wrap around into looking current.
//!
//! # Examples
//!
//! ```
//! use rbcursor::tokenization::Tokenizer;
//!
//! let mut tokenizer = Tokenizer::new();
//! let before = tokenizer.create();
//! assert!(!before.expired());
//!
//! tokenizer.reset();
//! assert!(before.expired());
//! assert!(!tokenizer.create().expired());
//! ```

use alloc::rc::{Rc, Weak};

#[derive(Debug)]
struct Epoch;

/// Owner of the current epoch.
#[derive(Debug)]
pub struct Tokenizer {
    epoch: Rc<Epoch>,
}

/// A weak observer of the epoch that was current when it was created.
#[derive(Clone, Debug)]
pub struct Token {
    epoch: Weak<Epoch>,
}

impl Tokenizer {
    /// Creates a tokenizer with a fresh epoch.
    #[must_use]
    pub fn new() -> Self {
        Tokenizer {
            epoch: Rc::new(Epoch),
        }
    }

    /// Returns a token observing the current epoch.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn create(&self) -> Token {
        Token {
            epoch: Rc::downgrade(&self.epoch),
        }
    }

    /// Expires every token created so far.
    ///
    /// # Complexity
    ///
    /// O(1), independent of the number of outstanding tokens.
    pub fn reset(&mut self) {
        self.epoch = Rc::new(Epoch);
        log::trace!("tokenizer epoch reset");
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Tokenizer::new()
    }
}

impl Token {
    /// Returns true once the tokenizer that created this token has been reset or dropped.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.epoch.strong_count() == 0
    }
}
