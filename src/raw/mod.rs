mod arena;
mod handle;
mod node;
mod raw_rb_tree;

pub(crate) use handle::Handle;
pub(crate) use raw_rb_tree::{Insertion, RawRbTree, SetOperation, Walk};
