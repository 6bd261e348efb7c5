//! The tagged token tree handed from the front end to the core.

mod tree;

pub use tree::{ParseToken, Tag};
