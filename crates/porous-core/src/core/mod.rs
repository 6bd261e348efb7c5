mod span;

pub use span::{LineCol, Pos, Span};
