use std::fmt;

/// Byte offset in source code.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Pos(u32);

impl Pos {
    pub fn new(offset: u32) -> Self {
        Self(offset)
    }

    pub fn offset(self) -> u32 {
        self.0
    }
}

/// A half-open byte range in source code.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Span {
    start: Pos,
    end: Pos,
}

impl Span {
    /// Span used for synthesized tokens with no source text.
    pub const DUMMY: Span = Span {
        start: Pos(0),
        end: Pos(0),
    };

    pub fn new(start: Pos, end: Pos) -> Self {
        Self { start, end }
    }

    /// Build a span from raw byte offsets.
    pub fn from_offsets(start: usize, end: usize) -> Self {
        Self::new(Pos::new(start as u32), Pos::new(end as u32))
    }

    pub fn start(self) -> Pos {
        self.start
    }

    pub fn end(self) -> Pos {
        self.end
    }

    /// Smallest span covering both `self` and `other`.
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn is_empty(self) -> bool {
        self.start >= self.end
    }

    pub fn len(self) -> u32 {
        self.end.0.saturating_sub(self.start.0)
    }

    /// The text this span covers, if it lies within `source`.
    pub fn slice(self, source: &str) -> Option<&str> {
        source.get(self.start.0 as usize..self.end.0 as usize)
    }
}

/// One-based line and column of a position.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

impl LineCol {
    /// Locate `pos` in `source`. Columns count characters, not bytes.
    pub fn locate(source: &str, pos: Pos) -> Self {
        let offset = (pos.offset() as usize).min(source.len());
        let mut line = 1;
        let mut col = 1;
        for (i, ch) in source.char_indices() {
            if i >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        Self { line, col }
    }
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}
