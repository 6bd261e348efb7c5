use std::{collections::BTreeSet, fmt};

use crate::core::Span;

/// Syntactic role of a token.
///
/// A token may carry several tags at once; a function literal is both
/// `BlockType` and `Stmt`, a macro definition both `Global` and `Macro`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Tag {
    Int,
    Char,
    Bool,
    /// Arithmetic or comparison operator.
    Oper,
    /// `==`, `?` or `:`.
    BoolOp,
    Extern,
    Word,
    Stmt,
    BlockType,
    Block,
    Sig,
    Type,
    TypeList,
    /// Binding generic occurrence (`<T>`).
    Generic,
    Global,
    Macro,
}

impl Tag {
    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Int => "int",
            Tag::Char => "char",
            Tag::Bool => "bool",
            Tag::Oper => "oper",
            Tag::BoolOp => "boolOp",
            Tag::Extern => "extern",
            Tag::Word => "word",
            Tag::Stmt => "stmt",
            Tag::BlockType => "blockType",
            Tag::Block => "block",
            Tag::Sig => "sig",
            Tag::Type => "type",
            Tag::TypeList => "typeList",
            Tag::Generic => "generic",
            Tag::Global => "global",
            Tag::Macro => "macro",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of the parse tree: content, tags, children and source span.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ParseToken {
    pub content: String,
    pub tags: BTreeSet<Tag>,
    pub children: Vec<ParseToken>,
    pub span: Span,
}

impl ParseToken {
    pub fn new(content: impl Into<String>, span: Span) -> Self {
        Self {
            content: content.into(),
            tags: BTreeSet::new(),
            children: Vec::new(),
            span,
        }
    }

    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.insert(tag);
        self
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.tags.extend(tags);
        self
    }

    pub fn with_children(mut self, children: Vec<ParseToken>) -> Self {
        self.children = children;
        self
    }

    pub fn is(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn child(&self, index: usize) -> Option<&ParseToken> {
        self.children.get(index)
    }

    /// Short form used in diagnostics: the content, or the tag list for
    /// structural tokens that have none.
    pub fn display(&self) -> String {
        if !self.content.is_empty() {
            return self.content.clone();
        }
        let tags: Vec<&str> = self.tags.iter().map(|t| t.as_str()).collect();
        format!("<{}>", tags.join(","))
    }
}

impl fmt::Display for ParseToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.children.is_empty() {
            return f.write_str(&self.display());
        }
        write!(f, "{}[", self.display())?;
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", child)?;
        }
        f.write_str("]")
    }
}
