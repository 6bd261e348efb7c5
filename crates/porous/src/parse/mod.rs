//! Parser for Porous source code.
//!
//! Converts source text to the tagged token tree the core consumes.
//!
//! # Grammar
//!
//! ```text
//! program   = global*
//! global    = word "=" stmt            definition
//!           | word "%" block           macro
//! stmt      = int | char | bool | oper | "==" | "?" | ":" | extern
//!           | word | function
//! function  = signature block
//! signature = "(" type* ":" type* ")"
//! type      = word                     int, char, bool, or a generic
//!           | "<" word ">"             determining generic occurrence
//!           | signature
//! block     = "{" stmt* "}"
//! int       = ["-"] digit+
//! char      = "'" (any | "\" escape) "'"
//! extern    = "%!" word
//! ```
//!
//! `//` starts a comment that runs to the end of the line.

use porous_core::{ParseToken, Span, Tag};

use crate::error::ParseError;

/// Lexical category of a lexeme.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LexKind {
    Int,
    /// A character literal, already unescaped.
    Char(char),
    Word,
    /// `+ - * / % < > <= >=`
    Oper,
    /// `==`
    Equals,
    /// `?`
    Choose,
    /// `:`
    Colon,
    /// `=`
    Define,
    /// `%!name`; the text is the name.
    Extern,
    LParen,
    RParen,
    LBrace,
    RBrace,
}

/// A lexeme from the source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lexeme {
    pub kind: LexKind,
    pub text: String,
    pub span: Span,
}

fn is_word_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Split source into lexemes.
pub fn tokenize(source: &str) -> Result<Vec<Lexeme>, ParseError> {
    let mut lexemes = Vec::with_capacity(source.len() / 3);
    let mut chars = source.char_indices().peekable();

    while let Some(&(start, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        let next = source[start + ch.len_utf8()..].chars().next();

        if ch == '/' && next == Some('/') {
            while let Some(&(_, c)) = chars.peek() {
                if c == '\n' {
                    break;
                }
                chars.next();
            }
            continue;
        }

        let simple = |kind: LexKind, len: usize| Lexeme {
            kind,
            text: source[start..start + len].to_string(),
            span: Span::from_offsets(start, start + len),
        };

        // Integer literal, with a minus sign glued to its digits
        if ch.is_ascii_digit() || (ch == '-' && next.is_some_and(|c| c.is_ascii_digit())) {
            chars.next();
            let mut end = start + 1;
            while let Some(&(i, c)) = chars.peek() {
                if !c.is_ascii_digit() {
                    break;
                }
                end = i + 1;
                chars.next();
            }
            let text = &source[start..end];
            if text.parse::<i64>().is_err() {
                return Err(ParseError::InvalidLiteral {
                    what: "integer",
                    text: text.to_string(),
                    span: Span::from_offsets(start, end),
                });
            }
            lexemes.push(simple(LexKind::Int, end - start));
            continue;
        }

        if ch == '\'' {
            chars.next();
            lexemes.push(char_literal(source, start, &mut chars)?);
            continue;
        }

        if is_word_start(ch) {
            let mut end = start;
            while let Some(&(i, c)) = chars.peek() {
                if !is_word_char(c) {
                    break;
                }
                end = i + c.len_utf8();
                chars.next();
            }
            lexemes.push(simple(LexKind::Word, end - start));
            continue;
        }

        if ch == '%' && next == Some('!') {
            chars.next();
            chars.next();
            let name_start = start + 2;
            let mut end = name_start;
            while let Some(&(i, c)) = chars.peek() {
                if !is_word_char(c) {
                    break;
                }
                end = i + c.len_utf8();
                chars.next();
            }
            if end == name_start {
                return Err(ParseError::UnexpectedToken {
                    expected: "an extern name after `%!`".to_string(),
                    found: "nothing".to_string(),
                    span: Span::from_offsets(start, end),
                });
            }
            lexemes.push(Lexeme {
                kind: LexKind::Extern,
                text: source[name_start..end].to_string(),
                span: Span::from_offsets(start, end),
            });
            continue;
        }

        let (kind, len) = match (ch, next) {
            ('<' | '>', Some('=')) => (LexKind::Oper, 2),
            ('=', Some('=')) => (LexKind::Equals, 2),
            ('+' | '-' | '*' | '/' | '%' | '<' | '>', _) => (LexKind::Oper, 1),
            ('=', _) => (LexKind::Define, 1),
            ('?', _) => (LexKind::Choose, 1),
            (':', _) => (LexKind::Colon, 1),
            ('(', _) => (LexKind::LParen, 1),
            (')', _) => (LexKind::RParen, 1),
            ('{', _) => (LexKind::LBrace, 1),
            ('}', _) => (LexKind::RBrace, 1),
            _ => {
                return Err(ParseError::UnrecognizedChar {
                    ch,
                    span: Span::from_offsets(start, start + ch.len_utf8()),
                });
            }
        };
        for _ in 0..len {
            chars.next();
        }
        lexemes.push(simple(kind, len));
    }

    Ok(lexemes)
}

/// Lex a character literal whose opening quote at `start` was consumed.
fn char_literal(
    source: &str,
    start: usize,
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> Result<Lexeme, ParseError> {
    let unterminated = |end: usize| ParseError::Unterminated {
        what: "character",
        span: Span::from_offsets(start, end),
    };

    let (i, c) = chars.next().ok_or_else(|| unterminated(source.len()))?;
    let value = if c == '\\' {
        let (j, escaped) = chars.next().ok_or_else(|| unterminated(source.len()))?;
        match escaped {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            '\\' => '\\',
            '\'' => '\'',
            _ => {
                return Err(ParseError::InvalidLiteral {
                    what: "character",
                    text: format!("\\{}", escaped),
                    span: Span::from_offsets(i, j + escaped.len_utf8()),
                });
            }
        }
    } else if c == '\'' || c == '\n' {
        return Err(unterminated(i));
    } else {
        c
    };

    match chars.next() {
        Some((end, '\'')) => Ok(Lexeme {
            kind: LexKind::Char(value),
            text: source[start..end + 1].to_string(),
            span: Span::from_offsets(start, end + 1),
        }),
        Some((end, _)) => Err(unterminated(end)),
        None => Err(unterminated(source.len())),
    }
}

/// Parse a program: a sequence of top-level definitions.
pub fn parse_program(source: &str) -> Result<Vec<ParseToken>, ParseError> {
    let mut parser = Parser::new(source)?;
    let mut globals = Vec::new();
    while !parser.at_end() {
        globals.push(parser.global()?);
    }
    Ok(globals)
}

/// Parse a bare sequence of statements, as typed at a prompt.
pub fn parse_statements(source: &str) -> Result<Vec<ParseToken>, ParseError> {
    let mut parser = Parser::new(source)?;
    let mut statements = Vec::new();
    while !parser.at_end() {
        statements.push(parser.stmt()?);
    }
    Ok(statements)
}

struct Parser<'s> {
    source: &'s str,
    lexemes: Vec<Lexeme>,
    position: usize,
}

impl<'s> Parser<'s> {
    fn new(source: &'s str) -> Result<Self, ParseError> {
        Ok(Self {
            source,
            lexemes: tokenize(source)?,
            position: 0,
        })
    }

    fn peek(&self) -> Option<&Lexeme> {
        self.lexemes.get(self.position)
    }

    fn advance(&mut self) -> Option<Lexeme> {
        let lexeme = self.lexemes.get(self.position).cloned();
        if lexeme.is_some() {
            self.position += 1;
        }
        lexeme
    }

    fn at_end(&self) -> bool {
        self.position >= self.lexemes.len()
    }

    fn end_span(&self) -> Span {
        Span::from_offsets(self.source.len(), self.source.len())
    }

    fn unexpected(&self, expected: &str, found: Option<&Lexeme>) -> ParseError {
        match found {
            Some(lexeme) => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: format!("`{}`", self.text(lexeme.span)),
                span: lexeme.span,
            },
            None => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: "end of input".to_string(),
                span: self.end_span(),
            },
        }
    }

    fn text(&self, span: Span) -> &'s str {
        span.slice(self.source).unwrap_or_default()
    }

    fn expect(&mut self, kind: LexKind, expected: &str) -> Result<Lexeme, ParseError> {
        match self.advance() {
            Some(lexeme) if lexeme.kind == kind => Ok(lexeme),
            other => Err(self.unexpected(expected, other.as_ref())),
        }
    }

    fn global(&mut self) -> Result<ParseToken, ParseError> {
        let name = self.expect(LexKind::Word, "a definition name")?;
        let name_token = ParseToken::new(name.text.clone(), name.span).with_tag(Tag::Word);

        match self.advance() {
            Some(l) if l.kind == LexKind::Define => {
                let body = self.stmt()?;
                let span = name.span.merge(body.span);
                Ok(ParseToken::new(name.text, span)
                    .with_tag(Tag::Global)
                    .with_children(vec![name_token, body]))
            }
            Some(l) if l.kind == LexKind::Oper && l.text == "%" => {
                let body = self.block()?;
                let span = name.span.merge(body.span);
                Ok(ParseToken::new(name.text, span)
                    .with_tags([Tag::Global, Tag::Macro])
                    .with_children(vec![name_token, body]))
            }
            other => Err(self.unexpected("`=` or `%` after a definition name", other.as_ref())),
        }
    }

    fn stmt(&mut self) -> Result<ParseToken, ParseError> {
        let Some(lexeme) = self.peek().cloned() else {
            return Err(self.unexpected("a statement", None));
        };
        let tag = match &lexeme.kind {
            LexKind::LParen => return self.function(),
            LexKind::Int => Tag::Int,
            LexKind::Char(_) => Tag::Char,
            LexKind::Word if lexeme.text == "true" || lexeme.text == "false" => Tag::Bool,
            LexKind::Word => Tag::Word,
            LexKind::Oper => Tag::Oper,
            LexKind::Equals | LexKind::Choose | LexKind::Colon => Tag::BoolOp,
            LexKind::Extern => Tag::Extern,
            _ => return Err(self.unexpected("a statement", Some(&lexeme))),
        };
        self.position += 1;

        let content = match lexeme.kind {
            LexKind::Char(c) => c.to_string(),
            _ => lexeme.text,
        };
        Ok(ParseToken::new(content, lexeme.span).with_tags([tag, Tag::Stmt]))
    }

    fn function(&mut self) -> Result<ParseToken, ParseError> {
        let sig = self.signature()?;
        let block = self.block()?;
        let span = sig.span.merge(block.span);
        Ok(ParseToken::new(sig.content.clone(), span)
            .with_tags([Tag::BlockType, Tag::Stmt])
            .with_children(vec![sig, block]))
    }

    fn signature(&mut self) -> Result<ParseToken, ParseError> {
        let open = self.expect(LexKind::LParen, "`(`")?;
        let ins = self.type_list(open.span, LexKind::Colon)?;
        self.expect(LexKind::Colon, "`:` in signature")?;
        let outs = self.type_list(open.span, LexKind::RParen)?;
        let close = self.expect(LexKind::RParen, "`)`")?;

        let span = open.span.merge(close.span);
        Ok(ParseToken::new(self.text(span), span)
            .with_tags([Tag::Sig, Tag::Type])
            .with_children(vec![ins, outs]))
    }

    fn type_list(&mut self, open: Span, until: LexKind) -> Result<ParseToken, ParseError> {
        let mut types = Vec::new();
        loop {
            match self.peek() {
                None => return Err(ParseError::Unclosed { open: '(', span: open }),
                Some(l) if l.kind == until => break,
                Some(_) => types.push(self.type_()?),
            }
        }
        let span = types
            .iter()
            .map(|t| t.span)
            .reduce(Span::merge)
            .unwrap_or(open);
        Ok(ParseToken::new("", span)
            .with_tag(Tag::TypeList)
            .with_children(types))
    }

    fn type_(&mut self) -> Result<ParseToken, ParseError> {
        let Some(lexeme) = self.peek().cloned() else {
            return Err(self.unexpected("a type", None));
        };
        match lexeme.kind {
            LexKind::LParen => self.signature(),
            LexKind::Word => {
                self.position += 1;
                Ok(ParseToken::new(lexeme.text, lexeme.span).with_tag(Tag::Type))
            }
            LexKind::Oper if lexeme.text == "<" => {
                self.position += 1;
                let name = self.expect(LexKind::Word, "a generic name")?;
                let close = self.advance();
                match close {
                    Some(c) if c.kind == LexKind::Oper && c.text == ">" => {
                        let span = lexeme.span.merge(c.span);
                        Ok(ParseToken::new(name.text, span).with_tags([Tag::Type, Tag::Generic]))
                    }
                    other => Err(self.unexpected("`>` after a generic name", other.as_ref())),
                }
            }
            _ => Err(self.unexpected("a type", Some(&lexeme))),
        }
    }

    fn block(&mut self) -> Result<ParseToken, ParseError> {
        let open = self.expect(LexKind::LBrace, "`{`")?;
        let mut statements = Vec::new();
        let close = loop {
            match self.peek() {
                None => return Err(ParseError::Unclosed { open: '{', span: open.span }),
                Some(l) if l.kind == LexKind::RBrace => break self.advance(),
                Some(_) => statements.push(self.stmt()?),
            }
        };
        let span = close.map_or(open.span, |c| open.span.merge(c.span));
        Ok(ParseToken::new("", span)
            .with_tag(Tag::Block)
            .with_children(statements))
    }
}
