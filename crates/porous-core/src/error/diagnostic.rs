use std::fmt::Write as _;

use super::code::ErrorCode;
use crate::core::{LineCol, Span};

/// Severity level of a diagnostic.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl Severity {
    fn label(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        }
    }
}

/// A message tied to a code and, when known, a source location.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Diagnostic {
    severity: Severity,
    code: ErrorCode,
    message: String,
    span: Option<Span>,
    notes: Vec<String>,
}

impl Diagnostic {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            span: None,
            notes: Vec::new(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn span(&self) -> Option<Span> {
        self.span
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Render against the source the span points into.
    ///
    /// ```text
    /// error[E201]: unknown extern `bogus`
    ///   --> 1:1
    ///    |
    ///  1 | %!bogus
    ///    | ^^^^^^^
    /// ```
    pub fn render(&self, source: &str) -> String {
        let mut out = format!(
            "{}[{}]: {}\n",
            self.severity.label(),
            self.code.as_str(),
            self.message
        );

        if let Some(span) = self.span
            && !span.is_empty()
        {
            let start = LineCol::locate(source, span.start());
            let line_text = source.lines().nth(start.line as usize - 1).unwrap_or("");
            let gutter = start.line.to_string().len();
            let width = span.len().max(1) as usize;
            let _ = writeln!(out, "{:gutter$}--> {}", "", start);
            let _ = writeln!(out, "{:gutter$} |", "");
            let _ = writeln!(out, "{} | {}", start.line, line_text);
            let _ = writeln!(
                out,
                "{:gutter$} | {}{}",
                "",
                " ".repeat(start.col as usize - 1),
                "^".repeat(width.min(line_text.len().saturating_sub(start.col as usize - 1)).max(1))
            );
        }

        for note in &self.notes {
            let _ = writeln!(out, "  = note: {}", note);
        }

        out
    }
}
