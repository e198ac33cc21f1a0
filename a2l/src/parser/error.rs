use std::fmt;
use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};

/// The structural recoveries the tree builder can make.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningKind {
    /// An `/end` line with no open block.
    UnmatchedEnd,
    /// An `/end found` line while `open` is the innermost open block. The
    /// block is closed anyway.
    MismatchedEnd { open: String, found: String },
    /// A block still open at end of input. It stays attached to its parent.
    NeverClosed { keyword: String },
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningKind::UnmatchedEnd => write!(f, "unmatched /end ignored"),
            WarningKind::MismatchedEnd { open, found } => {
                write!(f, "/end {} closes block `{}`", found, open)
            }
            WarningKind::NeverClosed { keyword } => {
                write!(f, "block `{}` is never closed", keyword)
            }
        }
    }
}

/// A structural problem found while building the block tree, with its
/// location in the comment-stripped source.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub kind: WarningKind,
    pub message: String,
    pub span: Range<usize>,
    pub file_id: usize,
    pub notes: Vec<String>,
}

impl ParseError {
    pub fn warning(kind: WarningKind, span: Range<usize>, file_id: usize) -> Self {
        ParseError {
            message: kind.to_string(),
            kind,
            span,
            file_id,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        Diagnostic::new(Severity::Warning)
            .with_message(&self.message)
            .with_labels(vec![Label::primary(self.file_id, self.span.clone())])
            .with_notes(self.notes.clone())
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}
