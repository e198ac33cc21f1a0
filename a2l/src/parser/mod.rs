pub mod comment;
pub mod error;
pub mod lexer;
mod structural;

pub use error::{ParseError, WarningKind};

use crate::Program;

/// Parser entry point.
pub struct Parser {
    source: String,
    file_id: usize,
}

impl Parser {
    pub fn new(source: String, file_id: usize) -> Self {
        Parser { source, file_id }
    }

    /// Strip block comments and build the block tree.
    ///
    /// Never fails: malformed nesting is recovered from and reported in
    /// [`Program::warnings`].
    pub fn parse(&self) -> Program {
        let source = comment::strip_block_comments(&self.source);
        let (root, warnings) = structural::build_tree(&source, self.file_id);
        Program {
            root,
            source,
            source_id: self.file_id,
            warnings,
        }
    }
}
