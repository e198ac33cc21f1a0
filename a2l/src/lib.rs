pub mod block;
pub mod parser;

use crate::block::Block;
use crate::parser::ParseError;

/// A parsed A2L description, before any entity decoding.
#[derive(Debug, Clone)]
pub struct Program {
    /// Synthetic root block. Top-level `/begin` blocks are its children.
    pub root: Block,
    /// The comment-stripped text the tree was built from. Warning spans index into it.
    pub source: String,
    /// The source file ID (for error reporting with codespan-reporting).
    pub source_id: usize,
    /// Structural recoveries made while building the tree.
    pub warnings: Vec<ParseError>,
}
