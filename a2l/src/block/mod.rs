pub mod kind;

use std::ops::Range;

pub use kind::BlockKind;

use crate::parser::lexer::split_tokens;

/// Keyword of the synthetic block that owns every top-level block.
pub const ROOT_KEYWORD: &str = "ROOT";

/// A `/begin KEYWORD ... /end KEYWORD` unit of an A2L description.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// The declared block kind, as written in the source.
    pub keyword: String,
    /// Tokens after the keyword on the begin line, quotes preserved.
    pub arguments: Vec<String>,
    /// Right-trimmed lines belonging directly to this block. Lines of nested
    /// blocks are not included and blank lines are dropped.
    pub content_lines: Vec<String>,
    /// Nested blocks in source order.
    pub children: Vec<Block>,
    /// Byte span in the comment-stripped source.
    pub span: Range<usize>,
}

impl Block {
    pub fn new(keyword: impl Into<String>) -> Self {
        Block {
            keyword: keyword.into(),
            arguments: Vec::new(),
            content_lines: Vec::new(),
            children: Vec::new(),
            span: 0..0,
        }
    }

    /// The recognized kind of this block, if its keyword is one the decoders know.
    pub fn kind(&self) -> Option<BlockKind> {
        BlockKind::from_keyword(&self.keyword)
    }

    /// Immediate children whose keyword matches `keyword`, ignoring ASCII case.
    pub fn children_named(&self, keyword: &str) -> impl Iterator<Item = &Block> {
        self.children
            .iter()
            .filter(move |child| child.keyword.eq_ignore_ascii_case(keyword))
    }

    pub fn first_child(&self, keyword: &str) -> Option<&Block> {
        self.children_named(keyword).next()
    }

    /// Immediate children of the given kind.
    pub fn children_of(&self, kind: BlockKind) -> impl Iterator<Item = &Block> {
        self.children_named(kind.as_str())
    }

    pub fn first_of(&self, kind: BlockKind) -> Option<&Block> {
        self.children_of(kind).next()
    }

    /// The first header argument, verbatim.
    pub fn first_argument(&self) -> Option<&str> {
        self.arguments.first().map(String::as_str)
    }

    /// Content lines split into tokens, skipping lines that yield none.
    pub fn token_lines(&self) -> Vec<Vec<String>> {
        self.content_lines
            .iter()
            .map(|line| split_tokens(line))
            .filter(|tokens| !tokens.is_empty())
            .collect()
    }

    /// Header arguments followed by the tokens of every content line.
    pub fn flat_tokens(&self) -> Vec<String> {
        let mut tokens = self.arguments.clone();
        for line in &self.content_lines {
            tokens.extend(split_tokens(line));
        }
        tokens
    }
}
