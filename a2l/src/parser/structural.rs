use std::ops::Range;
use std::sync::LazyLock;

use log::{debug, trace};
use regex::Regex;

use crate::block::{Block, ROOT_KEYWORD};
use crate::parser::error::{ParseError, WarningKind};
use crate::parser::lexer::{is_end_marker, split_tokens};

static BEGIN_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^/begin\s+(\S+)\s*(.*)$").expect("begin line pattern is valid")
});

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the block tree for comment-free source text.
///
/// Returns the synthetic root block and the warnings for every structural
/// recovery that was needed.
pub fn build_tree(source: &str, file_id: usize) -> (Block, Vec<ParseError>) {
    let mut state = ParseState::new(file_id);

    let mut offset = 0;
    for raw in source.split_inclusive('\n') {
        let start = offset;
        offset += raw.len();
        let line = raw.trim_end_matches(['\n', '\r']);
        state.feed_line(line, start..start + line.len());
    }

    state.finalize(source.len())
}

// ---------------------------------------------------------------------------
// Parse state
// ---------------------------------------------------------------------------

struct ParseState {
    file_id: usize,
    /// Stack of open blocks. The bottom entry is the root and is never popped
    /// while lines are being fed.
    block_stack: Vec<BlockBuilder>,
    warnings: Vec<ParseError>,
}

struct BlockBuilder {
    keyword: String,
    arguments: Vec<String>,
    content_lines: Vec<String>,
    children: Vec<Block>,
    /// Span of the begin line, for "never closed" warnings.
    header_span: Range<usize>,
}

impl BlockBuilder {
    fn new(keyword: String, arguments: Vec<String>, header_span: Range<usize>) -> Self {
        BlockBuilder {
            keyword,
            arguments,
            content_lines: Vec::new(),
            children: Vec::new(),
            header_span,
        }
    }

    fn into_block(self, span_end: usize) -> Block {
        Block {
            keyword: self.keyword,
            arguments: self.arguments,
            content_lines: self.content_lines,
            children: self.children,
            span: self.header_span.start..span_end,
        }
    }
}

impl ParseState {
    fn new(file_id: usize) -> Self {
        ParseState {
            file_id,
            block_stack: vec![BlockBuilder::new(ROOT_KEYWORD.to_string(), Vec::new(), 0..0)],
            warnings: Vec::new(),
        }
    }

    fn feed_line(&mut self, line: &str, span: Range<usize>) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }

        if starts_with_ignore_case(trimmed, "/begin") {
            match BEGIN_LINE.captures(trimmed) {
                Some(caps) => {
                    let keyword = caps[1].to_string();
                    let rest = caps.get(2).map_or("", |m| m.as_str().trim());
                    self.open_block(keyword, rest, span);
                }
                // A bare `/begin` with no keyword is kept as content
                None => self.push_content(line),
            }
        } else if starts_with_ignore_case(trimmed, "/end") {
            let closing = trimmed.split_whitespace().nth(1);
            self.close_block(closing, span);
        } else {
            self.push_content(line);
        }
    }

    fn open_block(&mut self, keyword: String, rest: &str, span: Range<usize>) {
        let mut arguments = if rest.is_empty() {
            Vec::new()
        } else {
            split_tokens(rest)
        };

        // `/begin KEYWORD args /end KEYWORD` on a single line
        let inline_close = arguments.iter().position(|t| is_end_marker(t));
        let closing = inline_close.map(|pos| {
            let closing = arguments.get(pos + 1).cloned();
            arguments.truncate(pos);
            closing
        });

        trace!(keyword = keyword.as_str(), depth = self.block_stack.len(); "Opening block");
        self.block_stack
            .push(BlockBuilder::new(keyword, arguments, span.clone()));

        if let Some(closing) = closing {
            self.close_block(closing.as_deref(), span);
        }
    }

    fn close_block(&mut self, closing: Option<&str>, span: Range<usize>) {
        if self.block_stack.len() <= 1 {
            self.warnings.push(ParseError::warning(
                WarningKind::UnmatchedEnd,
                span,
                self.file_id,
            ));
            return;
        }

        let Some(builder) = self.block_stack.pop() else {
            return;
        };

        if let Some(closing) = closing
            && !closing.eq_ignore_ascii_case(&builder.keyword)
        {
            self.warnings.push(
                ParseError::warning(
                    WarningKind::MismatchedEnd {
                        open: builder.keyword.clone(),
                        found: closing.to_string(),
                    },
                    span.clone(),
                    self.file_id,
                )
                .with_note("the innermost open block is closed regardless of the keyword"),
            );
        }

        let block = builder.into_block(span.end);
        if let Some(parent) = self.block_stack.last_mut() {
            parent.children.push(block);
        }
    }

    fn push_content(&mut self, line: &str) {
        if let Some(builder) = self.block_stack.last_mut() {
            builder.content_lines.push(line.trim_end().to_string());
        }
    }

    fn finalize(mut self, source_len: usize) -> (Block, Vec<ParseError>) {
        // Blocks still open at end of input stay attached to their parents
        while self.block_stack.len() > 1 {
            let Some(builder) = self.block_stack.pop() else {
                break;
            };
            self.warnings.push(ParseError::warning(
                WarningKind::NeverClosed {
                    keyword: builder.keyword.clone(),
                },
                builder.header_span.clone(),
                self.file_id,
            ));
            let block = builder.into_block(source_len);
            if let Some(parent) = self.block_stack.last_mut() {
                parent.children.push(block);
            }
        }

        let root = match self.block_stack.pop() {
            Some(builder) => builder.into_block(source_len),
            None => Block::new(ROOT_KEYWORD),
        };

        debug!(
            top_level = root.children.len(),
            warnings = self.warnings.len();
            "Block tree built"
        );

        (root, self.warnings)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
