use std::sync::LazyLock;

use regex::Regex;

static BLOCK_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("block comment pattern is valid"));

/// Remove every `/* ... */` comment from the whole text, including comments
/// spanning several lines.
///
/// Quoting is not considered: a delimiter inside a string literal still opens
/// or closes a comment. An opening delimiter with no closing one is left as is.
pub fn strip_block_comments(text: &str) -> String {
    BLOCK_COMMENT.replace_all(text, "").into_owned()
}
