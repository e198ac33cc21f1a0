use a2l::block::Block;
use a2l::parser::lexer::unquote;
use serde::Serialize;

/// A `RECORD_LAYOUT`. Its entries are kept as trimmed text lines and not
/// interpreted further.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordLayout {
    pub name: String,
    pub entries: Vec<String>,
    pub source_lines: Vec<String>,
}

pub fn decode_record_layout(block: &Block) -> RecordLayout {
    let mut lines = block
        .content_lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty());

    let name = match block.first_argument() {
        Some(name) => unquote(name).to_string(),
        None => lines
            .next()
            .and_then(|line| line.split_whitespace().next())
            .map(|name| unquote(name).to_string())
            .unwrap_or_default(),
    };

    RecordLayout {
        name,
        entries: lines.map(str::to_string).collect(),
        source_lines: block.content_lines.clone(),
    }
}
