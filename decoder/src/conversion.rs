//! Conversion methods (`COMPU_METHOD`) and verbal lookup tables (`COMPU_VTAB`).

use a2l::block::Block;
use a2l::parser::lexer::{join_unquoted, parse_float, parse_int, unquote};
use log::trace;
use serde::Serialize;

use crate::cursor::LineCursor;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompuMethod {
    pub name: String,
    pub description: Option<String>,
    /// `IDENTICAL`, `LINEAR`, `RAT_FUNC`, `TAB_VERB`, ...
    pub method_type: Option<String>,
    pub format: Option<String>,
    pub unit: Option<String>,
    pub coeffs: Vec<f64>,
    pub compu_tab_ref: Option<String>,
    pub source_lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompuVtab {
    pub name: String,
    pub description: Option<String>,
    pub tab_type: Option<String>,
    pub entries: Vec<VtabEntry>,
    pub default_value: Option<String>,
    pub source_lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VtabEntry {
    pub value: i64,
    pub text: String,
}

pub fn decode_compu_method(block: &Block) -> CompuMethod {
    let mut cursor = LineCursor::new(block);
    let name = cursor.take_name(block);

    let description = cursor.next_text();
    let method_type = cursor.next_token();
    let format = cursor.next_text();
    let unit = cursor.next_text();

    let mut coeffs = Vec::new();
    let mut compu_tab_ref = None;
    for line in cursor.rest() {
        let Some((keyword, values)) = line.split_first() else {
            continue;
        };
        match keyword.to_ascii_uppercase().as_str() {
            "COEFFS" | "COEFFS_LINEAR" => {
                coeffs.extend(values.iter().filter_map(|v| parse_float(v)));
            }
            "COMPU_TAB_REF" => {
                compu_tab_ref = values.first().map(|v| unquote(v).to_string());
            }
            _ => {}
        }
    }

    CompuMethod {
        name,
        description,
        method_type,
        format,
        unit,
        coeffs,
        compu_tab_ref,
        source_lines: block.content_lines.clone(),
    }
}

/// Decode a `COMPU_VTAB` block.
///
/// When the line after the table type starts with an integer, that integer is
/// the entry count and the line is consumed. Exactly that many lines are then
/// read as entries (lines that do not start with an integer are consumed but
/// dropped). Without a count, entries are read until the first line that does
/// not start with an integer.
pub fn decode_compu_vtab(block: &Block) -> CompuVtab {
    let mut cursor = LineCursor::new(block);
    let name = cursor.take_name(block);

    let description = cursor.next_text();
    let tab_type = cursor.next_token();

    let mut entries = Vec::new();
    let count = cursor
        .peek()
        .and_then(|line| line.first())
        .and_then(|token| parse_int(token));

    match count {
        Some(count) => {
            cursor.advance();
            for _ in 0..count {
                let Some(line) = cursor.next_line() else {
                    break;
                };
                entries.extend(decode_entry(line));
            }
        }
        None => {
            while let Some(entry) = cursor.peek().and_then(decode_entry) {
                entries.push(entry);
                cursor.advance();
            }
        }
    }

    let mut default_value = None;
    for line in cursor.rest() {
        if let Some((keyword, values)) = line.split_first()
            && keyword.eq_ignore_ascii_case("DEFAULT_VALUE")
        {
            default_value = Some(join_unquoted(values));
        }
    }

    trace!(name = name.as_str(), entries = entries.len(); "verbal table decoded");

    CompuVtab {
        name,
        description,
        tab_type,
        entries,
        default_value,
        source_lines: block.content_lines.clone(),
    }
}

fn decode_entry(line: &[String]) -> Option<VtabEntry> {
    let (value, text) = line.split_first()?;
    Some(VtabEntry {
        value: parse_int(value)?,
        text: join_unquoted(text).trim_matches('"').to_string(),
    })
}
