//! `GROUP` and `FUNCTION` blocks: a name, a description, and lists of names
//! gathered from nested reference blocks.

use a2l::block::{Block, BlockKind};
use a2l::parser::lexer::{is_begin_marker, is_end_marker, unquote};
use serde::Serialize;

use crate::cursor::LineCursor;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub name: String,
    pub description: Option<String>,
    pub ref_measurements: Vec<String>,
    pub ref_characteristics: Vec<String>,
    pub sub_groups: Vec<String>,
    pub source_lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Function {
    pub name: String,
    pub description: Option<String>,
    pub loc_measurements: Vec<String>,
    pub def_characteristics: Vec<String>,
    pub ref_characteristics: Vec<String>,
    pub in_measurements: Vec<String>,
    pub out_measurements: Vec<String>,
    pub sub_functions: Vec<String>,
    pub source_lines: Vec<String>,
}

/// Name and description shared by groups and functions. The description is
/// always the first body line after the name.
fn decode_heading(block: &Block) -> (String, Option<String>) {
    let mut cursor = LineCursor::new(block);
    let name = cursor.take_name(block);
    let description = cursor.next_text();
    (name, description)
}

/// Every token of every `kind` child, unquoted, with stray bracket markers dropped.
fn referenced_names(block: &Block, kind: BlockKind) -> Vec<String> {
    block
        .children_of(kind)
        .flat_map(Block::flat_tokens)
        .filter(|token| !is_begin_marker(token) && !is_end_marker(token))
        .map(|token| unquote(&token).to_string())
        .collect()
}

pub fn decode_group(block: &Block) -> Group {
    let (name, description) = decode_heading(block);
    Group {
        name,
        description,
        ref_measurements: referenced_names(block, BlockKind::RefMeasurement),
        ref_characteristics: referenced_names(block, BlockKind::RefCharacteristic),
        sub_groups: referenced_names(block, BlockKind::SubGroup),
        source_lines: block.content_lines.clone(),
    }
}

pub fn decode_function(block: &Block) -> Function {
    let (name, description) = decode_heading(block);
    Function {
        name,
        description,
        loc_measurements: referenced_names(block, BlockKind::LocMeasurement),
        def_characteristics: referenced_names(block, BlockKind::DefCharacteristic),
        ref_characteristics: referenced_names(block, BlockKind::RefCharacteristic),
        in_measurements: referenced_names(block, BlockKind::InMeasurement),
        out_measurements: referenced_names(block, BlockKind::OutMeasurement),
        sub_functions: referenced_names(block, BlockKind::SubFunction),
        source_lines: block.content_lines.clone(),
    }
}
