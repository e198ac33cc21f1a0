//! Calibration axes, measurements and characteristics.
//!
//! All three start with a name followed by a fixed positional prefix, one
//! field per line, and end with keyword lines in any order:
//!
//! | kind             | positional prefix                                                                   |
//! |------------------|-------------------------------------------------------------------------------------|
//! | `AXIS_PTS`       | description, address, input quantity, record layout, deposit, conversion, max points, lower, upper |
//! | `MEASUREMENT`    | description, data type, conversion                                                  |
//! | `CHARACTERISTIC` | description, type, address, record layout, max diff, conversion, lower, upper      |

use a2l::block::Block;
use a2l::parser::lexer::{is_numeric, parse_int, parse_number, unquote};
use serde::Serialize;

use crate::cursor::{Annotations, LineCursor, SymbolLink};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisPts {
    pub name: String,
    pub description: Option<String>,
    pub address: Option<i64>,
    pub input_quantity: Option<String>,
    pub record_layout: Option<String>,
    pub deposit: Option<i64>,
    pub compu_method: Option<String>,
    pub max_axis_points: Option<i64>,
    pub lower_limit: Option<f64>,
    pub upper_limit: Option<f64>,
    pub byte_order: Option<String>,
    pub format: Option<String>,
    pub symbol_link: Option<SymbolLink>,
    pub source_lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub name: String,
    pub description: Option<String>,
    pub datatype: Option<String>,
    pub compu_method: Option<String>,
    /// Trailing values that are neither keywords nor a limit pair, in order.
    pub params: Vec<String>,
    pub ecu_address: Option<i64>,
    pub address: Option<i64>,
    pub lower_limit: Option<f64>,
    pub upper_limit: Option<f64>,
    pub byte_order: Option<String>,
    pub format: Option<String>,
    pub symbol_link: Option<SymbolLink>,
    pub source_lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Characteristic {
    pub name: String,
    pub description: Option<String>,
    pub char_type: Option<String>,
    pub address: Option<i64>,
    pub record_layout: Option<String>,
    pub max_diff: Option<f64>,
    pub compu_method: Option<String>,
    pub lower_limit: Option<f64>,
    pub upper_limit: Option<f64>,
    pub byte_order: Option<String>,
    pub format: Option<String>,
    pub symbol_link: Option<SymbolLink>,
    pub source_lines: Vec<String>,
}

pub fn decode_axis_pts(block: &Block) -> AxisPts {
    let mut cursor = LineCursor::new(block);
    let name = cursor.take_name(block);

    let description = cursor.next_text();
    let address = cursor.next_int();
    let input_quantity = cursor.next_token();
    let record_layout = cursor.next_token();
    let deposit = cursor.next_int();
    let compu_method = cursor.next_token();
    let max_axis_points = cursor.next_int();
    let lower_limit = cursor.next_number();
    let upper_limit = cursor.next_number();

    let mut annotations = Annotations::default();
    for line in cursor.rest() {
        annotations.absorb(line);
    }

    AxisPts {
        name,
        description,
        address,
        input_quantity,
        record_layout,
        deposit,
        compu_method,
        max_axis_points,
        lower_limit,
        upper_limit,
        byte_order: annotations.byte_order,
        format: annotations.format,
        symbol_link: annotations.symbol_link,
        source_lines: block.content_lines.clone(),
    }
}

/// Decode a `MEASUREMENT` block.
///
/// After the prefix, lines that are not keywords are classified by shape: a
/// lone number is a parameter, two numbers are the limit pair (the last such
/// line wins), and anything else contributes each of its tokens as parameters.
pub fn decode_measurement(block: &Block) -> Measurement {
    let mut cursor = LineCursor::new(block);
    let name = cursor.take_name(block);

    let description = cursor.next_text();
    let datatype = cursor.next_token();
    let compu_method = cursor.next_token();

    let mut params = Vec::new();
    let mut ecu_address = None;
    let mut address = None;
    let mut lower_limit = None;
    let mut upper_limit = None;
    let mut annotations = Annotations::default();

    for line in cursor.rest() {
        let Some(keyword) = line.first() else {
            continue;
        };
        match keyword.to_ascii_uppercase().as_str() {
            "ECU_ADDRESS" => {
                if let Some(value) = line.get(1) {
                    ecu_address = parse_int(value);
                }
            }
            "ADDRESS" => {
                if let Some(value) = line.get(1) {
                    address = parse_int(value);
                }
            }
            _ => {
                if annotations.absorb(line) {
                    continue;
                }
                match line.as_slice() {
                    [value] if is_numeric(value) => params.push(value.clone()),
                    [lower, upper] if is_numeric(lower) && is_numeric(upper) => {
                        lower_limit = parse_number(lower);
                        upper_limit = parse_number(upper);
                    }
                    _ => params.extend(line.iter().map(|t| unquote(t).to_string())),
                }
            }
        }
    }

    Measurement {
        name,
        description,
        datatype,
        compu_method,
        params,
        ecu_address,
        address,
        lower_limit,
        upper_limit,
        byte_order: annotations.byte_order,
        format: annotations.format,
        symbol_link: annotations.symbol_link,
        source_lines: block.content_lines.clone(),
    }
}

pub fn decode_characteristic(block: &Block) -> Characteristic {
    let mut cursor = LineCursor::new(block);
    let name = cursor.take_name(block);

    let description = cursor.next_text();
    let char_type = cursor.next_token();
    let address = cursor.next_int();
    let record_layout = cursor.next_token();
    let max_diff = cursor.next_number();
    let compu_method = cursor.next_token();
    let lower_limit = cursor.next_number();
    let upper_limit = cursor.next_number();

    // Unrecognized trailing lines are ignored
    let mut annotations = Annotations::default();
    for line in cursor.rest() {
        annotations.absorb(line);
    }

    Characteristic {
        name,
        description,
        char_type,
        address,
        record_layout,
        max_diff,
        compu_method,
        lower_limit,
        upper_limit,
        byte_order: annotations.byte_order,
        format: annotations.format,
        symbol_link: annotations.symbol_link,
        source_lines: block.content_lines.clone(),
    }
}
