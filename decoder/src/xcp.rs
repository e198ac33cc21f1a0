//! XCP protocol layer and data acquisition settings from the `IF_DATA XCPplus` block.
//!
//! These blocks are decoded from one flat token stream (header arguments and
//! content lines), because vendors put the fields on the begin line as often as
//! on their own lines.

use a2l::block::{Block, BlockKind};
use a2l::parser::lexer::{is_quoted, parse_int, unquote};
use log::trace;
use serde::Serialize;

/// Tokens that end the leading run of timing values.
const TIMING_STOP_PREFIXES: [&str; 2] = ["BYTE_ORDER", "ADDRESS_GRANULARITY"];
const TIMING_STOP_KEYWORDS: [&str; 2] = ["OPTIONAL_CMD", "COMMUNICATION_MODE_SUPPORTED"];

const EVENT_TYPES: [&str; 3] = ["DAQ", "STIM", "DAQ_STIM"];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProtocolLayer {
    pub version: Option<i64>,
    /// The leading integers after the version (T1..T7 and the CTO/DTO sizes).
    pub timing_values: Vec<i64>,
    pub max_cto: Option<i64>,
    pub max_dto: Option<i64>,
    pub byte_order: Option<String>,
    pub address_granularity: Option<String>,
    pub optional_commands: Vec<String>,
    pub communication_mode: Option<String>,
    pub master_max_bs: Option<i64>,
    pub master_min_st: Option<i64>,
    pub source_lines: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DaqConfig {
    /// `STATIC` or `DYNAMIC`.
    pub mode: Option<String>,
    pub max_daq: Option<i64>,
    pub max_event_channel: Option<i64>,
    pub min_daq: Option<i64>,
    pub identification_field_type: Option<String>,
    pub odt_entry_granularity_daq: Option<String>,
    pub max_odt_entry_size_daq: Option<i64>,
    /// Suffix of the `OVERLOAD_INDICATION_*` token, e.g. `EVENT` or `PID`.
    pub overload_indication: Option<String>,
    pub stim_granularity: Option<String>,
    pub max_odt_entry_size_stim: Option<i64>,
    pub bit_stim_supported: bool,
    pub events: Vec<DaqEvent>,
    pub source_lines: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DaqEvent {
    pub name: String,
    pub short_name: Option<String>,
    pub event_channel_number: Option<i64>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub max_daq_list: Option<i64>,
    pub cycle: Option<i64>,
    pub time_unit: Option<i64>,
    pub priority: Option<i64>,
    pub source_lines: Vec<String>,
}

// ---------------------------------------------------------------------------
// PROTOCOL_LAYER
// ---------------------------------------------------------------------------

pub fn decode_protocol_layer(block: &Block) -> ProtocolLayer {
    let tokens = block.flat_tokens();
    let mut layer = ProtocolLayer {
        source_lines: block.content_lines.clone(),
        ..ProtocolLayer::default()
    };

    let mut index = 0;
    if let Some(version) = tokens.first().and_then(|t| parse_int(t)) {
        layer.version = Some(version);
        index = 1;
    }

    for token in &tokens[index..] {
        if ends_timing_run(token) {
            break;
        }
        match parse_int(token) {
            Some(value) => layer.timing_values.push(value),
            None => break,
        }
    }

    if let [.., cto, dto, _] = layer.timing_values.as_slice() {
        layer.max_cto = Some(*cto);
        layer.max_dto = Some(*dto);
    }

    for (i, token) in tokens.iter().enumerate() {
        let next = tokens.get(i + 1);
        if token.starts_with("BYTE_ORDER") {
            layer.byte_order = Some(token.clone());
        } else if token.starts_with("ADDRESS_GRANULARITY") {
            layer.address_granularity = Some(token.clone());
        } else if token == "OPTIONAL_CMD" {
            if let Some(command) = next {
                layer.optional_commands.push(command.clone());
            }
        } else if token == "COMMUNICATION_MODE_SUPPORTED" {
            if let Some(mode) = next {
                layer.communication_mode = Some(mode.clone());
            }
        } else if token == "MASTER"
            && let (Some(max_bs), Some(min_st)) = (next, tokens.get(i + 2))
        {
            layer.master_max_bs = parse_int(max_bs);
            layer.master_min_st = parse_int(min_st);
        }
    }

    layer
}

fn ends_timing_run(token: &str) -> bool {
    TIMING_STOP_PREFIXES.iter().any(|p| token.starts_with(p))
        || TIMING_STOP_KEYWORDS.contains(&token)
}

// ---------------------------------------------------------------------------
// DAQ
// ---------------------------------------------------------------------------

/// Decode a `DAQ` block together with its `EVENT` children.
///
/// Keyword scans also cover a nested `STIM` block, where newer files keep the
/// stimulation granularity and the bit-stim flag.
pub fn decode_daq(block: &Block) -> DaqConfig {
    let tokens = block.flat_tokens();
    let mut daq = DaqConfig {
        source_lines: block.content_lines.clone(),
        ..DaqConfig::default()
    };

    if let Some(first) = tokens.first()
        && (first == "STATIC" || first == "DYNAMIC")
    {
        daq.mode = Some(first.clone());
    }

    if let Some([max_daq, max_event_channel, min_daq]) = tokens.get(1..4) {
        daq.max_daq = parse_int(max_daq);
        daq.max_event_channel = parse_int(max_event_channel);
        daq.min_daq = parse_int(min_daq);
    }

    let mut scanned = tokens;
    if let Some(stim) = block.first_of(BlockKind::Stim) {
        scanned.extend(stim.flat_tokens());
    }

    for (i, token) in scanned.iter().enumerate() {
        let size = || scanned.get(i + 1).and_then(|t| parse_int(t));
        if token.starts_with("IDENTIFICATION_FIELD_TYPE_") {
            daq.identification_field_type = Some(token.clone());
        } else if token.starts_with("GRANULARITY_ODT_ENTRY_SIZE_DAQ") {
            daq.odt_entry_granularity_daq = Some(token.clone());
            daq.max_odt_entry_size_daq = size();
        } else if token.starts_with("GRANULARITY_ODT_ENTRY_SIZE_STIM") {
            daq.stim_granularity = Some(token.clone());
            daq.max_odt_entry_size_stim = size();
        } else if let Some(kind) = token.strip_prefix("OVERLOAD_INDICATION_") {
            daq.overload_indication = Some(kind.to_string());
        } else if token == "BIT_STIM_SUPPORTED" {
            daq.bit_stim_supported = true;
        }
    }

    daq.events = block.children_of(BlockKind::Event).map(decode_daq_event).collect();
    trace!(events = daq.events.len(); "DAQ decoded");

    daq
}

// ---------------------------------------------------------------------------
// EVENT
// ---------------------------------------------------------------------------

/// Decode one DAQ `EVENT`.
///
/// Fields are found by scanning rather than by position: the first two quoted
/// tokens are the names, the first integer is the channel number, and the four
/// integers after the type tag are max DAQ lists, cycle, time unit and priority.
pub fn decode_daq_event(block: &Block) -> DaqEvent {
    let tokens = block.flat_tokens();

    let mut quoted = tokens
        .iter()
        .filter(|t| is_quoted(t))
        .map(|t| unquote(t).to_string());
    let name = quoted.next().unwrap_or_default();
    let short_name = quoted.next();

    let event_channel_number = tokens.iter().find_map(|t| parse_int(t));

    let type_position = tokens
        .iter()
        .position(|t| EVENT_TYPES.contains(&t.as_str()));

    let mut event = DaqEvent {
        name,
        short_name,
        event_channel_number,
        event_type: type_position.map(|pos| tokens[pos].clone()),
        source_lines: block.content_lines.clone(),
        ..DaqEvent::default()
    };

    if let Some(pos) = type_position {
        let after: Vec<i64> = tokens[pos + 1..]
            .iter()
            .filter_map(|t| parse_int(t))
            .take(4)
            .collect();
        if let [max_daq_list, cycle, time_unit, priority] = after[..] {
            event.max_daq_list = Some(max_daq_list);
            event.cycle = Some(cycle);
            event.time_unit = Some(time_unit);
            event.priority = Some(priority);
        }
    }

    event
}
