//! `XCP_ON_CAN` transport settings and the nested `CAN_FD` block.

use std::sync::LazyLock;

use a2l::block::{Block, BlockKind};
use a2l::parser::lexer::{parse_int, split_whitespace};
use regex::Regex;
use serde::Serialize;

/// A `KEYWORD value` content line.
static KEY_VALUE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z0-9_]+)\s+(\S+)$").expect("key/value line pattern is valid")
});

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct XcpOnCan {
    pub version: Option<i64>,
    pub can_id_broadcast: Option<i64>,
    pub can_id_master: Option<i64>,
    pub can_id_slave: Option<i64>,
    pub can_id_get_daq_clock_multicast: Option<i64>,
    pub baudrate: Option<i64>,
    pub sample_point: Option<i64>,
    pub sample_rate: Option<String>,
    pub btl_cycles: Option<i64>,
    pub sjw: Option<i64>,
    pub sync_edge: Option<String>,
    pub max_dlc_required: bool,
    pub max_bus_load: Option<i64>,
    pub can_fd: Option<CanFd>,
    pub source_lines: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CanFd {
    pub max_dlc: Option<i64>,
    pub data_transfer_baudrate: Option<i64>,
    pub sample_point: Option<i64>,
    pub btl_cycles: Option<i64>,
    pub sjw: Option<i64>,
    pub sync_edge: Option<String>,
    pub max_dlc_required: bool,
    pub secondary_sample_point: Option<i64>,
    pub transceiver_delay_compensation: Option<String>,
    pub source_lines: Vec<String>,
}

/// Yields `(keyword, value)` for every content line shaped like `KEYWORD value`.
///
/// `MAX_DLC_REQUIRED` is a flag and usually stands alone on its line, so a
/// line whose only token is a keyword yields that keyword with an empty value.
fn keyword_lines(block: &Block) -> impl Iterator<Item = (String, String)> + '_ {
    block.content_lines.iter().filter_map(|line| {
        let line = line.trim();
        if let Some(captures) = KEY_VALUE_LINE.captures(line) {
            return Some((captures[1].to_string(), captures[2].to_string()));
        }
        match split_whitespace(line).as_slice() {
            [keyword] => Some((keyword.clone(), String::new())),
            _ => None,
        }
    })
}

pub fn decode_xcp_on_can(block: &Block) -> XcpOnCan {
    let mut can = XcpOnCan {
        version: block.flat_tokens().first().and_then(|t| parse_int(t)),
        source_lines: block.content_lines.clone(),
        ..XcpOnCan::default()
    };

    for (keyword, value) in keyword_lines(block) {
        match keyword.to_ascii_uppercase().as_str() {
            "CAN_ID_BROADCAST" => can.can_id_broadcast = parse_int(&value),
            "CAN_ID_MASTER" => can.can_id_master = parse_int(&value),
            "CAN_ID_SLAVE" => can.can_id_slave = parse_int(&value),
            "CAN_ID_GET_DAQ_CLOCK_MULTICAST" => {
                can.can_id_get_daq_clock_multicast = parse_int(&value)
            }
            "BAUDRATE" => can.baudrate = parse_int(&value),
            "SAMPLE_POINT" => can.sample_point = parse_int(&value),
            "SAMPLE_RATE" => can.sample_rate = Some(value),
            "BTL_CYCLES" => can.btl_cycles = parse_int(&value),
            "SJW" => can.sjw = parse_int(&value),
            "SYNC_EDGE" => can.sync_edge = Some(value),
            "MAX_DLC_REQUIRED" => can.max_dlc_required = true,
            "MAX_BUS_LOAD" => can.max_bus_load = parse_int(&value),
            _ => {}
        }
    }

    can.can_fd = block.first_of(BlockKind::CanFd).map(decode_can_fd);
    can
}

pub fn decode_can_fd(block: &Block) -> CanFd {
    let mut fd = CanFd {
        source_lines: block.content_lines.clone(),
        ..CanFd::default()
    };

    for (keyword, value) in keyword_lines(block) {
        match keyword.to_ascii_uppercase().as_str() {
            "MAX_DLC" => fd.max_dlc = parse_int(&value),
            "CAN_FD_DATA_TRANSFER_BAUDRATE" => fd.data_transfer_baudrate = parse_int(&value),
            "SAMPLE_POINT" => fd.sample_point = parse_int(&value),
            "BTL_CYCLES" => fd.btl_cycles = parse_int(&value),
            "SJW" => fd.sjw = parse_int(&value),
            "SYNC_EDGE" => fd.sync_edge = Some(value),
            "MAX_DLC_REQUIRED" => fd.max_dlc_required = true,
            "SECONDARY_SAMPLE_POINT" => fd.secondary_sample_point = parse_int(&value),
            "TRANSCEIVER_DELAY_COMPENSATION" => fd.transceiver_delay_compensation = Some(value),
            _ => {}
        }
    }

    fd
}
