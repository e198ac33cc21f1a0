//! `MEMORY_SEGMENT` blocks from `MOD_PAR`, including the XCP paging info
//! vendors attach under `IF_DATA XCPplus`.

use a2l::block::{Block, BlockKind};
use a2l::parser::lexer::{is_quoted, join_unquoted, parse_int, unquote};
use serde::Serialize;

use crate::assembler::XCP_PLUS_TAG;

const ACCESS_MODES: [&str; 2] = ["INTERN", "EXTERN"];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MemorySegment {
    pub name: String,
    pub long_identifier: Option<String>,
    /// Segment class such as `CODE`, `DATA` or `RESERVED`.
    pub class_type: Option<String>,
    /// Memory type such as `RAM`, `FLASH` or `EEPROM`.
    pub memory_type: Option<String>,
    pub address: Option<i64>,
    pub size: Option<i64>,
    /// The offsets that follow size on the access line, verbatim.
    pub attributes: Vec<String>,
    pub segment_info: Option<SegmentInfo>,
    pub source_lines: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SegmentInfo {
    pub segment_number: Option<i64>,
    pub num_pages: Option<i64>,
    pub address_extension: Option<i64>,
    pub compression_method: Option<i64>,
    pub encryption_method: Option<i64>,
    pub checksum_type: Option<String>,
    pub pages: Vec<PageInfo>,
    pub source_lines: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageInfo {
    pub page_number: Option<i64>,
    pub ecu_access: Option<String>,
    pub xcp_read_access: Option<String>,
    pub xcp_write_access: Option<String>,
}

/// Decode a `MEMORY_SEGMENT` block.
///
/// The name and long identifier normally sit on the begin line. When the
/// header is bare, the first body line carries the name (and possibly the
/// long identifier), or the long identifier is the following line if that
/// line is a single string literal.
pub fn decode_memory_segment(block: &Block) -> MemorySegment {
    let lines = block.token_lines();
    let mut body = lines.as_slice();

    let (name, long_identifier) = match block.arguments.split_first() {
        Some((name, rest)) => (
            unquote(name).to_string(),
            (!rest.is_empty()).then(|| join_unquoted(rest)),
        ),
        None => match body.split_first() {
            Some((first, tail)) => {
                body = tail;
                let name = first.first().map(|t| unquote(t).to_string());
                let long_identifier = if first.len() > 1 {
                    Some(join_unquoted(&first[1..]))
                } else if let Some((next, tail)) = body.split_first()
                    && let [literal] = next.as_slice()
                    && is_quoted(literal)
                {
                    body = tail;
                    Some(unquote(literal).to_string())
                } else {
                    None
                };
                (name.unwrap_or_default(), long_identifier)
            }
            None => (String::new(), None),
        },
    };

    let mut segment = MemorySegment {
        name,
        long_identifier,
        source_lines: block.content_lines.clone(),
        ..MemorySegment::default()
    };

    let mut classified = false;
    let mut access_found = false;
    for line in body {
        if !classified
            && let [class_type, memory_type] = line.as_slice()
            && is_alphabetic(class_type)
            && is_alphabetic(memory_type)
        {
            segment.class_type = Some(class_type.clone());
            segment.memory_type = Some(memory_type.clone());
            classified = true;
            continue;
        }

        if !access_found
            && line.len() >= 3
            && ACCESS_MODES.contains(&line[0].as_str())
        {
            segment.address = parse_int(&line[1]);
            segment.size = parse_int(&line[2]);
            segment.attributes = line[3..].iter().map(|t| unquote(t).to_string()).collect();
            access_found = true;
        }
    }

    segment.segment_info = find_segment_block(block).map(decode_segment_info);
    segment
}

/// Letters and underscores, starting with a letter (`OFFLINE_DATA`, `FLASH`).
fn is_alphabetic(token: &str) -> bool {
    token.starts_with(|c: char| c.is_ascii_alphabetic())
        && token.chars().all(|c| c.is_ascii_alphabetic() || c == '_')
}

/// `IF_DATA` → `XCPplus` → `SEGMENT`. The `XCPplus` level is either the
/// `IF_DATA` block's own tag argument or a nested block of that name.
fn find_segment_block(block: &Block) -> Option<&Block> {
    block.children_of(BlockKind::IfData).find_map(|if_data| {
        if if_data.first_argument() == Some(XCP_PLUS_TAG) {
            if_data.first_of(BlockKind::Segment)
        } else {
            if_data
                .first_of(BlockKind::XcpPlus)
                .and_then(|xcp| xcp.first_of(BlockKind::Segment))
        }
    })
}

pub fn decode_segment_info(block: &Block) -> SegmentInfo {
    let numbers: Vec<i64> = block
        .flat_tokens()
        .iter()
        .filter_map(|t| parse_int(t))
        .take(5)
        .collect();

    let mut info = SegmentInfo {
        checksum_type: block
            .first_of(BlockKind::Checksum)
            .and_then(|checksum| checksum.flat_tokens().into_iter().next()),
        pages: block.children_of(BlockKind::Page).map(decode_page).collect(),
        source_lines: block.content_lines.clone(),
        ..SegmentInfo::default()
    };

    if let [segment, pages, extension, compression, encryption] = numbers[..] {
        info.segment_number = Some(segment);
        info.num_pages = Some(pages);
        info.address_extension = Some(extension);
        info.compression_method = Some(compression);
        info.encryption_method = Some(encryption);
    }

    info
}

pub fn decode_page(block: &Block) -> PageInfo {
    let mut tokens = block.flat_tokens().into_iter();
    PageInfo {
        page_number: tokens.next().and_then(|t| parse_int(&t)),
        ecu_access: tokens.next(),
        xcp_read_access: tokens.next(),
        xcp_write_access: tokens.next(),
    }
}
