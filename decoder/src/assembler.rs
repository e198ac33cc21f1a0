use a2l::Program;
use a2l::block::{Block, BlockKind};
use a2l::parser::lexer::unquote;
use log::debug;

use crate::conversion::{decode_compu_method, decode_compu_vtab};
use crate::document::Document;
use crate::grouping::{decode_function, decode_group};
use crate::layout::decode_record_layout;
use crate::memory::decode_memory_segment;
use crate::quantity::{decode_axis_pts, decode_characteristic, decode_measurement};
use crate::transport::decode_xcp_on_can;
use crate::xcp::{decode_daq, decode_protocol_layer};

/// First argument of the `IF_DATA` block that carries the XCP settings.
pub const XCP_PLUS_TAG: &str = "XCPplus";

pub fn decode_program(program: &Program) -> Document {
    decode_tree(&program.root)
}

/// Decode a block tree rooted at the synthetic root block.
///
/// Each step is optional: a missing `PROJECT`, `MODULE`, `IF_DATA XCPplus` or
/// `MOD_PAR` block leaves the corresponding fields empty.
pub fn decode_tree(root: &Block) -> Document {
    let mut document = Document::default();

    let Some(project) = root.first_of(BlockKind::Project) else {
        debug!("no PROJECT block");
        return document;
    };
    document.project_name = project.first_argument().map(|name| unquote(name).to_string());

    let Some(module) = project.first_of(BlockKind::Module) else {
        debug!(project = document.project_name.as_deref().unwrap_or(""); "no MODULE block");
        return document;
    };
    document.module_name = module.first_argument().map(|name| unquote(name).to_string());

    if let Some(if_data) = module
        .children_of(BlockKind::IfData)
        .find(|block| block.first_argument() == Some(XCP_PLUS_TAG))
    {
        document.protocol_layer = if_data
            .first_of(BlockKind::ProtocolLayer)
            .map(decode_protocol_layer);
        document.daq = if_data.first_of(BlockKind::Daq).map(decode_daq);
        document.transport = if_data.first_of(BlockKind::XcpOnCan).map(decode_xcp_on_can);
    }

    if let Some(mod_par) = module.first_of(BlockKind::ModPar) {
        document.memory_segments = mod_par
            .children_of(BlockKind::MemorySegment)
            .map(decode_memory_segment)
            .collect();
    }

    document.axis_pts = decode_all(module, BlockKind::AxisPts, decode_axis_pts);
    document.measurements = decode_all(module, BlockKind::Measurement, decode_measurement);
    document.characteristics =
        decode_all(module, BlockKind::Characteristic, decode_characteristic);
    document.compu_methods = decode_all(module, BlockKind::CompuMethod, decode_compu_method);
    document.compu_vtabs = decode_all(module, BlockKind::CompuVtab, decode_compu_vtab);
    document.record_layouts = decode_all(module, BlockKind::RecordLayout, decode_record_layout);
    document.groups = decode_all(module, BlockKind::Group, decode_group);
    document.functions = decode_all(module, BlockKind::Function, decode_function);

    for (label, count) in document.entity_counts() {
        debug!(kind = label, count = count; "decoded entities");
    }

    document
}

fn decode_all<T>(parent: &Block, kind: BlockKind, decode: fn(&Block) -> T) -> Vec<T> {
    parent.children_of(kind).map(decode).collect()
}
