use serde::Serialize;

use crate::conversion::{CompuMethod, CompuVtab};
use crate::grouping::{Function, Group};
use crate::layout::RecordLayout;
use crate::memory::MemorySegment;
use crate::quantity::{AxisPts, Characteristic, Measurement};
use crate::transport::XcpOnCan;
use crate::xcp::{DaqConfig, DaqEvent, ProtocolLayer};

/// Everything decoded from one A2L description.
///
/// Cross references (a measurement naming its conversion method, a group
/// naming its members) are kept as plain names and never resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Document {
    pub project_name: Option<String>,
    pub module_name: Option<String>,
    pub protocol_layer: Option<ProtocolLayer>,
    pub daq: Option<DaqConfig>,
    pub transport: Option<XcpOnCan>,
    pub memory_segments: Vec<MemorySegment>,
    pub axis_pts: Vec<AxisPts>,
    pub measurements: Vec<Measurement>,
    pub characteristics: Vec<Characteristic>,
    pub compu_methods: Vec<CompuMethod>,
    pub compu_vtabs: Vec<CompuVtab>,
    pub record_layouts: Vec<RecordLayout>,
    pub groups: Vec<Group>,
    pub functions: Vec<Function>,
}

impl Document {
    /// Events of the DAQ configuration, empty when there is none.
    pub fn daq_events(&self) -> &[DaqEvent] {
        self.daq
            .as_ref()
            .map(|daq| daq.events.as_slice())
            .unwrap_or_default()
    }

    /// Labelled entity counts in a fixed order.
    pub fn entity_counts(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("memory_segments", self.memory_segments.len()),
            ("daq_events", self.daq_events().len()),
            ("axis_pts", self.axis_pts.len()),
            ("measurements", self.measurements.len()),
            ("characteristics", self.characteristics.len()),
            ("compu_methods", self.compu_methods.len()),
            ("compu_vtabs", self.compu_vtabs.len()),
            ("record_layouts", self.record_layouts.len()),
            ("groups", self.groups.len()),
            ("functions", self.functions.len()),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.project_name.is_none() && self.entity_counts().iter().all(|(_, n)| *n == 0)
    }
}
