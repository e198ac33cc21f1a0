use std::fmt;

/// Block keywords the decoders know how to interpret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Project,
    Module,
    ModPar,
    IfData,
    XcpPlus,
    ProtocolLayer,
    Daq,
    Stim,
    Event,
    XcpOnCan,
    CanFd,
    MemorySegment,
    Segment,
    Checksum,
    Page,
    AxisPts,
    Measurement,
    Characteristic,
    CompuMethod,
    CompuVtab,
    RecordLayout,
    Group,
    Function,
    RefMeasurement,
    RefCharacteristic,
    SubGroup,
    LocMeasurement,
    DefCharacteristic,
    InMeasurement,
    OutMeasurement,
    SubFunction,
}

impl BlockKind {
    pub const ALL: [BlockKind; 31] = [
        BlockKind::Project,
        BlockKind::Module,
        BlockKind::ModPar,
        BlockKind::IfData,
        BlockKind::XcpPlus,
        BlockKind::ProtocolLayer,
        BlockKind::Daq,
        BlockKind::Stim,
        BlockKind::Event,
        BlockKind::XcpOnCan,
        BlockKind::CanFd,
        BlockKind::MemorySegment,
        BlockKind::Segment,
        BlockKind::Checksum,
        BlockKind::Page,
        BlockKind::AxisPts,
        BlockKind::Measurement,
        BlockKind::Characteristic,
        BlockKind::CompuMethod,
        BlockKind::CompuVtab,
        BlockKind::RecordLayout,
        BlockKind::Group,
        BlockKind::Function,
        BlockKind::RefMeasurement,
        BlockKind::RefCharacteristic,
        BlockKind::SubGroup,
        BlockKind::LocMeasurement,
        BlockKind::DefCharacteristic,
        BlockKind::InMeasurement,
        BlockKind::OutMeasurement,
        BlockKind::SubFunction,
    ];

    /// The keyword as it appears after `/begin`.
    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Project => "PROJECT",
            BlockKind::Module => "MODULE",
            BlockKind::ModPar => "MOD_PAR",
            BlockKind::IfData => "IF_DATA",
            BlockKind::XcpPlus => "XCPplus",
            BlockKind::ProtocolLayer => "PROTOCOL_LAYER",
            BlockKind::Daq => "DAQ",
            BlockKind::Stim => "STIM",
            BlockKind::Event => "EVENT",
            BlockKind::XcpOnCan => "XCP_ON_CAN",
            BlockKind::CanFd => "CAN_FD",
            BlockKind::MemorySegment => "MEMORY_SEGMENT",
            BlockKind::Segment => "SEGMENT",
            BlockKind::Checksum => "CHECKSUM",
            BlockKind::Page => "PAGE",
            BlockKind::AxisPts => "AXIS_PTS",
            BlockKind::Measurement => "MEASUREMENT",
            BlockKind::Characteristic => "CHARACTERISTIC",
            BlockKind::CompuMethod => "COMPU_METHOD",
            BlockKind::CompuVtab => "COMPU_VTAB",
            BlockKind::RecordLayout => "RECORD_LAYOUT",
            BlockKind::Group => "GROUP",
            BlockKind::Function => "FUNCTION",
            BlockKind::RefMeasurement => "REF_MEASUREMENT",
            BlockKind::RefCharacteristic => "REF_CHARACTERISTIC",
            BlockKind::SubGroup => "SUB_GROUP",
            BlockKind::LocMeasurement => "LOC_MEASUREMENT",
            BlockKind::DefCharacteristic => "DEF_CHARACTERISTIC",
            BlockKind::InMeasurement => "IN_MEASUREMENT",
            BlockKind::OutMeasurement => "OUT_MEASUREMENT",
            BlockKind::SubFunction => "SUB_FUNCTION",
        }
    }

    /// Case-insensitive keyword lookup.
    pub fn from_keyword(keyword: &str) -> Option<BlockKind> {
        BlockKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(keyword))
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
