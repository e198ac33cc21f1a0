use a2l::parser::Parser;
use decoder::{Document, decode_program, parse_document};

const ECU: &str = r#"
/* Demo ECU description */
ASAP2_VERSION 1 71
/begin PROJECT Demo "Demo project"
  /begin MODULE Engine "Engine controller"

    /begin MOD_PAR "ECU"
      /begin MEMORY_SEGMENT Cal "Calibration"
        DATA RAM
        INTERN 0x8000 0x400 -1 -1 -1 -1 -1
        /begin IF_DATA XCPplus
          /begin SEGMENT 0 2 0 0 0
            /begin CHECKSUM XCP_ADD_44 /end CHECKSUM
            /begin PAGE 0x0 ECU_ACCESS_WITH_XCP_ONLY XCP_READ_ACCESS_WITH_ECU_ONLY XCP_WRITE_ACCESS_NOT_ALLOWED /end PAGE
            /begin PAGE 0x1 ECU_ACCESS_WITH_XCP_ONLY XCP_READ_ACCESS_WITH_ECU_ONLY XCP_WRITE_ACCESS_WITH_ECU_ONLY /end PAGE
          /end SEGMENT
        /end IF_DATA
      /end MEMORY_SEGMENT
      /begin MEMORY_SEGMENT Code "Code"
        CODE FLASH
        INTERN 0x0 0x8000 -1 -1 -1 -1 -1
      /end MEMORY_SEGMENT
    /end MOD_PAR

    /begin IF_DATA CANAPE_EXT
      100
    /end IF_DATA

    /begin IF_DATA XCPplus 0x0104
      /begin PROTOCOL_LAYER
        0x0104
        1000 2000 0 0 0 0 0
        8 8 0
        BYTE_ORDER_MSB_LAST
        ADDRESS_GRANULARITY_BYTE
        OPTIONAL_CMD GET_ID
      /end PROTOCOL_LAYER
      /begin DAQ
        STATIC 2 2 0
        OVERLOAD_INDICATION_EVENT
        /begin EVENT "10ms" "10ms" 0 DAQ 1 10 6 0 /end EVENT
        /begin EVENT "100ms" "100ms" 1 DAQ 1 100 6 0 /end EVENT
      /end DAQ
      /begin XCP_ON_CAN 0x0100
        CAN_ID_MASTER 0x7E0
        CAN_ID_SLAVE 0x7E8
        BAUDRATE 500000
      /end XCP_ON_CAN
    /end IF_DATA

    /begin AXIS_PTS RpmAxis
      "Rpm axis"
      0x8100
      EngineSpeed
      RL_AXIS
      0
      CM_RPM
      8
      0
      8000
    /end AXIS_PTS

    /begin MEASUREMENT EngineSpeed
      "Engine speed"
      UWORD
      CM_RPM
      0 8000
      ECU_ADDRESS 0x2000
    /end MEASUREMENT

    /begin MEASUREMENT Gear
      "Selected gear"
      UBYTE
      CM_GEAR
      ECU_ADDRESS 0x2002
    /end MEASUREMENT

    /begin CHARACTERISTIC MaxTorque
      "Torque limit"
      VALUE
      0x8000
      RL_FLOAT
      0
      CM_NM
      0
      500
    /end CHARACTERISTIC

    /begin COMPU_METHOD CM_RPM
      "rpm"
      RAT_FUNC
      "%6.1"
      "1/min"
      COEFFS 0 1 0 0 0 1
    /end COMPU_METHOD

    /begin COMPU_METHOD CM_GEAR
      "gear"
      TAB_VERB
      "%d"
      ""
      COMPU_TAB_REF VT_GEAR
    /end COMPU_METHOD

    /begin COMPU_VTAB VT_GEAR
      "Gear names"
      TAB_VERB
      3
      0 "Neutral"
      1 "First"
      2 "Second"
    /end COMPU_VTAB

    /begin RECORD_LAYOUT RL_FLOAT
      FNC_VALUES 1 FLOAT32_IEEE COLUMN_DIR DIRECT
    /end RECORD_LAYOUT

    /begin RECORD_LAYOUT RL_AXIS
      AXIS_PTS_X 1 UWORD INDEX_INCR DIRECT
    /end RECORD_LAYOUT

    /begin GROUP Powertrain
      "Powertrain signals"
      /begin REF_MEASUREMENT
        EngineSpeed Gear
      /end REF_MEASUREMENT
    /end GROUP

    /begin FUNCTION TorqueControl
      "Torque control"
      /begin DEF_CHARACTERISTIC MaxTorque /end DEF_CHARACTERISTIC
      /begin LOC_MEASUREMENT
        EngineSpeed
      /end LOC_MEASUREMENT
    /end FUNCTION

  /end MODULE
/end PROJECT
"#;

fn decode(source: &str) -> Document {
    let program = Parser::new(source.to_string(), 0).parse();
    assert!(program.warnings.is_empty(), "{:?}", program.warnings);
    decode_program(&program)
}

#[test]
fn decodes_full_description() {
    let document = decode(ECU);

    assert_eq!(document.project_name.as_deref(), Some("Demo"));
    assert_eq!(document.module_name.as_deref(), Some("Engine"));

    let layer = document.protocol_layer.as_ref().expect("protocol layer");
    assert_eq!(layer.version, Some(0x0104));
    assert_eq!(layer.max_cto, Some(8));
    assert_eq!(layer.max_dto, Some(8));
    assert_eq!(layer.optional_commands, vec!["GET_ID"]);

    let daq = document.daq.as_ref().expect("daq");
    assert_eq!(daq.mode.as_deref(), Some("STATIC"));
    assert_eq!(daq.overload_indication.as_deref(), Some("EVENT"));
    assert_eq!(document.daq_events().len(), 2);
    assert_eq!(document.daq_events()[1].cycle, Some(100));

    let transport = document.transport.as_ref().expect("transport");
    assert_eq!(transport.version, Some(0x0100));
    assert_eq!(transport.can_id_master, Some(0x7E0));
    assert_eq!(transport.can_id_slave, Some(0x7E8));

    assert_eq!(document.memory_segments.len(), 2);
    let cal = &document.memory_segments[0];
    assert_eq!(cal.address, Some(0x8000));
    let info = cal.segment_info.as_ref().expect("segment info");
    assert_eq!(info.num_pages, Some(2));
    assert_eq!(info.checksum_type.as_deref(), Some("XCP_ADD_44"));
    assert_eq!(info.pages.len(), 2);
    assert!(document.memory_segments[1].segment_info.is_none());

    let names: Vec<&str> = document.measurements.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["EngineSpeed", "Gear"]);
    assert_eq!(document.measurements[1].ecu_address, Some(0x2002));

    assert_eq!(document.axis_pts[0].input_quantity.as_deref(), Some("EngineSpeed"));
    assert_eq!(document.characteristics[0].upper_limit, Some(500.0));
    assert_eq!(document.compu_methods[1].compu_tab_ref.as_deref(), Some("VT_GEAR"));
    assert_eq!(document.compu_vtabs[0].entries.len(), 3);
    assert_eq!(document.compu_vtabs[0].entries[2].text, "Second");
    assert_eq!(document.record_layouts.len(), 2);
    assert_eq!(document.groups[0].ref_measurements, vec!["EngineSpeed", "Gear"]);
    assert_eq!(document.functions[0].def_characteristics, vec!["MaxTorque"]);
    assert_eq!(document.functions[0].loc_measurements, vec!["EngineSpeed"]);
}

#[test]
fn entity_counts_follow_fixed_order() {
    let document = decode(ECU);
    assert_eq!(
        document.entity_counts(),
        vec![
            ("memory_segments", 2),
            ("daq_events", 2),
            ("axis_pts", 1),
            ("measurements", 2),
            ("characteristics", 1),
            ("compu_methods", 2),
            ("compu_vtabs", 1),
            ("record_layouts", 2),
            ("groups", 1),
            ("functions", 1),
        ]
    );
    assert!(!document.is_empty());
}

#[test]
fn only_tagged_if_data_is_decoded() {
    let document = parse_document(
        "/begin PROJECT P\n/begin MODULE M\n\
         /begin IF_DATA OTHER\n/begin DAQ\nSTATIC 1 1 0\n/end DAQ\n/end IF_DATA\n\
         /end MODULE\n/end PROJECT\n",
    );
    assert!(document.daq.is_none());
    assert!(document.protocol_layer.is_none());
    assert!(document.daq_events().is_empty());
}

#[test]
fn first_tagged_if_data_wins() {
    let document = parse_document(
        "/begin PROJECT P\n/begin MODULE M\n\
         /begin IF_DATA XCPplus\n/begin DAQ\nSTATIC 1 1 0\n/end DAQ\n/end IF_DATA\n\
         /begin IF_DATA XCPplus\n/begin DAQ\nDYNAMIC 9 9 9\n/end DAQ\n/end IF_DATA\n\
         /end MODULE\n/end PROJECT\n",
    );
    assert_eq!(document.daq.and_then(|daq| daq.mode).as_deref(), Some("STATIC"));
}

#[test]
fn missing_levels_short_circuit() {
    assert!(parse_document("").is_empty());
    assert!(parse_document("/begin MODULE M\n/begin MEASUREMENT m\n/end MEASUREMENT\n/end MODULE\n").is_empty());

    let document = parse_document("/begin PROJECT P\n/end PROJECT\n");
    assert_eq!(document.project_name.as_deref(), Some("P"));
    assert_eq!(document.module_name, None);
    assert!(document.measurements.is_empty());
}

#[test]
fn project_and_module_names_are_unquoted() {
    let document = parse_document("/begin PROJECT \"P\"\n/begin MODULE \"M\"\n/end MODULE\n/end PROJECT\n");
    assert_eq!(document.project_name.as_deref(), Some("P"));
    assert_eq!(document.module_name.as_deref(), Some("M"));
}

#[test]
fn entities_nested_below_module_children_are_not_collected() {
    let document = parse_document(
        "/begin PROJECT P\n/begin MODULE M\n\
         /begin GROUP g\n\"d\"\n/begin MEASUREMENT hidden\n/end MEASUREMENT\n/end GROUP\n\
         /end MODULE\n/end PROJECT\n",
    );
    assert!(document.measurements.is_empty());
    assert_eq!(document.groups.len(), 1);
}

#[test]
fn unclosed_module_still_decodes() {
    let program = Parser::new(
        "/begin PROJECT P\n/begin MODULE M\n/begin MEASUREMENT m\n\"d\"\nUBYTE\n".to_string(),
        0,
    )
    .parse();
    assert_eq!(program.warnings.len(), 3);
    let document = decode_program(&program);
    assert_eq!(document.measurements.len(), 1);
    assert_eq!(document.measurements[0].datatype.as_deref(), Some("UBYTE"));
}

#[test]
fn serializes_to_json_in_declaration_order() {
    let document = decode(ECU);
    let json = serde_json::to_value(&document).expect("serializable");

    assert_eq!(json["project_name"], "Demo");
    assert_eq!(json["daq"]["events"][0]["type"], "DAQ");
    assert_eq!(json["daq"]["events"][0]["name"], "10ms");
    assert_eq!(json["compu_vtabs"][0]["entries"][1]["text"], "First");
    assert_eq!(json["measurements"][0]["ecu_address"], 0x2000);
    assert!(json["measurements"][0]["symbol_link"].is_null());

    let text = serde_json::to_string(&document).expect("serializable");
    let project = text.find("\"project_name\"").expect("project field");
    let functions = text.find("\"functions\"").expect("functions field");
    assert!(project < functions);
}
