// Delimited-text reader/writer tests

use rttseries::PipelineError;
use rttseries::models::{ProbeRecord, RttTable};
use rttseries::table_io::{read_probes, write_table, write_table_json};
use std::collections::BTreeMap;
use std::io::Cursor;

fn read(text: &str) -> Result<Vec<ProbeRecord>, PipelineError> {
    read_probes(Cursor::new(text), ',')
}

#[test]
fn read_probes_maps_columns_by_name() {
    let text = "reply_rx,extra,ssid,test_tx\n3.5,x,flowA,1.5\n7,y,flowB,2\n";
    let records = read(text).unwrap();
    assert_eq!(
        records,
        vec![
            ProbeRecord::new("flowA", 1.5, 3.5),
            ProbeRecord::new("flowB", 2.0, 7.0),
        ]
    );
}

#[test]
fn read_probes_header_only_is_empty() {
    assert!(read("ssid,test_tx,reply_rx\n").unwrap().is_empty());
    assert!(read("").unwrap().is_empty());
}

#[test]
fn read_probes_skips_blank_lines_and_handles_crlf() {
    let text = "ssid,test_tx,reply_rx\r\n\r\nA,0,1\r\n\nB,1,3\r\n";
    let records = read(text).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].rtt(), 2.0);
}

#[test]
fn read_probes_quoted_header_and_flow() {
    let text = "\"ssid\",\"test_tx\",\"reply_rx\"\n\"a,b\",0,1\n";
    let records = read(text).unwrap();
    assert_eq!(records[0].flow_id, "a,b");
}

#[test]
fn read_probes_missing_column_is_schema_error() {
    let err = read("ssid,test_tx\nA,0\n").unwrap_err();
    match err {
        PipelineError::Schema { column } => assert_eq!(column, "reply_rx"),
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn read_probes_non_numeric_value_is_parse_error() {
    let err = read("ssid,test_tx,reply_rx\nA,0,1\nA,abc,2\n").unwrap_err();
    match err {
        PipelineError::Parse {
            line,
            column,
            value,
        } => {
            assert_eq!(line, 3);
            assert_eq!(column, "test_tx");
            assert_eq!(value, "abc");
        }
        other => panic!("expected parse error, got {other:?}"),
    }
    assert!(
        read("ssid,test_tx,reply_rx\nA,0\n")
            .unwrap_err()
            .is_input_error()
    );
}

#[test]
fn read_probes_rejects_non_finite_timestamp() {
    let err = read("ssid,test_tx,reply_rx\nA,0,5\nA,NaN,6\nB,0.5,7\n").unwrap_err();
    match err {
        PipelineError::Parse {
            line,
            column,
            value,
        } => {
            assert_eq!(line, 3);
            assert_eq!(column, "test_tx");
            assert_eq!(value, "NaN");
        }
        other => panic!("expected parse error, got {other:?}"),
    }

    for bad in ["inf", "-inf", "infinity", "nan"] {
        let text = format!("ssid,test_tx,reply_rx\nA,0,{bad}\n");
        match read(&text).unwrap_err() {
            PipelineError::Parse { column, value, .. } => {
                assert_eq!(column, "reply_rx");
                assert_eq!(value, bad);
            }
            other => panic!("expected parse error for {bad}, got {other:?}"),
        }
    }
}

#[test]
fn read_probes_microsecond_epochs_are_exact() {
    let text = "ssid,test_tx,reply_rx\nA,1700000000123456,1700000000123789\n";
    let records = read(text).unwrap();
    assert_eq!(records[0].send_time, 1_700_000_000_123_456.0);
    assert_eq!(records[0].rtt(), 333.0);
}

#[test]
fn read_probes_custom_separator() {
    let text = "ssid;test_tx;reply_rx\nA;0;0.5\n";
    let records = read_probes(Cursor::new(text), ';').unwrap();
    assert_eq!(records, vec![ProbeRecord::new("A", 0.0, 0.5)]);
}

fn sample_table() -> RttTable {
    let mut flows = BTreeMap::new();
    flows.insert("B".to_string(), vec![Some(4.0), None]);
    flows.insert("A".to_string(), vec![Some(1.5), Some(2.0)]);
    RttTable {
        time: vec![0.0, 1.0],
        aggregate: vec![2.75, 2.0],
        flows,
    }
}

#[test]
fn write_table_renders_header_rows_and_gaps() {
    let mut buf = Vec::new();
    write_table(&mut buf, &sample_table(), ',').unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert_eq!(text, "Time,Aggregate-Flow,A,B\n0,2.75,1.5,4\n1,2,2,\n");
}

#[test]
fn write_table_uses_separator() {
    let mut buf = Vec::new();
    write_table(&mut buf, &sample_table(), '\t').unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.starts_with("Time\tAggregate-Flow\tA\tB\n"));
}

#[test]
fn write_table_empty_has_header_only() {
    let mut buf = Vec::new();
    write_table(&mut buf, &RttTable::default(), ',').unwrap();
    assert_eq!(String::from_utf8(buf).unwrap(), "Time,Aggregate-Flow\n");
}

#[test]
fn write_table_quotes_flow_ids_containing_separator() {
    let mut table = RttTable {
        time: vec![0.0],
        aggregate: vec![1.0],
        flows: BTreeMap::new(),
    };
    table.flows.insert("x,y".to_string(), vec![Some(1.0)]);
    let mut buf = Vec::new();
    write_table(&mut buf, &table, ',').unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.starts_with("Time,Aggregate-Flow,\"x,y\"\n"));
}

#[test]
fn write_table_json_uses_null_for_gaps() {
    let mut buf = Vec::new();
    write_table_json(&mut buf, &sample_table()).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
    assert_eq!(value["time"], serde_json::json!([0.0, 1.0]));
    assert_eq!(value["flows"]["B"], serde_json::json!([4.0, null]));
}
