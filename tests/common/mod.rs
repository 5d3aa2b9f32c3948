// Shared test helpers

#![allow(dead_code)]

use rttseries::models::ProbeRecord;
use std::path::Path;

pub fn probe(flow_id: &str, send_time: f64, rtt: f64) -> ProbeRecord {
    ProbeRecord::new(flow_id, send_time, send_time + rtt)
}

/// Raw log text with the standard header and one row per (flow, send, reply).
pub fn raw_csv(rows: &[(&str, f64, f64)]) -> String {
    let mut s = String::from("ssid,test_tx,reply_rx\n");
    for (flow, tx, rx) in rows {
        s.push_str(&format!("{},{},{}\n", flow, tx, rx));
    }
    s
}

pub fn write_file(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
