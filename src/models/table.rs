// Bucketed RTT table: one row per time bucket, one column per flow.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Header of the bucket key column.
pub const TIME_COLUMN: &str = "Time";
/// Header of the all-flows mean column.
pub const AGGREGATE_COLUMN: &str = "Aggregate-Flow";

/// Rows are ascending by `time` and `time` values are unique. Every flow column has
/// exactly `time.len()` cells; `None` means the flow had no probe in that bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RttTable {
    pub time: Vec<f64>,
    pub aggregate: Vec<f64>,
    pub flows: BTreeMap<String, Vec<Option<f64>>>,
}

impl RttTable {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn flow_ids(&self) -> impl Iterator<Item = &str> {
        self.flows.keys().map(String::as_str)
    }

    pub fn flow(&self, flow_id: &str) -> Option<&[Option<f64>]> {
        self.flows.get(flow_id).map(Vec::as_slice)
    }

    /// Output header: `Time`, `Aggregate-Flow`, then flow ids in ascending order.
    pub fn header(&self) -> Vec<&str> {
        let mut cols = Vec::with_capacity(2 + self.flows.len());
        cols.push(TIME_COLUMN);
        cols.push(AGGREGATE_COLUMN);
        cols.extend(self.flow_ids());
        cols
    }
}
