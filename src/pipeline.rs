// Per-file pipeline: sort -> aggregate -> Hampel-filter every flow column.

use serde::Deserialize;
use tracing::debug;

use crate::aggregation::{self, validate_sampling_rate};
use crate::error::Result;
use crate::hampel::{DEFAULT_THRESHOLD, DEFAULT_WINDOW_HALF_WIDTH, HampelFilter, OutlierPolicy};
use crate::models::{ProbeRecord, RttTable};

/// Numeric settings for one pipeline run. Validated before any record is processed.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PipelineConfig {
    /// Bucket width, in the unit of the send timestamps.
    #[serde(default = "default_sampling_rate")]
    pub sampling_rate: f64,
    #[serde(default = "default_window_half_width")]
    pub window_half_width: usize,
    /// Rejection threshold in scaled-MAD units.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default)]
    pub outlier_policy: OutlierPolicy,
}

fn default_sampling_rate() -> f64 {
    1.0
}

fn default_window_half_width() -> usize {
    DEFAULT_WINDOW_HALF_WIDTH
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sampling_rate: default_sampling_rate(),
            window_half_width: default_window_half_width(),
            threshold: default_threshold(),
            outlier_policy: OutlierPolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Checks every parameter and builds the filter they describe.
    pub fn validate(&self) -> Result<HampelFilter> {
        validate_sampling_rate(self.sampling_rate)?;
        Ok(HampelFilter::new(self.window_half_width, self.threshold)?
            .with_policy(self.outlier_policy))
    }
}

/// Runs both stages over one file's records. The aggregate column is left unfiltered.
pub fn process(mut records: Vec<ProbeRecord>, config: &PipelineConfig) -> Result<RttTable> {
    let filter = config.validate()?;

    records.sort_by(|a, b| a.send_time.total_cmp(&b.send_time));
    let mut table = aggregation::aggregate(&records, config.sampling_rate)?;
    filter_flows(&mut table, &filter);

    debug!(
        operation = "process",
        records = records.len(),
        buckets = table.len(),
        flows = table.flows.len(),
        "pipeline complete"
    );
    Ok(table)
}

/// Filters each flow column in place, independently of the others.
pub fn filter_flows(table: &mut RttTable, filter: &HampelFilter) {
    for (flow_id, column) in table.flows.iter_mut() {
        let filtered = filter.filter(column);
        let changed = column
            .iter()
            .zip(&filtered)
            .filter(|(before, after)| before != after)
            .count();
        if changed > 0 {
            debug!(flow = %flow_id, outliers = changed, "outliers replaced");
        }
        *column = filtered;
    }
}
