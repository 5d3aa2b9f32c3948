// Bucketing: raw probes -> per-bucket mean RTT, overall and per flow.
// Pure; sorting and filtering happen in pipeline.

use std::collections::{BTreeMap, HashMap};

use crate::error::{PipelineError, Result};
use crate::models::{ProbeRecord, RttTable};

/// Running sum/count for one bucket.
#[derive(Debug, Clone, Copy, Default)]
struct MeanAccumulator {
    sum: f64,
    count: u64,
}

impl MeanAccumulator {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    /// Only called on accumulators that received at least one value.
    fn mean(&self) -> f64 {
        self.sum / (self.count as f64)
    }
}

/// Rejects non-positive or non-finite bucket widths.
pub fn validate_sampling_rate(sampling_rate: f64) -> Result<()> {
    if !sampling_rate.is_finite() || sampling_rate <= 0.0 {
        return Err(PipelineError::Configuration(format!(
            "sampling_rate must be a positive number, got {}",
            sampling_rate
        )));
    }
    Ok(())
}

/// Bucket index of `send_time`, counted in `sampling_rate` steps from `min_send_time`.
pub fn bucket_index(send_time: f64, min_send_time: f64, sampling_rate: f64) -> i64 {
    ((send_time - min_send_time) / sampling_rate).floor() as i64
}

/// Left edge of a bucket, in the same unit as the send timestamps.
pub fn bucket_time(index: i64, sampling_rate: f64) -> f64 {
    index as f64 * sampling_rate
}

/// Groups `records` into `sampling_rate`-wide buckets anchored at the earliest send time.
/// Returns one row per non-empty bucket, ascending. A flow with no probe in a bucket gets
/// `None` there, not zero. Record order does not matter.
pub fn aggregate(records: &[ProbeRecord], sampling_rate: f64) -> Result<RttTable> {
    validate_sampling_rate(sampling_rate)?;

    let Some(min_send_time) = records.iter().map(|r| r.send_time).min_by(f64::total_cmp) else {
        return Ok(RttTable::default());
    };

    let mut overall: BTreeMap<i64, MeanAccumulator> = BTreeMap::new();
    let mut by_flow: HashMap<&str, BTreeMap<i64, MeanAccumulator>> = HashMap::new();
    for r in records {
        let bucket = bucket_index(r.send_time, min_send_time, sampling_rate);
        let rtt = r.rtt();
        overall.entry(bucket).or_default().push(rtt);
        by_flow
            .entry(r.flow_id.as_str())
            .or_default()
            .entry(bucket)
            .or_default()
            .push(rtt);
    }

    let buckets: Vec<i64> = overall.keys().copied().collect();
    let time = buckets
        .iter()
        .map(|&b| bucket_time(b, sampling_rate))
        .collect();
    let aggregate = overall.values().map(MeanAccumulator::mean).collect();

    let flows = by_flow
        .into_iter()
        .map(|(flow_id, per_bucket)| {
            let column: Vec<Option<f64>> = buckets
                .iter()
                .map(|b| per_bucket.get(b).map(MeanAccumulator::mean))
                .collect();
            (flow_id.to_string(), column)
        })
        .collect();

    Ok(RttTable {
        time,
        aggregate,
        flows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_index_floors_toward_negative_infinity() {
        assert_eq!(bucket_index(10.0, 10.0, 1.0), 0);
        assert_eq!(bucket_index(10.99, 10.0, 1.0), 0);
        assert_eq!(bucket_index(11.0, 10.0, 1.0), 1);
        assert_eq!(bucket_index(12.5, 10.0, 0.5), 5);
    }

    #[test]
    fn validate_sampling_rate_rejects_nan() {
        assert!(validate_sampling_rate(f64::NAN).is_err());
        assert!(validate_sampling_rate(f64::INFINITY).is_err());
        assert!(validate_sampling_rate(0.25).is_ok());
    }
}
