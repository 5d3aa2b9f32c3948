// One network probe as read from a raw log

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeRecord {
    pub flow_id: String,
    pub send_time: f64,
    pub reply_time: f64,
}

impl ProbeRecord {
    pub fn new(flow_id: impl Into<String>, send_time: f64, reply_time: f64) -> Self {
        Self {
            flow_id: flow_id.into(),
            send_time,
            reply_time,
        }
    }

    /// Round-trip time. Negative when the reply predates the send; not clamped.
    pub fn rtt(&self) -> f64 {
        self.reply_time - self.send_time
    }
}
