// Domain models: raw probe rows in, bucketed RTT table out

mod probe;
mod table;

pub use probe::ProbeRecord;
pub use table::{AGGREGATE_COLUMN, RttTable, TIME_COLUMN};
