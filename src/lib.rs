// Library for the binary and tests

pub mod aggregation;
pub mod config;
pub mod discovery;
pub mod driver;
pub mod error;
pub mod hampel;
pub mod models;
pub mod pipeline;
pub mod table_io;

pub use error::{PipelineError, Result};
