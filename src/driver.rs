// Batch driver: runs the pipeline over every discovered file, several at a time.
// Each file runs on the blocking pool; its output is written to a temp file in the output
// directory and renamed into place only after both pipeline stages succeed.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;

use tempfile::NamedTempFile;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, instrument, warn};

use crate::config::{AppConfig, OutputFormat};
use crate::discovery::FileJob;
use crate::error::PipelineError;
use crate::pipeline;
use crate::table_io::{read_probes, write_table, write_table_json};

/// Per-run counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub written: usize,
    pub failed: usize,
}

/// Reads, processes and writes one file. Returns the number of rows written.
#[instrument(skip_all, fields(input = %job.input.display()))]
pub fn process_file(job: &FileJob, config: &AppConfig) -> Result<usize, PipelineError> {
    let file = File::open(&job.input)?;
    let records = read_probes(BufReader::new(file), config.input.separator)?;
    let table = pipeline::process(records, &config.pipeline)?;

    let dir = job.output.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let writer = BufWriter::new(tmp.as_file_mut());
        match config.output.format {
            OutputFormat::Csv => write_table(writer, &table, config.output.separator)?,
            OutputFormat::Json => write_table_json(writer, &table)?,
        }
    }
    tmp.persist(&job.output).map_err(|e| e.error)?;
    Ok(table.len())
}

/// Processes `jobs` with at most `driver.max_parallel_files` in flight. Bad input files are
/// logged and counted; a configuration error aborts the run.
pub async fn run(jobs: Vec<FileJob>, config: Arc<AppConfig>) -> anyhow::Result<RunSummary> {
    let total = jobs.len();
    let mut summary = RunSummary {
        total,
        ..Default::default()
    };
    if total == 0 {
        return Ok(summary);
    }

    let permits = Arc::new(Semaphore::new(config.driver.max_parallel_files));
    let mut tasks = JoinSet::new();
    for (i, job) in jobs.into_iter().enumerate() {
        let permits = permits.clone();
        let config = config.clone();
        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await?;
            info!(
                "[{}/{}] Collecting raw data from '{}'",
                i + 1,
                total,
                job.input.display()
            );
            let result = tokio::task::spawn_blocking(move || {
                let outcome = process_file(&job, &config);
                (job, outcome)
            })
            .await?;
            anyhow::Ok((i, result))
        });
    }

    while let Some(joined) = tasks.join_next().await {
        let (i, (job, outcome)) = joined??;
        match outcome {
            Ok(rows) => {
                summary.written += 1;
                info!(
                    rows,
                    "[{}/{}] RTT result saved to '{}'",
                    i + 1,
                    total,
                    job.output.display()
                );
            }
            Err(e @ PipelineError::Configuration(_)) => {
                tasks.abort_all();
                return Err(anyhow::anyhow!("{}: {}", job.input.display(), e));
            }
            Err(e) => {
                summary.failed += 1;
                warn!(
                    error = %e,
                    operation = "process_file",
                    input_error = e.is_input_error(),
                    "[{}/{}] skipping '{}'",
                    i + 1,
                    total,
                    job.input.display()
                );
            }
        }
    }

    info!(
        written = summary.written,
        failed = summary.failed,
        total = summary.total,
        "run complete"
    );
    Ok(summary)
}
