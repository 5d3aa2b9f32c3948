// Input discovery: find files ending in `<word char>_raw.csv` and pair each with its
// `<name>_rtt.csv` output.
// Inputs whose output already exists are skipped.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

const RAW_SUFFIX: &str = "_raw.csv";
const RTT_SUFFIX: &str = "_rtt.csv";

static RAW_FILE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\w_raw\.csv$").expect("raw file pattern is a valid regex")
});

/// One input file and the output path it will be written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Inputs still to process, sorted by file name.
    pub jobs: Vec<FileJob>,
    pub raw_files_found: usize,
    pub already_processed: usize,
}

pub fn is_raw_file(file_name: &str) -> bool {
    RAW_FILE_PATTERN.is_match(file_name)
}

/// `probe_raw.csv` -> `probe_rtt.csv`; `None` for names that are not raw logs.
pub fn output_name(raw_file_name: &str) -> Option<String> {
    if !is_raw_file(raw_file_name) {
        return None;
    }
    raw_file_name
        .strip_suffix(RAW_SUFFIX)
        .map(|stem| format!("{}{}", stem, RTT_SUFFIX))
}

/// Scans `src_dir` for raw logs and `out_dir` for finished outputs.
pub fn discover(src_dir: &Path, out_dir: &Path) -> anyhow::Result<Discovery> {
    let existing: HashSet<String> = file_names(out_dir)?.into_iter().collect();

    let mut raw_names: Vec<String> = file_names(src_dir)?
        .into_iter()
        .filter(|n| is_raw_file(n))
        .collect();
    raw_names.sort();

    let mut discovery = Discovery {
        raw_files_found: raw_names.len(),
        ..Default::default()
    };
    for raw in raw_names {
        let Some(out) = output_name(&raw) else {
            continue;
        };
        if existing.contains(&out) {
            discovery.already_processed += 1;
        } else {
            discovery.jobs.push(FileJob {
                input: src_dir.join(&raw),
                output: out_dir.join(out),
            });
        }
    }

    info!("{} raw file(s) found", discovery.raw_files_found);
    info!(
        "Parsing {} files ({} files already parsed)",
        discovery.jobs.len(),
        discovery.already_processed
    );
    Ok(discovery)
}

/// Names of regular files directly under `dir`; non-UTF-8 names are ignored.
fn file_names(dir: &Path) -> anyhow::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)
        .map_err(|e| anyhow::anyhow!("read_dir {}: {}", dir.display(), e))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }
    Ok(names)
}
