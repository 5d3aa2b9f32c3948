use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::pipeline::PipelineConfig;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub driver: DriverConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_separator")]
    pub separator: char,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            separator: default_separator(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_separator")]
    pub separator: char,
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            format: OutputFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DriverConfig {
    /// Max number of files processed at once.
    #[serde(default = "default_max_parallel_files")]
    pub max_parallel_files: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            max_parallel_files: default_max_parallel_files(),
        }
    }
}

fn default_separator() -> char {
    ','
}

fn default_max_parallel_files() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl AppConfig {
    /// Loads from `path`, else from `$CONFIG_FILE`, else built-in defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("CONFIG_FILE").map(PathBuf::from));
        let Some(path) = path else {
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        };
        let s = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("config {}: {}", path.display(), e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Re-run after applying command-line overrides.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.pipeline
            .validate()
            .map_err(|e| anyhow::anyhow!("pipeline: {}", e))?;
        for (name, sep) in [
            ("input.separator", self.input.separator),
            ("output.separator", self.output.separator),
        ] {
            anyhow::ensure!(
                !matches!(sep, '"' | '\n' | '\r'),
                "{} must not be a quote or line break, got {:?}",
                name,
                sep
            );
        }
        anyhow::ensure!(
            self.driver.max_parallel_files > 0,
            "driver.max_parallel_files must be > 0, got {}",
            self.driver.max_parallel_files
        );
        Ok(())
    }
}
