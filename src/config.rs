use std::{fs, path::Path};

use serde::Deserialize;

use crate::{ProcmineError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// number of async worker threads, range [1, 32768), defaults to 4
    pub async_worker_thread_number: u16,
    /// wall-clock budget of a single analysis in milliseconds, 0 disables it
    pub analysis_timeout_ms: u64,
    /// outcome analyzer thresholds
    pub outcome: OutcomeConfig,
    /// graph differ thresholds
    pub compare: CompareConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutcomeConfig {
    /// an edge is a top path when its average outcome reaches this multiple of the overall average
    pub top_path_ratio: f64,
    /// number of top paths reported
    pub top_path_limit: usize,
    /// minimum absolute rate difference (fraction, not percent) between segments
    pub segment_min_diff: f64,
    /// number of segment differences reported
    pub segment_diff_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// frequency change rate (percent) under which an element is unchanged
    pub unchanged_threshold: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            async_worker_thread_number: 4,
            analysis_timeout_ms: 30_000,
            outcome: OutcomeConfig::default(),
            compare: CompareConfig::default(),
        }
    }
}

impl Default for OutcomeConfig {
    fn default() -> Self {
        Self {
            top_path_ratio: 1.2,
            top_path_limit: 5,
            segment_min_diff: 0.1,
            segment_diff_limit: 10,
        }
    }
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            unchanged_threshold: 5.0,
        }
    }
}

impl Config {
    pub fn create<T: AsRef<Path>>(path: T) -> Result<Self> {
        let data = fs::read_to_string(path.as_ref()).map_err(|e| ProcmineError::Config(format!("failed to load config file {:?}: {}", path.as_ref(), e)))?;

        Self::load_from_str(data.as_str())
    }

    pub fn load_from_str(toml_str: &str) -> Result<Self> {
        let config = toml::from_str::<Config>(toml_str)?;
        if config.async_worker_thread_number == 0 {
            return Err(ProcmineError::Config("async_worker_thread_number must be at least 1".to_string()));
        }
        Ok(config)
    }
}
