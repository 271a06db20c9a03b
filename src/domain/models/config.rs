use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Buffer capacity used when a sink is configured with `buffer_size: 0`
pub const DEFAULT_BUFFER_SIZE: usize = 512 * 1024;

/// Flush period used when a sink is configured with a non-positive interval
pub const DEFAULT_FLUSH_INTERVAL_SECONDS: i64 = 5;

/// Settings for a single buffered file sink.
///
/// An empty `path` describes a disabled sink: writes are accepted and
/// discarded, and no background flusher is started.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SinkConfig {
    /// File to append to (empty disables file output)
    #[serde(default)]
    pub path: PathBuf,

    /// In-memory buffer capacity in bytes (0 selects the default)
    #[serde(default, alias = "bufferSize", alias = "buffersize")]
    pub buffer_size: usize,

    /// Background flush period in seconds (<= 0 selects the default)
    #[serde(
        default,
        alias = "flushIntervalSeconds",
        alias = "flushseconds",
        alias = "flush_seconds"
    )]
    pub flush_interval_seconds: i64,
}

impl SinkConfig {
    /// Create a sink config for `path` with default buffering
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Set the buffer capacity in bytes
    #[must_use]
    pub const fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Set the flush period in seconds
    #[must_use]
    pub const fn with_flush_interval_seconds(mut self, seconds: i64) -> Self {
        self.flush_interval_seconds = seconds;
        self
    }

    /// Whether this config backs the sink with a file
    pub fn is_enabled(&self) -> bool {
        !self.path.as_os_str().is_empty()
    }

    /// Effective buffer capacity
    pub const fn buffer_capacity(&self) -> usize {
        if self.buffer_size == 0 {
            DEFAULT_BUFFER_SIZE
        } else {
            self.buffer_size
        }
    }

    /// Effective background flush period
    pub fn flush_interval(&self) -> Duration {
        let seconds = if self.flush_interval_seconds > 0 {
            self.flush_interval_seconds
        } else {
            DEFAULT_FLUSH_INTERVAL_SECONDS
        };
        Duration::from_secs(seconds.unsigned_abs())
    }
}

/// Record encoding of a logging core
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// One JSON object per line
    #[default]
    Json,
    /// Human-readable single-line records
    Console,
}

/// Output destinations of a logging core
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OutputConfig {
    /// Colourise level names on console output
    #[serde(default, alias = "useCapitalColor")]
    pub use_capital_color: bool,

    /// Also write to stdout (implied when `path` is empty)
    #[serde(default, alias = "useStdOut")]
    pub use_stdout: bool,

    /// File to append to
    #[serde(default)]
    pub path: PathBuf,

    /// Background flush period in seconds
    #[serde(default, alias = "flushseconds", alias = "flushIntervalSeconds")]
    pub flush_seconds: i64,

    /// In-memory buffer capacity in bytes
    #[serde(default, alias = "buffersize", alias = "bufferSize")]
    pub buffer_size: usize,
}

impl OutputConfig {
    /// Sink settings described by this output
    pub fn sink_config(&self) -> SinkConfig {
        SinkConfig {
            path: self.path.clone(),
            buffer_size: self.buffer_size,
            flush_interval_seconds: self.flush_seconds,
        }
    }

    /// Whether records of this core reach stdout
    pub fn writes_stdout(&self) -> bool {
        self.use_stdout || self.path.as_os_str().is_empty()
    }
}

/// A leveled, encoded output of the logging pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CoreConfig {
    /// Minimum level: trace, debug, info, warn, error (dpanic, panic, fatal map to error)
    #[serde(default = "default_level")]
    pub level: String,

    /// Record encoding
    #[serde(default)]
    pub encoding: Encoding,

    /// Level from which span context is attached to records (empty disables)
    #[serde(default)]
    pub stacktrace: String,

    /// Where records go
    #[serde(default, alias = "outputConfig")]
    pub output: OutputConfig,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            encoding: Encoding::default(),
            stacktrace: String::new(),
            output: OutputConfig::default(),
        }
    }
}

/// Logging pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggerConfig {
    /// Independent outputs; empty builds a logger that discards everything
    #[serde(default)]
    pub cores: Vec<CoreConfig>,

    /// Annotate records with source file and line
    #[serde(default)]
    pub caller: bool,

    /// Verbose development output (thread info, span close events)
    #[serde(default)]
    pub development: bool,

    /// Deprecated single-file block, use `cores[].output` instead
    #[serde(
        default,
        alias = "fileConfig",
        skip_serializing_if = "Option::is_none"
    )]
    pub file_config: Option<SinkConfig>,
}

impl LoggerConfig {
    /// Console core on stdout plus a debug-level JSON core writing to `log_file`
    pub fn default_for(log_file: impl Into<PathBuf>) -> Self {
        Self {
            cores: vec![
                CoreConfig {
                    level: "error".to_string(),
                    encoding: Encoding::Console,
                    stacktrace: "error".to_string(),
                    output: OutputConfig {
                        use_capital_color: true,
                        use_stdout: true,
                        ..OutputConfig::default()
                    },
                },
                CoreConfig {
                    level: "debug".to_string(),
                    encoding: Encoding::Json,
                    stacktrace: "error".to_string(),
                    output: OutputConfig {
                        path: log_file.into(),
                        flush_seconds: DEFAULT_FLUSH_INTERVAL_SECONDS,
                        buffer_size: DEFAULT_BUFFER_SIZE,
                        ..OutputConfig::default()
                    },
                },
            ],
            caller: true,
            development: false,
            file_config: None,
        }
    }

    /// Cores to build, with the deprecated `file_config` appended as a JSON core
    pub fn effective_cores(&self) -> Vec<CoreConfig> {
        let mut cores = self.cores.clone();
        if let Some(file) = self.file_config.as_ref().filter(|f| f.is_enabled()) {
            cores.push(CoreConfig {
                level: "debug".to_string(),
                encoding: Encoding::Json,
                stacktrace: String::new(),
                output: OutputConfig {
                    path: file.path.clone(),
                    flush_seconds: file.flush_interval_seconds,
                    buffer_size: file.buffer_size,
                    ..OutputConfig::default()
                },
            });
        }
        cores
    }
}

/// Static identity fields attached to every record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    /// Project name
    pub project: String,
    /// Service name
    pub service: String,
    /// Source branch
    pub branch: String,
    /// Service version
    pub version: String,
}
