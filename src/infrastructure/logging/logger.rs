use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::level_filters::LevelFilter;
use tracing::Span;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, Registry};

use crate::domain::models::{CoreConfig, Encoding, LoggerConfig, ServiceInfo};
use crate::infrastructure::sink::{BufferedFileSink, SinkError, SinkWriter};

/// A type-erased per-core layer
pub type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Subscriber assembled from the configured cores
pub type Pipeline = Layered<Vec<BoxedLayer>, Registry>;

/// Builds the tracing pipeline from a [`LoggerConfig`]
pub struct Logger;

impl Logger {
    /// Build the pipeline and install it as the global default subscriber.
    ///
    /// With no cores configured nothing is installed and every record is
    /// discarded. Must run inside a Tokio runtime when any core writes to a file.
    ///
    /// # Errors
    /// Returns an error if a level is invalid, a log file cannot be opened,
    /// or a global subscriber is already installed.
    pub fn init(config: &LoggerConfig, service: ServiceInfo) -> Result<LoggerGuard> {
        let (pipeline, guard) = Self::build(config, service)?;

        if config.effective_cores().is_empty() {
            return Ok(guard);
        }

        pipeline
            .try_init()
            .context("Failed to install global tracing subscriber")?;

        tracing::info!(
            cores = config.effective_cores().len(),
            file_sinks = guard.sinks().len(),
            "logger initialized"
        );

        Ok(guard)
    }

    /// Build the pipeline without installing it
    pub fn build(config: &LoggerConfig, service: ServiceInfo) -> Result<(Pipeline, LoggerGuard)> {
        let mut sinks = Vec::new();
        let mut layers: Vec<BoxedLayer> = Vec::new();

        for core in config.effective_cores() {
            let layer = core_layer(&core, config, &mut sinks)
                .context("cannot create logger core")?;
            layers.push(layer);
        }

        let pipeline = tracing_subscriber::registry().with(layers);
        Ok((pipeline, LoggerGuard { sinks, service }))
    }
}

/// Build the layer for one core, registering any file sink it opens
fn core_layer(
    core: &CoreConfig,
    config: &LoggerConfig,
    sinks: &mut Vec<Arc<BufferedFileSink>>,
) -> Result<BoxedLayer> {
    let level = parse_level(&core.level)?;
    let with_spans = !core.stacktrace.is_empty();
    let sink_config = core.output.sink_config();

    let writer = if sink_config.is_enabled() {
        let path = sink_config.path.display().to_string();
        let sink = Arc::new(
            BufferedFileSink::open(sink_config)
                .with_context(|| format!("cannot open log file {path}"))?,
        );
        sinks.push(Arc::clone(&sink));

        let file = SinkWriter::new(sink);
        if core.output.writes_stdout() {
            BoxMakeWriter::new(file.and(io::stdout))
        } else {
            BoxMakeWriter::new(file)
        }
    } else {
        // Without a file every core writes to stdout
        BoxMakeWriter::new(io::stdout)
    };

    let layer = match core.encoding {
        Encoding::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(with_spans)
            .with_target(true)
            .with_file(config.caller)
            .with_line_number(config.caller)
            .with_thread_ids(config.development)
            .with_thread_names(config.development)
            .with_ansi(false)
            .with_writer(writer)
            .with_filter(level)
            .boxed(),
        Encoding::Console => tracing_subscriber::fmt::layer()
            .with_ansi(core.output.use_capital_color)
            .with_target(true)
            .with_file(config.caller)
            .with_line_number(config.caller)
            .with_thread_ids(config.development)
            .with_span_events(if config.development {
                FmtSpan::CLOSE
            } else {
                FmtSpan::NONE
            })
            .with_writer(writer)
            .with_filter(level)
            .boxed(),
    };

    Ok(layer)
}

/// Parse a core level; zap-era `dpanic`, `panic` and `fatal` map to `error`
pub fn parse_level(level: &str) -> Result<LevelFilter> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(LevelFilter::TRACE),
        "debug" => Ok(LevelFilter::DEBUG),
        "" | "info" => Ok(LevelFilter::INFO),
        "warn" | "warning" => Ok(LevelFilter::WARN),
        "error" | "dpanic" | "panic" | "fatal" => Ok(LevelFilter::ERROR),
        _ => anyhow::bail!("Invalid log level: {level}"),
    }
}

/// Keeps the pipeline's file sinks reachable for flushing, rotation and shutdown
#[derive(Debug)]
pub struct LoggerGuard {
    sinks: Vec<Arc<BufferedFileSink>>,
    service: ServiceInfo,
}

impl LoggerGuard {
    /// File sinks opened by the pipeline
    pub fn sinks(&self) -> &[Arc<BufferedFileSink>] {
        &self.sinks
    }

    /// Root span carrying the service identity; records emitted inside it include these fields
    pub fn service_span(&self) -> Span {
        tracing::info_span!(
            "service",
            project = %self.service.project,
            service = %self.service.service,
            branch = %self.service.branch,
            version = %self.service.version,
        )
    }

    /// Flush every sink, returning the first failure
    pub fn flush(&self) -> Result<(), SinkError> {
        first_error(self.sinks.iter().map(|sink| sink.flush()))
    }

    /// Reopen every sink at its configured path, returning the first failure
    pub fn rotate(&self) -> Result<(), SinkError> {
        first_error(self.sinks.iter().map(|sink| sink.restart()))
    }

    /// Stop every flush worker, waiting for each file to be flushed and closed
    pub async fn shutdown(&self) -> Result<(), SinkError> {
        let mut results = Vec::with_capacity(self.sinks.len());
        for sink in &self.sinks {
            results.push(sink.stop_worker().await);
        }
        first_error(results)
    }
}

/// Drive every operation to completion, keep the first error and log the rest
fn first_error(results: impl IntoIterator<Item = Result<(), SinkError>>) -> Result<(), SinkError> {
    let mut first = None;
    for result in results {
        if let Err(e) = result {
            if first.is_some() {
                tracing::warn!(error = %e, "additional log sink failure");
            } else {
                first = Some(e);
            }
        }
    }
    first.map_or(Ok(()), Err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::OutputConfig;
    use tempfile::TempDir;

    fn file_core(path: std::path::PathBuf, level: &str) -> CoreConfig {
        CoreConfig {
            level: level.to_string(),
            encoding: Encoding::Json,
            stacktrace: String::new(),
            output: OutputConfig {
                path,
                ..OutputConfig::default()
            },
        }
    }

    fn service() -> ServiceInfo {
        ServiceInfo {
            project: "testProject".to_string(),
            service: "testService".to_string(),
            branch: "testBranch".to_string(),
            version: "testVersion".to_string(),
        }
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("trace").unwrap(), LevelFilter::TRACE);
        assert_eq!(parse_level("DEBUG").unwrap(), LevelFilter::DEBUG);
        assert_eq!(parse_level("").unwrap(), LevelFilter::INFO);
        assert_eq!(parse_level("warn").unwrap(), LevelFilter::WARN);
        assert_eq!(parse_level("dpanic").unwrap(), LevelFilter::ERROR);
        assert_eq!(parse_level("fatal").unwrap(), LevelFilter::ERROR);
        assert!(parse_level("loud").is_err());
    }

    #[test]
    fn test_empty_config_opens_no_sinks() {
        let (_pipeline, guard) = Logger::build(&LoggerConfig::default(), service()).unwrap();
        assert!(guard.sinks().is_empty());
        assert!(guard.flush().is_ok());
        assert!(guard.rotate().is_ok());
    }

    #[tokio::test]
    async fn test_json_core_writes_through_sink() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        let config = LoggerConfig {
            cores: vec![file_core(path.clone(), "info")],
            ..LoggerConfig::default()
        };

        let (pipeline, guard) = Logger::build(&config, service()).unwrap();
        assert_eq!(guard.sinks().len(), 1);

        tracing::subscriber::with_default(pipeline, || {
            let span = guard.service_span();
            let _entered = span.enter();
            tracing::info!(key = "value", "Works perfectly");
            tracing::debug!("filtered out");
        });

        assert!(std::fs::read_to_string(&path).unwrap().is_empty());
        guard.flush().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 1);

        let record: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(record["message"], "Works perfectly");
        assert_eq!(record["key"], "value");
        assert_eq!(record["level"], "INFO");
        assert_eq!(record["span"]["project"], "testProject");
        assert_eq!(record["span"]["version"], "testVersion");

        guard.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_level_fails_build() {
        let temp_dir = TempDir::new().unwrap();
        let config = LoggerConfig {
            cores: vec![file_core(temp_dir.path().join("app.log"), "loud")],
            ..LoggerConfig::default()
        };

        assert!(Logger::build(&config, service()).is_err());
    }

    #[tokio::test]
    async fn test_unopenable_file_fails_build() {
        let temp_dir = TempDir::new().unwrap();
        let config = LoggerConfig {
            cores: vec![file_core(temp_dir.path().join("missing/app.log"), "info")],
            ..LoggerConfig::default()
        };

        match Logger::build(&config, service()) {
            Err(err) => assert!(format!("{err:#}").contains("cannot open log file")),
            Ok(_) => panic!("expected build to fail for a missing directory"),
        }
    }

    #[tokio::test]
    async fn test_rotate_and_shutdown_reach_every_sink() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("first.log");
        let second = temp_dir.path().join("second.log");
        let config = LoggerConfig {
            cores: vec![file_core(first.clone(), "info"), file_core(second.clone(), "warn")],
            ..LoggerConfig::default()
        };

        let (pipeline, guard) = Logger::build(&config, service()).unwrap();
        tracing::subscriber::with_default(pipeline, || {
            tracing::warn!("both cores");
        });

        std::fs::rename(&first, temp_dir.path().join("first.log.1")).unwrap();
        guard.rotate().unwrap();
        assert!(first.exists());

        guard.shutdown().await.unwrap();
        assert!(std::fs::read_to_string(temp_dir.path().join("first.log.1"))
            .unwrap()
            .contains("both cores"));
        assert!(std::fs::read_to_string(&second).unwrap().contains("both cores"));
    }

    #[tokio::test]
    async fn test_rotate_from_inside_pipeline_logs_into_same_sink() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        let config = LoggerConfig::default_for(&path);

        let (pipeline, guard) = Logger::build(&config, service()).unwrap();
        let _default = tracing::subscriber::set_default(pipeline);

        tracing::info!("before rotation");
        guard.rotate().unwrap();
        tracing::info!("after rotation");
        guard.shutdown().await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("before rotation"));
        assert!(contents.contains("log file reopened"));
        assert!(contents.contains("after rotation"));
    }
}
