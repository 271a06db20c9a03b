pub mod config;

pub use config::{
    CoreConfig, Encoding, LoggerConfig, OutputConfig, ServiceInfo, SinkConfig,
    DEFAULT_BUFFER_SIZE, DEFAULT_FLUSH_INTERVAL_SECONDS,
};
