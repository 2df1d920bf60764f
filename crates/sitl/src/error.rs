use std::path::PathBuf;

/// Errors from the host-side simulator, link adapter and configuration.
#[derive(Debug, thiserror::Error)]
pub enum SimulatorError {
    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Telemetry decode error: {0}")]
    TelemetryDecode(String),

    #[error("Telemetry link closed")]
    LinkClosed,

    #[error("Link rejected command: {0}")]
    CommandRejected(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
