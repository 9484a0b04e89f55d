use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Construction-time failures.
///
/// The tracer's three hot-path operations are infallible by contract:
/// anomalies there are logged and counted, a failed clock read degrades to an
/// unknown timestamp, and nothing propagates back into the instrumented data
/// path.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("failed to create sink file {path}: {source}")]
    SinkCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
