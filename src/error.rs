//! Error type for the I/O boundary and container operations.
//!
//! Per-trial problems during extraction are *not* errors: they are reported
//! as [`SkipReason`](crate::extract::SkipReason) values and the trial is
//! dropped.  Everything in here is surfaced to the caller.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("npz error while {context}: {source}")]
    Npz {
        context: &'static str,
        #[source]
        source: ndarray_npy::ReadNpzError,
    },
    #[error(
        "event sequences differ in length: type={types} position={positions} duration={durations}"
    )]
    EventLengthMismatch {
        types: usize,
        positions: usize,
        durations: usize,
    },
    #[error("missing tensor '{0}'")]
    MissingTensor(String),
    #[error("tensor '{name}' has unsupported dtype {dtype}")]
    UnsupportedDtype { name: String, dtype: String },
    #[error("tensor '{name}' has unexpected shape {shape:?}")]
    BadShape { name: String, shape: Vec<usize> },
    #[error("{context}: buffer truncated")]
    Truncated { context: String },
    #[error("malformed input: {message}")]
    Malformed { message: String },
    #[error("invalid event code table: {message}")]
    InvalidTable { message: String },
    #[error("trials differ in length ({min}..={max} samples), cannot stack")]
    RaggedTrials { min: usize, max: usize },
}

impl Error {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn npz(context: &'static str, source: ndarray_npy::ReadNpzError) -> Self {
        Self::Npz { context, source }
    }

    pub(crate) fn truncated(context: impl Into<String>) -> Self {
        Self::Truncated { context: context.into() }
    }

    pub(crate) fn bad_shape(name: &str, shape: &[usize]) -> Self {
        Self::BadShape { name: name.to_string(), shape: shape.to_vec() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
