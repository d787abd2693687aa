//! Error types for answer-cloud-core.

use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A config layer could not be parsed or had a value of the wrong type.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised by a word segmentation backend.
///
/// These never reach callers of [`crate::frequency::analyze`]; the analyzer
/// degrades to whitespace splitting instead. They are surfaced by
/// [`crate::segment::SegmenterService::initialize`] so the orchestrator can
/// log the failure and retry on the next call.
#[derive(Error, Debug)]
pub enum SegmentError {
    /// The segmenter could not be initialized.
    #[error("segmenter initialization failed: {0}")]
    Init(String),

    /// A user dictionary could not be read.
    #[error("failed to read user dictionary {path}: {source}")]
    UserDict {
        /// Path of the dictionary file.
        path: camino::Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The backend rejected the input text.
    #[error("segmentation failed: {0}")]
    Cut(String),

    /// The requested backend was not compiled into this build.
    #[error("segmenter backend `{0}` is not available in this build")]
    Unsupported(&'static str),
}

/// Result type alias using [`SegmentError`].
pub type SegmentResult<T> = Result<T, SegmentError>;
