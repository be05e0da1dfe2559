// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the photobooth pipeline
//!
//! Transient conditions (a frame source that is not producing frames yet, a
//! burst that yields fewer photos than requested) are *not* errors and never
//! show up here. Everything below is scoped to a single photo, a single
//! sequence attempt, or a single composition.

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Umbrella error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Frame source errors
    Backend(BackendError),
    /// Single-shot capture errors
    Capture(CaptureError),
    /// Burst sequencing errors
    Sequence(SequenceError),
    /// Mosaic composition errors
    Mosaic(MosaicError),
    /// Filter text could not be parsed
    Filter(FilterParseError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors (binary only)
    Storage(String),
    /// Generic error with message
    Other(String),
}

/// Frame source errors
#[derive(Debug, Clone)]
pub enum BackendError {
    /// Image file could not be opened or decoded
    LoadFailed(String),
    /// Unsupported file type
    UnsupportedFormat(String),
}

/// Errors from rasterizing a single frame
#[derive(Debug, Clone)]
pub enum CaptureError {
    /// Frame buffer does not match its declared geometry
    InvalidFrame(String),
    /// Encoding the still image failed
    EncodingFailed(String),
    /// The blocking worker panicked or was cancelled
    TaskFailed(String),
}

/// Errors from starting or running a burst
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    /// Another burst is already running on this sequencer
    AlreadyActive,
    /// Burst target must be at least one
    InvalidBurst(u32),
}

/// Errors from mosaic composition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MosaicError {
    /// A photo could not be decoded
    Decode { index: usize, reason: String },
    /// A photo did not finish decoding within the configured timeout
    DecodeTimeout { index: usize },
    /// Canvas allocation or drawing failed
    Render(String),
    /// Encoding the composed raster failed
    EncodingFailed(String),
    /// Invalid composition parameters
    InvalidParameters(String),
}

/// Filter text parse error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterParseError {
    /// Function name not recognised
    UnknownFunction(String),
    /// Argument missing or not a number
    InvalidArgument { function: String, argument: String },
    /// Unbalanced parentheses or stray text
    Malformed(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Backend(e) => write!(f, "Frame source error: {}", e),
            AppError::Capture(e) => write!(f, "Capture error: {}", e),
            AppError::Sequence(e) => write!(f, "Sequence error: {}", e),
            AppError::Mosaic(e) => write!(f, "Mosaic error: {}", e),
            AppError::Filter(e) => write!(f, "Filter error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::LoadFailed(msg) => write!(f, "Failed to load image: {}", msg),
            BackendError::UnsupportedFormat(ext) => write!(f, "Unsupported file format: {}", ext),
        }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::InvalidFrame(msg) => write!(f, "Invalid frame: {}", msg),
            CaptureError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
            CaptureError::TaskFailed(msg) => write!(f, "Capture task failed: {}", msg),
        }
    }
}

impl fmt::Display for SequenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceError::AlreadyActive => write!(f, "A capture sequence is already running"),
            SequenceError::InvalidBurst(n) => {
                write!(f, "Burst target must be at least 1 (got {})", n)
            }
        }
    }
}

impl fmt::Display for MosaicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MosaicError::Decode { index, reason } => {
                write!(f, "Photo {} could not be decoded: {}", index, reason)
            }
            MosaicError::DecodeTimeout { index } => {
                write!(f, "Photo {} timed out while decoding", index)
            }
            MosaicError::Render(msg) => write!(f, "Render failed: {}", msg),
            MosaicError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
            MosaicError::InvalidParameters(msg) => write!(f, "Invalid parameters: {}", msg),
        }
    }
}

impl fmt::Display for FilterParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterParseError::UnknownFunction(name) => write!(f, "Unknown filter '{}'", name),
            FilterParseError::InvalidArgument { function, argument } => {
                write!(f, "Invalid argument '{}' for {}()", argument, function)
            }
            FilterParseError::Malformed(text) => write!(f, "Malformed filter '{}'", text),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for BackendError {}
impl std::error::Error for CaptureError {}
impl std::error::Error for SequenceError {}
impl std::error::Error for MosaicError {}
impl std::error::Error for FilterParseError {}

// Conversions from sub-errors to AppError
impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        AppError::Backend(err)
    }
}

impl From<CaptureError> for AppError {
    fn from(err: CaptureError) -> Self {
        AppError::Capture(err)
    }
}

impl From<SequenceError> for AppError {
    fn from(err: SequenceError) -> Self {
        AppError::Sequence(err)
    }
}

impl From<MosaicError> for AppError {
    fn from(err: MosaicError) -> Self {
        AppError::Mosaic(err)
    }
}

impl From<FilterParseError> for AppError {
    fn from(err: FilterParseError) -> Self {
        AppError::Filter(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_error_converts() {
        let err: AppError = SequenceError::AlreadyActive.into();
        assert!(matches!(err, AppError::Sequence(SequenceError::AlreadyActive)));
        assert_eq!(
            err.to_string(),
            "Sequence error: A capture sequence is already running"
        );
    }

    #[test]
    fn test_mosaic_error_names_photo() {
        let err = MosaicError::DecodeTimeout { index: 3 };
        assert!(err.to_string().contains('3'));
    }
}
