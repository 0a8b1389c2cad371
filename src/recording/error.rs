//! Errors reported by the recorder controller.

use crate::clips::ClipId;
use thiserror::Error;

/// User-facing recorder failures.
///
/// Every variant is reported once on the status line and leaves the
/// controller idle; none of them are retried automatically.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecorderError {
    #[error("No microphones found")]
    NoDevicesFound,
    #[error("Error connecting to microphone: {0}")]
    Acquisition(String),
    #[error("Error starting recording: {0}")]
    CaptureStart(String),
    #[error("Error encoding recording: {0}")]
    Encode(String),
    #[error("Clip {0} not found")]
    ClipNotFound(ClipId),
    #[error("Clip {0} is no longer available")]
    ClipUnavailable(ClipId),
    #[error("Error exporting clip: {0}")]
    Export(String),
}

pub type Result<T> = std::result::Result<T, RecorderError>;
