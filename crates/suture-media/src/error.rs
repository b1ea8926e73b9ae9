//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while analyzing video or cropping images.
///
/// None of these reach the orchestration layer through the fail-soft entry
/// points; they are logged and turned into "no crop".
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        exit_code: Option<i32>,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Video cannot be read: {0}")]
    VideoUnreadable(String),

    #[error("Video has no frames")]
    EmptyVideo,

    #[error("Image cannot be decoded: {0}")]
    ImageDecode(String),

    #[error("Image cannot be written: {0}")]
    ImageEncode(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediaError {
    /// Create a video-unreadable error.
    pub fn video_unreadable(message: impl Into<String>) -> Self {
        Self::VideoUnreadable(message.into())
    }

    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(message: impl Into<String>, exit_code: Option<i32>) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            exit_code,
        }
    }

    /// Fold a probe or decoder failure into [`MediaError::VideoUnreadable`].
    ///
    /// Outcomes the sampler reports on their own (empty video, cancellation,
    /// timeout) pass through unchanged.
    pub fn into_unreadable(self) -> Self {
        match self {
            MediaError::VideoUnreadable(_)
            | MediaError::EmptyVideo
            | MediaError::Cancelled
            | MediaError::Timeout(_) => self,
            other => Self::VideoUnreadable(other.to_string()),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            MediaError::FfmpegNotFound | MediaError::FfprobeNotFound => "tool_missing",
            MediaError::FfmpegFailed { .. } => "tool_failed",
            MediaError::FileNotFound(_) | MediaError::VideoUnreadable(_) => "video_unreadable",
            MediaError::EmptyVideo => "empty_video",
            MediaError::ImageDecode(_) => "image_decode",
            MediaError::ImageEncode(_) => "image_encode",
            MediaError::Cancelled => "cancelled",
            MediaError::Timeout(_) => "timeout",
            MediaError::Io(_) | MediaError::Internal(_) => "internal",
        }
    }
}
