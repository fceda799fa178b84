//! Error types for ffstream.

use std::path::PathBuf;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading playlists and running a streaming session.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Filter options failed validation.
    #[error("invalid options for filter {filter}: {field}: {message}")]
    Validation {
        filter: String,
        field: String,
        message: String,
    },

    /// A source could not be inspected.
    #[error("probe failed for {source_id}: {message}")]
    Probe { source_id: String, message: String },

    /// The playlist document or directory could not be turned into a playlist.
    #[error("playlist error: {message}")]
    Playlist {
        path: Option<PathBuf>,
        message: String,
    },

    /// The session-long encoder died or stopped accepting data.
    #[error("encoder failure: {message}")]
    EncoderFailure { message: String },

    /// A per-entry decoder exited unsuccessfully.
    #[error("decoder failure for {source_id}: {message}")]
    DecoderFailure { source_id: String, message: String },

    /// Invalid application configuration.
    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failure in the external tool layer.
    #[error(transparent)]
    Av(ffstream_av::Error),
}

impl Error {
    /// Create a filter validation error.
    pub fn validation(
        filter: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Validation {
            filter: filter.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a playlist error not tied to a file.
    pub fn playlist(message: impl Into<String>) -> Self {
        Self::Playlist {
            path: None,
            message: message.into(),
        }
    }

    /// Create a playlist error for the document at `path`.
    pub fn playlist_at(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Playlist {
            path: Some(path.into()),
            message: message.into(),
        }
    }

    pub fn encoder_failure(message: impl Into<String>) -> Self {
        Self::EncoderFailure {
            message: message.into(),
        }
    }

    pub fn decoder_failure(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DecoderFailure {
            source_id: source_id.into(),
            message: message.into(),
        }
    }
}

impl From<ffstream_av::Error> for Error {
    fn from(err: ffstream_av::Error) -> Self {
        match err {
            ffstream_av::Error::Probe { source_id, message } => Self::Probe { source_id, message },
            other => Self::Av(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_display_names_field() {
        let err = Error::validation("interval_text", "duration", "expected a number");
        assert_eq!(
            err.to_string(),
            "invalid options for filter interval_text: duration: expected a number"
        );
    }

    #[test]
    fn av_probe_errors_become_domain_probe_errors() {
        let err: Error = ffstream_av::Error::probe("a.mkv", "no streams").into();
        assert!(matches!(err, Error::Probe { ref source_id, .. } if source_id == "a.mkv"));

        let err: Error = ffstream_av::Error::tool_not_found("ffmpeg").into();
        assert!(matches!(err, Error::Av(_)));
    }
}
