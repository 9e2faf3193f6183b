// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error taxonomy for image intake and detection.
//!
//! Every variant is recoverable: the caller turns it into a user-facing
//! notice (and, for the analysis kinds, a failure result) and the session
//! stays usable.

use thiserror::Error;

/// Errors raised by the session controller and its collaborators.
#[derive(Debug, Error)]
pub enum AppError {
    /// The candidate file does not report an image media type.
    #[error("not an image file: {name} ({media_type})")]
    InvalidFileType { name: String, media_type: String },

    /// The image bytes could not be decoded.
    #[error("could not decode image {name}: {reason}")]
    Decode { name: String, reason: String },

    /// Network failure, non-2xx status, or an unreadable response body.
    #[error("transport error: {0}")]
    Transport(String),

    /// Well-formed response that carries an `error` field.
    #[error("{0}")]
    Application(String),

    /// An operation that needs a loaded image was called without one.
    #[error("no image loaded")]
    NoImage,

    /// An analysis is already in flight for this session.
    #[error("an analysis is already running")]
    Busy,

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = AppError::InvalidFileType {
            name: "a.txt".into(),
            media_type: "text/plain".into(),
        };
        assert_eq!(err.to_string(), "not an image file: a.txt (text/plain)");
        assert_eq!(
            AppError::Transport("API Error: 502 Bad Gateway".into()).to_string(),
            "transport error: API Error: 502 Bad Gateway"
        );
    }

    #[test]
    fn test_application_error_displays_server_message() {
        let err = AppError::Application("No image file provided".into());
        assert_eq!(err.to_string(), "No image file provided");
    }
}
