use std::path::PathBuf;

use thiserror::Error;

pub type PlaybackResult<T> = Result<T, PlaybackError>;

/// Fatal problems with the settings file. Raised before the first cycle.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to write settings file '{path}': {message}")]
    Write { path: PathBuf, message: String },
    #[error("invalid setting {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

impl ConfigError {
    pub fn invalid(key: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            message: message.into(),
        }
    }
}

/// Problems with the input directory itself. Fatal at startup.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("input directory '{0}' does not exist")]
    Missing(PathBuf),
    #[error("input path '{0}' is not a directory")]
    NotADirectory(PathBuf),
    #[error("failed to read input directory '{path}': {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Per-file failures. The scheduler logs every variant the same way and
/// moves on to the next file.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("cannot open '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported or corrupt audio in '{path}': {message}")]
    Unsupported { path: PathBuf, message: String },
    #[error("failed to decode '{path}': {message}")]
    Decode { path: PathBuf, message: String },
    #[error("audio output unavailable: {0}")]
    Device(String),
}

impl PlaybackError {
    pub fn device(message: impl std::fmt::Display) -> Self {
        Self::Device(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_message() {
        let err = ConfigError::invalid("Settings.interval_minutes", "must be > 0");
        assert_eq!(
            err.to_string(),
            "invalid setting Settings.interval_minutes: must be > 0"
        );
    }

    #[test]
    fn test_playback_error_names_file() {
        let err = PlaybackError::Decode {
            path: PathBuf::from("input/broken.mp3"),
            message: "bad frame".into(),
        };
        let text = err.to_string();
        assert!(text.contains("input/broken.mp3"));
        assert!(text.contains("bad frame"));
    }
}
