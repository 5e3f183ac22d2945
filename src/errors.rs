// Error handling module
// Contains the error type shared by every stage of the splitting pipeline

use serde::Serialize;
use thiserror::Error;

/// Ошибки конвейера нарезки аудио.
///
/// Каждая стадия завершается атомарно: либо полный результат, либо одна из
/// этих ошибок без частично построенных данных.
#[derive(Debug, Error)]
pub enum SplitError {
    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("Audio decoding error: {0}")]
    Decode(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("WAV encoding error: {0}")]
    Encode(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Вид ошибки без полезной нагрузки, для диагностики и событий прогресса.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitErrorKind {
    UnsupportedFormat,
    Decode,
    InvalidParameter,
    Render,
    Encode,
    Archive,
    Io,
    Config,
}

impl SplitError {
    pub fn kind(&self) -> SplitErrorKind {
        match self {
            SplitError::UnsupportedFormat(_) => SplitErrorKind::UnsupportedFormat,
            SplitError::Decode(_) => SplitErrorKind::Decode,
            SplitError::InvalidParameter(_) => SplitErrorKind::InvalidParameter,
            SplitError::Render(_) => SplitErrorKind::Render,
            SplitError::Encode(_) => SplitErrorKind::Encode,
            SplitError::Archive(_) => SplitErrorKind::Archive,
            SplitError::Io(_) => SplitErrorKind::Io,
            SplitError::Config(_) => SplitErrorKind::Config,
        }
    }
}

impl From<zip::result::ZipError> for SplitError {
    fn from(err: zip::result::ZipError) -> Self {
        SplitError::Archive(err.to_string())
    }
}

impl From<serde_json::Error> for SplitError {
    fn from(err: serde_json::Error) -> Self {
        SplitError::Config(err.to_string())
    }
}

// Result type alias for the crate
pub type SplitResult<T> = Result<T, SplitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_is_preserved() {
        let err = SplitError::Decode("truncated frame".to_string());
        assert_eq!(err.kind(), SplitErrorKind::Decode);
        assert_eq!(err.to_string(), "Audio decoding error: truncated frame");

        let io = SplitError::from(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        assert_eq!(io.kind(), SplitErrorKind::Io);
    }

    #[test]
    fn test_zip_error_maps_to_archive() {
        let err: SplitError = zip::result::ZipError::FileNotFound.into();
        assert_eq!(err.kind(), SplitErrorKind::Archive);
    }
}
