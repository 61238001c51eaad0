use thiserror::Error;

/// epg_grid error types
#[derive(Error, Debug)]
pub enum EpgError {
    /// Entity list missing or empty
    #[error("You need to define at least one entity.")]
    MissingEntities,

    /// Card config could not be decoded (includes a non-sequence entity list)
    #[error("failed to parse card config: {0}")]
    ConfigDecode(#[from] toml::de::Error),

    #[error("failed to encode card config: {0}")]
    ConfigEncode(#[from] toml::ser::Error),

    /// Entity states could not be decoded
    #[error("failed to parse entity states: {0}")]
    StatesDecode(#[from] serde_json::Error),

    /// Not a zero-padded HH:MM time
    #[error("invalid time of day: {0:?}")]
    InvalidTime(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for epg_grid
pub type Result<T> = std::result::Result<T, EpgError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_entities_message() {
        assert_eq!(
            EpgError::MissingEntities.to_string(),
            "You need to define at least one entity."
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: EpgError = io_err.into();
        assert!(err.to_string().contains("io error"));
    }
}
