// Typed errors with thiserror. Surface meaningful messages to JS.
// Rejected transitions and out-of-range scroll are not errors; only startup can fail.

use thiserror::Error;

/// Engine error types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Missing asset for {month}: {asset}")]
    AssetResolution { month: String, asset: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl EngineError {
    pub fn missing_asset(month: impl Into<String>, asset: impl Into<String>) -> Self {
        EngineError::AssetResolution {
            month: month.into(),
            asset: asset.into(),
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization(err.to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = EngineError::InvalidConfig("missing end slot".to_string());
        assert!(err.to_string().contains("missing end slot"));
    }

    #[test]
    fn missing_asset_names_month_and_file() {
        let err = EngineError::missing_asset("jan", "snow.mp4");
        assert_eq!(err.to_string(), "Missing asset for jan: snow.mp4");
    }

    #[test]
    fn json_errors_convert() {
        let err: EngineError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, EngineError::Serialization(_)));
    }
}
