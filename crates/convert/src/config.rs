//! Converter configuration.

use serde::Deserialize;

pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Settings shared by every call on one converter. Deserializable from the
/// `[converter]` table of a TOML config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Maximum nesting depth for decode and encode.
    pub max_depth: usize,
    /// Default for [`DecodeOptions::accept_unknown`].
    pub accept_unknown: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        ConverterConfig {
            max_depth: DEFAULT_MAX_DEPTH,
            accept_unknown: false,
        }
    }
}

/// Per-call decode options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    pub accept_unknown: bool,
}

/// Options for [`crate::Converter::decode_csv`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    pub line_separator: String,
    /// Read column names from the first row. Without headers the class's
    /// serialized field names are used, in encode order.
    pub has_headers: bool,
    pub accept_unknown: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            line_separator: "\n".to_string(),
            has_headers: true,
            accept_unknown: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: ConverterConfig = serde_json::from_str(r#"{"accept_unknown": true}"#).unwrap();
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert!(config.accept_unknown);
    }
}
