//! Optional TOML configuration for the CLI.
//!
//! ```toml
//! [converter]
//! max_depth = 32
//! accept_unknown = false
//! ```

use std::path::Path;

use modelson_convert::ConverterConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) converter: ConverterConfig,
}

/// Read settings from `path`, or the defaults when no file was given.
pub(crate) fn load(path: Option<&Path>) -> Result<Settings, String> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("error reading config '{}': {}", path.display(), e))?;
    parse(&text).map_err(|e| format!("error parsing config '{}': {}", path.display(), e))
}

fn parse(text: &str) -> Result<Settings, toml::de::Error> {
    toml::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_table_keeps_defaults() {
        let settings = parse("[converter]\naccept_unknown = true\n").unwrap();
        assert!(settings.converter.accept_unknown);
        assert_eq!(settings.converter.max_depth, modelson_convert::DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_empty_file_is_default() {
        let settings = parse("").unwrap();
        assert_eq!(settings.converter, ConverterConfig::default());
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!(parse("[converter]\nmax_depth = \"deep\"\n").is_err());
    }
}
