pub(crate) mod decode;
pub(crate) mod describe;

use std::path::Path;

use modelson_convert::Converter;
use modelson_interchange::LoadedSchema;
use tracing::debug;

use crate::settings::Settings;

pub(crate) fn read_file(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("error reading file '{}': {}", path.display(), e))
}

pub(crate) fn load_schema(path: &Path) -> Result<LoadedSchema, String> {
    let text = read_file(path)?;
    debug!(path = %path.display(), "loading schema descriptor");
    modelson_interchange::load_descriptor_str(&text)
        .map_err(|e| format!("error loading schema '{}': {}", path.display(), e))
}

/// Converter over `schema` with the configured settings; `accept_unknown`
/// from the command line wins over the config file.
pub(crate) fn make_converter(
    schema: &LoadedSchema,
    settings: &Settings,
    accept_unknown: bool,
) -> Result<Converter, String> {
    let mut config = settings.converter.clone();
    config.accept_unknown |= accept_unknown;
    schema.converter(config).map_err(|e| e.to_string())
}
