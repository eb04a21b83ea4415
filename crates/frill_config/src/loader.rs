//! Configuration file loading and validation.

use std::path::Path;

use frill_common::fs;

use crate::error::ConfigError;
use crate::types::{DirectoryConfig, SourceEntry, CONFIG_FILE_NAME};

/// Loads and validates `<dir>/frill.json`.
pub fn load_config(dir: &Path) -> Result<DirectoryConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE_NAME);
    let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    parse_config(&content, &path)
}

/// Parses and validates configuration text. `path` is only used in errors.
pub fn parse_config(content: &str, path: &Path) -> Result<DirectoryConfig, ConfigError> {
    let config: DirectoryConfig =
        serde_json::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_config(&config, path)?;
    Ok(config)
}

/// Checks that every detailed source entry names a file.
fn validate_config(config: &DirectoryConfig, path: &Path) -> Result<(), ConfigError> {
    for (index, source) in config.sources.iter().enumerate() {
        let missing = match source {
            SourceEntry::Path(file) => file.as_os_str().is_empty(),
            SourceEntry::Detailed(spec) => spec
                .file
                .as_ref()
                .map_or(true, |file| file.as_os_str().is_empty()),
        };
        if missing {
            return Err(ConfigError::MissingField {
                path: path.to_path_buf(),
                field: format!("sources[{index}].file"),
            });
        }
    }
    Ok(())
}
