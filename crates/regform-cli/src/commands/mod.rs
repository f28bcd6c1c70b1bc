pub mod fields;
pub mod validate;

use std::path::Path;

use anyhow::Result;
use regform::RegformConfig;

/// Explicit path, else `regform.toml` in the working directory, else defaults.
pub fn load_config(path: Option<&Path>) -> Result<RegformConfig> {
    match path {
        Some(path) => RegformConfig::load(path),
        None => RegformConfig::load_default(),
    }
}
