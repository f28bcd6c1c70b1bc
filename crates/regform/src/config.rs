// File: src/config.rs
// Purpose: Configuration parsing from regform.toml

use anyhow::{Context, Result};
use regform_rules::{PhoneShape, DEFAULT_DATE_FORMATS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::SchemaError;

/// Registration form configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RegformConfig {
    #[serde(default)]
    pub phone: PhoneConfig,

    #[serde(default)]
    pub password: PasswordConfig,

    #[serde(default)]
    pub date: DateConfig,

    #[serde(default)]
    pub gender: GenderConfig,
}

/// Phone number shape
///
/// A fixed twelve-digit mask (`+999999999999`) is
/// `min_digits = max_digits = 12`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhoneConfig {
    #[serde(default = "default_min_digits")]
    pub min_digits: usize,

    #[serde(default = "default_max_digits")]
    pub max_digits: usize,

    /// Characters the input mask shows for positions not yet typed
    #[serde(default = "default_placeholders")]
    pub placeholders: Vec<char>,
}

/// Password policy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PasswordConfig {
    #[serde(default = "default_password_min_length")]
    pub min_length: usize,

    #[serde(default = "default_true")]
    pub require_uppercase: bool,
}

/// Accepted raw date formats (chrono syntax)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DateConfig {
    #[serde(default = "default_date_formats")]
    pub formats: Vec<String>,
}

/// Options offered by the gender select
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenderConfig {
    #[serde(default = "default_gender_options")]
    pub options: Vec<String>,
}

// Default values
fn default_min_digits() -> usize {
    7
}

fn default_max_digits() -> usize {
    15
}

fn default_placeholders() -> Vec<char> {
    vec!['_']
}

fn default_password_min_length() -> usize {
    6
}

fn default_true() -> bool {
    true
}

fn default_date_formats() -> Vec<String> {
    DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect()
}

fn default_gender_options() -> Vec<String> {
    vec!["male".to_string(), "female".to_string()]
}

// Default implementations
impl Default for PhoneConfig {
    fn default() -> Self {
        Self {
            min_digits: default_min_digits(),
            max_digits: default_max_digits(),
            placeholders: default_placeholders(),
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: default_password_min_length(),
            require_uppercase: true,
        }
    }
}

impl Default for DateConfig {
    fn default() -> Self {
        Self {
            formats: default_date_formats(),
        }
    }
}

impl Default for GenderConfig {
    fn default() -> Self {
        Self {
            options: default_gender_options(),
        }
    }
}

impl PhoneConfig {
    /// Checked conversion into the shape used by the phone rule.
    pub fn shape(&self) -> Result<PhoneShape, SchemaError> {
        if self.min_digits == 0 || self.min_digits > self.max_digits {
            return Err(SchemaError::InvalidPhoneShape {
                min: self.min_digits,
                max: self.max_digits,
            });
        }

        Ok(PhoneShape {
            min_digits: self.min_digits,
            max_digits: self.max_digits,
            placeholders: self.placeholders.clone(),
        })
    }
}

impl RegformConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // If file doesn't exist, return default config
        if !path.exists() {
            tracing::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: RegformConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Load configuration from default path (./regform.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("regform.toml")
    }
}
