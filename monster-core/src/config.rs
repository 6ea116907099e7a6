//! Editor configuration and percentage presets.
//!
//! Supports TOML configuration files like:
//! ```toml
//! monster_file = "Data/Monster.txt"
//! encoding = "windows-1252"
//! backup_on_save = true
//!
//! [[presets]]
//! name = "hard"
//! percent = 20
//! fields = ["MaxLife", "DamageMin", "DamageMax"]
//! ```

use crate::error::{MonsterError, Result};
use crate::file_utils::{SaveOptions, TextEncoding};
use crate::parsers::DEFAULT_HEADER;
use crate::transform::resolve_fields;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// A named, reusable percentage adjustment.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Preset {
    pub name: String,
    pub percent: f64,
    pub fields: Vec<String>,
}

/// Complete editor configuration loaded from TOML.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    pub monster_file: PathBuf,
    pub encoding: TextEncoding,
    pub default_header: String,
    pub backup_on_save: bool,
    pub presets: Vec<Preset>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            monster_file: PathBuf::from("Monster.txt"),
            encoding: TextEncoding::Utf8,
            default_header: DEFAULT_HEADER.to_string(),
            backup_on_save: false,
            presets: Vec::new(),
        }
    }
}

impl EditorConfig {
    /// Load editor configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MonsterError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read editor config from {:?}: {}", path, e),
            ))
        })?;

        Self::from_str(&content)
    }

    /// Parse editor configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| MonsterError::Config(format!("Failed to parse editor config TOML: {}", e)))
    }

    /// Look up a preset by name (case-insensitive) and check its fields.
    pub fn preset(&self, name: &str) -> Result<&Preset> {
        let preset = self
            .presets
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| MonsterError::Config(format!("Unknown preset: {}", name)))?;

        if !preset.percent.is_finite() {
            return Err(MonsterError::Config(format!(
                "Preset {} has an invalid percentage",
                preset.name
            )));
        }
        resolve_fields(&preset.fields).map_err(|e| {
            MonsterError::Config(format!("Preset {}: {}", preset.name, e))
        })?;
        Ok(preset)
    }

    pub fn save_options(&self) -> SaveOptions {
        SaveOptions {
            encoding: self.encoding,
            default_header: self.default_header.clone(),
            backup: self.backup_on_save,
        }
    }
}
