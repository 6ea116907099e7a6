//! File utility functions.

use crate::error::{MonsterError, Result};
use crate::models::Document;
use crate::parsers::{parse_document, render_document, DEFAULT_HEADER};
use encoding_rs::WINDOWS_1252;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Text encoding of a monster file on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextEncoding {
    #[default]
    #[serde(rename = "utf-8")]
    Utf8,
    #[serde(rename = "windows-1252")]
    Windows1252,
}

impl std::str::FromStr for TextEncoding {
    type Err = MonsterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(TextEncoding::Utf8),
            "windows-1252" | "cp1252" | "latin1" => Ok(TextEncoding::Windows1252),
            other => Err(MonsterError::Config(format!("Unsupported encoding: {}", other))),
        }
    }
}

/// Options applied when writing a document back to disk.
#[derive(Debug, Clone)]
pub struct SaveOptions {
    pub encoding: TextEncoding,
    pub default_header: String,
    pub backup: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            encoding: TextEncoding::Utf8,
            default_header: DEFAULT_HEADER.to_string(),
            backup: false,
        }
    }
}

/// Read file with Latin1 encoding (Windows-1252).
pub fn read_latin1_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    let (text, _, had_errors) = WINDOWS_1252.decode(&bytes);
    if had_errors {
        return Err(MonsterError::Parse("Failed to decode Latin1 text".to_string()));
    }
    Ok(text.into_owned())
}

/// Read file with UTF-8 encoding.
pub fn read_utf8_file(path: &Path) -> Result<String> {
    Ok(std::fs::read_to_string(path)?)
}

pub fn read_text(path: &Path, encoding: TextEncoding) -> Result<String> {
    match encoding {
        TextEncoding::Utf8 => read_utf8_file(path),
        TextEncoding::Windows1252 => read_latin1_file(path),
    }
}

/// Overwrite `path` with `content` in the given encoding.
pub fn write_text(path: &Path, content: &str, encoding: TextEncoding) -> Result<()> {
    match encoding {
        TextEncoding::Utf8 => std::fs::write(path, content)?,
        TextEncoding::Windows1252 => {
            let (encoded, _, had_errors) = WINDOWS_1252.encode(content);
            if had_errors {
                return Err(MonsterError::Parse(
                    "Failed to encode file content to Windows-1252".to_string(),
                ));
            }
            std::fs::write(path, &*encoded)?;
        }
    }
    Ok(())
}

/// Copy an existing file to `<file>.<YYYYMMDD-HHMMSS>.bak`.
///
/// Returns `None` when there is nothing to back up.
pub fn backup_file(path: &Path) -> Result<Option<PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }

    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "Monster.txt".to_string());
    let backup_path = path.with_file_name(format!("{}.{}.bak", file_name, stamp));

    std::fs::copy(path, &backup_path)?;
    Ok(Some(backup_path))
}

/// Load a UTF-8 monster file.
pub fn load_file(path: &Path) -> Result<Document> {
    load_file_with(path, TextEncoding::Utf8)
}

pub fn load_file_with(path: &Path, encoding: TextEncoding) -> Result<Document> {
    let text = read_text(path, encoding).map_err(|e| match e {
        MonsterError::Io(io) => MonsterError::Io(std::io::Error::new(
            io.kind(),
            format!("Failed to read monster file {:?}: {}", path, io),
        )),
        other => other,
    })?;

    let document = parse_document(&text);
    info!("Loaded {} monsters from {:?}", document.rows.len(), path);
    Ok(document)
}

/// Save a document as UTF-8 with the default header and no backup.
pub fn save_file(document: &Document, path: &Path) -> Result<()> {
    save_file_with(document, path, &SaveOptions::default())
}

/// Render and write the whole document, replacing the file's previous contents.
pub fn save_file_with(document: &Document, path: &Path, options: &SaveOptions) -> Result<()> {
    let content = render_document(document, &options.default_header);

    if options.backup {
        if let Some(backup_path) = backup_file(path)? {
            info!("Backed up {:?} to {:?}", path, backup_path);
        }
    }

    write_text(path, &content, options.encoding)?;
    info!("Saved {} monsters to {:?}", document.rows.len(), path);
    Ok(())
}
