//! Core library for editing MU Online `Monster.txt` databases.

pub mod config;
pub mod editing;
pub mod error;
pub mod export;
pub mod file_utils;
pub mod models;
pub mod parsers;
pub mod transform;

pub use error::{MonsterError, Result};
pub use editing::{add_row, delete_row, update_row};
pub use file_utils::{load_file, save_file};
pub use models::{Document, Field, Row, FIELD_COUNT};
pub use parsers::{decode_line, encode_row};
pub use transform::{apply_percentage, parse_percent, TransformSummary};
