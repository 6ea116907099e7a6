//! Data models for the monster database.

use crate::error::{MonsterError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of columns in every monster record.
pub const FIELD_COUNT: usize = 28;

/// Literal stored in place of absent or blank values.
pub const ZERO_VALUE: &str = "0";

/// Schema columns of a `Monster.txt` record, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Index,
    Rate,
    Name,
    Level,
    MaxLife,
    MaxMana,
    DamageMin,
    DamageMax,
    Defense,
    MagicDefense,
    AttackRate,
    DefenseRate,
    MoveRange,
    AttackType,
    AttackRange,
    ViewRange,
    MoveSpeed,
    AttackSpeed,
    RegenTime,
    Attribute,
    ItemRate,
    MoneyRate,
    MaxItemLevel,
    MonsterSkill,
    Resistance1,
    Resistance2,
    Resistance3,
    Resistance4,
}

impl Field {
    pub const ALL: [Field; FIELD_COUNT] = [
        Field::Index,
        Field::Rate,
        Field::Name,
        Field::Level,
        Field::MaxLife,
        Field::MaxMana,
        Field::DamageMin,
        Field::DamageMax,
        Field::Defense,
        Field::MagicDefense,
        Field::AttackRate,
        Field::DefenseRate,
        Field::MoveRange,
        Field::AttackType,
        Field::AttackRange,
        Field::ViewRange,
        Field::MoveSpeed,
        Field::AttackSpeed,
        Field::RegenTime,
        Field::Attribute,
        Field::ItemRate,
        Field::MoneyRate,
        Field::MaxItemLevel,
        Field::MonsterSkill,
        Field::Resistance1,
        Field::Resistance2,
        Field::Resistance3,
        Field::Resistance4,
    ];

    /// Fields offered for percentage adjustment (Level onward).
    pub fn targetable() -> &'static [Field] {
        &Self::ALL[3..]
    }

    /// Position of this field inside a row.
    pub fn position(self) -> usize {
        self as usize
    }

    pub fn is_targetable(self) -> bool {
        self.position() >= Field::Level.position()
    }

    pub fn name(self) -> &'static str {
        match self {
            Field::Index => "Index",
            Field::Rate => "Rate",
            Field::Name => "Name",
            Field::Level => "Level",
            Field::MaxLife => "MaxLife",
            Field::MaxMana => "MaxMana",
            Field::DamageMin => "DamageMin",
            Field::DamageMax => "DamageMax",
            Field::Defense => "Defense",
            Field::MagicDefense => "MagicDefense",
            Field::AttackRate => "AttackRate",
            Field::DefenseRate => "DefenseRate",
            Field::MoveRange => "MoveRange",
            Field::AttackType => "AttackType",
            Field::AttackRange => "AttackRange",
            Field::ViewRange => "ViewRange",
            Field::MoveSpeed => "MoveSpeed",
            Field::AttackSpeed => "AttackSpeed",
            Field::RegenTime => "RegenTime",
            Field::Attribute => "Attribute",
            Field::ItemRate => "ItemRate",
            Field::MoneyRate => "MoneyRate",
            Field::MaxItemLevel => "MaxItemLevel",
            Field::MonsterSkill => "MonsterSkill",
            Field::Resistance1 => "Resistance1",
            Field::Resistance2 => "Resistance2",
            Field::Resistance3 => "Resistance3",
            Field::Resistance4 => "Resistance4",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = MonsterError;

    /// Field names match case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| MonsterError::Validation(format!("Unknown field: {:?}", s)))
    }
}

/// One monster record: a value per schema field, index-aligned to `Field::ALL`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    values: [String; FIELD_COUNT],
}

impl Row {
    pub fn new(values: [String; FIELD_COUNT]) -> Self {
        Self { values }
    }

    /// Build a row from exactly `FIELD_COUNT` values.
    pub fn from_values(values: Vec<String>) -> Result<Self> {
        let count = values.len();
        let values: [String; FIELD_COUNT] = values.try_into().map_err(|_| {
            MonsterError::Validation(format!(
                "Expected {} values, got {}",
                FIELD_COUNT, count
            ))
        })?;
        Ok(Self::new(values))
    }

    /// A row with every field set to the zero value.
    pub fn zeroed() -> Self {
        Self {
            values: std::array::from_fn(|_| ZERO_VALUE.to_string()),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        &self.values[field.position()]
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values[field.position()] = value.into();
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn index(&self) -> &str {
        self.get(Field::Index)
    }

    pub fn name(&self) -> &str {
        self.get(Field::Name)
    }

    /// Iterate `(field, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        Field::ALL
            .iter()
            .copied()
            .zip(self.values.iter().map(String::as_str))
    }
}

/// In-memory form of a whole `Monster.txt` file.
///
/// `header` holds the passthrough lines seen before the terminator, `rows`
/// the editable records and `footer` everything from the terminator onward.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub header: Vec<String>,
    pub rows: Vec<Row>,
    pub footer: Vec<String>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }
}
