//! Rubric rating levels.
//!
//! Every rubric criterion is rated on a five-point scale:
//!
//! - `1` poor
//! - `2` substandard
//! - `3` competent
//! - `4` proficient
//! - `5` exemplary

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A single rating on the 1-5 rubric scale.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum RatingLevel {
    Poor,
    Substandard,
    Competent,
    Proficient,
    Exemplary,
}

impl RatingLevel {
    /// All levels, lowest first.
    pub const ALL: &'static [RatingLevel] = &[
        RatingLevel::Poor,
        RatingLevel::Substandard,
        RatingLevel::Competent,
        RatingLevel::Proficient,
        RatingLevel::Exemplary,
    ];

    /// Lowest numeric rating.
    pub const MIN_VALUE: u8 = 1;

    /// Highest numeric rating.
    pub const MAX_VALUE: u8 = 5;

    /// Level for a numeric rating, `None` outside 1-5.
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(RatingLevel::Poor),
            2 => Some(RatingLevel::Substandard),
            3 => Some(RatingLevel::Competent),
            4 => Some(RatingLevel::Proficient),
            5 => Some(RatingLevel::Exemplary),
            _ => None,
        }
    }

    /// Numeric rating (1-5).
    pub fn value(&self) -> u8 {
        match self {
            RatingLevel::Poor => 1,
            RatingLevel::Substandard => 2,
            RatingLevel::Competent => 3,
            RatingLevel::Proficient => 4,
            RatingLevel::Exemplary => 5,
        }
    }

    /// Lowercase label as it appears in assessment text.
    pub fn as_str(&self) -> &'static str {
        match self {
            RatingLevel::Poor => "poor",
            RatingLevel::Substandard => "substandard",
            RatingLevel::Competent => "competent",
            RatingLevel::Proficient => "proficient",
            RatingLevel::Exemplary => "exemplary",
        }
    }

    /// Capitalized label for reports.
    pub fn title(&self) -> &'static str {
        match self {
            RatingLevel::Poor => "Poor",
            RatingLevel::Substandard => "Substandard",
            RatingLevel::Competent => "Competent",
            RatingLevel::Proficient => "Proficient",
            RatingLevel::Exemplary => "Exemplary",
        }
    }

    /// True for a numeric rating inside the 1-5 scale.
    pub fn is_valid_value(value: u8) -> bool {
        (Self::MIN_VALUE..=Self::MAX_VALUE).contains(&value)
    }
}

impl fmt::Display for RatingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RatingLevel {
    type Err = RatingLevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(value) = trimmed.parse::<u8>() {
            return Self::from_value(value).ok_or_else(|| RatingLevelParseError(s.to_string()));
        }

        match trimmed.to_lowercase().as_str() {
            "poor" => Ok(RatingLevel::Poor),
            "substandard" => Ok(RatingLevel::Substandard),
            "competent" => Ok(RatingLevel::Competent),
            "proficient" => Ok(RatingLevel::Proficient),
            "exemplary" => Ok(RatingLevel::Exemplary),
            _ => Err(RatingLevelParseError(s.to_string())),
        }
    }
}

impl TryFrom<u8> for RatingLevel {
    type Error = RatingLevelParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_value(value).ok_or_else(|| RatingLevelParseError(value.to_string()))
    }
}

impl From<RatingLevel> for u8 {
    fn from(level: RatingLevel) -> Self {
        level.value()
    }
}

#[derive(Debug, Error)]
#[error("Unknown rating level: {0}")]
pub struct RatingLevelParseError(String);
