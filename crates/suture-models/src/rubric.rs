//! Per-criterion rubric scores.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::rating::RatingLevel;

/// Number of rubric criteria in one assessment.
pub const RUBRIC_CRITERIA_COUNT: usize = 7;

/// One rubric criterion's rating plus the assessor's justification.
///
/// The justification is opaque text and is carried through unchanged when
/// the rating is normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RubricScore {
    /// Rating on the 1-5 scale
    pub rating: u8,
    /// Free-text justification
    pub justification: String,
}

impl RubricScore {
    /// Create a new rubric score.
    pub fn new(rating: u8, justification: impl Into<String>) -> Self {
        Self {
            rating,
            justification: justification.into(),
        }
    }

    /// Rating level, `None` when the rating is outside 1-5.
    pub fn level(&self) -> Option<RatingLevel> {
        RatingLevel::from_value(self.rating)
    }

    /// Same justification with a different rating.
    pub fn with_rating(&self, rating: u8) -> Self {
        Self {
            rating,
            justification: self.justification.clone(),
        }
    }
}
