//! Per-criterion assessment responses.
//!
//! Each rubric criterion comes back from the assessment service as a short
//! text block:
//!
//! ```text
//! Needle perpendicular to skin
//! 4/5 proficient
//! Entry angle close to 90 degrees on all but one pass.
//! ```
//!
//! The rating line is located anywhere in the text; the first line is the
//! rubric point and the third line the justification.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, warn};

use suture_models::{RatingLevel, RubricScore, RUBRIC_CRITERIA_COUNT};

use crate::aggregate::final_score;
use crate::normalizer::normalize_scores;

/// Justification used when a response has no third line.
pub const MISSING_JUSTIFICATION: &str = "No justification provided";

static RATING_PATTERN: OnceLock<Regex> = OnceLock::new();

fn rating_pattern() -> &'static Regex {
    RATING_PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(\d)/5\s+(poor|substandard|competent|proficient|exemplary)")
            .expect("rating pattern is a valid regex")
    })
}

/// Errors from parsing a single response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RubricParseError {
    #[error("No 'N/5 label' rating found in response")]
    MissingRating,

    #[error("Rating {0} is outside the 1-5 scale")]
    OutOfRange(u8),
}

/// One parsed criterion response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RubricResponse {
    /// First line of the response
    pub rubric_point: String,
    /// Rating the service gave
    pub rating: u8,
    /// Third line of the response, or [`MISSING_JUSTIFICATION`]
    pub justification: String,
    /// Whether the response has the three-line layout that can be re-rendered
    pub structured: bool,
}

impl RubricResponse {
    /// Rating plus justification.
    pub fn score(&self) -> RubricScore {
        RubricScore::new(self.rating, self.justification.clone())
    }

    /// Render as `"<point>\n<N>/5 <label>\n<justification>"` with a new rating.
    ///
    /// Returns `None` for responses without the three-line layout.
    pub fn render_with_rating(&self, rating: u8) -> Option<String> {
        if !self.structured {
            return None;
        }
        let label = RatingLevel::from_value(rating).map(|l| l.as_str()).unwrap_or("");
        Some(format!(
            "{}\n{}/5 {}\n{}",
            self.rubric_point, rating, label, self.justification
        ))
    }
}

/// Parse one criterion response.
pub fn parse_rubric_response(text: &str) -> Result<RubricResponse, RubricParseError> {
    let captures = rating_pattern()
        .captures(text)
        .ok_or(RubricParseError::MissingRating)?;

    // The capture is a single ASCII digit.
    let rating = captures[1].parse::<u8>().unwrap_or(0);
    if !RatingLevel::is_valid_value(rating) {
        return Err(RubricParseError::OutOfRange(rating));
    }

    let lines: Vec<&str> = text.trim().lines().collect();
    let structured = lines.len() >= 3;
    let rubric_point = lines.first().map(|l| l.trim()).unwrap_or("").to_string();
    let justification = if structured {
        lines[2].trim().to_string()
    } else {
        MISSING_JUSTIFICATION.to_string()
    };

    Ok(RubricResponse {
        rubric_point,
        rating,
        justification,
        structured,
    })
}

/// Seven criterion responses with their normalized ratings and final score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RubricAssessment {
    texts: Vec<String>,
    parsed: Vec<Option<RubricResponse>>,
    normalized: Option<Vec<u8>>,
}

impl RubricAssessment {
    /// Parse the first seven responses and normalize when all seven parse.
    pub fn from_responses<S: AsRef<str>>(responses: &[S]) -> Self {
        let texts: Vec<String> = responses
            .iter()
            .take(RUBRIC_CRITERIA_COUNT)
            .map(|r| r.as_ref().trim().to_string())
            .collect();

        let parsed: Vec<Option<RubricResponse>> = texts
            .iter()
            .enumerate()
            .map(|(index, text)| match parse_rubric_response(text) {
                Ok(response) => Some(response),
                Err(e) => {
                    warn!("Criterion {} response not scored: {}", index + 1, e);
                    None
                }
            })
            .collect();

        let raw: Vec<u8> = parsed.iter().flatten().map(|r| r.rating).collect();
        let normalized = if raw.len() == RUBRIC_CRITERIA_COUNT {
            Some(normalize_scores(&raw))
        } else {
            debug!(
                "Only {} of {} ratings recovered; skipping normalization",
                raw.len(),
                RUBRIC_CRITERIA_COUNT
            );
            None
        };

        Self {
            texts,
            parsed,
            normalized,
        }
    }

    /// Ratings as returned by the service, for criteria that parsed.
    pub fn raw_scores(&self) -> Vec<u8> {
        self.parsed.iter().flatten().map(|r| r.rating).collect()
    }

    /// Normalized ratings, present only when all seven parsed.
    pub fn normalized_scores(&self) -> Option<&[u8]> {
        self.normalized.as_deref()
    }

    /// Normalized ratings paired with their untouched justifications.
    pub fn rubric_scores(&self) -> Option<Vec<RubricScore>> {
        let normalized = self.normalized.as_ref()?;
        Some(
            self.parsed
                .iter()
                .flatten()
                .zip(normalized)
                .map(|(response, &rating)| response.score().with_rating(rating))
                .collect(),
        )
    }

    /// Final aggregate score over the normalized ratings.
    pub fn final_score(&self) -> Option<u8> {
        self.normalized.as_deref().and_then(final_score)
    }

    /// Report line for the final score.
    pub fn final_score_line(&self) -> String {
        match self.final_score().and_then(|s| RatingLevel::from_value(s).map(|l| (s, l))) {
            Some((score, level)) => format!("Final Score: {}/5 {}", score, level),
            None => "Final Score: ERROR - Could not calculate".to_string(),
        }
    }

    /// Responses re-rendered with normalized ratings.
    ///
    /// Responses that cannot be re-rendered, or all of them when
    /// normalization was skipped, are returned as received.
    pub fn rendered_responses(&self) -> Vec<String> {
        let Some(normalized) = self.normalized.as_ref() else {
            return self.texts.clone();
        };

        let mut ratings = normalized.iter();
        self.texts
            .iter()
            .zip(&self.parsed)
            .map(|(text, parsed)| {
                parsed
                    .as_ref()
                    .and_then(|response| {
                        let rating = *ratings.next()?;
                        response.render_with_rating(rating)
                    })
                    .unwrap_or_else(|| text.clone())
            })
            .collect()
    }
}
