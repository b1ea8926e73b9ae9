//! Rubric score calibration for suturing assessments.
//!
//! This crate provides:
//! - Performance tiers and their target rating distributions
//! - Rank-preserving score normalization onto those distributions
//! - The final aggregate score
//! - Parsing and re-rendering of per-criterion assessment responses

pub mod aggregate;
pub mod distribution;
pub mod normalizer;
pub mod response;

pub use aggregate::{final_rating, final_score};
pub use distribution::{PerformanceTier, TargetDistribution};
pub use normalizer::{normalize_scores, normalize_with_tier, Normalization};
pub use response::{parse_rubric_response, RubricAssessment, RubricParseError, RubricResponse};
