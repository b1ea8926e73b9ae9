//! Shared data models for the suturing assessment core.
//!
//! This crate provides Serde-serializable types for:
//! - Crop regions and the portrait aspect ratio used for smart cropping
//! - Rubric rating levels (1-5) and their labels
//! - Per-criterion rubric scores with opaque justification text

pub mod rating;
pub mod region;
pub mod rubric;

// Re-export common types
pub use rating::{RatingLevel, RatingLevelParseError};
pub use region::{AspectRatio, CropRegion};
pub use rubric::{RubricScore, RUBRIC_CRITERIA_COUNT};
