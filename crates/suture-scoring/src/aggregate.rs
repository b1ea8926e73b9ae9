//! Final aggregate score.

use suture_models::RatingLevel;

/// Mean rating rounded half up and clamped to 1-5, `None` for no ratings.
pub fn final_score(scores: &[u8]) -> Option<u8> {
    if scores.is_empty() {
        return None;
    }

    let n = scores.len() as u64;
    let sum: u64 = scores.iter().map(|&s| s as u64).sum();
    // floor(sum / n + 1/2) without floating point
    let rounded = (2 * sum + n) / (2 * n);

    Some(rounded.clamp(RatingLevel::MIN_VALUE as u64, RatingLevel::MAX_VALUE as u64) as u8)
}

/// Final score as a rating level.
pub fn final_rating(scores: &[u8]) -> Option<RatingLevel> {
    final_score(scores).and_then(RatingLevel::from_value)
}
