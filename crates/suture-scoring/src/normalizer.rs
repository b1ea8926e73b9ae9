//! Rank-preserving rubric score normalization.
//!
//! Seven raw ratings are pulled toward the calibration profile of their
//! performance tier without reordering the criteria:
//!
//! - **Good**: ratings are kept, except that more than two 5s or more than
//!   three 4s are capped. Each capped rating drops exactly one level.
//! - **Moderate / Weak**: ratings are ranked (highest first, earlier
//!   criterion first on ties) and handed out from rating 5 down to rating 1
//!   according to the tier's [`TargetDistribution`].
//!
//! Inputs that are not seven ratings in 1-5 are returned unchanged.

use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::debug;

use suture_models::{RatingLevel, RUBRIC_CRITERIA_COUNT};

use crate::distribution::{PerformanceTier, TargetDistribution};

/// Most 5s the good tier keeps.
pub const GOOD_TIER_MAX_FIVES: usize = 2;

/// Most 4s the good tier keeps.
pub const GOOD_TIER_MAX_FOURS: usize = 3;

/// Rating given to ranked items that a distribution table does not place.
const UNPLACED_RATING: u8 = 3;

/// Metric counting normalizations by tier.
const SCORES_NORMALIZED_TOTAL: &str = "suture_scores_normalized_total";

/// Result of a normalization pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Normalization {
    /// Normalized ratings, same length and order as the input
    pub scores: Vec<u8>,
    /// Tier used, `None` when the input was passed through as invalid
    pub tier: Option<PerformanceTier>,
}

impl Normalization {
    /// True when at least one rating differs from `raw`.
    pub fn changed_from(&self, raw: &[u8]) -> bool {
        self.scores != raw
    }
}

/// Normalize seven raw ratings. Never fails; invalid input comes back as is.
pub fn normalize_scores(raw: &[u8]) -> Vec<u8> {
    normalize_with_tier(raw).scores
}

/// Normalize seven raw ratings and report which tier was applied.
pub fn normalize_with_tier(raw: &[u8]) -> Normalization {
    if raw.len() != RUBRIC_CRITERIA_COUNT || !raw.iter().all(|&s| RatingLevel::is_valid_value(s)) {
        debug!(
            "Skipping score normalization for invalid input {:?} (expected {} ratings in 1-5)",
            raw, RUBRIC_CRITERIA_COUNT
        );
        counter!(SCORES_NORMALIZED_TOTAL, "tier" => "skipped").increment(1);
        return Normalization {
            scores: raw.to_vec(),
            tier: None,
        };
    }

    let sum: u32 = raw.iter().map(|&s| s as u32).sum();
    let tier = PerformanceTier::from_mean(sum as f64 / RUBRIC_CRITERIA_COUNT as f64);

    let scores = match tier.target_distribution() {
        None => cap_outliers(raw),
        Some(target) if target.is_satisfied_by(raw) => raw.to_vec(),
        Some(target) => assign_to_distribution(raw, target),
    };

    debug!(
        "Normalized scores ({} tier): {:?} -> {:?}",
        tier, raw, scores
    );
    counter!(SCORES_NORMALIZED_TOTAL, "tier" => tier.as_str()).increment(1);

    Normalization {
        scores,
        tier: Some(tier),
    }
}

/// Good-tier correction: cap 5s first, then 4s.
fn cap_outliers(raw: &[u8]) -> Vec<u8> {
    let mut adjusted = raw.to_vec();
    demote_excess(&mut adjusted, raw, 5, GOOD_TIER_MAX_FIVES);
    demote_excess(&mut adjusted, raw, 4, GOOD_TIER_MAX_FOURS);
    adjusted
}

/// Demote all but `keep` holders of `level` by one level.
///
/// Holders are ranked by original rating, then by position. Only ratings
/// still at their original value are demoted, so no rating drops more than
/// one level across both caps.
fn demote_excess(adjusted: &mut [u8], original: &[u8], level: u8, keep: usize) {
    let mut holders: Vec<usize> = (0..adjusted.len())
        .filter(|&i| adjusted[i] == level)
        .collect();

    if holders.len() <= keep {
        return;
    }

    holders.sort_by(|&a, &b| original[b].cmp(&original[a]).then(a.cmp(&b)));

    for &index in &holders[keep..] {
        if original[index] == level {
            adjusted[index] = level - 1;
        }
    }
}

/// Hand out ratings from 5 down to 1 in rank order.
fn assign_to_distribution(raw: &[u8], target: &TargetDistribution) -> Vec<u8> {
    let mut ranked: Vec<(usize, u8)> = raw.iter().copied().enumerate().collect();
    // Stable sort: equal ratings keep their criterion order.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let mut adjusted = vec![UNPLACED_RATING; raw.len()];
    let mut remaining = ranked.into_iter();

    for (rating, count) in target.levels_descending() {
        for (index, _) in remaining.by_ref().take(count) {
            adjusted[index] = rating;
        }
    }

    adjusted
}
