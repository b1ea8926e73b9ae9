//! Performance tiers and target rating distributions.
//!
//! The mean of the raw ratings places an assessment in one of three tiers:
//!
//! | Tier       | Mean         | Target counts (1/2/3/4/5) |
//! |------------|--------------|---------------------------|
//! | `Good`     | >= 3.5       | none, outlier caps only   |
//! | `Moderate` | 2.5 .. 3.5   | 0 / 1 / 4 / 1 / 1         |
//! | `Weak`     | < 2.5        | 1 / 2 / 3 / 1 / 0         |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Performance bracket chosen from the mean raw rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceTier {
    /// Mean of at least 3.5. Only outlier clustering is corrected.
    Good,
    /// Mean in [2.5, 3.5).
    Moderate,
    /// Mean below 2.5.
    Weak,
}

impl PerformanceTier {
    /// Lowest mean rating that counts as good performance.
    pub const GOOD_MIN_MEAN: f64 = 3.5;

    /// Lowest mean rating that counts as moderate performance.
    pub const MODERATE_MIN_MEAN: f64 = 2.5;

    /// Tier for a mean rating.
    pub fn from_mean(mean: f64) -> Self {
        if mean >= Self::GOOD_MIN_MEAN {
            PerformanceTier::Good
        } else if mean >= Self::MODERATE_MIN_MEAN {
            PerformanceTier::Moderate
        } else {
            PerformanceTier::Weak
        }
    }

    /// Distribution the tier reassigns ratings to, `None` for `Good`.
    pub fn target_distribution(&self) -> Option<&'static TargetDistribution> {
        match self {
            PerformanceTier::Good => None,
            PerformanceTier::Moderate => Some(&TargetDistribution::MODERATE),
            PerformanceTier::Weak => Some(&TargetDistribution::WEAK),
        }
    }

    /// Returns the tier name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceTier::Good => "good",
            PerformanceTier::Moderate => "moderate",
            PerformanceTier::Weak => "weak",
        }
    }
}

impl fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Number of criteria that should end up at each rating level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDistribution {
    /// `counts[r - 1]` criteria get rating `r`
    counts: [usize; 5],
}

impl TargetDistribution {
    /// Moderate tier: mostly competent, one each of 2, 4 and 5.
    pub const MODERATE: TargetDistribution = TargetDistribution::new([0, 1, 4, 1, 1]);

    /// Weak tier: one poor, two substandard, three competent, one proficient.
    pub const WEAK: TargetDistribution = TargetDistribution::new([1, 2, 3, 1, 0]);

    /// Create a distribution from counts for ratings 1 through 5.
    pub const fn new(counts: [usize; 5]) -> Self {
        Self { counts }
    }

    /// Target count for a rating, 0 outside 1-5.
    pub fn count(&self, rating: u8) -> usize {
        match rating {
            1..=5 => self.counts[rating as usize - 1],
            _ => 0,
        }
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// `(rating, count)` pairs from rating 5 down to rating 1.
    pub fn levels_descending(&self) -> impl Iterator<Item = (u8, usize)> + '_ {
        (1..=5u8).rev().map(move |rating| (rating, self.count(rating)))
    }

    /// True when `scores` has exactly the target count at every level.
    pub fn is_satisfied_by(&self, scores: &[u8]) -> bool {
        (1..=5u8).all(|rating| {
            scores.iter().filter(|&&s| s == rating).count() == self.count(rating)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use suture_models::RUBRIC_CRITERIA_COUNT;

    #[test]
    fn test_tables_cover_every_criterion() {
        assert_eq!(TargetDistribution::MODERATE.total(), RUBRIC_CRITERIA_COUNT);
        assert_eq!(TargetDistribution::WEAK.total(), RUBRIC_CRITERIA_COUNT);
    }

    #[test]
    fn test_moderate_counts() {
        let table = TargetDistribution::MODERATE;
        assert_eq!(
            (1..=5).map(|r| table.count(r)).collect::<Vec<_>>(),
            vec![0, 1, 4, 1, 1]
        );
    }

    #[test]
    fn test_weak_counts() {
        let table = TargetDistribution::WEAK;
        assert_eq!(
            (1..=5).map(|r| table.count(r)).collect::<Vec<_>>(),
            vec![1, 2, 3, 1, 0]
        );
    }

    #[test]
    fn test_levels_descending_order() {
        let levels: Vec<u8> = TargetDistribution::WEAK
            .levels_descending()
            .map(|(rating, _)| rating)
            .collect();
        assert_eq!(levels, vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(PerformanceTier::from_mean(3.5), PerformanceTier::Good);
        assert_eq!(PerformanceTier::from_mean(3.49), PerformanceTier::Moderate);
        assert_eq!(PerformanceTier::from_mean(2.5), PerformanceTier::Moderate);
        assert_eq!(PerformanceTier::from_mean(2.49), PerformanceTier::Weak);
    }

    #[test]
    fn test_good_tier_has_no_table() {
        assert!(PerformanceTier::Good.target_distribution().is_none());
        assert_eq!(
            PerformanceTier::Weak.target_distribution(),
            Some(&TargetDistribution::WEAK)
        );
    }

    #[test]
    fn test_is_satisfied_by() {
        assert!(TargetDistribution::MODERATE.is_satisfied_by(&[3, 4, 2, 5, 3, 3, 3]));
        assert!(!TargetDistribution::MODERATE.is_satisfied_by(&[3, 4, 2, 5, 3, 4, 3]));
    }
}
