//! End-to-end scoring scenarios through the public API.

use suture_models::RatingLevel;
use suture_scoring::{
    final_rating, final_score, normalize_scores, normalize_with_tier, PerformanceTier,
    RubricAssessment,
};

fn level_counts(scores: &[u8]) -> [usize; 5] {
    let mut counts = [0; 5];
    for &s in scores {
        counts[s as usize - 1] += 1;
    }
    counts
}

#[test]
fn test_good_performance_keeps_two_fives() {
    let raw = [5, 5, 5, 5, 5, 4, 4];
    let normalized = normalize_scores(&raw);

    assert_eq!(level_counts(&normalized)[4], 2);
    assert_eq!(&normalized[..2], &[5, 5], "earliest fives are retained");
    assert_eq!(normalized, vec![5, 5, 4, 4, 4, 3, 3]);
}

#[test]
fn test_good_performance_all_fours_capped() {
    let normalized = normalize_scores(&[5, 5, 4, 4, 4, 4, 4]);
    assert_eq!(normalized, vec![5, 5, 4, 4, 4, 3, 3]);
    assert_eq!(final_score(&normalized), Some(4));
}

#[test]
fn test_weak_performance_profile() {
    let normalization = normalize_with_tier(&[1, 1, 2, 2, 1, 2, 1]);
    assert_eq!(normalization.tier, Some(PerformanceTier::Weak));
    assert_eq!(level_counts(&normalization.scores), [1, 2, 3, 1, 0]);
    assert_eq!(final_rating(&normalization.scores), Some(RatingLevel::Competent));
}

#[test]
fn test_moderate_performance_profile() {
    let raw = [3, 4, 2, 5, 3, 4, 3];
    let normalized = normalize_scores(&raw);
    assert_eq!(level_counts(&normalized), [0, 1, 4, 1, 1]);
    assert_eq!(normalized[3], 5);
    assert_eq!(normalized[2], 2);
}

#[test]
fn test_normalization_serializes_tier() {
    let normalization = normalize_with_tier(&[3, 4, 2, 5, 3, 4, 3]);
    let json = serde_json::to_value(&normalization).unwrap();
    assert_eq!(json["tier"], "moderate");
    assert_eq!(json["scores"], serde_json::json!([3, 4, 2, 5, 3, 3, 3]));
}

#[test]
fn test_assessment_report_lines() {
    let responses = [
        "Needle perpendicular to skin\n5/5 exemplary\nConsistent 90 degree entry.",
        "Avoiding multiple forceps grasps\n5/5 exemplary\nSingle grasp each pass.",
        "Instrument ties with square knots\n5/5 exemplary\nAll knots square.",
        "Approximate tension\n5/5 exemplary\nEdges meet without blanching.",
        "Even spacing\n4/5 proficient\nOne wider gap near the apex.",
        "Eversion\n4/5 proficient\nMild inversion at the end.",
        "Economy of motion\n4/5 proficient\nFew wasted movements.",
    ];

    let assessment = RubricAssessment::from_responses(&responses);
    assert_eq!(
        assessment.normalized_scores(),
        Some(&[5, 5, 4, 4, 4, 3, 3][..])
    );
    assert_eq!(assessment.final_score_line(), "Final Score: 4/5 proficient");

    let rendered = assessment.rendered_responses();
    assert_eq!(
        rendered[3],
        "Approximate tension\n4/5 proficient\nEdges meet without blanching."
    );
    assert_eq!(
        rendered[6],
        "Economy of motion\n3/5 competent\nFew wasted movements."
    );
}
