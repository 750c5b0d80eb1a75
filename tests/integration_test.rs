//! Integration tests for the full ranking pipeline:
//! normalize -> deduplicate -> match -> score -> rank.

use chrono::NaiveDate;
use scholarship_pipeline::dedup::Deduplicator;
use scholarship_pipeline::matcher::EligibilityMatcher;
use scholarship_pipeline::normalize::normalize_batch;
use scholarship_pipeline::scorer::FitScorer;
use scholarship_pipeline::types::{
    CitizenshipStatus, ParsedEligibility, ScholarshipRecord, Tri, UserProfile,
};

fn raw_record(title: &str, source: &str, amount: &str, deadline: &str) -> ScholarshipRecord {
    ScholarshipRecord {
        title: title.to_string(),
        source: source.to_string(),
        amount_raw: Some(amount.to_string()),
        deadline_raw: Some(deadline.to_string()),
        ..Default::default()
    }
}

fn test_profile() -> UserProfile {
    let mut profile = UserProfile::default();
    profile.academic.gpa = Some(3.7);
    profile.academic.major = Some("Computer Science".to_string());
    profile.location.citizenship_status = Some(CitizenshipStatus::UsCitizen);
    profile.location.state = Some("California".to_string());
    profile.financial.financial_need = Tri::Yes;
    profile
}

fn stem_eligibility() -> ParsedEligibility {
    ParsedEligibility {
        min_gpa: Some(3.0),
        majors: vec!["Computer Science".to_string(), "Engineering".to_string()],
        citizenship: vec!["US Citizen".to_string()],
        ..Default::default()
    }
}

#[test]
fn pipeline_normalizes_dedupes_matches_and_ranks() {
    let mut records = vec![
        raw_record(
            "Women in STEM Scholarship",
            "fastweb",
            "Varies",
            "rolling",
        ),
        raw_record(
            "women in stem scholarship award",
            "CareerOneStop",
            "$1,000 - $5,000",
            "February 15th, 2026",
        ),
        raw_record(
            "Veterans Memorial Grant",
            "scholarships_com",
            "Up to $10,000",
            "15 Mar 2026",
        ),
        raw_record(
            "Future Nurses Fund",
            "iefa",
            "$2,500",
            "January 10, 2026",
        ),
    ];
    // The richer duplicate carries structured eligibility
    records[1].description = Some("Supports women pursuing STEM degrees nationwide.".to_string());
    records[1].parsed_eligibility = Some(stem_eligibility());
    records[2].parsed_eligibility = Some(ParsedEligibility {
        military_affiliation: Tri::Yes,
        ..Default::default()
    });
    records[3].parsed_eligibility = Some(ParsedEligibility {
        majors: vec!["Nursing".to_string()],
        min_gpa: Some(3.9),
        ..Default::default()
    });

    // Normalize
    let normalized = normalize_batch(&records);
    assert_eq!(normalized[1].source, "careeronestop");
    assert_eq!(normalized[1].amount_min, Some(100_000));
    assert_eq!(normalized[1].amount_max, Some(500_000));
    assert_eq!(
        normalized[1].deadline,
        NaiveDate::from_ymd_opt(2026, 2, 15)
    );
    assert_eq!(normalized[0].amount_min, None);
    assert_eq!(normalized[0].deadline, None);
    assert_eq!(normalized[2].amount_min, None);
    assert_eq!(normalized[2].amount_max, Some(1_000_000));

    // Deduplicate: the two STEM listings collapse, richer one canonical
    let deduper = Deduplicator::default();
    let groups = deduper.duplicate_groups(&normalized);
    assert_eq!(groups, vec![vec![0, 1]]);

    let deduped = deduper.deduplicate(&normalized, true);
    assert!(deduped[0].is_duplicate);
    assert_eq!(
        deduped[0].duplicate_of.as_deref(),
        Some("women in stem scholarship award")
    );
    assert!(!deduped[1].is_duplicate);

    // Match
    let matcher = EligibilityMatcher::new();
    let match_results = matcher.match_batch(&test_profile(), &deduped);
    assert_eq!(match_results.len(), deduped.len());
    assert!(match_results[1].eligible);
    assert_eq!(match_results[1].match_percentage, 100.0);
    // GPA 3.7 < 3.9 hard-fails the nursing award
    assert!(!match_results[3].eligible);

    // Score and rank, eligible only
    let scorer = FitScorer::new();
    let reference = NaiveDate::from_ymd_opt(2026, 1, 1);
    let scores = scorer
        .score_batch(&match_results, &deduped, reference)
        .unwrap();
    assert_eq!(scores.len(), deduped.len());
    for score in &scores {
        assert!(score.total >= 0.0 && score.total <= 1.0);
    }

    let ranked = scorer.rank_scholarships(&deduped, &scores, true, Some(&match_results));
    assert_eq!(ranked.len(), 3); // nursing award filtered out
    for window in ranked.windows(2) {
        assert!(window[0].fit_score >= window[1].fit_score);
    }
    let ranks: Vec<usize> = ranked.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3]);

    // Export shape: plain nested maps with rounded floats
    let exported = ranked[0].to_value();
    assert!(exported["fit_score"].is_number());
    assert!(exported["fit_score_breakdown"]["breakdown"]["criteria_match"].is_number());
    assert!(exported["match_result"]["eligible"].as_bool().unwrap());
    assert_eq!(exported["rank"], 1);
}

#[test]
fn pipeline_drop_mode_removes_duplicate_listings() {
    let records = vec![
        raw_record("Acme Scholarship", "fastweb", "$1,000", "2026-05-01"),
        raw_record("Acme Award", "iefa", "$1,000", "2026-05-01"),
    ];
    let normalized = normalize_batch(&records);
    let kept = Deduplicator::default().deduplicate(&normalized, false);
    assert_eq!(kept.len(), 1);
    assert!(!kept[0].is_duplicate);
}

#[test]
fn pipeline_tolerates_garbage_fields_end_to_end() {
    let records = vec![raw_record(
        "Mystery Opportunity",
        "somewhere",
        "contact the office",
        "whenever",
    )];
    let normalized = normalize_batch(&records);
    assert_eq!(normalized[0].amount_min, None);
    assert_eq!(normalized[0].deadline, None);

    let deduped = Deduplicator::default().deduplicate(&normalized, true);
    let match_results = EligibilityMatcher::new().match_batch(&UserProfile::default(), &deduped);
    // No requirements, nothing known: still eligible, neutral scores
    assert!(match_results[0].eligible);

    let scores = FitScorer::new()
        .score_batch(&match_results, &deduped, None)
        .unwrap();
    let ranked =
        FitScorer::new().rank_scholarships(&deduped, &scores, true, Some(&match_results));
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].rank, 1);
}
