use anyhow::{bail, Context, Result};
use scholarship_pipeline::dedup::Deduplicator;
use scholarship_pipeline::matcher::EligibilityMatcher;
use scholarship_pipeline::scorer::FitScorer;
use scholarship_pipeline::normalize;
use scholarship_pipeline::types::{ScholarshipRecord, UserProfile};
use std::fs;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        bail!(
            "usage: {} <scholarships.json> <profile.json> [ranked.json]",
            args[0]
        );
    }
    let scholarships_path = &args[1];
    let profile_path = &args[2];
    let output_path = args.get(3).map(String::as_str).unwrap_or("ranked.json");

    let records = load_records(scholarships_path)?;
    let profile = load_profile(profile_path)?;
    println!("Loaded {} scholarships", records.len());

    // Pipeline: normalize -> deduplicate -> match -> score -> rank
    let normalized = normalize::normalize_batch(&records);
    let deduped = Deduplicator::default().deduplicate(&normalized, true);

    let matcher = EligibilityMatcher::new();
    let match_results = matcher.match_batch(&profile, &deduped);

    let scorer = FitScorer::new();
    let scores = scorer.score_batch(&match_results, &deduped, None)?;
    let ranked = scorer.rank_scholarships(&deduped, &scores, true, Some(&match_results));

    let export: Vec<serde_json::Value> = ranked.iter().map(|r| r.to_value()).collect();
    fs::write(
        Path::new(output_path),
        serde_json::to_string_pretty(&export)?,
    )
    .with_context(|| format!("Failed to write {}", output_path))?;

    println!(
        "Ranked {} eligible scholarships (of {} input) -> {}",
        ranked.len(),
        deduped.len(),
        output_path
    );
    for ranked_record in ranked.iter().take(10) {
        let summary = ranked_record
            .match_result
            .as_ref()
            .map(|m| m.match_summary())
            .unwrap_or_default();
        println!(
            "{:>3}. {:.3}  {}  [{}]",
            ranked_record.rank,
            ranked_record.fit_score,
            ranked_record.record.title,
            summary
        );
    }

    Ok(())
}

fn load_records(path: &str) -> Result<Vec<ScholarshipRecord>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scholarships from {}", path))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse scholarships JSON in {}", path))
}

fn load_profile(path: &str) -> Result<UserProfile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read profile from {}", path))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse profile JSON in {}", path))
}
