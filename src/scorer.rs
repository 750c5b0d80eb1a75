//! Fit Scoring Module
//!
//! Computes one comparable desirability score per scholarship from four
//! independent signals, each normalized to [0, 1]:
//! criteria match (0.35), deadline urgency (0.20), value density (0.25)
//! and competition factor (0.20).

use crate::matcher::MatchResult;
use crate::types::ScholarshipRecord;
use anyhow::{bail, Result};
use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};

const WEIGHT_CRITERIA: f64 = 0.35;
const WEIGHT_DEADLINE: f64 = 0.20;
const WEIGHT_VALUE: f64 = 0.25;
const WEIGHT_COMPETITION: f64 = 0.20;

/// Mid-scale default when a record carries no effort estimate (1-10).
const DEFAULT_EFFORT: i32 = 5;

/// Days until deadline at which urgency has decayed to 0.5.
const DEADLINE_HALF_LIFE_DAYS: f64 = 30.0;

/// Divisor mapping raw log-amount x effort products into [0, 1];
/// roughly $50k at low effort lands at 1.0.
const VALUE_SCALE: f64 = 4.5;

/// Complete fit score with breakdown. Component fields are already
/// weighted; the raw inputs are kept for export and debugging.
#[derive(Debug, Clone)]
pub struct FitScore {
    /// Overall fit score, 0.0-1.0.
    pub total: f64,
    pub criteria_match: f64,
    pub deadline_urgency: f64,
    pub value_density: f64,
    pub competition_factor: f64,

    // Raw values before weighting
    pub match_percentage: f64,
    pub days_until_deadline: Option<i64>,
    /// Award amount in cents.
    pub amount: Option<i64>,
    pub effort_score: Option<i32>,
    pub competition_score: Option<i32>,
}

impl FitScore {
    /// Plain nested map for export. Breakdown floats are rounded to 3
    /// decimals, percentages to 1.
    pub fn to_value(&self) -> Value {
        json!({
            "total": round3(self.total),
            "breakdown": {
                "criteria_match": round3(self.criteria_match),
                "deadline_urgency": round3(self.deadline_urgency),
                "value_density": round3(self.value_density),
                "competition_factor": round3(self.competition_factor),
            },
            "raw_values": {
                "match_percentage": round1(self.match_percentage),
                "days_until_deadline": self.days_until_deadline,
                "amount_cents": self.amount,
                "effort_score": self.effort_score,
                "competition_score": self.competition_score,
            }
        })
    }

    /// Total as a whole percentage, 0-100.
    pub fn total_percentage(&self) -> i64 {
        (self.total * 100.0).round() as i64
    }
}

/// A record with its score, match detail and rank attached, ready for
/// the export layer.
#[derive(Debug, Clone)]
pub struct RankedScholarship {
    pub record: ScholarshipRecord,
    pub fit_score: f64,
    pub breakdown: FitScore,
    pub match_result: Option<MatchResult>,
    /// 1-based, contiguous, in descending score order.
    pub rank: usize,
}

impl RankedScholarship {
    pub fn to_value(&self) -> Value {
        let mut value = serde_json::to_value(&self.record).unwrap_or_else(|_| json!({}));
        if let Value::Object(map) = &mut value {
            map.insert("fit_score".to_string(), json!(round3(self.fit_score)));
            map.insert("fit_score_breakdown".to_string(), self.breakdown.to_value());
            if let Some(match_result) = &self.match_result {
                map.insert("match_result".to_string(), match_result.to_value());
            }
            map.insert("rank".to_string(), json!(self.rank));
        }
        value
    }
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[derive(Debug, Default)]
pub struct FitScorer;

impl FitScorer {
    pub fn new() -> Self {
        FitScorer
    }

    /// Score one scholarship. `reference_date` defaults to today; tests
    /// pass a fixed date for determinism.
    pub fn calculate(
        &self,
        match_result: &MatchResult,
        record: &ScholarshipRecord,
        reference_date: Option<NaiveDate>,
    ) -> FitScore {
        let reference_date = reference_date.unwrap_or_else(|| Utc::now().date_naive());

        let match_pct = match_result.match_percentage;
        let amount = record.amount_max.or(record.amount_min);
        let days_until = record
            .deadline
            .map(|deadline| (deadline - reference_date).num_days());

        let criteria_score = criteria_match(match_pct);
        let deadline_score = deadline_urgency(days_until);
        let value_score = value_density(amount, record.effort_score);
        let competition_score = competition_factor(record.competition_score);

        let total = criteria_score * WEIGHT_CRITERIA
            + deadline_score * WEIGHT_DEADLINE
            + value_score * WEIGHT_VALUE
            + competition_score * WEIGHT_COMPETITION;

        FitScore {
            total,
            criteria_match: criteria_score * WEIGHT_CRITERIA,
            deadline_urgency: deadline_score * WEIGHT_DEADLINE,
            value_density: value_score * WEIGHT_VALUE,
            competition_factor: competition_score * WEIGHT_COMPETITION,
            match_percentage: match_pct,
            days_until_deadline: days_until,
            amount,
            effort_score: record.effort_score,
            competition_score: record.competition_score,
        }
    }

    /// Score a batch. The two lists must be parallel: same length, same
    /// order. A length mismatch is a caller bug and fails immediately
    /// rather than silently misaligning scores with records.
    pub fn score_batch(
        &self,
        match_results: &[MatchResult],
        records: &[ScholarshipRecord],
        reference_date: Option<NaiveDate>,
    ) -> Result<Vec<FitScore>> {
        if match_results.len() != records.len() {
            bail!(
                "match_results and records must have the same length ({} != {})",
                match_results.len(),
                records.len()
            );
        }

        let scores: Vec<FitScore> = match_results
            .iter()
            .zip(records)
            .map(|(match_result, record)| self.calculate(match_result, record, reference_date))
            .collect();

        log::info!("Calculated {} fit scores", scores.len());
        Ok(scores)
    }

    /// Rank scholarships by fit score, descending, with 1-based
    /// contiguous ranks. With `eligible_only` (and match results
    /// supplied) ineligible scholarships are dropped before ranking.
    pub fn rank_scholarships(
        &self,
        records: &[ScholarshipRecord],
        scores: &[FitScore],
        eligible_only: bool,
        match_results: Option<&[MatchResult]>,
    ) -> Vec<RankedScholarship> {
        let mut combined: Vec<RankedScholarship> = Vec::new();

        for (i, (record, score)) in records.iter().zip(scores).enumerate() {
            let match_result = match_results.and_then(|results| results.get(i));
            if eligible_only {
                if let Some(match_result) = match_result {
                    if !match_result.eligible {
                        continue;
                    }
                }
            }

            combined.push(RankedScholarship {
                record: record.clone(),
                fit_score: score.total,
                breakdown: score.clone(),
                match_result: match_result.cloned(),
                rank: 0,
            });
        }

        combined.sort_by(|a, b| {
            b.fit_score
                .partial_cmp(&a.fit_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        for (i, ranked) in combined.iter_mut().enumerate() {
            ranked.rank = i + 1;
        }

        log::info!("Ranked {} scholarships by fit score", combined.len());
        combined
    }
}

/// Match percentage scaled to [0, 1].
fn criteria_match(match_percentage: f64) -> f64 {
    (match_percentage / 100.0).clamp(0.0, 1.0)
}

/// Exponential-decay urgency: 1.0 due today, 0.5 at the half-life,
/// 0.0 once expired, 0.5 neutral when no deadline is known.
fn deadline_urgency(days_until: Option<i64>) -> f64 {
    let days_until = match days_until {
        None => return 0.5,
        Some(days) => days,
    };

    if days_until < 0 {
        return 0.0;
    }
    if days_until == 0 {
        return 1.0;
    }

    let decay_rate = std::f64::consts::LN_2 / DEADLINE_HALF_LIFE_DAYS;
    (-decay_rate * days_until as f64).exp().clamp(0.0, 1.0)
}

/// Log-scaled award amount discounted by application effort. Unknown
/// amount scores neutral 0.5; non-positive amounts score 0.
fn value_density(amount_cents: Option<i64>, effort_score: Option<i32>) -> f64 {
    let amount_cents = match amount_cents {
        None => return 0.5,
        Some(cents) => cents,
    };

    let amount_dollars = amount_cents as f64 / 100.0;
    if amount_dollars <= 0.0 {
        return 0.0;
    }

    let effort = effort_score.unwrap_or(DEFAULT_EFFORT);
    let effort_factor = (11 - effort) as f64 / 10.0;
    let raw_value = amount_dollars.log10() * effort_factor;

    (raw_value / VALUE_SCALE).clamp(0.0, 1.0)
}

/// Lower competition scores higher: 1 -> 1.0, 10 -> 0.1, unknown -> 0.5.
fn competition_factor(competition_score: Option<i32>) -> f64 {
    match competition_score {
        None => 0.5,
        Some(score) => (11 - score) as f64 / 10.0,
    }
}
