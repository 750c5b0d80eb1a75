//! Eligibility Matching Module
//!
//! Evaluates a user profile against one scholarship's structured
//! eligibility requirements. Requirements come in two classes: hard
//! (GPA minimum, citizenship) where a failed check disqualifies, and
//! soft (major, degree level, demographics, ...) which only affect the
//! match percentage. Missing user data is always `Unknown`, never a
//! failure -- the matcher does not fabricate answers it cannot
//! determine.

use crate::tables;
use crate::types::{
    CitizenshipStatus, ParsedEligibility, ScholarshipRecord, Tri, UserProfile,
};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    /// User meets the requirement.
    Matched,
    /// User partially meets the requirement (e.g. related major).
    Partial,
    /// User does not meet the requirement.
    Unmatched,
    /// Cannot determine; user data missing.
    Unknown,
    /// Requirement does not apply.
    NotApplicable,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Matched => "matched",
            MatchStatus::Partial => "partial",
            MatchStatus::Unmatched => "unmatched",
            MatchStatus::Unknown => "unknown",
            MatchStatus::NotApplicable => "n/a",
        }
    }

    /// Whether this status counts toward the match percentage.
    fn is_considered(&self) -> bool {
        !matches!(self, MatchStatus::Unknown | MatchStatus::NotApplicable)
    }
}

/// One evaluated requirement.
#[derive(Debug, Clone)]
pub struct RequirementMatch {
    /// Human-readable label, e.g. "GPA >= 3.5".
    pub requirement: String,
    pub status: MatchStatus,
    pub user_value: Option<String>,
    pub required_value: Option<String>,
    /// Disqualifying if unmatched.
    pub is_hard: bool,
}

impl RequirementMatch {
    pub fn to_value(&self) -> Value {
        json!({
            "requirement": self.requirement,
            "status": self.status.as_str(),
            "user_value": self.user_value,
            "required_value": self.required_value,
            "is_hard": self.is_hard,
        })
    }
}

/// One scholarship's full evaluation against a profile.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub scholarship_id: String,
    pub eligible: bool,
    pub match_count: usize,
    pub total_requirements: usize,
    pub partial_count: usize,
    /// 0-100; partial matches count half.
    pub match_percentage: f64,
    pub details: Vec<RequirementMatch>,
}

impl MatchResult {
    /// Summary like "4/5", or "3/4 ~" when partial matches are present.
    pub fn match_summary(&self) -> String {
        if self.partial_count > 0 {
            format!("{}/{} ~", self.match_count, self.total_requirements)
        } else {
            format!("{}/{}", self.match_count, self.total_requirements)
        }
    }

    pub fn to_value(&self) -> Value {
        json!({
            "scholarship_id": self.scholarship_id,
            "eligible": self.eligible,
            "match_count": self.match_count,
            "total_requirements": self.total_requirements,
            "partial_count": self.partial_count,
            "match_percentage": round1(self.match_percentage),
            "details": self.details.iter().map(RequirementMatch::to_value).collect::<Vec<_>>(),
        })
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn contains_either(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

#[derive(Debug, Default)]
pub struct EligibilityMatcher;

impl EligibilityMatcher {
    pub fn new() -> Self {
        EligibilityMatcher
    }

    /// Evaluate a profile against one scholarship's requirements.
    pub fn match_profile(
        &self,
        profile: &UserProfile,
        eligibility: &ParsedEligibility,
        scholarship_id: &str,
    ) -> MatchResult {
        let mut details: Vec<RequirementMatch> = Vec::new();

        if let Some(gpa) = self.check_gpa(profile, eligibility) {
            details.push(gpa);
        }
        if let Some(citizenship) = self.check_citizenship(profile, eligibility) {
            details.push(citizenship);
        }
        if let Some(major) = self.check_major(profile, eligibility) {
            details.push(major);
        }
        if let Some(degree) = self.check_degree_level(profile, eligibility) {
            details.push(degree);
        }
        if let Some(year) = self.check_year(profile, eligibility) {
            details.push(year);
        }
        details.extend(self.check_demographics(profile, eligibility));
        if let Some(state) = self.check_state(profile, eligibility) {
            details.push(state);
        }
        if let Some(financial) = self.check_financial_need(profile, eligibility) {
            details.push(financial);
        }
        if let Some(military) = self.check_military(profile, eligibility) {
            details.push(military);
        }

        let hard_failure = details
            .iter()
            .any(|d| d.is_hard && d.status == MatchStatus::Unmatched);
        let matched = details
            .iter()
            .filter(|d| d.status == MatchStatus::Matched)
            .count();
        let partial = details
            .iter()
            .filter(|d| d.status == MatchStatus::Partial)
            .count();
        let total = details.iter().filter(|d| d.status.is_considered()).count();

        let match_percentage = if total > 0 {
            (matched as f64 + partial as f64 * 0.5) / total as f64 * 100.0
        } else {
            // No determinable requirements: nothing rules the user out
            100.0
        };

        MatchResult {
            scholarship_id: scholarship_id.to_string(),
            eligible: !hard_failure,
            match_count: matched,
            total_requirements: total,
            partial_count: partial,
            match_percentage,
            details,
        }
    }

    /// Evaluate a profile against many scholarships, order-preserving.
    /// A record without `parsed_eligibility` has no requirements and
    /// comes back eligible at 100%.
    pub fn match_batch(
        &self,
        profile: &UserProfile,
        records: &[ScholarshipRecord],
    ) -> Vec<MatchResult> {
        let empty = ParsedEligibility::default();
        let results: Vec<MatchResult> = records
            .iter()
            .map(|record| {
                let eligibility = record.parsed_eligibility.as_ref().unwrap_or(&empty);
                self.match_profile(profile, eligibility, &record.identity())
            })
            .collect();

        log::info!(
            "Matched {} scholarships, {} eligible",
            results.len(),
            results.iter().filter(|r| r.eligible).count()
        );
        results
    }

    fn check_gpa(
        &self,
        profile: &UserProfile,
        eligibility: &ParsedEligibility,
    ) -> Option<RequirementMatch> {
        let min_gpa = eligibility.min_gpa?;
        let requirement = format!("GPA >= {}", min_gpa);

        let user_gpa = match profile.academic.gpa {
            Some(gpa) => gpa,
            None => {
                return Some(RequirementMatch {
                    requirement,
                    status: MatchStatus::Unknown,
                    user_value: Some("Not specified".to_string()),
                    required_value: Some(min_gpa.to_string()),
                    is_hard: true,
                })
            }
        };

        let status = if user_gpa >= min_gpa {
            MatchStatus::Matched
        } else {
            MatchStatus::Unmatched
        };
        Some(RequirementMatch {
            requirement,
            status,
            user_value: Some(user_gpa.to_string()),
            required_value: Some(min_gpa.to_string()),
            is_hard: true,
        })
    }

    fn check_citizenship(
        &self,
        profile: &UserProfile,
        eligibility: &ParsedEligibility,
    ) -> Option<RequirementMatch> {
        let required = &eligibility.citizenship;
        if required.is_empty() {
            return None;
        }
        let requirement = format!("Citizenship: {}", required.join(", "));
        let required_value = Some(required.join(", "));

        let user_citizenship = match profile.location.citizenship_status {
            Some(status) => status,
            None => {
                return Some(RequirementMatch {
                    requirement,
                    status: MatchStatus::Unknown,
                    user_value: Some("Not specified".to_string()),
                    required_value,
                    is_hard: true,
                })
            }
        };

        let synonyms = tables::citizenship_synonyms(user_citizenship);
        let mut matched = required.iter().any(|req| {
            let req_lower = req.to_lowercase();
            synonyms
                .iter()
                .any(|syn| contains_either(&syn.to_lowercase(), &req_lower))
        });

        // "International" requirements admit an international user even
        // without synonym overlap. Deliberately asymmetric with the
        // other statuses; observed source behavior, kept literal.
        if !matched && user_citizenship == CitizenshipStatus::International {
            matched = required
                .iter()
                .any(|req| req.to_lowercase().contains("international"));
        }

        Some(RequirementMatch {
            requirement,
            status: if matched {
                MatchStatus::Matched
            } else {
                MatchStatus::Unmatched
            },
            user_value: Some(user_citizenship.as_str().to_string()),
            required_value,
            is_hard: true,
        })
    }

    fn check_major(
        &self,
        profile: &UserProfile,
        eligibility: &ParsedEligibility,
    ) -> Option<RequirementMatch> {
        let required = &eligibility.majors;
        if required.is_empty() {
            return None;
        }
        let shown: Vec<&str> = required.iter().take(3).map(String::as_str).collect();
        let required_value = Some(shown.join(", "));

        let user_major = match &profile.academic.major {
            Some(major) if !major.is_empty() => major,
            _ => {
                return Some(RequirementMatch {
                    requirement: format!("Major: {}...", shown.join(", ")),
                    status: MatchStatus::Unknown,
                    user_value: Some("Not specified".to_string()),
                    required_value,
                    is_hard: false,
                })
            }
        };

        let user_major_lower = user_major.to_lowercase();
        let mut matched = false;
        let mut partial = false;
        for req in required {
            let req_lower = req.to_lowercase();
            if contains_either(&req_lower, &user_major_lower) {
                matched = true;
                break;
            }
            if tables::is_related_field(&user_major_lower, &req_lower) {
                partial = true;
            }
        }

        let status = if matched {
            MatchStatus::Matched
        } else if partial {
            MatchStatus::Partial
        } else {
            MatchStatus::Unmatched
        };

        Some(RequirementMatch {
            requirement: format!("Major: {}", shown.join(", ")),
            status,
            user_value: Some(user_major.clone()),
            required_value,
            is_hard: false,
        })
    }

    fn check_degree_level(
        &self,
        profile: &UserProfile,
        eligibility: &ParsedEligibility,
    ) -> Option<RequirementMatch> {
        let required = &eligibility.degree_levels;
        if required.is_empty() {
            return None;
        }
        let requirement = format!("Degree: {}", required.join(", "));
        let required_value = Some(required.join(", "));

        let user_level = match profile.academic.degree_level {
            Some(level) => level,
            None => {
                return Some(RequirementMatch {
                    requirement,
                    status: MatchStatus::Unknown,
                    user_value: Some("Not specified".to_string()),
                    required_value,
                    is_hard: false,
                })
            }
        };

        let user_level_str = user_level.as_str();
        let matched = required
            .iter()
            .any(|req| contains_either(&req.to_lowercase(), user_level_str));

        Some(RequirementMatch {
            requirement,
            status: if matched {
                MatchStatus::Matched
            } else {
                MatchStatus::Unmatched
            },
            user_value: Some(user_level_str.to_string()),
            required_value,
            is_hard: false,
        })
    }

    fn check_year(
        &self,
        profile: &UserProfile,
        eligibility: &ParsedEligibility,
    ) -> Option<RequirementMatch> {
        let required = &eligibility.year_in_school;
        if required.is_empty() {
            return None;
        }
        let requirement = format!("Year: {}", required.join(", "));
        let required_value = Some(required.join(", "));

        let user_year = match profile.academic.year_in_school {
            Some(year) => year,
            None => {
                return Some(RequirementMatch {
                    requirement,
                    status: MatchStatus::Unknown,
                    user_value: Some("Not specified".to_string()),
                    required_value,
                    is_hard: false,
                })
            }
        };

        let user_year_str = user_year.as_str();
        let matched = required
            .iter()
            .any(|req| contains_either(&req.to_lowercase(), user_year_str));

        Some(RequirementMatch {
            requirement,
            status: if matched {
                MatchStatus::Matched
            } else {
                MatchStatus::Unmatched
            },
            user_value: Some(user_year_str.to_string()),
            required_value,
            is_hard: false,
        })
    }

    /// Each demographic requirement is evaluated independently against
    /// every signal the profile carries: ethnicity list, first-generation
    /// flag, gender, LGBTQ+ flag. A requirement with no determinable
    /// signal stays `Unknown`.
    fn check_demographics(
        &self,
        profile: &UserProfile,
        eligibility: &ParsedEligibility,
    ) -> Vec<RequirementMatch> {
        let required = &eligibility.demographics;
        if required.is_empty() {
            return Vec::new();
        }

        let demographics = &profile.demographics;
        let mut results = Vec::new();

        for req in required {
            let req_lower = req.to_lowercase();
            let mut matched = false;
            let mut user_value: Option<String> = None;

            if demographics
                .ethnicity
                .iter()
                .any(|e| contains_either(&e.to_lowercase(), &req_lower))
            {
                matched = true;
                user_value = Some(demographics.ethnicity.join(", "));
            }

            if req_lower.contains("first") && req_lower.contains("generation") {
                match demographics.first_generation {
                    Tri::Yes => {
                        matched = true;
                        user_value = Some("First-generation".to_string());
                    }
                    Tri::No => {
                        user_value = Some("Not first-generation".to_string());
                    }
                    Tri::Unknown => {}
                }
            }

            if let Some(gender) = demographics.gender {
                if contains_either(gender.as_str(), &req_lower) {
                    matched = true;
                    user_value = Some(gender.as_str().to_string());
                }
            }

            if req_lower.contains("lgbtq") || req_lower.contains("lgbt") {
                match demographics.lgbtq {
                    Tri::Yes => {
                        matched = true;
                        user_value = Some("LGBTQ+".to_string());
                    }
                    Tri::No => {
                        user_value = Some("Not LGBTQ+".to_string());
                    }
                    Tri::Unknown => {}
                }
            }

            let status = match (&user_value, matched) {
                (None, _) => MatchStatus::Unknown,
                (Some(_), true) => MatchStatus::Matched,
                (Some(_), false) => MatchStatus::Unmatched,
            };
            let user_value =
                user_value.unwrap_or_else(|| "Not specified".to_string());

            results.push(RequirementMatch {
                requirement: format!("Demographics: {}", req),
                status,
                user_value: Some(user_value),
                required_value: Some(req.clone()),
                is_hard: false,
            });
        }

        results
    }

    fn check_state(
        &self,
        profile: &UserProfile,
        eligibility: &ParsedEligibility,
    ) -> Option<RequirementMatch> {
        let required = &eligibility.states;
        if required.is_empty() {
            return None;
        }
        let requirement = format!("State: {}", required.join(", "));
        let required_value = Some(required.join(", "));

        let user_state = match &profile.location.state {
            Some(state) if !state.is_empty() => state,
            _ => {
                return Some(RequirementMatch {
                    requirement,
                    status: MatchStatus::Unknown,
                    user_value: Some("Not specified".to_string()),
                    required_value,
                    is_hard: false,
                })
            }
        };

        let user_state_lower = user_state.to_lowercase();
        let matched = required
            .iter()
            .any(|req| contains_either(&req.to_lowercase(), &user_state_lower));

        Some(RequirementMatch {
            requirement,
            status: if matched {
                MatchStatus::Matched
            } else {
                MatchStatus::Unmatched
            },
            user_value: Some(user_state.clone()),
            required_value,
            is_hard: false,
        })
    }

    fn check_financial_need(
        &self,
        profile: &UserProfile,
        eligibility: &ParsedEligibility,
    ) -> Option<RequirementMatch> {
        let requires_need = match eligibility.financial_need {
            Tri::Unknown => return None,
            Tri::Yes => true,
            Tri::No => false,
        };
        let requirement = "Demonstrates financial need".to_string();
        let required_value = Some(if requires_need { "Yes" } else { "No" }.to_string());

        let user_need = match profile.financial.financial_need {
            Tri::Unknown => {
                return Some(RequirementMatch {
                    requirement,
                    status: MatchStatus::Unknown,
                    user_value: Some("Not specified".to_string()),
                    required_value,
                    is_hard: false,
                })
            }
            Tri::Yes => true,
            Tri::No => false,
        };

        let status = if !requires_need || user_need {
            MatchStatus::Matched
        } else {
            MatchStatus::Unmatched
        };

        Some(RequirementMatch {
            requirement,
            status,
            user_value: Some(if user_need { "Yes" } else { "No" }.to_string()),
            required_value,
            is_hard: false,
        })
    }

    fn check_military(
        &self,
        profile: &UserProfile,
        eligibility: &ParsedEligibility,
    ) -> Option<RequirementMatch> {
        let requires_military = match eligibility.military_affiliation {
            Tri::Unknown => return None,
            Tri::Yes => true,
            Tri::No => false,
        };
        let requirement = "Military affiliation".to_string();
        let required_value = Some(
            if requires_military { "Required" } else { "Not required" }.to_string(),
        );

        let user_military = profile
            .affiliations
            .military_affiliation
            .as_deref()
            .filter(|s| !s.is_empty());
        let user_veteran = profile.demographics.veteran;
        let has_military = user_military.is_some() || user_veteran == Tri::Yes;

        if user_military.is_none() && user_veteran == Tri::Unknown {
            return Some(RequirementMatch {
                requirement,
                status: MatchStatus::Unknown,
                user_value: Some("Not specified".to_string()),
                required_value,
                is_hard: false,
            });
        }

        let status = if !requires_military || has_military {
            MatchStatus::Matched
        } else {
            MatchStatus::Unmatched
        };

        let user_value = user_military
            .map(str::to_string)
            .unwrap_or_else(|| {
                if user_veteran == Tri::Yes { "Veteran" } else { "No" }.to_string()
            });

        Some(RequirementMatch {
            requirement,
            status,
            user_value: Some(user_value),
            required_value,
            is_hard: false,
        })
    }
}
