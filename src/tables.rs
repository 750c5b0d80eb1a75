//! Static lookup tables for normalization and matching heuristics.
//!
//! Kept in one place, as data, so the tables can be reviewed and tested
//! directly instead of being buried in matching logic.

use crate::types::CitizenshipStatus;

/// Known source aliases mapped to one canonical lowercase slug.
pub const SOURCE_ALIASES: &[(&str, &str)] = &[
    ("scholarships_com", "scholarships.com"),
    ("scholarships.com", "scholarships.com"),
    ("fastweb", "fastweb"),
    ("careeronestop", "careeronestop"),
    ("CareerOneStop", "careeronestop"),
    ("iefa", "iefa"),
    ("IEFA", "iefa"),
    ("intl_scholarships_com", "internationalscholarships.com"),
    ("intl_scholarships", "internationalscholarships.com"),
    ("internationalscholarships.com", "internationalscholarships.com"),
    ("scholars4dev", "scholars4dev"),
];

/// Generic suffix tokens stripped from titles before comparison.
/// "Women in STEM Scholarship" and "Women in STEM Award" describe the
/// same thing; the suffix carries no identity.
pub const TITLE_SUFFIXES: &[&str] = &[
    "scholarship",
    "scholarships",
    "grant",
    "grants",
    "award",
    "awards",
    "fellowship",
    "fellowships",
    "program",
    "fund",
    "foundation",
];

/// Strings that satisfy each citizenship status when they overlap a
/// scholarship's accepted-citizenship list.
pub fn citizenship_synonyms(status: CitizenshipStatus) -> &'static [&'static str] {
    match status {
        CitizenshipStatus::UsCitizen => &["US Citizen", "US Citizens", "American", "Citizen"],
        CitizenshipStatus::PermanentResident => &["Permanent Resident", "Green Card", "LPR"],
        CitizenshipStatus::International => &["International", "International Student", "Foreign"],
        CitizenshipStatus::Daca => &["DACA", "Dreamer"],
        CitizenshipStatus::Refugee => &["Refugee", "Asylee"],
        CitizenshipStatus::Other => &[],
    }
}

/// Majors counted as part of a broad STEM requirement.
pub const STEM_FIELDS: &[&str] = &[
    "computer",
    "engineering",
    "math",
    "science",
    "physics",
    "chemistry",
    "biology",
    "data",
];

/// Majors counted as part of a broad business requirement.
pub const BUSINESS_FIELDS: &[&str] = &[
    "business",
    "finance",
    "accounting",
    "economics",
    "marketing",
];

/// Majors counted as part of a broad arts/humanities requirement.
pub const ARTS_FIELDS: &[&str] = &[
    "art", "music", "theater", "film", "design", "creative",
];

/// Requirement spellings that select each related-field group.
pub const STEM_REQUIREMENTS: &[&str] =
    &["stem", "science", "technology", "engineering", "mathematics"];
pub const BUSINESS_REQUIREMENTS: &[&str] = &["business", "commerce"];
pub const ARTS_REQUIREMENTS: &[&str] = &["arts", "humanities"];

/// Whether a user's major falls inside a broad required field, e.g.
/// "Computer Science" inside "STEM". Both arguments must be lowercase.
pub fn is_related_field(user_major: &str, required: &str) -> bool {
    if STEM_REQUIREMENTS.contains(&required) {
        return STEM_FIELDS.iter().any(|f| user_major.contains(f));
    }
    if BUSINESS_REQUIREMENTS.contains(&required) {
        return BUSINESS_FIELDS.iter().any(|f| user_major.contains(f));
    }
    if ARTS_REQUIREMENTS.contains(&required) {
        return ARTS_FIELDS.iter().any(|f| user_major.contains(f));
    }
    false
}
