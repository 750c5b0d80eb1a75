use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Three-valued boolean for requirements and profile flags.
///
/// Several matching rules need to distinguish "known false" from
/// "never answered", so this is not an `Option<bool>` collapsed by
/// convention. On the wire it is `true` / `false` / `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum Tri {
    Yes,
    No,
    #[default]
    Unknown,
}

impl Tri {
    pub fn is_known(self) -> bool {
        self != Tri::Unknown
    }
}

impl From<Option<bool>> for Tri {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Tri::Yes,
            Some(false) => Tri::No,
            None => Tri::Unknown,
        }
    }
}

impl From<Tri> for Option<bool> {
    fn from(value: Tri) -> Self {
        match value {
            Tri::Yes => Some(true),
            Tri::No => Some(false),
            Tri::Unknown => None,
        }
    }
}

/// One scholarship listing as it flows through the pipeline.
///
/// Scrapers fill the raw string fields; the normalizer fills the typed
/// `deadline` and `amount_min`/`amount_max` fields; the external
/// extraction service fills `parsed_eligibility`; the deduplicator sets
/// `is_duplicate`/`duplicate_of`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScholarshipRecord {
    /// Source-assigned identifier. Unique within one source only.
    pub id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub source: String,
    /// Original amount text, kept for reference after normalization.
    pub amount_raw: Option<String>,
    /// Minimum award in cents. Never negative.
    pub amount_min: Option<i64>,
    /// Maximum award in cents. Never negative.
    pub amount_max: Option<i64>,
    /// Original deadline text, kept for reference after normalization.
    pub deadline_raw: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub application_url: Option<String>,
    /// Free-text eligibility prose from the source page.
    pub raw_eligibility: Option<String>,
    /// Structured requirements produced by the external extraction
    /// service. Read-only input as far as the pipeline is concerned.
    pub parsed_eligibility: Option<ParsedEligibility>,
    /// Application effort estimate, 1-10 (10 = most effort). Supplied
    /// upstream; the scorer defaults to mid-scale when absent.
    pub effort_score: Option<i32>,
    /// Competition estimate, 1-10 (10 = most competitive).
    pub competition_score: Option<i32>,
    pub is_duplicate: bool,
    pub duplicate_of: Option<String>,
}

impl ScholarshipRecord {
    /// Identifier used when pointing other records at this one: the
    /// source-assigned id when present, the title otherwise.
    pub fn identity(&self) -> String {
        self.id.clone().unwrap_or_else(|| self.title.clone())
    }
}

/// Structured eligibility requirements for one scholarship.
///
/// All list fields are order-insensitive sets of free-form strings as the
/// extraction service emits them ("US Citizen", "First-generation", ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedEligibility {
    /// Minimum GPA on a 4.0 scale.
    pub min_gpa: Option<f64>,
    pub majors: Vec<String>,
    pub degree_levels: Vec<String>,
    pub year_in_school: Vec<String>,
    pub citizenship: Vec<String>,
    pub demographics: Vec<String>,
    pub states: Vec<String>,
    pub organizations: Vec<String>,
    pub financial_need: Tri,
    pub military_affiliation: Tri,
    pub disabilities: Tri,
}

impl ParsedEligibility {
    /// Number of populated fields, used by the completeness score.
    pub fn populated_field_count(&self) -> usize {
        let mut count = 0;
        if self.min_gpa.is_some() {
            count += 1;
        }
        for list in [
            &self.majors,
            &self.degree_levels,
            &self.year_in_school,
            &self.citizenship,
            &self.demographics,
            &self.states,
            &self.organizations,
        ] {
            if !list.is_empty() {
                count += 1;
            }
        }
        for tri in [self.financial_need, self.military_affiliation, self.disabilities] {
            if tri.is_known() {
                count += 1;
            }
        }
        count
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitizenshipStatus {
    UsCitizen,
    PermanentResident,
    International,
    Daca,
    Refugee,
    Other,
}

impl CitizenshipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CitizenshipStatus::UsCitizen => "us_citizen",
            CitizenshipStatus::PermanentResident => "permanent_resident",
            CitizenshipStatus::International => "international",
            CitizenshipStatus::Daca => "daca",
            CitizenshipStatus::Refugee => "refugee",
            CitizenshipStatus::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegreeLevel {
    HighSchool,
    Undergraduate,
    Graduate,
    Doctoral,
    Professional,
}

impl DegreeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DegreeLevel::HighSchool => "high_school",
            DegreeLevel::Undergraduate => "undergraduate",
            DegreeLevel::Graduate => "graduate",
            DegreeLevel::Doctoral => "doctoral",
            DegreeLevel::Professional => "professional",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearInSchool {
    Freshman,
    Sophomore,
    Junior,
    Senior,
    FifthYear,
    Graduate1,
    Graduate2,
    Graduate3Plus,
}

impl YearInSchool {
    pub fn as_str(&self) -> &'static str {
        match self {
            YearInSchool::Freshman => "freshman",
            YearInSchool::Sophomore => "sophomore",
            YearInSchool::Junior => "junior",
            YearInSchool::Senior => "senior",
            YearInSchool::FifthYear => "fifth_year",
            YearInSchool::Graduate1 => "graduate_1",
            YearInSchool::Graduate2 => "graduate_2",
            YearInSchool::Graduate3Plus => "graduate_3_plus",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    NonBinary,
    Other,
    PreferNotToSay,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::NonBinary => "non_binary",
            Gender::Other => "other",
            Gender::PreferNotToSay => "prefer_not_to_say",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AcademicInfo {
    /// GPA on a 4.0 scale.
    pub gpa: Option<f64>,
    pub major: Option<String>,
    pub minor: Option<String>,
    pub degree_level: Option<DegreeLevel>,
    pub year_in_school: Option<YearInSchool>,
    pub institution: Option<String>,
    pub institution_type: Option<String>,
    pub expected_graduation: Option<NaiveDate>,
    pub enrolled: Tri,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationInfo {
    pub country_of_origin: Option<String>,
    pub country_of_residence: Option<String>,
    /// US state if applicable.
    pub state: Option<String>,
    pub city: Option<String>,
    pub citizenship_status: Option<CitizenshipStatus>,
    pub destination_country: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DemographicInfo {
    pub gender: Option<Gender>,
    /// Ethnicity/race, can be multiple.
    pub ethnicity: Vec<String>,
    pub first_generation: Tri,
    pub age: Option<u32>,
    pub veteran: Tri,
    pub disability: Tri,
    pub lgbtq: Tri,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialInfo {
    /// Income bracket: under_30k, 30k_60k, 60k_100k, 100k_150k, over_150k.
    pub household_income: Option<String>,
    pub financial_need: Tri,
    pub fafsa_efc: Option<i64>,
    pub pell_eligible: Tri,
    pub employed: Tri,
    pub work_study: Tri,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InterestsInfo {
    pub career_goals: Vec<String>,
    pub hobbies: Vec<String>,
    pub activities: Vec<String>,
    pub volunteer_work: Vec<String>,
    pub leadership_roles: Vec<String>,
    pub sports: Vec<String>,
    pub arts: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AffiliationsInfo {
    pub organizations: Vec<String>,
    pub clubs: Vec<String>,
    pub religious_affiliation: Option<String>,
    /// Military branch/status if applicable.
    pub military_affiliation: Option<String>,
    pub union_membership: Option<String>,
    pub employer: Option<String>,
}

/// Complete user eligibility profile.
///
/// Any field may be absent. Absent means unknown, never "no" -- the
/// matcher reports unknown data as `Unknown`, not as a failed check.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub academic: AcademicInfo,
    pub location: LocationInfo,
    pub demographics: DemographicInfo,
    pub financial: FinancialInfo,
    pub interests: InterestsInfo,
    pub affiliations: AffiliationsInfo,
}

/// Indices of records judged to refer to the same underlying award.
/// Always sorted, always more than one member.
pub type DuplicateGroup = Vec<usize>;
