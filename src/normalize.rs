//! Record Normalization Module
//!
//! Standardizes raw scraped fields (dates, money amounts, source names)
//! into canonical types so records from independent sources can be
//! compared and matched. Every parser here recovers locally: garbage in
//! means `None` out, never an error up the stack.

use crate::tables::SOURCE_ALIASES;
use crate::types::ScholarshipRecord;
use chrono::NaiveDate;
use regex::Regex;

/// Date formats seen across sources, tried in order.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",  // ISO
    "%m/%d/%Y",  // US
    "%m/%d/%y",  // US short year
    "%B %d, %Y", // January 15, 2026
    "%B %d %Y",  // January 15 2026
    "%b %d, %Y", // Jan 15, 2026
    "%b %d %Y",  // Jan 15 2026
    "%d %B %Y",  // 15 January 2026
    "%d %b %Y",  // 15 Jan 2026
    "%Y/%m/%d",  // ISO with slashes
    "%m-%d-%Y",  // US with dashes
];

/// Parse a date string in any common source format.
///
/// Ordinal suffixes are stripped first ("February 15th" -> "February 15"),
/// then each explicit format is tried; as a last resort a month-name +
/// day + 4-digit year is extracted from anywhere in the string. Returns
/// `None` on total failure, never an error.
pub fn normalize_date(date_str: &str) -> Option<NaiveDate> {
    let date_str = date_str.trim();
    if date_str.is_empty() {
        return None;
    }

    // Remove ordinal suffixes: "1st" -> "1", "22nd" -> "22"
    let cleaned = match Regex::new(r"(\d+)(st|nd|rd|th)") {
        Ok(re) => re.replace_all(date_str, "$1").into_owned(),
        Err(_) => date_str.to_string(),
    };

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&cleaned, fmt) {
            return Some(date);
        }
    }

    // Fallback: pull "Month D, YYYY" out of surrounding text
    if let Ok(re) = Regex::new(r"(?i)([a-z]+)\s+(\d{1,2}),?\s+(\d{4})") {
        if let Some(caps) = re.captures(&cleaned) {
            let month = month_from_name(&caps[1]);
            let day: Option<u32> = caps[2].parse().ok();
            let year: Option<i32> = caps[3].parse().ok();
            if let (Some(month), Some(day), Some(year)) = (month, day, year) {
                if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                    return Some(date);
                }
            }
        }
    }

    log::warn!("Could not parse date: {}", date_str);
    None
}

fn month_from_name(name: &str) -> Option<u32> {
    match name.to_lowercase().as_str() {
        "january" | "jan" => Some(1),
        "february" | "feb" => Some(2),
        "march" | "mar" => Some(3),
        "april" | "apr" => Some(4),
        "may" => Some(5),
        "june" | "jun" => Some(6),
        "july" | "jul" => Some(7),
        "august" | "aug" => Some(8),
        "september" | "sep" => Some(9),
        "october" | "oct" => Some(10),
        "november" | "nov" => Some(11),
        "december" | "dec" => Some(12),
        _ => None,
    }
}

/// Parse an amount string to (min, max) in cents.
///
/// Handles "$5,000", "$1,000 - $5,000", "Up to $10,000", "Varies",
/// "$500/month". A single amount maps to (amount, amount) unless the
/// string carries an "up to"/"maximum" qualifier, which maps to
/// (None, amount). Unparseable input yields (None, None), not an error.
pub fn normalize_amount(amount_str: &str) -> (Option<i64>, Option<i64>) {
    let amount_str = amount_str.trim().to_lowercase();
    if amount_str.is_empty() {
        return (None, None);
    }

    if amount_str.contains("varies") || amount_str.contains("variable") {
        return (None, None);
    }

    // Prefer $-prefixed amounts; fall back to bare numbers
    let mut amounts: Vec<String> = Vec::new();
    if let Ok(re) = Regex::new(r"\$[\d,]+(?:\.\d{2})?") {
        amounts = re
            .find_iter(&amount_str)
            .map(|m| m.as_str().to_string())
            .collect();
    }
    if amounts.is_empty() {
        if let Ok(re) = Regex::new(r"[\d,]+(?:\.\d{2})?") {
            amounts = re
                .find_iter(&amount_str)
                .map(|m| m.as_str().to_string())
                .collect();
        }
    }

    let mut parsed: Vec<i64> = Vec::new();
    for amt in &amounts {
        let clean = amt.replace('$', "").replace(',', "");
        if let Ok(dollars) = clean.parse::<f64>() {
            let cents = dollars * 100.0;
            // Skip values that cannot be represented as cents
            if cents.is_finite() && cents >= 0.0 && cents <= i64::MAX as f64 {
                parsed.push(cents.round() as i64);
            }
        }
    }

    if parsed.is_empty() {
        return (None, None);
    }

    if parsed.len() == 1 {
        let amount = parsed[0];
        if amount_str.contains("up to") || amount_str.contains("maximum") {
            return (None, Some(amount));
        }
        return (Some(amount), Some(amount));
    }

    let min = *parsed.iter().min().unwrap_or(&0);
    let max = *parsed.iter().max().unwrap_or(&0);
    (Some(min), Some(max))
}

/// Canonicalize a source name: known aliases map to one lowercase slug,
/// unknown sources are lowercased verbatim.
pub fn normalize_source_name(source: &str) -> String {
    for (alias, canonical) in SOURCE_ALIASES {
        if *alias == source {
            return (*canonical).to_string();
        }
    }
    source.to_lowercase()
}

/// Normalize a single scholarship record (copy-on-write).
///
/// Fills the typed `deadline` and `amount_min`/`amount_max` fields from
/// their raw counterparts, canonicalizes the source, trims the title and
/// upgrades protocol-relative URLs to HTTPS. Idempotent: running it on
/// an already-normalized record is a no-op.
pub fn normalize_scholarship(record: &ScholarshipRecord) -> ScholarshipRecord {
    let mut normalized = record.clone();

    normalized.source = normalize_source_name(&record.source);

    if let Some(deadline_raw) = &record.deadline_raw {
        normalized.deadline = normalize_date(deadline_raw);
    }

    if let Some(amount_raw) = &record.amount_raw {
        let (min, max) = normalize_amount(amount_raw);
        normalized.amount_min = min;
        normalized.amount_max = max;
    }

    normalized.title = record.title.trim().to_string();

    if let Some(url) = &record.application_url {
        if url.starts_with("//") {
            normalized.application_url = Some(format!("https:{}", url));
        }
    }

    normalized
}

/// Normalize a batch of records. One record's bad fields never affect
/// the rest of the batch; each parse failure degrades to `None` on that
/// field alone.
pub fn normalize_batch(records: &[ScholarshipRecord]) -> Vec<ScholarshipRecord> {
    let normalized: Vec<ScholarshipRecord> =
        records.iter().map(normalize_scholarship).collect();
    log::info!("Normalized {} scholarships", normalized.len());
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_normalize_date_iso() {
        assert_eq!(normalize_date("2026-02-15"), Some(date(2026, 2, 15)));
    }

    #[test]
    fn test_normalize_date_us_formats() {
        assert_eq!(normalize_date("02/15/2026"), Some(date(2026, 2, 15)));
        assert_eq!(normalize_date("02-15-2026"), Some(date(2026, 2, 15)));
    }

    #[test]
    fn test_normalize_date_month_names() {
        assert_eq!(normalize_date("February 15, 2026"), Some(date(2026, 2, 15)));
        assert_eq!(normalize_date("Feb 15 2026"), Some(date(2026, 2, 15)));
        assert_eq!(normalize_date("15 Feb 2026"), Some(date(2026, 2, 15)));
        assert_eq!(normalize_date("15 February 2026"), Some(date(2026, 2, 15)));
    }

    #[test]
    fn test_normalize_date_ordinal_suffix() {
        assert_eq!(
            normalize_date("February 15th, 2026"),
            Some(date(2026, 2, 15))
        );
        assert_eq!(normalize_date("June 1st, 2026"), Some(date(2026, 6, 1)));
        assert_eq!(normalize_date("May 3rd 2026"), Some(date(2026, 5, 3)));
    }

    #[test]
    fn test_normalize_date_embedded_in_text() {
        assert_eq!(
            normalize_date("Deadline: March 31, 2026 (midnight)"),
            Some(date(2026, 3, 31))
        );
    }

    #[test]
    fn test_normalize_date_garbage() {
        assert_eq!(normalize_date("rolling basis"), None);
        assert_eq!(normalize_date(""), None);
        assert_eq!(normalize_date("Check website"), None);
    }

    #[test]
    fn test_normalize_amount_range() {
        assert_eq!(
            normalize_amount("$1,000 - $5,000"),
            (Some(100_000), Some(500_000))
        );
    }

    #[test]
    fn test_normalize_amount_up_to() {
        assert_eq!(normalize_amount("Up to $10,000"), (None, Some(1_000_000)));
        assert_eq!(normalize_amount("Maximum $2,500"), (None, Some(250_000)));
    }

    #[test]
    fn test_normalize_amount_single() {
        assert_eq!(normalize_amount("$5,000"), (Some(500_000), Some(500_000)));
        assert_eq!(normalize_amount("2500"), (Some(250_000), Some(250_000)));
    }

    #[test]
    fn test_normalize_amount_varies() {
        assert_eq!(normalize_amount("Varies"), (None, None));
        assert_eq!(normalize_amount("Amount is variable"), (None, None));
    }

    #[test]
    fn test_normalize_amount_decimal_cents() {
        assert_eq!(
            normalize_amount("$1,234.56"),
            (Some(123_456), Some(123_456))
        );
    }

    #[test]
    fn test_normalize_amount_garbage() {
        assert_eq!(normalize_amount("full tuition"), (None, None));
        assert_eq!(normalize_amount(""), (None, None));
    }

    #[test]
    fn test_normalize_source_name() {
        assert_eq!(normalize_source_name("CareerOneStop"), "careeronestop");
        assert_eq!(
            normalize_source_name("intl_scholarships"),
            "internationalscholarships.com"
        );
        // Unknown sources are lowercased verbatim
        assert_eq!(normalize_source_name("SomeNewSite"), "somenewsite");
    }

    fn raw_record() -> ScholarshipRecord {
        ScholarshipRecord {
            title: "  Women in STEM Scholarship  ".to_string(),
            source: "CareerOneStop".to_string(),
            amount_raw: Some("$1,000 - $5,000".to_string()),
            deadline_raw: Some("February 15th, 2026".to_string()),
            application_url: Some("//example.org/apply".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_scholarship() {
        let normalized = normalize_scholarship(&raw_record());
        assert_eq!(normalized.title, "Women in STEM Scholarship");
        assert_eq!(normalized.source, "careeronestop");
        assert_eq!(normalized.amount_min, Some(100_000));
        assert_eq!(normalized.amount_max, Some(500_000));
        assert_eq!(normalized.deadline, Some(date(2026, 2, 15)));
        assert_eq!(
            normalized.application_url.as_deref(),
            Some("https://example.org/apply")
        );
    }

    #[test]
    fn test_normalize_scholarship_is_idempotent() {
        let once = normalize_scholarship(&raw_record());
        let twice = normalize_scholarship(&once);
        assert_eq!(
            serde_json::to_value(&once).unwrap(),
            serde_json::to_value(&twice).unwrap()
        );
    }

    #[test]
    fn test_normalize_batch_keeps_unparseable_records() {
        let records = vec![
            raw_record(),
            ScholarshipRecord {
                title: "Mystery Grant".to_string(),
                source: "unknown".to_string(),
                amount_raw: Some("see website".to_string()),
                deadline_raw: Some("rolling".to_string()),
                ..Default::default()
            },
        ];
        let normalized = normalize_batch(&records);
        assert_eq!(normalized.len(), 2);
        // Bad fields degrade to None; the record itself survives
        assert_eq!(normalized[1].amount_min, None);
        assert_eq!(normalized[1].deadline, None);
        assert_eq!(normalized[1].amount_raw.as_deref(), Some("see website"));
    }
}
