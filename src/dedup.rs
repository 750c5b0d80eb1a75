//! Cross-Source Deduplication Module
//!
//! Detects scholarship listings that describe the same underlying award
//! on different sources, groups them, and keeps the most complete copy
//! as the canonical record.

use crate::types::{DuplicateGroup, ScholarshipRecord};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet, VecDeque};

/// Above this many records the all-pairs fuzzy pass is skipped and only
/// exact fingerprint buckets are compared. Near-duplicates with
/// differently-worded titles can slip through on very large batches;
/// accepted trade-off to keep the pass quadratic only on small inputs.
const FUZZY_MATCH_CAP: usize = 1000;

/// Minimum shorter/longer title length ratio for a fuzzy comparison.
/// Pairs below it cannot reach the similarity threshold anyway.
const LENGTH_RATIO_FLOOR: f64 = 0.5;

pub struct Deduplicator {
    similarity_threshold: f64,
}

impl Default for Deduplicator {
    fn default() -> Self {
        Deduplicator {
            similarity_threshold: 0.85,
        }
    }
}

impl Deduplicator {
    pub fn new(similarity_threshold: f64) -> Self {
        Deduplicator {
            similarity_threshold,
        }
    }

    /// Normalize a title for comparison: lowercase, strip generic suffix
    /// tokens ("scholarship", "award", ...) until none remain, strip
    /// punctuation, collapse whitespace.
    pub fn normalize_title(title: &str) -> String {
        let mut normalized = title.to_lowercase().trim().to_string();

        // Strip suffix tokens repeatedly so "x scholarship award" and
        // "x scholarship" reach the same normal form
        loop {
            let mut stripped = false;
            for suffix in crate::tables::TITLE_SUFFIXES {
                if let Some(rest) = normalized.strip_suffix(&format!(" {}", suffix)) {
                    normalized = rest.trim_end().to_string();
                    stripped = true;
                }
            }
            if !stripped {
                break;
            }
        }

        if let Ok(re) = Regex::new(r"[^\w\s]") {
            normalized = re.replace_all(&normalized, "").into_owned();
        }

        normalized.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Short fingerprint of the normalized title for O(1) exact-bucket
    /// grouping.
    pub fn title_fingerprint(title: &str) -> String {
        let normalized = Self::normalize_title(title);
        let mut hasher = Sha256::new();
        hasher.update(normalized.as_bytes());
        format!("{:x}", hasher.finalize())[..12].to_string()
    }

    /// Similarity ratio between two titles (0.0-1.0). Exact match after
    /// normalization scores 1.0 without running the edit-distance pass.
    pub fn title_similarity(title1: &str, title2: &str) -> f64 {
        let norm1 = Self::normalize_title(title1);
        let norm2 = Self::normalize_title(title2);

        if norm1.is_empty() || norm2.is_empty() {
            return 0.0;
        }
        if norm1 == norm2 {
            return 1.0;
        }

        strsim::normalized_levenshtein(&norm1, &norm2)
    }

    /// Heuristic measure of how much usable data a record carries.
    /// Decides which member of a duplicate group survives as canonical.
    pub fn completeness_score(record: &ScholarshipRecord) -> i64 {
        let mut score: i64 = 0;

        score += string_points(&record.title);
        if let Some(description) = &record.description {
            score += string_points(description);
        }
        if record.amount_min.is_some() {
            score += 1;
        }
        if record.amount_max.is_some() {
            score += 1;
        }
        if record.deadline.is_some() {
            score += 1;
        }
        if let Some(url) = &record.application_url {
            score += string_points(url);
        }
        if let Some(raw) = &record.raw_eligibility {
            score += string_points(raw);
        }
        if let Some(parsed) = &record.parsed_eligibility {
            score += 2 * parsed.populated_field_count() as i64;
        }

        // Bonuses for the fields that matter most downstream
        if record.parsed_eligibility.is_some() {
            score += 10;
        }
        if record.deadline.is_some() {
            score += 5;
        }
        if record.amount_min.is_some() || record.amount_max.is_some() {
            score += 5;
        }

        score
    }

    /// Find duplicate pairs as (index, index, similarity) triples.
    ///
    /// Exact-fingerprint buckets are always compared. For inputs up to
    /// [`FUZZY_MATCH_CAP`] records an all-pairs fuzzy pass also runs
    /// across bucket boundaries, pruned by the title length ratio.
    pub fn find_duplicates(
        &self,
        records: &[ScholarshipRecord],
    ) -> Vec<(usize, usize, f64)> {
        let n = records.len();
        let mut duplicates: Vec<(usize, usize, f64)> = Vec::new();

        let mut fingerprints: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, record) in records.iter().enumerate() {
            fingerprints
                .entry(Self::title_fingerprint(&record.title))
                .or_default()
                .push(i);
        }

        for indices in fingerprints.values() {
            if indices.len() < 2 {
                continue;
            }
            for a in 0..indices.len() {
                for b in (a + 1)..indices.len() {
                    let (i, j) = (indices[a], indices[b]);
                    let sim = Self::title_similarity(&records[i].title, &records[j].title);
                    if sim >= self.similarity_threshold {
                        duplicates.push((i, j, sim));
                    }
                }
            }
        }

        if n <= FUZZY_MATCH_CAP {
            let mut checked: HashSet<(usize, usize)> = HashSet::new();
            for (i, j, _) in &duplicates {
                checked.insert((*i, *j));
            }

            for i in 0..n {
                for j in (i + 1)..n {
                    if checked.contains(&(i, j)) {
                        continue;
                    }

                    let title1 = &records[i].title;
                    let title2 = &records[j].title;

                    // Very different lengths cannot clear the threshold
                    if !title1.is_empty() && !title2.is_empty() {
                        let len1 = title1.chars().count();
                        let len2 = title2.chars().count();
                        let ratio = len1.min(len2) as f64 / len1.max(len2) as f64;
                        if ratio < LENGTH_RATIO_FLOOR {
                            continue;
                        }
                    }

                    let sim = Self::title_similarity(title1, title2);
                    if sim >= self.similarity_threshold {
                        duplicates.push((i, j, sim));
                    }
                }
            }
        }

        log::info!(
            "Found {} duplicate pairs among {} scholarships",
            duplicates.len(),
            n
        );
        duplicates
    }

    /// Deduplicate records, keeping the most complete copy per group as
    /// canonical. With `mark_only` every record is returned with
    /// `is_duplicate`/`duplicate_of` set; otherwise non-canonical
    /// members are dropped.
    pub fn deduplicate(
        &self,
        records: &[ScholarshipRecord],
        mark_only: bool,
    ) -> Vec<ScholarshipRecord> {
        if records.is_empty() {
            return Vec::new();
        }

        let completeness: Vec<i64> =
            records.iter().map(Deduplicator::completeness_score).collect();
        let duplicate_pairs = self.find_duplicates(records);

        let mut dsu = UnionFind::new(records.len());
        for (i, j, _) in &duplicate_pairs {
            dsu.union(*i, *j, &completeness);
        }

        let mut result = Vec::new();
        for (i, record) in records.iter().enumerate() {
            let mut marked = record.clone();
            let root = dsu.find(i);

            if root != i {
                marked.is_duplicate = true;
                marked.duplicate_of = Some(records[root].identity());
            } else {
                marked.is_duplicate = false;
                marked.duplicate_of = None;
            }

            if mark_only || !marked.is_duplicate {
                result.push(marked);
            }
        }

        let unique = result.iter().filter(|r| !r.is_duplicate).count();
        log::info!(
            "Deduplication: {} unique, {} duplicates marked",
            unique,
            result.len() - unique
        );
        result
    }

    /// Duplicate groups as sorted index lists, one per connected
    /// component of the pairwise duplicate graph with more than one
    /// member. Groups partition the input: no index appears twice.
    pub fn duplicate_groups(&self, records: &[ScholarshipRecord]) -> Vec<DuplicateGroup> {
        let duplicate_pairs = self.find_duplicates(records);

        let mut adjacency: HashMap<usize, HashSet<usize>> = HashMap::new();
        for (i, j, _) in &duplicate_pairs {
            adjacency.entry(*i).or_default().insert(*j);
            adjacency.entry(*j).or_default().insert(*i);
        }

        let mut visited: HashSet<usize> = HashSet::new();
        let mut groups: Vec<DuplicateGroup> = Vec::new();

        for start in 0..records.len() {
            if visited.contains(&start) {
                continue;
            }

            let mut group = Vec::new();
            let mut queue = VecDeque::from([start]);
            while let Some(node) = queue.pop_front() {
                if !visited.insert(node) {
                    continue;
                }
                group.push(node);
                if let Some(neighbors) = adjacency.get(&node) {
                    for &neighbor in neighbors {
                        if !visited.contains(&neighbor) {
                            queue.push_back(neighbor);
                        }
                    }
                }
            }

            if group.len() > 1 {
                group.sort_unstable();
                groups.push(group);
            }
        }

        groups
    }
}

fn string_points(s: &str) -> i64 {
    if s.is_empty() {
        return 0;
    }
    (s.chars().count().min(500) / 50) as i64 + 1
}

/// Array-backed disjoint set with path compression. Union keeps the
/// higher-completeness root as parent; ties keep the existing root.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        UnionFind {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    fn union(&mut self, x: usize, y: usize, completeness: &[i64]) {
        let rx = self.find(x);
        let ry = self.find(y);
        if rx == ry {
            return;
        }
        if completeness[rx] >= completeness[ry] {
            self.parent[ry] = rx;
        } else {
            self.parent[rx] = ry;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParsedEligibility;

    fn record(title: &str) -> ScholarshipRecord {
        ScholarshipRecord {
            title: title.to_string(),
            source: "test".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_title_strips_suffixes_and_punctuation() {
        assert_eq!(
            Deduplicator::normalize_title("Women in STEM Scholarship"),
            "women in stem"
        );
        assert_eq!(
            Deduplicator::normalize_title("women in stem scholarship award"),
            "women in stem"
        );
        assert_eq!(
            Deduplicator::normalize_title("The O'Brien Family   Fund"),
            "the obrien family"
        );
    }

    #[test]
    fn test_fingerprint_matches_for_same_award() {
        assert_eq!(
            Deduplicator::title_fingerprint("Women in STEM Scholarship"),
            Deduplicator::title_fingerprint("women in stem scholarship award")
        );
        assert_ne!(
            Deduplicator::title_fingerprint("Women in STEM Scholarship"),
            Deduplicator::title_fingerprint("Veterans Memorial Grant")
        );
    }

    #[test]
    fn test_title_similarity() {
        assert_eq!(
            Deduplicator::title_similarity("Acme Scholarship", "Acme Award"),
            1.0
        );
        assert_eq!(Deduplicator::title_similarity("", "Anything"), 0.0);
        let sim = Deduplicator::title_similarity(
            "Future Engineers Scholarship",
            "Future Engineer Scholarship",
        );
        assert!(sim > 0.9 && sim < 1.0);
    }

    #[test]
    fn test_completeness_prefers_richer_records() {
        let sparse = record("Women in STEM Scholarship");
        let mut rich = record("women in stem scholarship award");
        rich.description = Some("A long description of the award. ".repeat(10));
        rich.deadline = chrono::NaiveDate::from_ymd_opt(2026, 2, 15);
        rich.amount_max = Some(500_000);
        rich.parsed_eligibility = Some(ParsedEligibility {
            min_gpa: Some(3.0),
            majors: vec!["STEM".to_string()],
            ..Default::default()
        });

        assert!(
            Deduplicator::completeness_score(&rich)
                > Deduplicator::completeness_score(&sparse)
        );
    }

    #[test]
    fn test_deduplicate_marks_richer_record_canonical() {
        let sparse = record("Women in STEM Scholarship");
        let mut rich = record("women in stem scholarship award");
        rich.description = Some("Supports women pursuing STEM degrees.".to_string());
        rich.parsed_eligibility = Some(ParsedEligibility {
            majors: vec!["STEM".to_string()],
            ..Default::default()
        });

        let deduped = Deduplicator::default().deduplicate(&[sparse, rich], true);
        assert_eq!(deduped.len(), 2);
        assert!(deduped[0].is_duplicate);
        assert_eq!(
            deduped[0].duplicate_of.as_deref(),
            Some("women in stem scholarship award")
        );
        assert!(!deduped[1].is_duplicate);
        assert!(deduped[1].duplicate_of.is_none());
    }

    #[test]
    fn test_deduplicate_drop_mode_removes_duplicates() {
        let a = record("Acme Scholarship");
        let b = record("Acme Award");
        let c = record("Totally Different Grant");

        let kept = Deduplicator::default().deduplicate(&[a, b, c], false);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|r| !r.is_duplicate));
    }

    #[test]
    fn test_fuzzy_pass_crosses_fingerprint_buckets() {
        // Near-identical titles with one typo land in different buckets
        let a = record("Future Engineers of America Scholarship");
        let b = record("Future Enginers of America Scholarship");
        let pairs = Deduplicator::default().find_duplicates(&[a, b]);
        assert_eq!(pairs.len(), 1);
        assert!(pairs[0].2 >= 0.85);
    }

    #[test]
    fn test_length_ratio_prefilter_skips_mismatched_titles() {
        let a = record("Art Grant");
        let b = record("A Very Long And Specific Scholarship Title For Artists");
        let pairs = Deduplicator::default().find_duplicates(&[a, b]);
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_duplicate_groups_partition_input() {
        let records = vec![
            record("Women in STEM Scholarship"),
            record("women in stem scholarship award"),
            record("Veterans Memorial Grant"),
            record("Veterans Memorial Award"),
            record("Unrelated Fellowship"),
        ];

        let groups = Deduplicator::default().duplicate_groups(&records);
        assert_eq!(groups.len(), 2);
        for group in &groups {
            assert!(group.len() > 1);
            let mut sorted = group.clone();
            sorted.sort_unstable();
            assert_eq!(*group, sorted);
        }

        let mut seen = HashSet::new();
        for group in &groups {
            for idx in group {
                assert!(seen.insert(*idx), "index {} in two groups", idx);
            }
        }
        assert!(!seen.contains(&4));
    }

    #[test]
    fn test_empty_titles_stay_singletons() {
        let records = vec![record(""), record(""), record("Real Scholarship")];
        let pairs = Deduplicator::default().find_duplicates(&records);
        assert!(pairs.is_empty());

        let deduped = Deduplicator::default().deduplicate(&records, true);
        assert!(deduped.iter().all(|r| !r.is_duplicate));
    }

    #[test]
    fn test_empty_input() {
        let dedup = Deduplicator::default();
        assert!(dedup.deduplicate(&[], true).is_empty());
        assert!(dedup.duplicate_groups(&[]).is_empty());
    }
}
