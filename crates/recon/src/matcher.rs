use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info};

use crate::config::Thresholds;
use crate::model::{CompetitionRecord, MatchMethod, MatchResult, RegistryRecord, SchoolKey};
use crate::registry::Registry;
use crate::school_mapping::{SchoolMapping, SchoolTarget};
use crate::score::{NameScorer, TokenSetRatio};

/// Resolves (school, city) pairs against the registry.
///
/// Borrows the registry and manual mapping read-only; every pair is
/// decided independently of the others.
pub struct Matcher<'a, S = TokenSetRatio> {
    registry: &'a Registry,
    manual: &'a SchoolMapping,
    thresholds: Thresholds,
    scorer: S,
}

impl<'a> Matcher<'a> {
    pub fn new(registry: &'a Registry, manual: &'a SchoolMapping, thresholds: Thresholds) -> Self {
        Self {
            registry,
            manual,
            thresholds,
            scorer: TokenSetRatio,
        }
    }
}

impl<'a, S: NameScorer> Matcher<'a, S> {
    /// Replace the name scorer.
    pub fn with_scorer<T: NameScorer>(self, scorer: T) -> Matcher<'a, T> {
        Matcher {
            registry: self.registry,
            manual: self.manual,
            thresholds: self.thresholds,
            scorer,
        }
    }

    /// Decide one pair: manual override, then city-filtered fuzzy match.
    pub fn match_school(&self, school_name: &str, city: &str) -> MatchResult {
        let key = SchoolKey::new(school_name, city);

        if let Some(entry) = self.manual.get(school_name, city) {
            return match &entry.target {
                SchoolTarget::Drop => MatchResult::new(
                    &key,
                    MatchMethod::ManualDrop,
                    None,
                    None,
                    entry.comment.clone(),
                ),
                SchoolTarget::Registry(target) => match self.registry.find_by_name(target) {
                    Some(record) => MatchResult::new(
                        &key,
                        MatchMethod::Manual,
                        Some(record),
                        None,
                        entry.comment.clone(),
                    ),
                    None => MatchResult::new(
                        &key,
                        MatchMethod::NoMatch,
                        None,
                        None,
                        format!("Manual mapping target '{target}' not found in registry"),
                    ),
                },
            };
        }

        let Some((best, score)) = self.best_candidate(school_name, city) else {
            return MatchResult::new(
                &key,
                MatchMethod::NoMatch,
                None,
                None,
                format!("No schools found in city '{city}'"),
            );
        };

        let t = &self.thresholds;
        if score >= t.high {
            MatchResult::new(&key, MatchMethod::AutoHigh, Some(best), Some(score), "")
        } else if score >= t.medium {
            MatchResult::new(&key, MatchMethod::AutoMedium, Some(best), Some(score), "")
        } else {
            MatchResult::new(
                &key,
                MatchMethod::Dropped,
                Some(best),
                Some(score),
                format!(
                    "Best score {score:.1} below medium confidence threshold {}",
                    t.medium
                ),
            )
        }
    }

    /// Highest-scoring registry row in the city. The first row wins ties, so
    /// a city whose candidates all score zero still yields its first row.
    fn best_candidate(&self, school_name: &str, city: &str) -> Option<(&'a RegistryRecord, f64)> {
        // Candidates borrow the registry for 'a, not `self`
        let registry: &'a Registry = self.registry;
        let mut best: Option<(&'a RegistryRecord, f64)> = None;

        for candidate in registry.candidates_in(city) {
            let score = self.candidate_score(school_name, candidate);
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((candidate, score));
            }
        }

        if let Some((record, score)) = best {
            debug!("{school_name} ({city}) -> {} [{score:.1}]", record.institution_name);
        }
        best
    }

    fn candidate_score(&self, school_name: &str, candidate: &RegistryRecord) -> f64 {
        let by_name = self.scorer.score(school_name, &candidate.institution_name);
        match &candidate.facility_name {
            Some(facility) => by_name.max(self.scorer.score(school_name, facility)),
            None => by_name,
        }
    }

    /// One result per distinct (school, city), in first-seen order.
    pub fn match_all_schools(&self, records: &[CompetitionRecord]) -> Vec<MatchResult> {
        let mut seen = HashSet::new();
        let mut results = Vec::new();

        for record in records {
            let key = record.key();
            if !seen.insert(key) {
                continue;
            }
            results.push(self.match_school(&record.school_name, &record.city));
        }

        log_method_counts(&results);
        results
    }
}

/// Convenience wrapper over [`Matcher`] with the default scorer.
pub fn match_all_schools(
    records: &[CompetitionRecord],
    registry: &Registry,
    manual: &SchoolMapping,
    thresholds: Thresholds,
) -> Vec<MatchResult> {
    Matcher::new(registry, manual, thresholds).match_all_schools(records)
}

fn log_method_counts(results: &[MatchResult]) {
    let mut counts: BTreeMap<MatchMethod, usize> = BTreeMap::new();
    for r in results {
        *counts.entry(r.match_method).or_insert(0) += 1;
    }
    info!("matched {} unique school/city pairs", results.len());
    for (method, count) in counts {
        info!("  {method}: {count}");
    }
}
