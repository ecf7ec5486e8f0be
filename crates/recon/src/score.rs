//! Name similarity scoring.
//!
//! `token_set_ratio` compares the words two names share separately from the
//! words they don't, so "Ált. Isk. Mintaváros" against
//! "Mintaváros Általános Iskola" is judged on the abbreviations alone.
//! Results are 0–100 and agree with rapidfuzz's `fuzz.token_set_ratio`
//! without a processor: tokens split on whitespace, comparison is
//! case-sensitive.

use std::collections::BTreeSet;

use rapidfuzz::distance::indel;

/// Similarity of two school names, 0–100.
pub trait NameScorer {
    fn score(&self, ours: &str, theirs: &str) -> f64;
}

/// The default scorer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenSetRatio;

impl NameScorer for TokenSetRatio {
    fn score(&self, ours: &str, theirs: &str) -> f64 {
        token_set_ratio(ours, theirs)
    }
}

impl<F> NameScorer for F
where
    F: Fn(&str, &str) -> f64,
{
    fn score(&self, ours: &str, theirs: &str) -> f64 {
        self(ours, theirs)
    }
}

pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let intersection: Vec<&str> = tokens_a.intersection(&tokens_b).copied().collect();
    let diff_ab: Vec<&str> = tokens_a.difference(&tokens_b).copied().collect();
    let diff_ba: Vec<&str> = tokens_b.difference(&tokens_a).copied().collect();

    // One name's words are a subset of the other's
    if !intersection.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
        return 100.0;
    }

    let diff_ab_joined = diff_ab.join(" ");
    let diff_ba_joined = diff_ba.join(" ");
    let ab_len = char_len(&diff_ab_joined);
    let ba_len = char_len(&diff_ba_joined);
    let sect_len = char_len(&intersection.join(" "));

    // Length of "<intersection> <diff>" without building it
    let sep = usize::from(sect_len != 0);
    let sect_ab_len = sect_len + sep + ab_len;
    let sect_ba_len = sect_len + sep + ba_len;

    let dist = indel::distance(diff_ab_joined.chars(), diff_ba_joined.chars());
    let result = normalized_similarity(dist, sect_ab_len + sect_ba_len);
    if sect_len == 0 {
        return result;
    }

    // The intersection is a prefix of both, so only the tails differ
    let sect_ab_ratio = normalized_similarity(sep + ab_len, sect_len + sect_ab_len);
    let sect_ba_ratio = normalized_similarity(sep + ba_len, sect_len + sect_ba_len);

    result.max(sect_ab_ratio).max(sect_ba_ratio)
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn normalized_similarity(distance: usize, len_sum: usize) -> f64 {
    if len_sum == 0 {
        return 100.0;
    }
    100.0 - 100.0 * distance as f64 / len_sum as f64
}
