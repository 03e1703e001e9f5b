use std::collections::HashSet;

use crate::normalize::normalize_match_text;

pub const DEFAULT_WORD_OVERLAP_THRESHOLD: f64 = 0.5;

fn match_tokens(input: &str) -> HashSet<String> {
    normalize_match_text(input)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Shared tokens over the size of the smaller token set. A short phrase fully
/// contained in a longer one scores 1.0.
pub fn word_overlap_ratio(left: &str, right: &str) -> f64 {
    let left_words = match_tokens(left);
    let right_words = match_tokens(right);
    if left_words.is_empty() || right_words.is_empty() {
        return 0.0;
    }

    let shared = left_words.intersection(&right_words).count();
    shared as f64 / left_words.len().min(right_words.len()) as f64
}

/// Share of the ground-truth tokens found in the system text.
pub fn ground_truth_word_coverage(ground_truth: &str, system: &str) -> f64 {
    let gt_words = match_tokens(ground_truth);
    if gt_words.is_empty() {
        return 0.0;
    }

    let system_words = match_tokens(system);
    let covered = gt_words.intersection(&system_words).count();
    covered as f64 / gt_words.len() as f64
}

fn label_similarity(gt_label: &str, sys_label: &str, sys_description: &str) -> f64 {
    word_overlap_ratio(gt_label, sys_label).max(word_overlap_ratio(gt_label, sys_description))
}

pub fn indicator_matches(
    gt_label: &str,
    sys_label: &str,
    sys_description: &str,
    threshold: f64,
) -> bool {
    label_similarity(gt_label, sys_label, sys_description) >= threshold
}

pub fn statement_matches(
    gt_label: &str,
    sys_label: &str,
    sys_description: &str,
    threshold: f64,
) -> bool {
    label_similarity(gt_label, sys_label, sys_description) >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn word_overlap_ratio_uses_smaller_set_as_denominator() {
        assert_eq!(word_overlap_ratio("price is low", "price range"), 0.5);
        assert_eq!(word_overlap_ratio("budget", "very tight budget overall"), 1.0);
    }

    #[test]
    fn word_overlap_ratio_handles_empty_inputs() {
        assert_eq!(word_overlap_ratio("", "something"), 0.0);
        assert_eq!(word_overlap_ratio("value", ""), 0.0);
        assert_eq!(word_overlap_ratio("!!!", "???"), 0.0);
    }

    #[test]
    fn word_overlap_ratio_folds_synonyms() {
        assert_eq!(word_overlap_ratio("Capsules per day", "cap"), 1.0);
    }

    #[test]
    fn ground_truth_word_coverage_counts_ground_truth_side() {
        assert_eq!(ground_truth_word_coverage("low price", "price is low and fair"), 1.0);
        assert_eq!(ground_truth_word_coverage("low price", "price is fair"), 0.5);
        assert_eq!(ground_truth_word_coverage("", "price"), 0.0);
    }

    #[test]
    fn indicator_matches_uses_description_overlap() {
        assert!(indicator_matches("price", "", "price range", 0.5));
        assert!(!indicator_matches("price", "taste", "flavour profile", 0.5));
    }

    #[test]
    fn statement_matches_applies_threshold() {
        assert!(statement_matches("value", "value", "", 0.5));
        assert!(!statement_matches("value", "quality", "", 0.5));
        assert!(!statement_matches("skews urban", "urban", "", 1.5));
    }

    proptest! {
        #[test]
        fn word_overlap_ratio_is_symmetric(a in "[a-z ,]{0,40}", b in "[a-z ,]{0,40}") {
            prop_assert_eq!(word_overlap_ratio(&a, &b), word_overlap_ratio(&b, &a));
        }

        #[test]
        fn word_overlap_ratio_is_bounded(a in ".{0,40}", b in ".{0,40}") {
            let score = word_overlap_ratio(&a, &b);
            prop_assert!((0.0..=1.0).contains(&score), "score out of bounds: {}", score);
        }
    }
}
