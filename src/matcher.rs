//! Greedy ground-truth ↔ system metric pairing with staged failure diagnosis.
//!
//! Pairing is first-fit in input order, not an optimal assignment: each
//! ground-truth metric takes the first unused system metric that agrees on
//! indicator, statement, value and unit. Whatever stays unpaired is explained
//! by re-running the same predicates as a funnel over every system metric,
//! used or not, and reporting the first stage that empties the candidate set.

use std::collections::HashSet;

use tracing::warn;

use crate::model::{MetricEntry, MismatchStep, UnmatchedMetric};
use crate::normalize::{normalize_text, normalize_unit, parse_decimal, value_text};
use crate::similarity::{ground_truth_word_coverage, indicator_matches, statement_matches};

#[derive(Debug, Clone, Default)]
pub struct MatchResult {
    pub matched: usize,
    pub pairs: Vec<(usize, usize)>,
    pub unmatched_ground_truth: Vec<UnmatchedMetric>,
    pub unmatched_system: Vec<UnmatchedMetric>,
}

impl MatchResult {
    /// Every metric on either side lands in exactly one bucket.
    pub fn reconciles(&self, ground_truth_len: usize, system_len: usize) -> bool {
        self.matched == self.pairs.len()
            && self.matched + self.unmatched_ground_truth.len() == ground_truth_len
            && self.matched + self.unmatched_system.len() == system_len
    }
}

/// Exact numeric equality when both sides parse, normalized text otherwise.
pub fn values_equal(gt_value: &serde_json::Value, sys_value: &serde_json::Value) -> bool {
    match (parse_decimal(gt_value), parse_decimal(sys_value)) {
        (Some(gt_number), Some(sys_number)) => gt_number == sys_number,
        _ => normalize_text(&value_text(gt_value)) == normalize_text(&value_text(sys_value)),
    }
}

/// An empty ground-truth unit accepts any system unit.
pub fn units_compatible(gt_unit: &serde_json::Value, sys_unit: &serde_json::Value) -> bool {
    let gt_normalized = normalize_unit(gt_unit);
    if gt_normalized.is_empty() {
        return true;
    }
    gt_normalized == normalize_unit(sys_unit)
}

#[derive(Debug, Clone, Copy)]
pub struct MetricMatcher {
    threshold: f64,
}

impl MetricMatcher {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    fn indicator_ok(&self, gt: &MetricEntry, sys: &MetricEntry) -> bool {
        indicator_matches(
            &gt.indicator_label,
            &sys.indicator_label,
            &sys.indicator_description,
            self.threshold,
        )
    }

    fn statement_ok(&self, gt: &MetricEntry, sys: &MetricEntry) -> bool {
        statement_matches(
            &gt.statement_label,
            &sys.statement_label,
            &sys.statement_description,
            self.threshold,
        )
    }

    pub fn is_full_match(&self, gt: &MetricEntry, sys: &MetricEntry) -> bool {
        self.indicator_ok(gt, sys)
            && self.statement_ok(gt, sys)
            && values_equal(&gt.value, &sys.value)
            && units_compatible(&gt.unit, &sys.unit)
    }

    pub fn match_metrics(
        &self,
        ground_truth: &[MetricEntry],
        system: &[MetricEntry],
    ) -> MatchResult {
        let mut used = HashSet::<usize>::new();
        let mut result = MatchResult::default();

        for (gt_index, gt) in ground_truth.iter().enumerate() {
            let candidate = system
                .iter()
                .enumerate()
                .filter(|(index, _)| !used.contains(index))
                .find(|(_, sys)| self.is_full_match(gt, sys))
                .map(|(index, _)| index);

            match candidate {
                Some(sys_index) => {
                    used.insert(sys_index);
                    result.matched += 1;
                    result.pairs.push((gt_index, sys_index));
                }
                None => {
                    let unmatched = self.diagnose(gt, system, &used);
                    result.unmatched_ground_truth.push(unmatched);
                }
            }
        }

        for (index, sys) in system.iter().enumerate() {
            if used.contains(&index) {
                continue;
            }
            result
                .unmatched_system
                .push(UnmatchedMetric::new(sys.clone(), MismatchStep::ExtraExtraction));
        }

        result
    }

    /// Narrows all system metrics stage by stage; the first empty stage names
    /// the failure.
    pub fn diagnose(
        &self,
        gt: &MetricEntry,
        system: &[MetricEntry],
        used: &HashSet<usize>,
    ) -> UnmatchedMetric {
        let indicator_candidates = system
            .iter()
            .enumerate()
            .filter(|(_, sys)| self.indicator_ok(gt, sys))
            .collect::<Vec<(usize, &MetricEntry)>>();
        if indicator_candidates.is_empty() {
            return UnmatchedMetric::new(gt.clone(), MismatchStep::IndicatorMatch);
        }

        let statement_candidates = indicator_candidates
            .iter()
            .copied()
            .filter(|(_, sys)| self.statement_ok(gt, sys))
            .collect::<Vec<(usize, &MetricEntry)>>();
        if statement_candidates.is_empty() {
            let coverage = indicator_candidates
                .iter()
                .map(|(_, sys)| {
                    let system_text =
                        format!("{} {}", sys.statement_label, sys.statement_description);
                    ground_truth_word_coverage(&gt.statement_label, &system_text)
                })
                .fold(0.0_f64, f64::max);
            let mut unmatched = UnmatchedMetric::new(gt.clone(), MismatchStep::StatementMatch);
            unmatched.statement_coverage = Some(coverage);
            return unmatched;
        }

        let value_candidates = statement_candidates
            .iter()
            .copied()
            .filter(|(_, sys)| values_equal(&gt.value, &sys.value))
            .collect::<Vec<(usize, &MetricEntry)>>();
        if value_candidates.is_empty() {
            return UnmatchedMetric::new(gt.clone(), MismatchStep::ValueMatch);
        }

        let unit_candidates = value_candidates
            .iter()
            .copied()
            .filter(|(_, sys)| units_compatible(&gt.unit, &sys.unit))
            .collect::<Vec<(usize, &MetricEntry)>>();
        if unit_candidates.is_empty() {
            return UnmatchedMetric::new(gt.clone(), MismatchStep::UnitMatch);
        }

        if unit_candidates.iter().all(|(index, _)| used.contains(index)) {
            return UnmatchedMetric::new(gt.clone(), MismatchStep::DuplicateMatch);
        }

        warn!(
            indicator = %gt.indicator_label,
            statement = %gt.statement_label,
            "unmatched metric has an unused full match"
        );
        UnmatchedMetric::new(gt.clone(), MismatchStep::Unknown)
    }
}
