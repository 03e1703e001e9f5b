use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Treats an explicit `null` like a missing field.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricRecord {
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub unit: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatementRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metrics: Vec<MetricRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndicatorRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub statements: Vec<StatementRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One fact under the indicator → statement → metric hierarchy, flattened.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricEntry {
    pub indicator_label: String,
    pub indicator_description: String,
    pub statement_label: String,
    pub statement_description: String,
    pub value: Value,
    pub unit: Value,
}

impl MetricEntry {
    /// Flattens an indicator tree; statements without metrics contribute nothing.
    pub fn flatten_indicators(indicators: &[IndicatorRecord]) -> Vec<MetricEntry> {
        let mut entries = Vec::new();
        for indicator in indicators {
            for statement in &indicator.statements {
                for metric in &statement.metrics {
                    entries.push(MetricEntry {
                        indicator_label: indicator.label.clone(),
                        indicator_description: indicator.description.clone(),
                        statement_label: statement.label.clone(),
                        statement_description: statement.description.clone(),
                        value: metric.value.clone(),
                        unit: metric.unit.clone(),
                    });
                }
            }
        }
        entries
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchStep {
    IndicatorMatch,
    StatementMatch,
    ValueMatch,
    UnitMatch,
    DuplicateMatch,
    Unknown,
    ExtraExtraction,
}

impl MismatchStep {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IndicatorMatch => "indicator_match",
            Self::StatementMatch => "statement_match",
            Self::ValueMatch => "value_match",
            Self::UnitMatch => "unit_match",
            Self::DuplicateMatch => "duplicate_match",
            Self::Unknown => "unknown",
            Self::ExtraExtraction => "extra_extraction",
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            Self::IndicatorMatch => "no_indicator_overlap",
            Self::StatementMatch => "statement_overlap_below_threshold",
            Self::ValueMatch => "value_mismatch",
            Self::UnitMatch => "unit_mismatch",
            Self::DuplicateMatch => "already_matched",
            Self::Unknown => "unknown",
            Self::ExtraExtraction => "no_ground_truth_match",
        }
    }
}

impl fmt::Display for MismatchStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric that ended up outside any match, with the diagnosed cause.
#[derive(Debug, Clone, Serialize)]
pub struct UnmatchedMetric {
    #[serde(flatten)]
    pub metric: MetricEntry,
    pub mismatch_step: MismatchStep,
    pub mismatch_reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement_coverage: Option<f64>,
}

impl UnmatchedMetric {
    pub fn new(metric: MetricEntry, step: MismatchStep) -> Self {
        Self {
            metric,
            mismatch_step: step,
            mismatch_reason: step.reason().to_string(),
            statement_coverage: None,
        }
    }
}
