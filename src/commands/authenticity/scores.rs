use super::*;

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        _ => None,
    }
}

fn scored_item(item: &Value) -> Option<f64> {
    match item {
        Value::Object(object) => object.get("score").and_then(numeric),
        other => numeric(other),
    }
}

/// A rating is a number, `{score}`, `{criteria: [{score}...]}` (averaged) or
/// a list of numbers or `{score}` objects (averaged). Anything else is unrated.
pub fn extract_score(rating: &Value) -> Option<f64> {
    match rating {
        Value::Number(number) => number.as_f64(),
        Value::Object(object) => {
            if let Some(score) = object.get("score").and_then(numeric) {
                return Some(score);
            }
            match object.get("criteria") {
                Some(Value::Array(criteria)) => {
                    mean(&criteria.iter().filter_map(scored_item).collect::<Vec<f64>>())
                }
                _ => None,
            }
        }
        Value::Array(items) => mean(&items.iter().filter_map(scored_item).collect::<Vec<f64>>()),
        _ => None,
    }
}

/// Factual grounding additionally accepts `{factually_accurate: bool}`.
pub fn extract_factual_score(rating: &Value) -> Option<f64> {
    if let Some(Value::Bool(accurate)) = rating.get("factually_accurate") {
        return Some(if *accurate { 1.0 } else { 0.0 });
    }
    extract_score(rating)
}

/// Scores of one rated response; `None` means the dimension was not rated.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RatingScores {
    pub authenticity: Option<f64>,
    pub style_alignment: Option<f64>,
    pub factual_grounding: Option<f64>,
}

impl RatingScores {
    pub fn from_ratings(ratings: &Value) -> Self {
        let dimension = |key: &str| ratings.get(key).unwrap_or(&Value::Null);
        Self {
            authenticity: extract_score(dimension("authenticity")),
            style_alignment: extract_score(dimension("style_alignment")),
            factual_grounding: extract_factual_score(dimension("factual_grounding")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DimensionScores {
    pub authenticity: f64,
    pub style_alignment: f64,
    pub factual_grounding: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RatedCounts {
    pub authenticity: usize,
    pub style_alignment: usize,
    pub factual_grounding: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ScoreBuckets {
    authenticity: Vec<f64>,
    style_alignment: Vec<f64>,
    factual_grounding: Vec<f64>,
    evaluations: usize,
}

impl ScoreBuckets {
    pub fn record(&mut self, scores: RatingScores) {
        self.evaluations += 1;
        self.authenticity.extend(scores.authenticity);
        self.style_alignment.extend(scores.style_alignment);
        self.factual_grounding.extend(scores.factual_grounding);
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Means over rated entries only; an unrated dimension averages to 0.
    pub fn means(&self) -> DimensionScores {
        DimensionScores {
            authenticity: mean(&self.authenticity).unwrap_or(0.0),
            style_alignment: mean(&self.style_alignment).unwrap_or(0.0),
            factual_grounding: mean(&self.factual_grounding).unwrap_or(0.0),
        }
    }

    pub fn rated(&self) -> RatedCounts {
        RatedCounts {
            authenticity: self.authenticity.len(),
            style_alignment: self.style_alignment.len(),
            factual_grounding: self.factual_grounding.len(),
        }
    }
}
