use super::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutoffScore {
    pub k: usize,
    pub precision: f64,
    pub recall: f64,
}

/// Per-cutoff scores serialized flat as `precision_at_{k}` then `recall_at_{k}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CutoffScores(pub Vec<CutoffScore>);

impl CutoffScores {
    pub fn precision_at(&self, k: usize) -> Option<f64> {
        self.0
            .iter()
            .find(|score| score.k == k)
            .map(|score| score.precision)
    }

    pub fn recall_at(&self, k: usize) -> Option<f64> {
        self.0
            .iter()
            .find(|score| score.k == k)
            .map(|score| score.recall)
    }
}

impl Serialize for CutoffScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len() * 2))?;
        for score in &self.0 {
            map.serialize_entry(&format!("precision_at_{}", score.k), &score.precision)?;
        }
        for score in &self.0 {
            map.serialize_entry(&format!("recall_at_{}", score.k), &score.recall)?;
        }
        map.end()
    }
}

/// `precision@k = hits / min(k, retrieved)` and `recall@k = hits / relevant`;
/// duplicate retrieved items each count as a hit.
pub fn cutoff_scores(retrieved: &[String], relevant: &HashSet<&str>, k_values: &[usize]) -> CutoffScores {
    let scores = k_values
        .iter()
        .map(|&k| {
            let window = &retrieved[..k.min(retrieved.len())];
            let hits = window
                .iter()
                .filter(|item| relevant.contains(item.as_str()))
                .count();
            CutoffScore {
                k,
                precision: ratio(hits, window.len()),
                recall: ratio(hits, relevant.len()),
            }
        })
        .collect();
    CutoffScores(scores)
}
