use super::*;

#[derive(Debug, Clone, Serialize)]
pub struct QueryDetail {
    pub query_id: String,
    pub query: Value,
    #[serde(flatten)]
    pub scores: CutoffScores,
    pub retrieved_count: usize,
    pub relevant_count: usize,
    pub unlabeled: usize,
    pub missing_relevant: Vec<String>,
    pub irrelevant_retrieved: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RetrievalReport {
    #[serde(flatten)]
    pub averages: CutoffScores,
    pub total_queries: usize,
    pub skipped_queries: usize,
    pub k_values: Vec<usize>,
    pub max_k: usize,
    pub missing_relevant_total: usize,
    pub irrelevant_retrieved_total: usize,
    pub unlabeled_total: usize,
    pub query_details: Vec<QueryDetail>,
}

impl Summary for RetrievalReport {
    fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for score in &self.averages.0 {
            lines.push(format!(
                "Precision@{}: {}",
                score.k,
                format_percent(score.precision)
            ));
        }
        for score in &self.averages.0 {
            lines.push(format!("Recall@{}: {}", score.k, format_percent(score.recall)));
        }
        lines.push(format!("Total Queries: {}", self.total_queries));
        if self.skipped_queries > 0 {
            lines.push(format!("Skipped Queries: {}", self.skipped_queries));
        }
        if self.unlabeled_total > 0 {
            lines.push(format!("Unlabeled Docs: {}", self.unlabeled_total));
        }
        lines
    }
}

pub struct RagRetrievalEvaluator {
    queries: PathBuf,
    results: Option<PathBuf>,
    k_values: Vec<usize>,
}

impl RagRetrievalEvaluator {
    /// Cutoffs are sorted and deduplicated; zero is not a cutoff.
    pub fn new(queries: PathBuf, results: Option<PathBuf>, k_values: &[usize]) -> Self {
        let k_values = k_values
            .iter()
            .copied()
            .filter(|k| *k > 0)
            .collect::<BTreeSet<usize>>()
            .into_iter()
            .collect();
        Self {
            queries,
            results,
            k_values,
        }
    }
}

impl Evaluator for RagRetrievalEvaluator {
    type Report = RetrievalReport;

    fn name(&self) -> &'static str {
        "rag_retrieval"
    }

    fn title(&self) -> &'static str {
        "RAG Retrieval Evaluation"
    }

    fn inputs(&self) -> Vec<EvaluatorInput> {
        let mut inputs = vec![EvaluatorInput::new("queries file", &self.queries)];
        if let Some(results) = &self.results {
            inputs.push(EvaluatorInput::new("retrieval results", results));
        }
        inputs
    }

    fn run_evaluation(&self) -> Result<RetrievalReport> {
        let queries = load_queries(&self.queries)?;
        let results = match &self.results {
            Some(path) => load_retrieval_results(path)?,
            None => HashMap::new(),
        };

        info!(
            queries = queries.len(),
            result_entries = results.len(),
            k_values = ?self.k_values,
            "loaded retrieval inputs"
        );

        Ok(evaluate_queries(&queries, &results, &self.k_values))
    }
}

/// Inline labeled documents are used only when no retrieval results were
/// loaded; otherwise each query is looked up by id.
pub fn rank_queries(
    queries: &[QueryRecord],
    results: &HashMap<String, Vec<String>>,
) -> Vec<RankedQuery> {
    queries
        .iter()
        .map(|query| match query.inline_docs() {
            Some(docs) if results.is_empty() => query.ranked_from_inline(docs),
            _ => {
                let retrieved = results
                    .get(&query.query_id)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                query.ranked_from_results(retrieved)
            }
        })
        .collect()
}

fn unique_in_order(items: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    items
        .iter()
        .map(String::as_str)
        .filter(|item| seen.insert(*item))
        .collect()
}

pub fn score_query(ranked: &RankedQuery, k_values: &[usize], max_k: usize) -> QueryDetail {
    let relevant = unique_in_order(&ranked.relevant);
    let relevant_set = relevant.iter().copied().collect::<HashSet<&str>>();
    let scores = cutoff_scores(&ranked.retrieved, &relevant_set, k_values);

    let window = if max_k == 0 {
        ranked.retrieved.as_slice()
    } else {
        &ranked.retrieved[..max_k.min(ranked.retrieved.len())]
    };
    let window_set = window.iter().map(String::as_str).collect::<HashSet<&str>>();

    let missing_relevant = relevant
        .iter()
        .filter(|item| !window_set.contains(**item))
        .map(|item| item.to_string())
        .collect();
    let irrelevant_retrieved = window
        .iter()
        .filter(|item| !relevant_set.contains(item.as_str()))
        .cloned()
        .collect();

    QueryDetail {
        query_id: ranked.query_id.clone(),
        query: ranked.query.clone(),
        scores,
        retrieved_count: ranked.retrieved.len(),
        relevant_count: relevant.len(),
        unlabeled: ranked.unlabeled,
        missing_relevant,
        irrelevant_retrieved,
    }
}

pub fn evaluate_queries(
    queries: &[QueryRecord],
    results: &HashMap<String, Vec<String>>,
    k_values: &[usize],
) -> RetrievalReport {
    let max_k = k_values.iter().copied().max().unwrap_or(0);
    let mut details = Vec::new();
    let mut skipped = 0_usize;
    let mut unlabeled_total = 0_usize;

    for ranked in rank_queries(queries, results) {
        unlabeled_total += ranked.unlabeled;
        if ranked.retrieved.is_empty() {
            debug!(query_id = %ranked.query_id, "skipped query without retrieved items");
            skipped += 1;
            continue;
        }
        details.push(score_query(&ranked, k_values, max_k));
    }

    let evaluated = details.len();
    let averages = k_values
        .iter()
        .map(|&k| {
            let precision_sum = details
                .iter()
                .filter_map(|detail| detail.scores.precision_at(k))
                .sum::<f64>();
            let recall_sum = details
                .iter()
                .filter_map(|detail| detail.scores.recall_at(k))
                .sum::<f64>();
            CutoffScore {
                k,
                precision: mean_over(precision_sum, evaluated),
                recall: mean_over(recall_sum, evaluated),
            }
        })
        .collect();

    RetrievalReport {
        averages: CutoffScores(averages),
        total_queries: evaluated,
        skipped_queries: skipped,
        k_values: k_values.to_vec(),
        max_k,
        missing_relevant_total: details.iter().map(|detail| detail.missing_relevant.len()).sum(),
        irrelevant_retrieved_total: details
            .iter()
            .map(|detail| detail.irrelevant_retrieved.len())
            .sum(),
        unlabeled_total,
        query_details: details,
    }
}

fn mean_over(sum: f64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    sum / count as f64
}
