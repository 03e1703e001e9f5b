use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FactMismatchReason {
    ValueNotFound,
    PageNotExtracted,
}

#[derive(Debug, Clone, Serialize)]
pub struct FactDetail {
    pub page: i64,
    pub attribute: Value,
    pub ground_truth_value: Value,
    pub matched: bool,
    pub mismatch_reason: Option<FactMismatchReason>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FactReport {
    pub exact_match_accuracy: f64,
    pub total_values: usize,
    pub matched_values: usize,
    pub mismatched_values: Vec<FactDetail>,
    pub system_source: SystemSource,
    pub extracted_pages: usize,
    pub details: Vec<FactDetail>,
}

impl Summary for FactReport {
    fn summary_lines(&self) -> Vec<String> {
        vec![
            format!(
                "Exact Match Accuracy: {}",
                format_percent(self.exact_match_accuracy)
            ),
            format!("Total Values: {}", self.total_values),
            format!("Matched Values: {}", self.matched_values),
        ]
    }
}

pub struct FactExtractionEvaluator {
    ground_truth: PathBuf,
    system_output: PathBuf,
}

impl FactExtractionEvaluator {
    pub fn new(ground_truth: PathBuf, system_output: PathBuf) -> Self {
        Self {
            ground_truth,
            system_output,
        }
    }
}

impl Evaluator for FactExtractionEvaluator {
    type Report = FactReport;

    fn name(&self) -> &'static str {
        "fact_extraction"
    }

    fn title(&self) -> &'static str {
        "Fact Extraction Evaluation"
    }

    fn inputs(&self) -> Vec<EvaluatorInput> {
        vec![
            EvaluatorInput::new("ground truth", &self.ground_truth),
            EvaluatorInput::new("system output", &self.system_output),
        ]
    }

    fn run_evaluation(&self) -> Result<FactReport> {
        let ground_truth = load_ground_truth_facts(&self.ground_truth)?;
        let system = load_system_facts(&self.system_output)?;

        info!(
            ground_truth_pages = ground_truth.len(),
            extracted_pages = system.pages.len(),
            source = ?system.source,
            "loaded fact pages"
        );

        Ok(evaluate_facts(&ground_truth, &system))
    }
}

/// Numeric facts must appear among the page's numbers; anything else must
/// appear as normalized text on the page.
pub fn fact_found(value: &Value, page: &ExtractedPage) -> bool {
    match parse_decimal(value) {
        Some(number) => page.numbers.contains(&number),
        None => page.contains_text(&normalize_text(&value_text(value))),
    }
}

pub fn evaluate_facts(ground_truth: &[GroundTruthFactPage], system: &SystemFacts) -> FactReport {
    let mut details = Vec::new();

    for gt_page in ground_truth {
        let extracted = system.pages.get(&gt_page.page);
        if extracted.is_none() && !gt_page.facts.is_empty() {
            warn!(page = gt_page.page, "ground-truth page was not extracted");
        }

        for fact in &gt_page.facts {
            let (matched, mismatch_reason) = match extracted {
                None => (false, Some(FactMismatchReason::PageNotExtracted)),
                Some(page) if fact_found(&fact.value, page) => (true, None),
                Some(_) => (false, Some(FactMismatchReason::ValueNotFound)),
            };
            details.push(FactDetail {
                page: gt_page.page,
                attribute: fact.attribute.clone(),
                ground_truth_value: fact.value.clone(),
                matched,
                mismatch_reason,
            });
        }
    }

    let total_values = details.len();
    let matched_values = details.iter().filter(|detail| detail.matched).count();
    let mismatched_values = details
        .iter()
        .filter(|detail| !detail.matched)
        .cloned()
        .collect::<Vec<FactDetail>>();

    FactReport {
        exact_match_accuracy: ratio(matched_values, total_values),
        total_values,
        matched_values,
        mismatched_values,
        system_source: system.source,
        extracted_pages: system.pages.len(),
        details,
    }
}
