use super::*;

#[derive(Debug, Clone, Default, Serialize)]
pub struct PersonaCounts {
    pub ground_truth_pages: usize,
    pub system_pages: usize,
    pub ground_truth_personas: usize,
    pub detected_personas: usize,
    pub ground_truth_metrics: usize,
    pub system_metrics: usize,
    pub matched_metrics: usize,
    pub mismatched_ground_truth_metrics: usize,
    pub mismatched_system_metrics: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageBreakdown {
    pub page: i64,
    pub has_system_output: bool,
    pub ground_truth_personas: usize,
    pub detected_personas: usize,
    pub ground_truth_metrics: usize,
    pub system_metrics: usize,
    pub matched_metrics: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageMismatch {
    pub page: i64,
    #[serde(flatten)]
    pub metric: UnmatchedMetric,
}

#[derive(Debug, Clone, Serialize)]
pub struct PersonaReport {
    pub persona_detection_rate: f64,
    pub metrics_recall: f64,
    pub metrics_precision: f64,
    pub threshold: f64,
    pub counts: PersonaCounts,
    pub mismatch_step_counts: BTreeMap<String, usize>,
    pub pages: Vec<PageBreakdown>,
    pub mismatched_ground_truth_metrics: Vec<PageMismatch>,
    pub mismatched_system_metrics: Vec<PageMismatch>,
}

impl Summary for PersonaReport {
    fn summary_lines(&self) -> Vec<String> {
        vec![
            format!(
                "Persona Detection Rate: {}",
                format_percent(self.persona_detection_rate)
            ),
            format!("Metrics Recall: {}", format_percent(self.metrics_recall)),
            format!("Metrics Precision: {}", format_percent(self.metrics_precision)),
        ]
    }
}

pub struct PersonaExtractionEvaluator {
    ground_truth: PathBuf,
    system_output: PathBuf,
    matcher: MetricMatcher,
}

impl PersonaExtractionEvaluator {
    pub fn new(ground_truth: PathBuf, system_output: PathBuf, threshold: f64) -> Self {
        Self {
            ground_truth,
            system_output,
            matcher: MetricMatcher::new(threshold),
        }
    }
}

impl Evaluator for PersonaExtractionEvaluator {
    type Report = PersonaReport;

    fn name(&self) -> &'static str {
        "persona_extraction"
    }

    fn title(&self) -> &'static str {
        "Persona Extraction Evaluation"
    }

    fn inputs(&self) -> Vec<EvaluatorInput> {
        vec![
            EvaluatorInput::new("ground truth", &self.ground_truth),
            EvaluatorInput::new("system output", &self.system_output),
        ]
    }

    fn run_evaluation(&self) -> Result<PersonaReport> {
        let ground_truth = load_ground_truth_pages(&self.ground_truth)?;
        let system = load_system_pages(&self.system_output)?;

        info!(
            ground_truth_pages = ground_truth.len(),
            system_pages = system.len(),
            threshold = self.matcher.threshold(),
            "loaded persona pages"
        );

        Ok(evaluate_pages(&ground_truth, &system, &self.matcher))
    }
}

/// Scores every ground-truth page against the system page with the same
/// number; a missing system page counts as an empty extraction.
pub fn evaluate_pages(
    ground_truth: &[GroundTruthPage],
    system: &BTreeMap<i64, SystemOutputPage>,
    matcher: &MetricMatcher,
) -> PersonaReport {
    let empty = SystemOutputPage::default();
    let mut counts = PersonaCounts {
        ground_truth_pages: ground_truth.len(),
        system_pages: system.len(),
        ..PersonaCounts::default()
    };
    let mut pages = Vec::with_capacity(ground_truth.len());
    let mut mismatched_ground_truth = Vec::new();
    let mut mismatched_system = Vec::new();
    let mut step_counts = BTreeMap::<String, usize>::new();

    for gt_page in ground_truth {
        let system_page = system.get(&gt_page.page);
        if system_page.is_none() {
            warn!(page = gt_page.page, "ground-truth page has no system output");
        }
        let system_page = system_page.unwrap_or(&empty);

        let detected = gt_page.personas.intersection(&system_page.personas).count();
        let result = matcher.match_metrics(&gt_page.metrics, &system_page.metrics);
        debug_assert!(result.reconciles(gt_page.metrics.len(), system_page.metrics.len()));

        counts.ground_truth_personas += gt_page.personas.len();
        counts.detected_personas += detected;
        counts.ground_truth_metrics += gt_page.metrics.len();
        counts.system_metrics += system_page.metrics.len();
        counts.matched_metrics += result.matched;

        pages.push(PageBreakdown {
            page: gt_page.page,
            has_system_output: system.contains_key(&gt_page.page),
            ground_truth_personas: gt_page.personas.len(),
            detected_personas: detected,
            ground_truth_metrics: gt_page.metrics.len(),
            system_metrics: system_page.metrics.len(),
            matched_metrics: result.matched,
        });

        for metric in result.unmatched_ground_truth {
            *step_counts
                .entry(metric.mismatch_step.to_string())
                .or_default() += 1;
            mismatched_ground_truth.push(PageMismatch {
                page: gt_page.page,
                metric,
            });
        }
        for metric in result.unmatched_system {
            *step_counts
                .entry(metric.mismatch_step.to_string())
                .or_default() += 1;
            mismatched_system.push(PageMismatch {
                page: gt_page.page,
                metric,
            });
        }
    }

    counts.mismatched_ground_truth_metrics = mismatched_ground_truth.len();
    counts.mismatched_system_metrics = mismatched_system.len();

    PersonaReport {
        persona_detection_rate: ratio(counts.detected_personas, counts.ground_truth_personas),
        metrics_recall: ratio(counts.matched_metrics, counts.ground_truth_metrics),
        metrics_precision: ratio(counts.matched_metrics, counts.system_metrics),
        threshold: matcher.threshold(),
        counts,
        mismatch_step_counts: step_counts,
        pages,
        mismatched_ground_truth_metrics: mismatched_ground_truth,
        mismatched_system_metrics: mismatched_system,
    }
}
