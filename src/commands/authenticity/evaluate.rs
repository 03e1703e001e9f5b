use super::*;

#[derive(Debug, Clone, Serialize)]
pub struct PersonaScores {
    #[serde(flatten)]
    pub scores: DimensionScores,
    pub rated: RatedCounts,
    pub total_evaluations: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthenticityReport {
    pub expert_authenticity_score: f64,
    pub style_alignment_score: f64,
    pub factual_grounding_score: f64,
    pub total_evaluations: usize,
    pub rated: RatedCounts,
    pub persona_scores: BTreeMap<String, PersonaScores>,
}

impl Summary for AuthenticityReport {
    fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!(
                "Expert Authenticity Score: {:.2}",
                self.expert_authenticity_score
            ),
            format!("Style Alignment Score: {:.2}", self.style_alignment_score),
            format!("Factual Grounding Score: {:.2}", self.factual_grounding_score),
            format!("Total Evaluations: {}", self.total_evaluations),
        ];
        if !self.persona_scores.is_empty() {
            lines.push("Per-Persona Averages".to_string());
            for (persona_id, persona) in &self.persona_scores {
                lines.push(format!(
                    "  {persona_id}: authenticity={:.2}, style_alignment={:.2}, factual_grounding={:.2}, total={}",
                    persona.scores.authenticity,
                    persona.scores.style_alignment,
                    persona.scores.factual_grounding,
                    persona.total_evaluations
                ));
            }
        }
        lines
    }
}

pub struct AuthenticityEvaluator {
    evaluations: PathBuf,
}

impl AuthenticityEvaluator {
    pub fn new(evaluations: PathBuf) -> Self {
        Self { evaluations }
    }
}

impl Evaluator for AuthenticityEvaluator {
    type Report = AuthenticityReport;

    fn name(&self) -> &'static str {
        "authenticity"
    }

    fn title(&self) -> &'static str {
        "Authenticity Evaluation"
    }

    fn inputs(&self) -> Vec<EvaluatorInput> {
        vec![EvaluatorInput::new("evaluations file", &self.evaluations)]
    }

    fn run_evaluation(&self) -> Result<AuthenticityReport> {
        let responses = load_rated_responses(&self.evaluations)?;
        info!(responses = responses.len(), "loaded rated responses");
        Ok(aggregate_ratings(&responses))
    }
}

/// Overall means plus per-persona means; responses without a persona id
/// only count toward the overall figures.
pub fn aggregate_ratings(responses: &[RatedResponse]) -> AuthenticityReport {
    let mut overall = ScoreBuckets::default();
    let mut by_persona = BTreeMap::<String, ScoreBuckets>::new();

    for response in responses {
        overall.record(response.scores);
        if let Some(persona_id) = &response.persona_id {
            by_persona
                .entry(persona_id.clone())
                .or_default()
                .record(response.scores);
        }
    }

    let means = overall.means();
    let persona_scores = by_persona
        .into_iter()
        .map(|(persona_id, buckets)| {
            let scores = PersonaScores {
                scores: buckets.means(),
                rated: buckets.rated(),
                total_evaluations: buckets.evaluations(),
            };
            (persona_id, scores)
        })
        .collect();

    AuthenticityReport {
        expert_authenticity_score: means.authenticity,
        style_alignment_score: means.style_alignment,
        factual_grounding_score: means.factual_grounding,
        total_evaluations: overall.evaluations(),
        rated: overall.rated(),
        persona_scores,
    }
}
