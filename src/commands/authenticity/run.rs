use super::*;

pub fn run(args: AuthenticityEvaluateArgs) -> Result<()> {
    let evaluator = AuthenticityEvaluator::new(args.evaluations_path());
    let output_path = args.output_path();

    let report = run_evaluator(&evaluator, &output_path)?;

    info!(
        evaluations = report.total_evaluations,
        personas = report.persona_scores.len(),
        "authenticity evaluation completed"
    );

    Ok(())
}
