use super::*;

pub fn run(args: PersonaArgs) -> Result<()> {
    let evaluator = PersonaExtractionEvaluator::new(
        args.ground_truth_path(),
        args.system_output_path(),
        args.threshold,
    );
    let output_path = args.output_path();

    let report = run_evaluator(&evaluator, &output_path)?;

    info!(
        pages = report.counts.ground_truth_pages,
        matched_metrics = report.counts.matched_metrics,
        mismatched_ground_truth_metrics = report.counts.mismatched_ground_truth_metrics,
        mismatched_system_metrics = report.counts.mismatched_system_metrics,
        "persona evaluation completed"
    );

    Ok(())
}
