use super::*;

pub fn run(args: FactsArgs) -> Result<()> {
    let evaluator =
        FactExtractionEvaluator::new(args.ground_truth_path(), args.system_output_path());
    let output_path = args.output_path();

    let report = run_evaluator(&evaluator, &output_path)?;

    info!(
        total_values = report.total_values,
        matched_values = report.matched_values,
        mismatched_values = report.mismatched_values.len(),
        "fact evaluation completed"
    );

    Ok(())
}
