use super::*;

pub fn run(args: RetrievalArgs) -> Result<()> {
    let results_path = args.system_output_path();
    if results_path.is_none() {
        info!("no retrieval results file; scoring inline labeled documents");
    }

    let evaluator = RagRetrievalEvaluator::new(args.ground_truth_path(), results_path, &args.k_values);
    let output_path = args.output_path();

    let report = run_evaluator(&evaluator, &output_path)?;

    info!(
        evaluated = report.total_queries,
        skipped = report.skipped_queries,
        missing_relevant = report.missing_relevant_total,
        irrelevant_retrieved = report.irrelevant_retrieved_total,
        "retrieval evaluation completed"
    );

    Ok(())
}
