use std::fs;

use serde_json::json;

use super::*;

fn write_json(path: &Path, value: &Value) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, serde_json::to_vec_pretty(value).expect("serialize")).expect("write json");
}

fn approx(left: f64, right: f64) -> bool {
    (left - right).abs() < 1e-12
}

#[test]
fn inline_relevance_labels_score_precision_and_recall() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let queries = dir.path().join("queries.json");
    write_json(
        &queries,
        &json!([{
            "query_id": "q1",
            "query": "price",
            "relevant_docs": [
                {"page_content": "doc1", "relevance": 1},
                {"page_content": "doc2", "relevance": 0}
            ]
        }]),
    );

    let report = RagRetrievalEvaluator::new(queries, None, &[1, 2])
        .run_evaluation()
        .expect("evaluation should succeed");

    assert_eq!(report.total_queries, 1);
    assert_eq!(report.averages.precision_at(1), Some(1.0));
    assert_eq!(report.averages.recall_at(2), Some(1.0));
    assert_eq!(report.averages.precision_at(2), Some(0.5));
    assert_eq!(report.query_details[0].irrelevant_retrieved, vec!["doc2".to_string()]);
    assert!(report.query_details[0].missing_relevant.is_empty());
    assert_eq!(report.unlabeled_total, 0);
}

#[test]
fn results_file_is_keyed_by_query_id() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let queries = dir.path().join("test_queries.json");
    write_json(
        &queries,
        &json!({"test_queries": [
            {"query_id": "q1", "relevant_indicators": ["a", "c"]},
            {"query_id": "q2", "relevance_scores": {"x": 1, "y": 0}},
            {"query_id": "q3", "relevant_indicators": ["z"]}
        ]}),
    );
    let results = dir.path().join("retrieval_results.json");
    write_json(
        &results,
        &json!({"results": [
            {"query_id": "q1", "retrieved_indicators": ["a", "b", "c", "d"]},
            {"query_id": "q2", "retrieved_docs": [{"id": "y"}, {"id": "x"}]},
            {"retrieved_docs": ["orphan"]}
        ]}),
    );

    let report = RagRetrievalEvaluator::new(queries, Some(results), &[3, 1])
        .run_evaluation()
        .expect("evaluation should succeed");

    assert_eq!(report.k_values, vec![1, 3]);
    assert_eq!(report.max_k, 3);
    assert_eq!(report.total_queries, 2);
    assert_eq!(report.skipped_queries, 1);

    let q1 = &report.query_details[0];
    assert_eq!(q1.scores.precision_at(1), Some(1.0));
    assert_eq!(q1.scores.recall_at(1), Some(0.5));
    assert!(approx(q1.scores.precision_at(3).unwrap_or_default(), 2.0 / 3.0));
    assert_eq!(q1.scores.recall_at(3), Some(1.0));
    assert_eq!(q1.irrelevant_retrieved, vec!["b".to_string()]);

    let q2 = &report.query_details[1];
    assert_eq!(q2.scores.precision_at(1), Some(0.0));
    assert_eq!(q2.scores.precision_at(3), Some(0.5));
    assert_eq!(q2.irrelevant_retrieved, vec!["y".to_string()]);

    assert_eq!(report.averages.precision_at(1), Some(0.5));
    assert_eq!(report.averages.recall_at(1), Some(0.25));
    assert!(approx(
        report.averages.precision_at(3).unwrap_or_default(),
        (2.0 / 3.0 + 0.5) / 2.0
    ));
    assert_eq!(report.missing_relevant_total, 0);
    assert_eq!(report.irrelevant_retrieved_total, 2);
}

#[test]
fn results_file_mode_ignores_docs_labeled_irrelevant() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let queries = dir.path().join("test_queries.json");
    write_json(
        &queries,
        &json!({"test_queries": [{
            "query_id": "q1",
            "relevant_docs": [
                {"page_content": "doc1", "relevance": 1},
                {"page_content": "doc2", "relevance": 0},
                {"doc_id": "doc3", "relevance_label": 1},
                {"id": "doc4"},
                "doc5"
            ]
        }]}),
    );
    let results = dir.path().join("retrieval_results.json");
    write_json(
        &results,
        &json!({"results": [{"query_id": "q1", "retrieved_docs": ["doc2", "doc1"]}]}),
    );

    let report = RagRetrievalEvaluator::new(queries, Some(results), &[1, 2])
        .run_evaluation()
        .expect("evaluation should succeed");

    let q1 = &report.query_details[0];
    assert_eq!(q1.relevant_count, 4);
    assert_eq!(q1.scores.precision_at(1), Some(0.0));
    assert_eq!(q1.scores.precision_at(2), Some(0.5));
    assert_eq!(q1.scores.recall_at(2), Some(0.25));
    assert_eq!(q1.irrelevant_retrieved, vec!["doc2".to_string()]);
    assert_eq!(
        q1.missing_relevant,
        vec!["doc3".to_string(), "doc4".to_string(), "doc5".to_string()]
    );
}

#[test]
fn missing_relevant_keeps_first_seen_order_without_duplicates() {
    let ranked = RankedQuery {
        query_id: "q".to_string(),
        retrieved: vec!["b".to_string()],
        relevant: vec!["c".to_string(), "a".to_string(), "c".to_string()],
        ..RankedQuery::default()
    };

    let detail = score_query(&ranked, &[1], 1);
    assert_eq!(detail.missing_relevant, vec!["c".to_string(), "a".to_string()]);
    assert_eq!(detail.relevant_count, 2);
    assert_eq!(detail.scores.recall_at(1), Some(0.0));
}

#[test]
fn unlabeled_inline_documents_are_counted() {
    let Value::Object(fields) = json!({
        "query_id": "q9",
        "retrieved_docs": [
            {"page_content": "first"},
            {"relevance_label": 1},
            "bare"
        ]
    }) else {
        panic!("query fixture should be an object");
    };
    let query = QueryRecord::new(fields);
    let docs = query.inline_docs().cloned().unwrap_or_default();
    let ranked = query.ranked_from_inline(&docs);

    assert_eq!(ranked.retrieved, vec!["first".to_string(), "1".to_string(), "bare".to_string()]);
    assert_eq!(ranked.relevant, vec!["1".to_string()]);
    assert_eq!(ranked.unlabeled, 2);
}

#[test]
fn item_key_uses_document_identity() {
    assert_eq!(item_key(&json!("doc")), "doc");
    assert_eq!(item_key(&json!(7)), "7");
    assert_eq!(item_key(&json!({"doc_id": 4, "page_content": "x"})), "4");
    assert_eq!(item_key(&json!({"page_content": "body"})), "body");
    assert_eq!(item_key(&json!({"title": "t"})), r#"{"title":"t"}"#);
}

#[test]
fn report_serializes_cutoffs_as_flat_keys() {
    let report = evaluate_queries(&[], &HashMap::new(), &[3, 5]);
    let payload = serde_json::to_value(&report).expect("report should serialize");

    assert_eq!(payload["precision_at_3"], json!(0.0));
    assert_eq!(payload["recall_at_5"], json!(0.0));
    assert_eq!(payload["total_queries"], json!(0));
    assert_eq!(payload["max_k"], json!(5));
}

#[test]
fn run_uses_inline_docs_when_no_results_file_exists() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let root = dir.path().to_path_buf();
    write_json(
        &root.join("rag_retrieval/ground_truth/test_queries.json"),
        &json!({"test_queries": [{
            "query_id": "q1",
            "relevant_docs": [
                {"page_content": "a", "relevance": 0},
                {"page_content": "b", "relevance": 1}
            ]
        }]}),
    );

    let args = RetrievalArgs {
        data_root: root.clone(),
        ground_truth: None,
        system_output: None,
        output: None,
        k_values: vec![1, 2],
    };
    run(args).expect("retrieval run should succeed");

    let written: Value = serde_json::from_slice(
        &fs::read(root.join("rag_retrieval/evaluation_results.json"))
            .expect("report should exist"),
    )
    .expect("report should be json");
    assert_eq!(written["evaluator"], json!("rag_retrieval"));
    assert_eq!(written["results"]["precision_at_1"], json!(0.0));
    assert_eq!(written["results"]["recall_at_2"], json!(1.0));
    assert_eq!(written["inputs"].as_array().map(Vec::len), Some(1));
}

#[test]
fn explicit_missing_results_file_fails_fast() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let queries = dir.path().join("queries.json");
    write_json(&queries, &json!([]));
    let evaluator =
        RagRetrievalEvaluator::new(queries, Some(dir.path().join("missing.json")), &[3]);

    let error = run_evaluator(&evaluator, &dir.path().join("out.json"))
        .expect_err("missing results must fail");
    assert!(error.to_string().starts_with("retrieval results not found"), "{error}");
}
