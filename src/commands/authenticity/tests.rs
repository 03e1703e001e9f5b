use std::fs;

use serde_json::json;

use super::generate::{QuestionEntry, expand_questions, question_entries, resolve_persona_ids};
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

fn generate_args(root: &Path) -> AuthenticityGenerateArgs {
    AuthenticityGenerateArgs {
        data_root: root.to_path_buf(),
        questions_file: None,
        persona_dir: root.join("personas"),
        persona_ids: Vec::new(),
        output: None,
    }
}

#[test]
fn numeric_scores_and_factual_flags_average_per_persona() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let evaluations = dir.path().join("responses.json");
    write_json(
        &evaluations,
        &json!({"test_questions": [
            {"persona_id": "p1", "ratings": {
                "authenticity": 4,
                "style_alignment": 3,
                "factual_grounding": {"factually_accurate": true}
            }},
            {"persona_id": "p1", "ratings": {
                "authenticity": 2,
                "style_alignment": 5,
                "factual_grounding": {"factually_accurate": false}
            }}
        ]}),
    );

    let report = AuthenticityEvaluator::new(evaluations)
        .run_evaluation()
        .expect("evaluation should succeed");

    assert_eq!(report.total_evaluations, 2);
    assert!(approx(report.expert_authenticity_score, 3.0));
    assert!(approx(report.style_alignment_score, 4.0));
    assert!(approx(report.factual_grounding_score, 0.5));

    let p1 = &report.persona_scores["p1"];
    assert_eq!(p1.total_evaluations, 2);
    assert!(approx(p1.scores.authenticity, 3.0));
    assert!(approx(p1.scores.factual_grounding, 0.5));
}

#[test]
fn criteria_and_score_lists_are_averaged() {
    let criteria = json!({"criteria": [{"score": 4}, {"score": 2}, {"name": "unscored"}]});
    assert_eq!(extract_score(&criteria), Some(3.0));
    assert_eq!(extract_score(&json!([1, 2, {"score": 6}])), Some(3.0));
    assert_eq!(extract_score(&json!({"score": 2.5})), Some(2.5));
    assert_eq!(extract_score(&json!("great")), None);
    assert_eq!(extract_score(&json!([])), None);
    assert_eq!(extract_factual_score(&json!({"factually_accurate": true})), Some(1.0));
    assert_eq!(extract_factual_score(&json!(0.75)), Some(0.75));
}

#[test]
fn unrated_dimensions_do_not_drag_means_down() {
    let responses = vec![
        RatedResponse {
            persona_id: Some("p1".to_string()),
            scores: RatingScores {
                authenticity: Some(4.0),
                style_alignment: None,
                factual_grounding: None,
            },
        },
        RatedResponse {
            persona_id: None,
            scores: RatingScores::default(),
        },
    ];

    let report = aggregate_ratings(&responses);

    assert_eq!(report.total_evaluations, 2);
    assert_eq!(report.rated.authenticity, 1);
    assert_eq!(report.rated.style_alignment, 0);
    assert!(approx(report.expert_authenticity_score, 4.0));
    assert!(approx(report.style_alignment_score, 0.0));
    assert_eq!(report.persona_scores.len(), 1);
    assert_eq!(report.persona_scores["p1"].total_evaluations, 1);
}

#[test]
fn evaluations_directory_merges_every_file() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let evaluations = dir.path().join("rated");
    write_json(
        &evaluations.join("a.json"),
        &json!([{"persona_id": "p1", "ratings": {"authenticity": 5}}]),
    );
    write_json(
        &evaluations.join("b.json"),
        &json!({"persona_id": "p2", "ratings": {"authenticity": 1}}),
    );

    let report = AuthenticityEvaluator::new(evaluations)
        .run_evaluation()
        .expect("evaluation should succeed");

    assert_eq!(report.total_evaluations, 2);
    assert!(approx(report.expert_authenticity_score, 3.0));
    assert_eq!(
        report.persona_scores.keys().cloned().collect::<Vec<String>>(),
        vec!["p1".to_string(), "p2".to_string()]
    );
}

#[test]
fn category_map_questions_fan_out_across_persona_profiles() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let root = dir.path();
    write_json(
        &root.join("authenticity/test_questions.json"),
        &json!({
            "pricing": ["What do you pay?", {"question": "Any discounts?"}],
            "habits": [{"query": "Where do you shop?", "persona_id": "alpha"}]
        }),
    );
    write_json(&root.join("personas/alpha.json"), &json!({}));
    write_json(&root.join("personas/beta.json"), &json!({}));

    let entries = question_entries(
        read_json(&root.join("authenticity/test_questions.json")).expect("read questions"),
        root,
    )
    .expect("questions should normalize");
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].query, "Where do you shop?");
    assert_eq!(entries[0].category, json!("habits"));
    assert_eq!(entries[2].category, json!("pricing"));

    // Question-level ids take precedence over profile files.
    let ids = resolve_persona_ids(&entries, &root.join("personas"), &[])
        .expect("ids should resolve");
    assert_eq!(ids, vec!["alpha".to_string()]);

    let unpinned = entries
        .iter()
        .filter(|entry| entry.persona_id.is_none())
        .cloned()
        .collect::<Vec<QuestionEntry>>();
    let ids = resolve_persona_ids(&unpinned, &root.join("personas"), &[])
        .expect("ids should resolve");
    assert_eq!(ids, vec!["alpha".to_string(), "beta".to_string()]);

    let expanded = expand_questions(&entries, &ids);
    assert_eq!(expanded.len(), 5);
    assert_eq!(expanded[0].persona_id, "alpha");
    assert_eq!(expanded[1].query, "What do you pay?");
    assert_eq!(expanded[2].persona_id, "beta");
}

#[test]
fn generate_writes_unrated_templates() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let root = dir.path();
    write_json(
        &root.join("authenticity/test_questions.json"),
        &json!({"test_questions": [{"query": "Why this brand?", "category": "loyalty"}]}),
    );
    let mut args = generate_args(root);
    args.persona_ids = vec!["p1".to_string(), "p2".to_string()];

    generate(args.clone()).expect("generate should succeed");

    let written = read_json(&args.output_path()).expect("template should be readable");
    let questions = written["test_questions"]
        .as_array()
        .expect("test_questions should be a list");
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[1]["persona_id"], json!("p2"));
    assert_eq!(questions[0]["category"], json!("loyalty"));
    assert!(questions[0]["response"].is_null());
    assert!(questions[0]["ratings"]["authenticity"].is_null());
    assert!(written["generated_at"].is_string());
}

#[test]
fn generate_without_any_persona_ids_fails() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let root = dir.path();
    write_json(
        &root.join("authenticity/test_questions.json"),
        &json!(["What matters most?"]),
    );
    fs::create_dir_all(root.join("personas")).expect("create persona dir");

    let err = generate(generate_args(root)).expect_err("no personas should fail");

    assert!(err.to_string().contains("no persona profiles found"));
}

#[test]
fn unsupported_question_payload_is_rejected() {
    let err = question_entries(json!(42), Path::new("questions.json"))
        .expect_err("a bare number is not a question set");

    assert!(err.to_string().contains("unsupported test questions format"));
}

#[test]
fn run_writes_report_envelope() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let root = dir.path();
    write_json(
        &root.join("authenticity/system_output/generated_responses.json"),
        &json!({"test_questions": [{"persona_id": "p1", "ratings": {"authenticity": [4, 5]}}]}),
    );
    let args = AuthenticityEvaluateArgs {
        data_root: root.to_path_buf(),
        evaluations_file: None,
        output: None,
    };

    run(args.clone()).expect("run should succeed");

    let written = read_json(&args.output_path()).expect("report should be readable");
    assert_eq!(written["evaluator"], json!("authenticity"));
    assert_eq!(written["results"]["expert_authenticity_score"], json!(4.5));
    assert_eq!(written["inputs"][0]["kind"], json!("file"));
}

#[test]
fn run_fails_on_missing_evaluations() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let args = AuthenticityEvaluateArgs {
        data_root: dir.path().to_path_buf(),
        evaluations_file: None,
        output: None,
    };

    let err = run(args).expect_err("missing evaluations should fail");

    assert!(err.to_string().contains("not found"));
}
