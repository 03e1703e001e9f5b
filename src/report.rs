use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::loader::ensure_exists;
use crate::util::{list_files_with_extension, sha256_file, write_json_pretty};

const FINGERPRINT_EXTENSIONS: &[&str] = &["json", "md"];

/// A file or directory an evaluator reads.
#[derive(Debug, Clone)]
pub struct EvaluatorInput {
    pub label: &'static str,
    pub path: PathBuf,
}

impl EvaluatorInput {
    pub fn new(label: &'static str, path: &Path) -> Self {
        Self {
            label,
            path: path.to_path_buf(),
        }
    }
}

/// Human-readable lines echoed to stdout after a run.
pub trait Summary {
    fn summary_lines(&self) -> Vec<String>;
}

/// A stateless pass over input files that yields one report.
pub trait Evaluator {
    type Report: Serialize + Summary;

    fn name(&self) -> &'static str;

    fn title(&self) -> &'static str;

    fn inputs(&self) -> Vec<EvaluatorInput>;

    fn run_evaluation(&self) -> Result<Self::Report>;
}

#[derive(Debug, Clone, Serialize)]
pub struct FileDigest {
    pub name: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputFingerprint {
    pub label: String,
    pub path: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileDigest>,
}

#[derive(Debug, Serialize)]
pub struct ReportEnvelope<'a, R: Serialize> {
    pub evaluator: &'static str,
    pub tool_version: &'static str,
    pub inputs: Vec<InputFingerprint>,
    pub results: &'a R,
}

pub fn fingerprint_input(input: &EvaluatorInput) -> Result<InputFingerprint> {
    let path = input.path.display().to_string();

    if input.path.is_dir() {
        let mut files = Vec::new();
        for extension in FINGERPRINT_EXTENSIONS {
            for file in list_files_with_extension(&input.path, extension)? {
                let name = file
                    .file_name()
                    .and_then(|name| name.to_str())
                    .map(ToOwned::to_owned)
                    .unwrap_or_else(|| file.display().to_string());
                files.push(FileDigest {
                    name,
                    sha256: sha256_file(&file)?,
                });
            }
        }
        files.sort_by(|left, right| left.name.cmp(&right.name));

        return Ok(InputFingerprint {
            label: input.label.to_string(),
            path,
            kind: "directory".to_string(),
            sha256: None,
            files,
        });
    }

    Ok(InputFingerprint {
        label: input.label.to_string(),
        path,
        kind: "file".to_string(),
        sha256: Some(sha256_file(&input.path)?),
        files: Vec::new(),
    })
}

/// Checks inputs up front, runs the evaluator, writes the report envelope to
/// `output_path` and prints the summary.
pub fn run_evaluator<E: Evaluator>(evaluator: &E, output_path: &Path) -> Result<E::Report> {
    let inputs = evaluator.inputs();
    for input in &inputs {
        ensure_exists(&input.path, input.label)?;
    }

    info!(
        evaluator = evaluator.name(),
        inputs = inputs.len(),
        "evaluation started"
    );

    let report = evaluator.run_evaluation()?;

    let fingerprints = inputs
        .iter()
        .map(fingerprint_input)
        .collect::<Result<Vec<InputFingerprint>>>()?;

    let envelope = ReportEnvelope {
        evaluator: evaluator.name(),
        tool_version: env!("CARGO_PKG_VERSION"),
        inputs: fingerprints,
        results: &report,
    };
    write_json_pretty(output_path, &envelope)?;

    println!("{}", evaluator.title());
    for line in report.summary_lines() {
        println!("{line}");
    }
    println!("Results saved to {}", output_path.display());

    info!(
        evaluator = evaluator.name(),
        report_path = %output_path.display(),
        "evaluation completed"
    );

    Ok(report)
}
