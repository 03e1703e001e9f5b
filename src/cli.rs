use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::similarity::DEFAULT_WORD_OVERLAP_THRESHOLD;

pub const DEFAULT_DATA_ROOT: &str = "data/evaluation";

#[derive(Parser, Debug)]
#[command(
    name = "persona-eval",
    version,
    about = "Extraction quality evaluation against curated ground truth"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score persona detection and metric extraction per page.
    Persona(PersonaArgs),
    /// Score page fact values against extracted markdown or JSON pages.
    Facts(FactsArgs),
    /// Score ranked retrieval with precision@k and recall@k.
    Retrieval(RetrievalArgs),
    /// Build rating templates and aggregate rated responses.
    Authenticity(AuthenticityArgs),
}

#[derive(Args, Debug, Clone)]
pub struct PersonaArgs {
    #[arg(long, default_value = DEFAULT_DATA_ROOT)]
    pub data_root: PathBuf,

    #[arg(long)]
    pub ground_truth_dir: Option<PathBuf>,

    #[arg(long)]
    pub system_output: Option<PathBuf>,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_WORD_OVERLAP_THRESHOLD, value_parser = parse_threshold)]
    pub threshold: f64,
}

impl PersonaArgs {
    pub fn ground_truth_path(&self) -> PathBuf {
        resolve(
            &self.ground_truth_dir,
            &self.data_root,
            "persona_extraction/ground_truth",
        )
    }

    pub fn system_output_path(&self) -> PathBuf {
        resolve(
            &self.system_output,
            &self.data_root,
            "persona_extraction/system_output",
        )
    }

    pub fn output_path(&self) -> PathBuf {
        resolve(
            &self.output,
            &self.data_root,
            "persona_extraction/evaluation_results.json",
        )
    }
}

#[derive(Args, Debug, Clone)]
pub struct FactsArgs {
    #[arg(long, default_value = DEFAULT_DATA_ROOT)]
    pub data_root: PathBuf,

    #[arg(long)]
    pub ground_truth_file: Option<PathBuf>,

    #[arg(long)]
    pub system_output: Option<PathBuf>,

    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl FactsArgs {
    pub fn ground_truth_path(&self) -> PathBuf {
        resolve(
            &self.ground_truth_file,
            &self.data_root,
            "fact_extraction/ground_truth/facts_ground_truth.json",
        )
    }

    pub fn system_output_path(&self) -> PathBuf {
        resolve(
            &self.system_output,
            &self.data_root,
            "fact_extraction/system_output/extraction_results.json",
        )
    }

    pub fn output_path(&self) -> PathBuf {
        resolve(
            &self.output,
            &self.data_root,
            "fact_extraction/evaluation_results.json",
        )
    }
}

#[derive(Args, Debug, Clone)]
pub struct RetrievalArgs {
    #[arg(long, default_value = DEFAULT_DATA_ROOT)]
    pub data_root: PathBuf,

    #[arg(long)]
    pub ground_truth: Option<PathBuf>,

    /// Per-query results keyed by `query_id`; inline labeled documents are used when absent.
    #[arg(long)]
    pub system_output: Option<PathBuf>,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = [3, 5, 10, 20],
        value_parser = parse_positive_k
    )]
    pub k_values: Vec<usize>,
}

impl RetrievalArgs {
    pub fn ground_truth_path(&self) -> PathBuf {
        resolve(
            &self.ground_truth,
            &self.data_root,
            "rag_retrieval/ground_truth/test_queries.json",
        )
    }

    /// Explicit paths are always used; the default only when it exists.
    pub fn system_output_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.system_output {
            return Some(path.clone());
        }
        let default = self
            .data_root
            .join("rag_retrieval/system_output/retrieval_results.json");
        default.exists().then_some(default)
    }

    pub fn output_path(&self) -> PathBuf {
        resolve(
            &self.output,
            &self.data_root,
            "rag_retrieval/evaluation_results.json",
        )
    }
}

#[derive(Args, Debug, Clone)]
pub struct AuthenticityArgs {
    #[command(subcommand)]
    pub command: AuthenticityCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum AuthenticityCommands {
    /// Expand test questions across personas into an unrated template.
    Generate(AuthenticityGenerateArgs),
    /// Aggregate rated responses into overall and per-persona scores.
    Evaluate(AuthenticityEvaluateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct AuthenticityGenerateArgs {
    #[arg(long, default_value = DEFAULT_DATA_ROOT)]
    pub data_root: PathBuf,

    #[arg(long)]
    pub questions_file: Option<PathBuf>,

    /// Directory of persona profiles; `*.json` stems are persona ids.
    #[arg(long, default_value = "data/processed/personas/individual")]
    pub persona_dir: PathBuf,

    #[arg(long, value_delimiter = ',', value_parser = parse_persona_id)]
    pub persona_ids: Vec<String>,

    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl AuthenticityGenerateArgs {
    pub fn questions_path(&self) -> PathBuf {
        resolve(
            &self.questions_file,
            &self.data_root,
            "authenticity/test_questions.json",
        )
    }

    pub fn output_path(&self) -> PathBuf {
        resolve(
            &self.output,
            &self.data_root,
            "authenticity/system_output/generated_responses.json",
        )
    }
}

#[derive(Args, Debug, Clone)]
pub struct AuthenticityEvaluateArgs {
    #[arg(long, default_value = DEFAULT_DATA_ROOT)]
    pub data_root: PathBuf,

    #[arg(long)]
    pub evaluations_file: Option<PathBuf>,

    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl AuthenticityEvaluateArgs {
    pub fn evaluations_path(&self) -> PathBuf {
        resolve(
            &self.evaluations_file,
            &self.data_root,
            "authenticity/system_output/generated_responses.json",
        )
    }

    pub fn output_path(&self) -> PathBuf {
        resolve(
            &self.output,
            &self.data_root,
            "authenticity/evaluation_results.json",
        )
    }
}

fn resolve(explicit: &Option<PathBuf>, data_root: &Path, default: &str) -> PathBuf {
    explicit
        .clone()
        .unwrap_or_else(|| data_root.join(default))
}

fn parse_threshold(raw: &str) -> Result<f64, String> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid threshold `{raw}`: {err}"))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("threshold must be within [0, 1], got {value}"));
    }
    Ok(value)
}

fn parse_positive_k(raw: &str) -> Result<usize, String> {
    let value = raw
        .trim()
        .parse::<usize>()
        .map_err(|err| format!("invalid k value `{raw}`: {err}"))?;
    if value == 0 {
        return Err("k values must be positive".to_string());
    }
    Ok(value)
}

fn parse_persona_id(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("persona ids cannot be empty".to_string());
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retrieval_k_values_parse_comma_separated() {
        let cli = Cli::try_parse_from(["persona-eval", "retrieval", "--k-values", "1,2, 5"])
            .expect("k values should parse");
        match cli.command {
            Commands::Retrieval(args) => assert_eq!(args.k_values, vec![1, 2, 5]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn retrieval_k_values_default_to_standard_cutoffs() {
        let cli = Cli::try_parse_from(["persona-eval", "retrieval"]).expect("defaults parse");
        match cli.command {
            Commands::Retrieval(args) => assert_eq!(args.k_values, vec![3, 5, 10, 20]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn zero_k_value_is_rejected() {
        assert!(Cli::try_parse_from(["persona-eval", "retrieval", "--k-values", "0,3"]).is_err());
    }

    #[test]
    fn threshold_outside_unit_interval_is_rejected() {
        assert!(Cli::try_parse_from(["persona-eval", "persona", "--threshold", "1.5"]).is_err());
        assert!(Cli::try_parse_from(["persona-eval", "persona", "--threshold", "-0.1"]).is_err());
    }

    #[test]
    fn persona_paths_default_under_data_root() {
        let cli = Cli::try_parse_from(["persona-eval", "persona", "--data-root", "/tmp/eval"])
            .expect("persona args parse");
        let Commands::Persona(args) = cli.command else {
            panic!("expected persona command");
        };
        assert_eq!(args.threshold, 0.5);
        assert_eq!(
            args.ground_truth_path(),
            PathBuf::from("/tmp/eval/persona_extraction/ground_truth")
        );
        assert_eq!(
            args.output_path(),
            PathBuf::from("/tmp/eval/persona_extraction/evaluation_results.json")
        );
    }

    #[test]
    fn explicit_paths_override_data_root() {
        let cli = Cli::try_parse_from([
            "persona-eval",
            "facts",
            "--ground-truth-file",
            "gt.json",
            "--system-output",
            "pages",
        ])
        .expect("facts args parse");
        let Commands::Facts(args) = cli.command else {
            panic!("expected facts command");
        };
        assert_eq!(args.ground_truth_path(), PathBuf::from("gt.json"));
        assert_eq!(args.system_output_path(), PathBuf::from("pages"));
    }

    #[test]
    fn retrieval_results_default_is_optional() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let root = dir.path().to_string_lossy().to_string();
        let cli = Cli::try_parse_from(["persona-eval", "retrieval", "--data-root", root.as_str()])
            .expect("retrieval args parse");
        let Commands::Retrieval(args) = cli.command else {
            panic!("expected retrieval command");
        };
        assert_eq!(args.system_output_path(), None);
    }

    #[test]
    fn authenticity_generate_splits_persona_ids() {
        let cli = Cli::try_parse_from([
            "persona-eval",
            "authenticity",
            "generate",
            "--persona-ids",
            "alex,sam",
        ])
        .expect("generate args parse");
        let Commands::Authenticity(AuthenticityArgs {
            command: AuthenticityCommands::Generate(args),
        }) = cli.command
        else {
            panic!("expected authenticity generate");
        };
        assert_eq!(args.persona_ids, vec!["alex".to_string(), "sam".to_string()]);
    }
}
