use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::cli::{AuthenticityEvaluateArgs, AuthenticityGenerateArgs};
use crate::loader::{JsonObject, ensure_exists, load_json_payloads, object_entries, take_list};
use crate::report::{Evaluator, EvaluatorInput, Summary, run_evaluator};
use crate::util::{list_files_with_extension, mean, now_utc_string, read_json, write_json_pretty};

mod evaluate;
mod generate;
mod load;
mod run;
mod scores;
#[cfg(test)]
mod tests;

use self::evaluate::*;
use self::load::*;
use self::scores::*;

pub use self::generate::generate;
pub use self::run::run;
