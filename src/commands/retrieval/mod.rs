use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cli::RetrievalArgs;
use crate::loader::{JsonObject, object_entries, take_list};
use crate::normalize::value_text;
use crate::report::{Evaluator, EvaluatorInput, Summary, run_evaluator};
use crate::util::{format_percent, ratio, read_json};

mod evaluate;
mod load;
mod metrics;
mod run;
#[cfg(test)]
mod tests;

use self::evaluate::*;
use self::load::*;
use self::metrics::*;

pub use self::run::run;
