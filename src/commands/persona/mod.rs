use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::cli::PersonaArgs;
use crate::loader::{
    JsonObject, decode, load_json_payloads, object_entries, parse_page_number, take_list,
};
use crate::matcher::MetricMatcher;
use crate::model::{IndicatorRecord, MetricEntry, UnmatchedMetric, null_as_default};
use crate::normalize::{slugify_persona_id, value_text};
use crate::report::{Evaluator, EvaluatorInput, Summary, run_evaluator};
use crate::util::{format_percent, ratio};

mod evaluate;
mod load;
mod run;

use self::evaluate::*;
use self::load::*;

pub use self::run::run;
