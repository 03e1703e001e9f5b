use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::cli::FactsArgs;
use crate::loader::{
    JsonObject, decode, load_json_payloads, object_entries, page_number_from_path,
    parse_page_number, take_list,
};
use crate::normalize::{Decimal, extract_decimals, normalize_text, parse_decimal, value_text};
use crate::report::{Evaluator, EvaluatorInput, Summary, run_evaluator};
use crate::util::{format_percent, list_files_with_extension, ratio, read_json, read_text};

mod evaluate;
mod load;
mod run;

use self::evaluate::*;
use self::load::*;

pub use self::run::run;
