use super::*;

/// Where the extracted page values came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemSource {
    Markdown,
    Json,
    Unknown,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroundTruthFact {
    #[serde(default)]
    pub attribute: Value,
    #[serde(default)]
    pub value: Value,
    #[serde(flatten)]
    _extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default)]
pub struct GroundTruthFactPage {
    pub page: i64,
    pub facts: Vec<GroundTruthFact>,
}

/// Numbers found on one extracted page plus its normalized text, used for
/// the non-numeric fallback.
#[derive(Debug, Clone, Default)]
pub struct ExtractedPage {
    pub numbers: HashSet<Decimal>,
    pub text: String,
}

impl ExtractedPage {
    fn absorb_text(&mut self, raw: &str) {
        let normalized = normalize_text(raw);
        if normalized.is_empty() {
            return;
        }
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(&normalized);
    }

    /// Whole-token containment: `low` is found in `price is low` but not in `below`.
    pub fn contains_text(&self, normalized: &str) -> bool {
        if normalized.is_empty() || self.text.is_empty() {
            return false;
        }
        format!(" {} ", self.text).contains(&format!(" {normalized} "))
    }
}

#[derive(Debug, Clone)]
pub struct SystemFacts {
    pub source: SystemSource,
    pub pages: BTreeMap<i64, ExtractedPage>,
}

impl SystemFacts {
    fn unknown() -> Self {
        Self {
            source: SystemSource::Unknown,
            pages: BTreeMap::new(),
        }
    }
}

/// Fact pages of one payload: a list of pages, a single page object, or an
/// object whose `facts` list holds the pages.
fn ground_truth_entries(payload: Value, source: &Path) -> Vec<JsonObject> {
    match payload {
        Value::Array(items) => object_entries(items, source),
        Value::Object(mut object) => {
            if object.contains_key("page_number") {
                return vec![object];
            }
            match take_list(&mut object, &["facts"]) {
                Some(items) => object_entries(items, source),
                None => vec![object],
            }
        }
        _ => {
            warn!(path = %source.display(), "skipped fact payload that is neither a list nor an object");
            Vec::new()
        }
    }
}

pub fn load_ground_truth_facts(path: &Path) -> Result<Vec<GroundTruthFactPage>> {
    let mut pages = Vec::new();

    for (source, payload) in load_json_payloads(path)? {
        for mut entry in ground_truth_entries(payload, &source) {
            let Some(page) = parse_page_number(&entry) else {
                debug!(path = %source.display(), "skipped fact entry without page number");
                continue;
            };
            let items = take_list(&mut entry, &["facts"]).unwrap_or_default();
            let mut facts = Vec::with_capacity(items.len());
            for item in object_entries(items, &source) {
                facts.push(decode::<GroundTruthFact>(
                    Value::Object(item),
                    &source,
                    "ground-truth fact",
                )?);
            }
            pages.push(GroundTruthFactPage { page, facts });
        }
    }

    Ok(pages)
}

fn load_markdown_page(path: &Path, pages: &mut BTreeMap<i64, ExtractedPage>) -> Result<bool> {
    let Some(page) = page_number_from_path(path) else {
        warn!(path = %path.display(), "skipped markdown page without a page number in its name");
        return Ok(false);
    };
    let text = read_text(path)?;

    let extracted = pages.entry(page).or_default();
    extracted.numbers.extend(extract_decimals(&text));
    extracted.absorb_text(&text);
    Ok(true)
}

/// `[{page_number, facts: [{value}]}]` entries merged into `pages`.
fn merge_json_entries(items: Vec<Value>, source: &Path, pages: &mut BTreeMap<i64, ExtractedPage>) {
    for mut entry in object_entries(items, source) {
        let Some(page) = parse_page_number(&entry) else {
            debug!(path = %source.display(), "skipped extracted entry without page number");
            continue;
        };
        let extracted = pages.entry(page).or_default();
        for fact in object_entries(take_list(&mut entry, &["facts"]).unwrap_or_default(), source) {
            let value = fact.get("value").unwrap_or(&Value::Null);
            if let Some(number) = parse_decimal(value) {
                extracted.numbers.insert(number);
            }
            extracted.absorb_text(&value_text(value));
        }
    }
}

fn json_result_entries(payload: Value) -> Option<Vec<Value>> {
    match payload {
        Value::Array(items) => Some(items),
        Value::Object(mut object) => take_list(&mut object, &["results"]),
        _ => None,
    }
}

/// Markdown pages win over JSON pages when a directory holds both.
pub fn load_system_facts(path: &Path) -> Result<SystemFacts> {
    let mut pages = BTreeMap::new();

    if path.is_dir() {
        let markdown_files = list_files_with_extension(path, "md")?;
        if !markdown_files.is_empty() {
            for file in &markdown_files {
                load_markdown_page(file, &mut pages)?;
            }
            return Ok(SystemFacts {
                source: SystemSource::Markdown,
                pages,
            });
        }

        let json_files = list_files_with_extension(path, "json")?;
        if json_files.is_empty() {
            warn!(dir = %path.display(), "system output directory holds no markdown or json pages");
            return Ok(SystemFacts::unknown());
        }
        for file in &json_files {
            let payload = read_json(file)?;
            match json_result_entries(payload) {
                Some(items) => merge_json_entries(items, file, &mut pages),
                None => warn!(path = %file.display(), "skipped json file without a result list"),
            }
        }
        return Ok(SystemFacts {
            source: SystemSource::Json,
            pages,
        });
    }

    let is_markdown = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("md"))
        .unwrap_or(false);
    if is_markdown {
        if !load_markdown_page(path, &mut pages)? {
            bail!("cannot infer page number from markdown file name: {}", path.display());
        }
        return Ok(SystemFacts {
            source: SystemSource::Markdown,
            pages,
        });
    }

    match json_result_entries(read_json(path)?) {
        Some(items) => {
            merge_json_entries(items, path, &mut pages);
            Ok(SystemFacts {
                source: SystemSource::Json,
                pages,
            })
        }
        None => {
            warn!(path = %path.display(), "system output has no result list");
            Ok(SystemFacts::unknown())
        }
    }
}
