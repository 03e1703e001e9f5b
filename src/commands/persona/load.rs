use super::*;

const PAGE_LIST_KEYS: &[&str] = &["pages", "page_results"];

/// Hand-curated expectations for one page.
#[derive(Debug, Clone, Default)]
pub struct GroundTruthPage {
    pub page: i64,
    pub personas: BTreeSet<String>,
    pub metrics: Vec<MetricEntry>,
}

/// What the extraction pipeline produced for one page.
#[derive(Debug, Clone, Default)]
pub struct SystemOutputPage {
    pub personas: BTreeSet<String>,
    pub metrics: Vec<MetricEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct GroundTruthBlock {
    #[serde(default, deserialize_with = "null_as_default")]
    personas: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    indicators: Vec<IndicatorRecord>,
    #[serde(flatten)]
    _extra: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ParsedPersona {
    #[serde(default)]
    persona_id: Value,
    #[serde(default)]
    persona_name: Value,
    #[serde(default, deserialize_with = "null_as_default")]
    indicators: Vec<IndicatorRecord>,
    #[serde(flatten)]
    _extra: Map<String, Value>,
}

/// Persona ids may be written as strings or bare numbers; null, empty and
/// structured values carry no id.
fn persona_id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => {
            let id = value_text(value).trim().to_string();
            (!id.is_empty()).then_some(id)
        }
        _ => None,
    }
}

impl ParsedPersona {
    /// Explicit id first, then a slug of the display name.
    fn resolved_id(&self) -> Option<String> {
        if let Some(id) = persona_id_text(&self.persona_id) {
            return Some(id);
        }
        persona_id_text(&self.persona_name)
            .map(|name| slugify_persona_id(&name))
            .filter(|slug| !slug.is_empty())
    }
}

#[derive(Debug, Default, Deserialize)]
struct ParsedPage {
    #[serde(default, deserialize_with = "null_as_default")]
    personas: Vec<ParsedPersona>,
    #[serde(flatten)]
    _extra: Map<String, Value>,
}

/// Page objects of one payload: a list of pages, an object holding one under
/// `pages`/`page_results`, or a single page object.
fn page_entries(payload: Value, source: &Path) -> Vec<JsonObject> {
    match payload {
        Value::Array(items) => object_entries(items, source),
        Value::Object(mut object) => match take_list(&mut object, PAGE_LIST_KEYS) {
            Some(items) => object_entries(items, source),
            None => vec![object],
        },
        _ => {
            warn!(path = %source.display(), "skipped payload that is neither a list nor an object");
            Vec::new()
        }
    }
}

/// Pages carrying a `ground_truth` block and a page number, in file order.
pub fn load_ground_truth_pages(path: &Path) -> Result<Vec<GroundTruthPage>> {
    let mut pages = Vec::new();

    for (source, payload) in load_json_payloads(path)? {
        for mut entry in page_entries(payload, &source) {
            let Some(page) = parse_page_number(&entry) else {
                debug!(path = %source.display(), "skipped ground-truth entry without page number");
                continue;
            };
            let block = match entry.remove("ground_truth") {
                None => {
                    debug!(path = %source.display(), page, "skipped entry without ground_truth");
                    continue;
                }
                Some(Value::Null) => GroundTruthBlock::default(),
                Some(value) => decode::<GroundTruthBlock>(value, &source, "persona ground truth")?,
            };

            let mut personas = BTreeSet::new();
            for value in &block.personas {
                match persona_id_text(value) {
                    Some(id) => {
                        personas.insert(id);
                    }
                    None => {
                        warn!(path = %source.display(), page, persona = %value, "skipped ground-truth persona without a usable id");
                    }
                }
            }

            pages.push(GroundTruthPage {
                page,
                personas,
                metrics: MetricEntry::flatten_indicators(&block.indicators),
            });
        }
    }

    Ok(pages)
}

/// System pages keyed by page number; a later entry for the same page
/// replaces the earlier one.
pub fn load_system_pages(path: &Path) -> Result<BTreeMap<i64, SystemOutputPage>> {
    let mut pages = BTreeMap::new();

    for (source, payload) in load_json_payloads(path)? {
        for mut entry in page_entries(payload, &source) {
            let Some(page) = parse_page_number(&entry) else {
                debug!(path = %source.display(), "skipped system entry without page number");
                continue;
            };
            let parsed = match entry.remove("parsed") {
                Some(value @ Value::Object(_)) => {
                    decode::<ParsedPage>(value, &source, "parsed persona page")?
                }
                _ => {
                    debug!(path = %source.display(), page, "skipped system entry without parsed object");
                    continue;
                }
            };

            let mut personas = BTreeSet::new();
            let mut metrics = Vec::new();
            for persona in &parsed.personas {
                match persona.resolved_id() {
                    Some(id) => {
                        personas.insert(id);
                    }
                    None => {
                        warn!(path = %source.display(), page, "skipped system persona without a usable id");
                    }
                }
                metrics.extend(MetricEntry::flatten_indicators(&persona.indicators));
            }

            if pages
                .insert(page, SystemOutputPage { personas, metrics })
                .is_some()
            {
                debug!(path = %source.display(), page, "system page replaced an earlier entry");
            }
        }
    }

    Ok(pages)
}
