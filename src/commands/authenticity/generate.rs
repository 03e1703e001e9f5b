use super::*;

/// A test question before it is expanded across personas.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionEntry {
    pub query: String,
    pub category: Value,
    pub persona_id: Option<String>,
}

impl QuestionEntry {
    fn from_item(item: &Value, category: &Value) -> Option<Self> {
        match item {
            Value::String(query) if !query.is_empty() => Some(Self {
                query: query.clone(),
                category: category.clone(),
                persona_id: None,
            }),
            Value::Object(object) => {
                let query = ["query", "question"]
                    .iter()
                    .filter_map(|key| object.get(*key).and_then(Value::as_str))
                    .find(|query| !query.is_empty())?;
                let category = match object.get("category") {
                    Some(value) if !value.is_null() => value.clone(),
                    _ => category.clone(),
                };
                let persona_id = object
                    .get("persona_id")
                    .and_then(Value::as_str)
                    .filter(|id| !id.is_empty())
                    .map(ToOwned::to_owned);
                Some(Self {
                    query: query.to_string(),
                    category,
                    persona_id,
                })
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TemplateRatings {
    pub authenticity: Option<Value>,
    pub style_alignment: Option<Value>,
    pub factual_grounding: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateEntry {
    pub persona_id: String,
    pub query: String,
    pub category: Value,
    pub response: Option<String>,
    pub ratings: TemplateRatings,
}

#[derive(Debug, Clone, Serialize)]
pub struct RatingTemplate {
    pub generated_at: String,
    pub test_questions: Vec<TemplateEntry>,
}

/// Accepts `{test_questions: [...]}`, an object of category → questions, or
/// a list of strings or `{query|question, category, persona_id}` objects.
pub fn question_entries(payload: Value, source: &Path) -> Result<Vec<QuestionEntry>> {
    let payload = match payload {
        Value::Object(mut object) => match take_list(&mut object, &["test_questions"]) {
            Some(items) => Value::Array(items),
            None => Value::Object(object),
        },
        other => other,
    };

    match payload {
        Value::Array(items) => Ok(items
            .iter()
            .filter_map(|item| QuestionEntry::from_item(item, &Value::Null))
            .collect()),
        Value::Object(categories) => {
            let mut entries = Vec::new();
            for (category, items) in &categories {
                let Value::Array(items) = items else {
                    continue;
                };
                let category = Value::String(category.clone());
                entries.extend(
                    items
                        .iter()
                        .filter_map(|item| QuestionEntry::from_item(item, &category)),
                );
            }
            Ok(entries)
        }
        _ => bail!("unsupported test questions format in {}", source.display()),
    }
}

/// Explicit ids first, then ids named by the questions, then the profile
/// file stems under `persona_dir`.
pub fn resolve_persona_ids(
    entries: &[QuestionEntry],
    persona_dir: &Path,
    explicit: &[String],
) -> Result<Vec<String>> {
    if !explicit.is_empty() {
        return Ok(explicit.to_vec());
    }

    let from_entries = entries
        .iter()
        .filter_map(|entry| entry.persona_id.clone())
        .collect::<BTreeSet<String>>();
    if !from_entries.is_empty() {
        return Ok(from_entries.into_iter().collect());
    }

    ensure_exists(persona_dir, "persona dir")?;
    let ids = list_files_with_extension(persona_dir, "json")?
        .iter()
        .filter_map(|path| path.file_stem().and_then(|stem| stem.to_str()))
        .map(ToOwned::to_owned)
        .collect::<Vec<String>>();
    if ids.is_empty() {
        bail!("no persona profiles found in {}", persona_dir.display());
    }
    Ok(ids)
}

/// Questions pinned to a persona stay with it; the rest fan out to every id.
pub fn expand_questions(entries: &[QuestionEntry], persona_ids: &[String]) -> Vec<TemplateEntry> {
    let mut expanded = Vec::new();
    for entry in entries {
        let targets = match &entry.persona_id {
            Some(persona_id) => std::slice::from_ref(persona_id),
            None => persona_ids,
        };
        for persona_id in targets {
            expanded.push(TemplateEntry {
                persona_id: persona_id.clone(),
                query: entry.query.clone(),
                category: entry.category.clone(),
                response: None,
                ratings: TemplateRatings::default(),
            });
        }
    }
    expanded
}

pub fn generate(args: AuthenticityGenerateArgs) -> Result<()> {
    let questions_path = args.questions_path();
    ensure_exists(&questions_path, "questions file")?;

    let entries = question_entries(read_json(&questions_path)?, &questions_path)?;
    let persona_ids = resolve_persona_ids(&entries, &args.persona_dir, &args.persona_ids)?;
    let test_questions = expand_questions(&entries, &persona_ids);

    info!(
        questions = entries.len(),
        personas = persona_ids.len(),
        templates = test_questions.len(),
        "expanded test questions"
    );

    let output_path = args.output_path();
    if output_path.exists() {
        warn!(path = %output_path.display(), "overwriting existing responses file");
    }
    let template = RatingTemplate {
        generated_at: now_utc_string(),
        test_questions,
    };
    write_json_pretty(&output_path, &template)?;

    println!(
        "Generated {} rating templates saved to {}",
        template.test_questions.len(),
        output_path.display()
    );
    info!(path = %output_path.display(), "wrote rating template");

    Ok(())
}
