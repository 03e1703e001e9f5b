use super::*;

const QUERY_LIST_KEYS: &[&str] = &["test_queries", "results"];
const RETRIEVED_KEYS: &[&str] = &["retrieved_indicators", "retrieved_docs", "retrieved_documents"];
const INLINE_DOC_KEYS: &[&str] = &["relevant_docs", "retrieved_docs"];
const IDENTITY_KEYS: &[&str] = &["id", "doc_id", "page_content"];

/// Identity used to compare retrieved and relevant items: strings as-is,
/// numbers by their text, documents by `id`/`doc_id`/`page_content`, and
/// anything else by its JSON text.
pub fn item_key(item: &Value) -> String {
    match item {
        Value::String(text) => text.clone(),
        Value::Object(object) => IDENTITY_KEYS
            .iter()
            .filter_map(|key| object.get(*key))
            .find(|value| !value.is_null())
            .map(value_text)
            .unwrap_or_else(|| item.to_string()),
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map(|score| score != 0.0).unwrap_or(false),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(object) => !object.is_empty(),
    }
}

fn label_is_one(doc: &JsonObject, key: &str) -> Option<bool> {
    doc.get(key)
        .filter(|value| !value.is_null())
        .map(|value| value.as_f64() == Some(1.0))
}

/// One query's ranked list with the relevant subset, ready for scoring.
#[derive(Debug, Clone, Default)]
pub struct RankedQuery {
    pub query_id: String,
    pub query: Value,
    pub retrieved: Vec<String>,
    pub relevant: Vec<String>,
    pub unlabeled: usize,
}

#[derive(Debug, Clone)]
pub struct QueryRecord {
    pub query_id: String,
    pub query: Value,
    fields: JsonObject,
}

impl QueryRecord {
    pub fn new(mut fields: JsonObject) -> Self {
        let query_id = fields.get("query_id").map(value_text).unwrap_or_default();
        let query = fields.remove("query").unwrap_or(Value::Null);
        Self {
            query_id,
            query,
            fields,
        }
    }

    fn list(&self, key: &str) -> Option<&Vec<Value>> {
        self.fields.get(key).and_then(Value::as_array)
    }

    /// Labeled documents carried on the query itself.
    pub fn inline_docs(&self) -> Option<&Vec<Value>> {
        INLINE_DOC_KEYS.iter().find_map(|key| self.list(key))
    }

    /// Relevance-labeled ranking: each document is relevant when `relevance`
    /// or `relevance_label` equals 1; documents carrying neither are counted
    /// as unlabeled.
    pub fn ranked_from_inline(&self, docs: &[Value]) -> RankedQuery {
        let mut ranked = RankedQuery {
            query_id: self.query_id.clone(),
            query: self.query.clone(),
            ..RankedQuery::default()
        };

        for (index, doc) in docs.iter().enumerate() {
            let Value::Object(object) = doc else {
                ranked.retrieved.push(item_key(doc));
                ranked.unlabeled += 1;
                continue;
            };

            let key = object
                .get("page_content")
                .filter(|value| !value.is_null())
                .map(value_text)
                .unwrap_or_else(|| index.to_string());

            let relevance = label_is_one(object, "relevance");
            let relevance_label = label_is_one(object, "relevance_label");
            if relevance.is_none() && relevance_label.is_none() {
                ranked.unlabeled += 1;
            }
            if relevance == Some(true) || relevance_label == Some(true) {
                ranked.relevant.push(key.clone());
            }
            ranked.retrieved.push(key);
        }

        ranked
    }

    /// Relevant ids for results-file mode. A `relevant_docs` object carrying
    /// a relevance label counts only when that label is 1.
    pub fn relevant_ids(&self) -> Vec<String> {
        if let Some(ids) = self.list("relevant_indicators") {
            return ids.iter().map(item_key).collect();
        }
        if let Some(docs) = self.list("relevant_docs") {
            return docs
                .iter()
                .filter(|doc| match doc {
                    Value::Object(object) => {
                        let relevance = label_is_one(object, "relevance");
                        let relevance_label = label_is_one(object, "relevance_label");
                        (relevance.is_none() && relevance_label.is_none())
                            || relevance == Some(true)
                            || relevance_label == Some(true)
                    }
                    _ => true,
                })
                .map(item_key)
                .collect();
        }
        if let Some(Value::Object(scores)) = self.fields.get("relevance_scores") {
            return scores
                .iter()
                .filter(|(_, score)| is_truthy(score))
                .map(|(key, _)| key.clone())
                .collect();
        }
        Vec::new()
    }

    pub fn ranked_from_results(&self, retrieved: &[String]) -> RankedQuery {
        RankedQuery {
            query_id: self.query_id.clone(),
            query: self.query.clone(),
            retrieved: retrieved.to_vec(),
            relevant: self.relevant_ids(),
            unlabeled: 0,
        }
    }
}

pub fn load_queries(path: &Path) -> Result<Vec<QueryRecord>> {
    let items = match read_json(path)? {
        Value::Array(items) => items,
        Value::Object(mut object) => match take_list(&mut object, QUERY_LIST_KEYS) {
            Some(items) => items,
            None => {
                warn!(path = %path.display(), "query file holds no query list");
                Vec::new()
            }
        },
        _ => {
            warn!(path = %path.display(), "query file is neither a list nor an object");
            Vec::new()
        }
    };

    Ok(object_entries(items, path)
        .into_iter()
        .map(QueryRecord::new)
        .collect())
}

/// Retrieved item keys per query id.
pub fn load_retrieval_results(path: &Path) -> Result<HashMap<String, Vec<String>>> {
    let items = match read_json(path)? {
        Value::Array(items) => items,
        Value::Object(mut object) => take_list(&mut object, &["results"]).unwrap_or_default(),
        _ => Vec::new(),
    };

    let mut results = HashMap::new();
    for entry in object_entries(items, path) {
        let query_id = entry.get("query_id").map(value_text).unwrap_or_default();
        if query_id.is_empty() {
            debug!(path = %path.display(), "skipped result entry without query_id");
            continue;
        }
        let Some(key) = RETRIEVED_KEYS.iter().find(|key| entry.contains_key(**key)) else {
            debug!(query_id = %query_id, "skipped result entry without retrieved items");
            continue;
        };
        match entry.get(*key) {
            Some(Value::Array(retrieved)) => {
                results.insert(query_id, retrieved.iter().map(item_key).collect());
            }
            _ => debug!(query_id = %query_id, key = *key, "retrieved items are not a list"),
        }
    }

    Ok(results)
}
