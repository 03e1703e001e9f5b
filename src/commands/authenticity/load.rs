use super::*;

#[derive(Debug, Clone, Default)]
pub struct RatedResponse {
    pub persona_id: Option<String>,
    pub scores: RatingScores,
}

impl RatedResponse {
    fn from_object(object: &JsonObject) -> Self {
        let persona_id = object
            .get("persona_id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(ToOwned::to_owned);
        let scores = match object.get("ratings") {
            Some(ratings @ Value::Object(_)) => RatingScores::from_ratings(ratings),
            _ => RatingScores::default(),
        };
        Self { persona_id, scores }
    }
}

/// Entries of one payload: `{test_questions: [...]}`, a list, or a single
/// rated object.
pub fn rated_entries(payload: Value, source: &Path) -> Vec<JsonObject> {
    match payload {
        Value::Array(items) => object_entries(items, source),
        Value::Object(mut object) => match take_list(&mut object, &["test_questions"]) {
            Some(items) => object_entries(items, source),
            None => vec![object],
        },
        _ => {
            warn!(path = %source.display(), "skipped evaluations payload that is neither a list nor an object");
            Vec::new()
        }
    }
}

/// Rated responses from a file or from every `*.json` file of a directory.
pub fn load_rated_responses(path: &Path) -> Result<Vec<RatedResponse>> {
    let mut responses = Vec::new();
    for (source, payload) in load_json_payloads(path)? {
        responses.extend(
            rated_entries(payload, &source)
                .iter()
                .map(RatedResponse::from_object),
        );
    }
    Ok(responses)
}
