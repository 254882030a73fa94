//! Picking the best recording and pulling album, year and genre out of it

use serde::Serialize;
use serde_json::Value;

/// Fields a recording can contribute; empty means "no override"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Enrichment {
    pub album: String,
    pub year: String,
    pub genre: String,
}

impl Enrichment {
    pub fn is_empty(&self) -> bool {
        self.album.is_empty() && self.year.is_empty() && self.genre.is_empty()
    }
}

/// Highest-scoring candidate; ties go to the earliest one
pub fn select_best(candidates: Vec<Value>) -> Option<Value> {
    let mut best: Option<(i64, Value)> = None;
    for candidate in candidates {
        let score = int_field(&candidate, "score");
        if best.as_ref().map_or(true, |(top, _)| score > *top) {
            best = Some((score, candidate));
        }
    }
    best.map(|(_, candidate)| candidate)
}

/// Album and year from the preferred release, genre from the most-voted tag
pub fn extract(recording: &Value) -> Enrichment {
    let mut enrichment = Enrichment::default();

    // Official releases first, then albums; the first such release wins
    if let Some(release) = list(recording, "releases", "release-list")
        .iter()
        .min_by_key(|r| {
            (
                str_field(r, "status") != Some("Official"),
                primary_type(r) != Some("Album"),
            )
        })
    {
        enrichment.album = str_field(release, "title").unwrap_or_default().to_string();
        enrichment.year = str_field(release, "date")
            .map(|d| d.chars().take(4).collect())
            .unwrap_or_default();
    }

    let mut top_tag: Option<(i64, &str)> = None;
    for tag in list(recording, "tags", "tag-list") {
        let count = int_field(tag, "count");
        if top_tag.map_or(true, |(top, _)| count > top) {
            top_tag = Some((count, str_field(tag, "name").unwrap_or_default()));
        }
    }
    if let Some((_, name)) = top_tag {
        enrichment.genre = title_case(name);
    }

    enrichment
}

/// Capitalize the first letter of every run of letters, lowercase the rest
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// The JSON web service uses `releases`/`tags`; older cache entries used `*-list`
fn list<'a>(value: &'a Value, key: &str, legacy_key: &str) -> &'a [Value] {
    value
        .get(key)
        .or_else(|| value.get(legacy_key))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn primary_type(release: &Value) -> Option<&str> {
    release
        .pointer("/release-group/primary-type")
        .and_then(Value::as_str)
        .or_else(|| str_field(release, "primary-type"))
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

/// Integer field that may arrive as a number or a numeric string; anything else is 0
fn int_field(value: &Value, key: &str) -> i64 {
    match value.get(key) {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}
