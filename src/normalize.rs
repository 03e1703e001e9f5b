//! Canonical forms for free text, numbers and units.
//!
//! Everything the matcher compares goes through this module first so that
//! `"Capsules"` and `"cap"`, `"USD"` and `"$"`, or `"2,500"` and `2500.0`
//! compare equal without any fuzzy tolerance on the numeric side.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]+").expect("NON_WORD regex is invalid"));
static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("NUMBER regex is invalid"));
static INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+").expect("INTEGER regex is invalid"));

/// Word variants folded onto one token before overlap scoring.
pub const WORD_SYNONYMS: &[(&str, &str)] = &[
    ("cap", "capsule"),
    ("caps", "capsule"),
    ("capsule", "capsule"),
    ("capsules", "capsule"),
];

/// First entry of each group is the canonical spelling.
const UNIT_SYNONYM_GROUPS: &[&[&str]] = &[
    &["%", "percentage", "percent"],
    &["index", "idx"],
    &["€", "euro", "eur"],
    &["$", "dollar", "usd"],
    &["£", "pound", "gbp"],
    &["¥", "yen", "jpy"],
    &["₹", "rupee", "inr"],
    &["₩", "won", "krw"],
    &["₽", "ruble", "rub"],
    &["₺", "lira", "try"],
    &["₫", "dong", "vnd"],
    &["₱", "peso", "php"],
    &["₦", "naira", "ngn"],
    &["₴", "hryvnia", "uah"],
    &["₡", "colon", "crc"],
    &["₲", "guarani", "pyg"],
    &["₵", "cedi", "ghc"],
    &["₸", "tenge", "kzt"],
    &["₼", "manat", "azn"],
];

static UNIT_SYNONYMS: LazyLock<HashMap<String, String>> = LazyLock::new(|| {
    let mut mapping = HashMap::new();
    for group in UNIT_SYNONYM_GROUPS {
        let canonical = group[0].to_lowercase();
        for unit in *group {
            mapping.insert(unit.to_lowercase(), canonical.clone());
        }
    }
    mapping
});

/// Lower-cases, replaces punctuation runs with a space and collapses whitespace.
pub fn normalize_text(input: &str) -> String {
    let lowered = input.to_lowercase();
    let cleaned = NON_WORD.replace_all(&lowered, " ");
    cleaned.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// [`normalize_text`] plus folding of [`WORD_SYNONYMS`] variants.
pub fn normalize_match_text(input: &str) -> String {
    let cleaned = normalize_text(input);
    if cleaned.is_empty() {
        return cleaned;
    }

    cleaned
        .split(' ')
        .map(canonical_token)
        .collect::<Vec<&str>>()
        .join(" ")
}

fn canonical_token(token: &str) -> &str {
    WORD_SYNONYMS
        .iter()
        .find(|(variant, _)| *variant == token)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(token)
}

/// Canonical unit; the empty string means "no unit" and acts as a wildcard
/// on the ground-truth side.
pub fn normalize_unit(unit: &Value) -> String {
    let raw = match unit {
        Value::Null => return String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    normalize_unit_str(&raw)
}

pub fn normalize_unit_str(unit: &str) -> String {
    let cleaned = unit
        .trim()
        .to_lowercase()
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect::<String>();
    if cleaned.is_empty() {
        return cleaned;
    }

    UNIT_SYNONYMS.get(&cleaned).cloned().unwrap_or(cleaned)
}

/// Slug used when a system persona only carries a display name.
pub fn slugify_persona_id(name: &str) -> String {
    normalize_text(name).replace(' ', "-")
}

/// Exact decimal kept as a canonical literal: no leading integer zeros,
/// no trailing fraction zeros, no negative zero. Equality is textual, so
/// `2`, `2.0` and `"2.00"` are equal while `0.1` and `0.10000001` are not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Decimal(String);

impl Decimal {
    fn from_literal(literal: &str) -> Option<Self> {
        let (negative, unsigned) = match literal.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, literal),
        };
        let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        if integer.is_empty() || !integer.chars().all(|ch| ch.is_ascii_digit()) {
            return None;
        }
        if !fraction.chars().all(|ch| ch.is_ascii_digit()) {
            return None;
        }

        let integer = integer.trim_start_matches('0');
        let integer = if integer.is_empty() { "0" } else { integer };
        let fraction = fraction.trim_end_matches('0');

        let is_zero = integer == "0" && fraction.is_empty();
        let mut canonical = String::with_capacity(literal.len());
        if negative && !is_zero {
            canonical.push('-');
        }
        canonical.push_str(integer);
        if !fraction.is_empty() {
            canonical.push('.');
            canonical.push_str(fraction);
        }
        Some(Self(canonical))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Numbers parse directly; strings yield their first numeric literal after
/// thousands separators are removed. Anything else is not a number.
pub fn parse_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => {
            if let Some(integer) = number.as_i64() {
                return Decimal::from_literal(&integer.to_string());
            }
            if let Some(integer) = number.as_u64() {
                return Decimal::from_literal(&integer.to_string());
            }
            let float = number.as_f64()?;
            if !float.is_finite() {
                return None;
            }
            // f64 Display is the shortest round-trip form and never uses an exponent.
            Decimal::from_literal(&float.to_string())
        }
        Value::String(text) => parse_decimal_str(text),
        _ => None,
    }
}

pub fn parse_decimal_str(text: &str) -> Option<Decimal> {
    let cleaned = text.replace(',', "");
    NUMBER
        .find(&cleaned)
        .and_then(|found| Decimal::from_literal(found.as_str()))
}

/// Every numeric literal in free text, in reading order.
pub fn extract_decimals(text: &str) -> Vec<Decimal> {
    let cleaned = text.replace(',', "");
    NUMBER
        .find_iter(&cleaned)
        .filter_map(|found| Decimal::from_literal(found.as_str()))
        .collect()
}

pub fn first_integer(text: &str) -> Option<i64> {
    INTEGER
        .find(text)
        .and_then(|found| found.as_str().parse::<i64>().ok())
}

/// Text form of a loosely typed value, used by the non-numeric fallbacks.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
