//! Semantic defaulting: turns parsed but untrusted JSON into fully-typed
//! records. The functions here never fail; every missing or malformed field
//! is replaced by a type-appropriate neutral default, so callers always
//! receive a complete record and never a raw parser error.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::types::{
    BpmRange, INCOMPLETE_FIELD, Intensity, NOT_SPECIFIED, PlaylistAnalysis, Recommendation,
};

/// Outcome of a normalization round trip: either a record recovered from an
/// actual model reply, or the hardcoded fallback used after the retry
/// ceiling was exhausted. Callers never see a partially-typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized<T> {
    Parsed(T),
    Fallback(T),
}

impl<T> Normalized<T> {
    pub fn value(&self) -> &T {
        match self {
            Normalized::Parsed(v) | Normalized::Fallback(v) => v,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Normalized::Parsed(v) | Normalized::Fallback(v) => v,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Normalized::Fallback(_))
    }
}

/// True for the degenerate error-shaped payload (`{"error": ...}`) that the
/// fallback responder emits and that a confused model sometimes echoes.
pub fn is_error_marker(map: &Map<String, Value>) -> bool {
    map.contains_key("error")
}

/// Validates and defaults a parsed object into a [`PlaylistAnalysis`].
///
/// Every mandatory field is synthesized when absent: text fields get the
/// incomplete sentinel, mapping fields an empty map, and the bpm sub-object
/// per-key defaults of 80/120/160. The bpm ordering invariant
/// `min <= most_common <= max` is enforced by widening violated bounds.
pub fn normalize_analysis(map: &Map<String, Value>) -> PlaylistAnalysis {
    PlaylistAnalysis {
        general_description: text_field(map, "general_description"),
        bpm_range: normalize_bpm(map.get("bpm_range")),
        instruments: normalize_instruments(map.get("instruments")),
        key_distribution: normalize_key_distribution(map.get("key_distribution")),
        mood_description: text_field(map, "mood_description"),
        genre_analysis: text_field(map, "genre_analysis"),
        decade_profile: map
            .get("decade_profile")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

fn text_field(map: &Map<String, Value>, key: &str) -> String {
    match map.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        _ => INCOMPLETE_FIELD.to_string(),
    }
}

/// Numbers pass through; numeric strings are parsed; anything else is None.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn normalize_bpm(value: Option<&Value>) -> BpmRange {
    let defaults = BpmRange::default();
    let map = match value.and_then(Value::as_object) {
        Some(map) => map,
        None => return defaults,
    };

    let field = |key: &str, default: f64| {
        map.get(key).and_then(coerce_number).unwrap_or(default)
    };

    let mut min = field("min", defaults.min);
    let most_common = field("most_common", defaults.most_common);
    let mut max = field("max", defaults.max);

    // Widen whichever bound violates min <= most_common <= max rather than
    // failing on a contradictory reply.
    if min > most_common {
        min = most_common - 20.0;
    }
    if max < most_common {
        max = most_common + 20.0;
    }
    if min == max {
        min -= 20.0;
        max += 20.0;
    }
    if min < 0.0 {
        min = 0.0;
    }

    BpmRange {
        min,
        most_common,
        max,
    }
}

fn normalize_instruments(value: Option<&Value>) -> BTreeMap<String, Intensity> {
    let mut instruments = BTreeMap::new();
    if let Some(map) = value.and_then(Value::as_object) {
        for (name, raw) in map {
            instruments.insert(name.clone(), normalize_intensity(raw));
        }
    }
    instruments
}

/// Case-insensitive mapping through the three-level enum; in-range numerics
/// (1-3) are accepted, everything else defaults to medium.
fn normalize_intensity(value: &Value) -> Intensity {
    match value {
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "low" => Intensity::Low,
            "medium" => Intensity::Medium,
            "high" => Intensity::High,
            _ => Intensity::Medium,
        },
        Value::Number(n) => match n.as_u64() {
            Some(1) => Intensity::Low,
            Some(2) => Intensity::Medium,
            Some(3) => Intensity::High,
            _ => Intensity::Medium,
        },
        _ => Intensity::Medium,
    }
}

fn normalize_key_distribution(value: Option<&Value>) -> BTreeMap<String, u64> {
    let mut keys = BTreeMap::new();
    if let Some(map) = value.and_then(Value::as_object) {
        for (key, raw) in map {
            // Counts coerce to non-negative integers; non-numeric values
            // count as a single occurrence.
            let count = match coerce_number(raw) {
                Some(n) if n >= 0.0 => n as u64,
                Some(_) => 0,
                None => 1,
            };
            keys.insert(key.clone(), count);
        }
    }
    keys
}

/// Validates and defaults a parsed array into a recommendation list.
///
/// Returns `None` when the value is not an array at all (the caller retries
/// the round trip). Elements that are not objects are dropped, as are pure
/// error markers; any missing field on a surviving element is filled with a
/// placeholder rather than dropping the record.
pub fn normalize_recommendations(value: &Value) -> Option<Vec<Recommendation>> {
    let items = value.as_array()?;

    let recommendations = items
        .iter()
        .filter_map(Value::as_object)
        .filter(|map| !is_error_marker(map))
        .map(normalize_recommendation)
        .collect();

    Some(recommendations)
}

fn normalize_recommendation(map: &Map<String, Value>) -> Recommendation {
    let placeholder = |key: &str| match map.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        _ => NOT_SPECIFIED.to_string(),
    };

    Recommendation {
        title: placeholder("title"),
        artist: placeholder("artist"),
        reasoning: placeholder("reasoning"),
        attributes: normalize_attributes(map.get("attributes")),
        spotify_url: placeholder("spotify_url"),
    }
}

fn normalize_attributes(value: Option<&Value>) -> BTreeMap<String, String> {
    let mut attributes = BTreeMap::new();
    if let Some(map) = value.and_then(Value::as_object) {
        for (key, raw) in map {
            attributes.insert(key.clone(), stringify(raw));
        }
    }
    attributes
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(stringify)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
