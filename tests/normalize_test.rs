use playlens::gemini::extract::{JsonShape, extract_payload, repair_json};
use playlens::gemini::normalize::{
    is_error_marker, normalize_analysis, normalize_recommendations,
};
use playlens::types::{INCOMPLETE_FIELD, Intensity, NOT_SPECIFIED};
use serde_json::{Value, json};

fn analysis_of(value: Value) -> playlens::types::PlaylistAnalysis {
    normalize_analysis(value.as_object().unwrap())
}

#[test]
fn test_fenced_reply_fills_schema_defaults() {
    // A fenced reply carrying only general_description normalizes to a
    // record with every other mandatory field defaulted.
    let raw = "Here you go:\n```json\n{\"general_description\": \"x\"}\n```";
    let payload = extract_payload(raw, JsonShape::Object).unwrap();
    let value: Value = serde_json::from_str(&repair_json(&payload)).unwrap();
    let analysis = analysis_of(value);

    assert_eq!(analysis.general_description, "x");
    assert_eq!(analysis.bpm_range.min, 80.0);
    assert_eq!(analysis.bpm_range.most_common, 120.0);
    assert_eq!(analysis.bpm_range.max, 160.0);
    assert!(analysis.instruments.is_empty());
    assert!(analysis.key_distribution.is_empty());
    assert_eq!(analysis.mood_description, INCOMPLETE_FIELD);
    assert_eq!(analysis.genre_analysis, INCOMPLETE_FIELD);
    assert_eq!(analysis.decade_profile, None);
}

#[test]
fn test_bpm_min_above_most_common_is_widened() {
    let analysis = analysis_of(json!({
        "bpm_range": {"min": 150, "most_common": 120, "max": 160}
    }));
    assert_eq!(analysis.bpm_range.min, 100.0);
    assert_eq!(analysis.bpm_range.most_common, 120.0);
    assert_eq!(analysis.bpm_range.max, 160.0);
}

#[test]
fn test_bpm_max_below_most_common_is_widened() {
    let analysis = analysis_of(json!({
        "bpm_range": {"min": 100, "most_common": 140, "max": 120}
    }));
    assert_eq!(analysis.bpm_range.max, 160.0);
}

#[test]
fn test_bpm_equal_bounds_widen_in_both_directions() {
    let analysis = analysis_of(json!({
        "bpm_range": {"min": 120, "most_common": 120, "max": 120}
    }));
    assert_eq!(analysis.bpm_range.min, 100.0);
    assert_eq!(analysis.bpm_range.max, 140.0);
}

#[test]
fn test_bpm_min_clamped_at_zero() {
    let analysis = analysis_of(json!({
        "bpm_range": {"min": 10, "most_common": 10, "max": 10}
    }));
    assert_eq!(analysis.bpm_range.min, 0.0);
    assert_eq!(analysis.bpm_range.max, 30.0);
}

#[test]
fn test_bpm_invariant_holds_after_normalization() {
    let cases = [
        json!({"bpm_range": {"min": 150, "most_common": 120, "max": 100}}),
        json!({"bpm_range": {"min": "90", "most_common": "abc", "max": 60}}),
        json!({"bpm_range": {}}),
        json!({"bpm_range": "fast"}),
        json!({}),
    ];
    for case in cases {
        let bpm = analysis_of(case).bpm_range;
        assert!(bpm.min <= bpm.most_common, "min > most_common: {:?}", bpm);
        assert!(bpm.most_common <= bpm.max, "most_common > max: {:?}", bpm);
        assert!(bpm.min >= 0.0);
    }
}

#[test]
fn test_bpm_numeric_strings_coerced() {
    let analysis = analysis_of(json!({
        "bpm_range": {"min": "90", "most_common": "115", "max": "142"}
    }));
    assert_eq!(analysis.bpm_range.min, 90.0);
    assert_eq!(analysis.bpm_range.most_common, 115.0);
    assert_eq!(analysis.bpm_range.max, 142.0);
}

#[test]
fn test_instrument_intensities_normalize_to_enum() {
    let analysis = analysis_of(json!({
        "instruments": {
            "Guitar": "HIGH",
            "Bass": "low",
            "Drums": "Medium",
            "Synth": "overwhelming",
            "Piano": 3,
            "Strings": 42,
            "Flute": ["?"]
        }
    }));

    assert_eq!(analysis.instruments["Guitar"], Intensity::High);
    assert_eq!(analysis.instruments["Bass"], Intensity::Low);
    assert_eq!(analysis.instruments["Drums"], Intensity::Medium);
    // Unrecognized strings and out-of-range numerics default to medium
    assert_eq!(analysis.instruments["Synth"], Intensity::Medium);
    assert_eq!(analysis.instruments["Piano"], Intensity::High);
    assert_eq!(analysis.instruments["Strings"], Intensity::Medium);
    assert_eq!(analysis.instruments["Flute"], Intensity::Medium);
}

#[test]
fn test_key_distribution_counts_coerced() {
    let analysis = analysis_of(json!({
        "key_distribution": {
            "A Minor": 3,
            "C Major": "5",
            "D Minor": "several",
            "E Major": -2,
            "F Major": 2.7
        }
    }));

    assert_eq!(analysis.key_distribution["A Minor"], 3);
    assert_eq!(analysis.key_distribution["C Major"], 5);
    // Non-numeric values count once
    assert_eq!(analysis.key_distribution["D Minor"], 1);
    // Negative counts clamp to zero
    assert_eq!(analysis.key_distribution["E Major"], 0);
    assert_eq!(analysis.key_distribution["F Major"], 2);
}

#[test]
fn test_error_marker_detected() {
    let value = json!({"error": "Gemini unavailable. Using fallback response."});
    assert!(is_error_marker(value.as_object().unwrap()));

    let value = json!({"general_description": "x"});
    assert!(!is_error_marker(value.as_object().unwrap()));
}

#[test]
fn test_recommendations_missing_comma_scenario() {
    // Two adjacent object literals with the comma missing normalize to a
    // 2-element list with placeholder-filled fields.
    let raw = "[{\"title\":\"A\"}{\"title\":\"B\"}]";
    let payload = extract_payload(raw, JsonShape::Array).unwrap();
    let value: Value = serde_json::from_str(&repair_json(&payload)).unwrap();
    let recommendations = normalize_recommendations(&value).unwrap();

    assert_eq!(recommendations.len(), 2);
    assert_eq!(recommendations[0].title, "A");
    assert_eq!(recommendations[1].title, "B");
    for rec in &recommendations {
        assert_eq!(rec.artist, NOT_SPECIFIED);
        assert_eq!(rec.reasoning, NOT_SPECIFIED);
        assert_eq!(rec.spotify_url, NOT_SPECIFIED);
        assert!(rec.attributes.is_empty());
    }
}

#[test]
fn test_recommendations_every_field_non_null() {
    let value = json!([
        {"title": "Song", "artist": "Band", "reasoning": "Fits the mood",
         "attributes": {"tempo": "120 BPM", "key": "A Minor"},
         "spotify_url": "https://open.spotify.com/track/x"},
        {"artist": "Only Artist"},
        {}
    ]);

    let recommendations = normalize_recommendations(&value).unwrap();
    assert_eq!(recommendations.len(), 3);
    for rec in &recommendations {
        assert!(!rec.title.is_empty());
        assert!(!rec.artist.is_empty());
        assert!(!rec.reasoning.is_empty());
        assert!(!rec.spotify_url.is_empty());
    }
    assert_eq!(recommendations[0].attributes["tempo"], "120 BPM");
}

#[test]
fn test_recommendations_non_objects_dropped() {
    let value = json!([
        "just a string",
        42,
        {"title": "Kept"},
        null,
        ["nested", "array"]
    ]);

    let recommendations = normalize_recommendations(&value).unwrap();
    assert_eq!(recommendations.len(), 1);
    assert_eq!(recommendations[0].title, "Kept");
}

#[test]
fn test_recommendations_error_entries_dropped() {
    let value = json!([{"error": "Failed to parse recommendations."}]);
    let recommendations = normalize_recommendations(&value).unwrap();
    assert!(recommendations.is_empty());
}

#[test]
fn test_recommendations_rejects_non_array() {
    assert!(normalize_recommendations(&json!({"title": "A"})).is_none());
    assert!(normalize_recommendations(&json!("text")).is_none());
}

#[test]
fn test_recommendation_attribute_values_stringified() {
    let value = json!([
        {"title": "Song", "attributes": {
            "tempo": 128,
            "instruments": ["guitar", "bass"],
            "acoustic": true
        }}
    ]);

    let recommendations = normalize_recommendations(&value).unwrap();
    let attributes = &recommendations[0].attributes;
    assert_eq!(attributes["tempo"], "128");
    assert_eq!(attributes["instruments"], "guitar, bass");
    assert_eq!(attributes["acoustic"], "true");
}

#[test]
fn test_whitespace_only_text_fields_get_sentinel() {
    let analysis = analysis_of(json!({
        "general_description": "   ",
        "mood_description": 7
    }));
    assert_eq!(analysis.general_description, INCOMPLETE_FIELD);
    assert_eq!(analysis.mood_description, INCOMPLETE_FIELD);
}

#[test]
fn test_decade_profile_passthrough() {
    let analysis = analysis_of(json!({
        "decade_profile": "Mostly 1980s synth-pop"
    }));
    assert_eq!(
        analysis.decade_profile.as_deref(),
        Some("Mostly 1980s synth-pop")
    );
}
