//! Turns whatever the scoring backend returned into the one canonical
//! shape the presentation layer consumes. Backend revisions disagree on
//! scales (0-1 vs 0-100), field names, and the breakdown container, so
//! everything here degrades instead of failing: a malformed field becomes
//! an absent value, never an error and never a silently wrong number.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The backend's response body, as received. Only guaranteed to be a keyed
/// JSON structure; the client rejects anything else before we get here.
pub type RawScoringResponse = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub name: String,
    pub value_percent: f64,
}

/// The only result shape the presentation layer ever sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalResult {
    /// Self-discipline score, 0-100.
    pub self_discipline_percent: f64,
    /// STEM-fit probability, 0-1.
    pub stem_fit_probability: f64,
    pub stem_fit_label: String,
    pub breakdown: Vec<BreakdownEntry>,
}

// Field aliases observed across backend revisions.
static SCORE_KEYS: &[&str] = &["self_discipline_score", "self_discipline"];
static PROBABILITY_KEYS: &[&str] = &["stem_fit_probability", "stem_probability", "confidence"];
static LABEL_KEYS: &[&str] = &["stem_fit_label", "prediction"];
static BREAKDOWN_KEYS: &[&str] = &["breakdown", "components"];

/// Canonical factor order for map-shaped breakdowns. Only keys actually
/// present are kept.
static FACTOR_ORDER: &[(&str, &str)] = &[
    ("study", "Study"),
    ("attendance", "Attendance"),
    ("gaming", "Gaming"),
    ("work", "Work"),
    ("academics", "Academics"),
];

/// Oldest revision: four discrete fields, fixed names and order.
static LEGACY_FIELDS: &[(&str, &str)] = &[
    ("study_component", "Study"),
    ("attendance_component", "Attendance"),
    ("gaming_component", "Gaming"),
    ("job_component", "Work"),
];

pub fn normalize(raw: &RawScoringResponse) -> CanonicalResult {
    let self_discipline_percent = normalize_score(first_number(raw, SCORE_KEYS));
    let stem_fit_probability = normalize_probability(first_number(raw, PROBABILITY_KEYS));

    let stem_fit_label = first_string(raw, LABEL_KEYS).unwrap_or_else(|| {
        if stem_fit_probability >= 0.5 {
            "STEM".to_string()
        } else {
            "non-STEM".to_string()
        }
    });

    CanonicalResult {
        self_discipline_percent,
        stem_fit_probability,
        stem_fit_label,
        breakdown: normalize_breakdown(raw),
    }
}

/// Raw values above 1 are already on the 0-100 scale; at or below 1 they
/// are fractions. Clamped to [0,100]; missing degrades to 0.
fn normalize_score(raw: Option<f64>) -> f64 {
    let value = match raw {
        Some(v) if v > 1.0 => v,
        Some(v) => v * 100.0,
        None => 0.0,
    };
    value.clamp(0.0, 100.0)
}

/// Raw values above 1 are percentages; at or below 1 they are already
/// probabilities. Clamped to [0,1]; missing degrades to 0.
fn normalize_probability(raw: Option<f64>) -> f64 {
    let value = match raw {
        Some(v) if v > 1.0 => v / 100.0,
        Some(v) => v,
        None => 0.0,
    };
    value.clamp(0.0, 1.0)
}

/// The three breakdown shapes the backend has shipped, in detection order.
enum BreakdownShape<'a> {
    /// Ordered list of {name, value} objects.
    Pairs(&'a Vec<Value>),
    /// name → value map, iterated in canonical factor order.
    NameMap(&'a Map<String, Value>),
    /// Four discrete top-level fields.
    Legacy,
}

fn detect_shape(raw: &RawScoringResponse) -> BreakdownShape<'_> {
    for key in BREAKDOWN_KEYS {
        match raw.get(*key) {
            Some(Value::Array(entries)) => return BreakdownShape::Pairs(entries),
            Some(Value::Object(map)) => return BreakdownShape::NameMap(map),
            _ => {}
        }
    }
    BreakdownShape::Legacy
}

/// Entries with a missing, non-numeric, or non-finite value are dropped,
/// never coerced to zero. Values are treated as already percent-scaled.
fn normalize_breakdown(raw: &RawScoringResponse) -> Vec<BreakdownEntry> {
    match detect_shape(raw) {
        BreakdownShape::Pairs(entries) => entries
            .iter()
            .filter_map(|entry| {
                let name = entry.get("name")?.as_str()?;
                let value = finite_number(entry.get("value")?)?;
                Some(BreakdownEntry {
                    name: name.to_string(),
                    value_percent: value.clamp(0.0, 100.0),
                })
            })
            .collect(),
        BreakdownShape::NameMap(map) => FACTOR_ORDER
            .iter()
            .filter_map(|(key, name)| {
                let value = map
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(key))
                    .and_then(|(_, v)| finite_number(v))?;
                Some(BreakdownEntry {
                    name: (*name).to_string(),
                    value_percent: value.clamp(0.0, 100.0),
                })
            })
            .collect(),
        BreakdownShape::Legacy => LEGACY_FIELDS
            .iter()
            .filter_map(|(field, name)| {
                let value = finite_number(raw.get(*field)?)?;
                Some(BreakdownEntry {
                    name: (*name).to_string(),
                    value_percent: value.clamp(0.0, 100.0),
                })
            })
            .collect(),
    }
}

fn finite_number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|n| n.is_finite())
}

fn first_number(raw: &RawScoringResponse, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .find_map(|key| raw.get(*key).and_then(finite_number))
}

fn first_string(raw: &RawScoringResponse, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| raw.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawScoringResponse {
        match value {
            Value::Object(map) => map,
            other => panic!("test fixture must be an object, got {}", other),
        }
    }

    #[test]
    fn test_score_fraction_scales_to_percent() {
        let result = normalize(&raw(json!({ "self_discipline_score": 0.42 })));
        assert_eq!(result.self_discipline_percent, 42.0);
    }

    #[test]
    fn test_score_above_one_is_already_percent() {
        let result = normalize(&raw(json!({ "self_discipline_score": 72.5 })));
        assert_eq!(result.self_discipline_percent, 72.5);
    }

    #[test]
    fn test_score_clamps_to_hundred() {
        let result = normalize(&raw(json!({ "self_discipline_score": 1.2 })));
        assert_eq!(result.self_discipline_percent, 100.0);

        let result = normalize(&raw(json!({ "self_discipline_score": 140 })));
        assert_eq!(result.self_discipline_percent, 100.0);
    }

    #[test]
    fn test_probability_percent_scales_down() {
        let result = normalize(&raw(json!({ "stem_fit_probability": 83 })));
        assert_eq!(result.stem_fit_probability, 0.83);
    }

    #[test]
    fn test_probability_fraction_used_as_is() {
        let result = normalize(&raw(json!({ "stem_fit_probability": 0.17 })));
        assert_eq!(result.stem_fit_probability, 0.17);
    }

    #[test]
    fn test_probability_alias_confidence() {
        let result = normalize(&raw(json!({ "confidence": 0.74 })));
        assert_eq!(result.stem_fit_probability, 0.74);
    }

    #[test]
    fn test_missing_fields_degrade_to_zero() {
        let result = normalize(&raw(json!({})));
        assert_eq!(result.self_discipline_percent, 0.0);
        assert_eq!(result.stem_fit_probability, 0.0);
        assert_eq!(result.stem_fit_label, "non-STEM");
        assert!(result.breakdown.is_empty());
    }

    #[test]
    fn test_label_passed_through() {
        let result = normalize(&raw(json!({
            "stem_fit_probability": 0.9,
            "stem_fit_label": "more likely STEM"
        })));
        assert_eq!(result.stem_fit_label, "more likely STEM");
    }

    #[test]
    fn test_label_alias_prediction() {
        let result = normalize(&raw(json!({ "prediction": "non-STEM" })));
        assert_eq!(result.stem_fit_label, "non-STEM");
    }

    #[test]
    fn test_label_derived_when_missing() {
        let result = normalize(&raw(json!({ "stem_fit_probability": 0.5 })));
        assert_eq!(result.stem_fit_label, "STEM");
    }

    #[test]
    fn test_breakdown_pairs_preserve_order() {
        let result = normalize(&raw(json!({
            "breakdown": [
                { "name": "Gaming", "value": 40.0 },
                { "name": "Study", "value": 60.0 }
            ]
        })));
        let names: Vec<_> = result.breakdown.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Gaming", "Study"]);
        assert_eq!(result.breakdown[0].value_percent, 40.0);
    }

    #[test]
    fn test_breakdown_pairs_drop_malformed_entries() {
        let result = normalize(&raw(json!({
            "breakdown": [
                { "name": "Study", "value": 60.0 },
                { "name": "Attendance" },
                { "name": "Gaming", "value": "high" },
                { "value": 10.0 }
            ]
        })));
        assert_eq!(result.breakdown.len(), 1);
        assert_eq!(result.breakdown[0].name, "Study");
    }

    #[test]
    fn test_breakdown_map_uses_canonical_order() {
        let result = normalize(&raw(json!({
            "components": { "gaming": 40.0, "study": 60.0, "academics": 75.0 }
        })));
        let names: Vec<_> = result.breakdown.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Study", "Gaming", "Academics"]);
    }

    #[test]
    fn test_breakdown_map_drops_non_numeric() {
        let result = normalize(&raw(json!({
            "components": { "study": "sixty", "work": 55.0 }
        })));
        assert_eq!(result.breakdown.len(), 1);
        assert_eq!(result.breakdown[0].name, "Work");
        assert_eq!(result.breakdown[0].value_percent, 55.0);
    }

    #[test]
    fn test_legacy_fields_in_fixed_order() {
        let result = normalize(&raw(json!({
            "study_component": 60,
            "attendance_component": 80,
            "gaming_component": 40,
            "job_component": 55
        })));
        let entries: Vec<_> = result
            .breakdown
            .iter()
            .map(|e| (e.name.as_str(), e.value_percent))
            .collect();
        assert_eq!(
            entries,
            vec![
                ("Study", 60.0),
                ("Attendance", 80.0),
                ("Gaming", 40.0),
                ("Work", 55.0)
            ]
        );
    }

    #[test]
    fn test_legacy_partial_fields_kept() {
        let result = normalize(&raw(json!({ "gaming_component": 40.0 })));
        assert_eq!(result.breakdown.len(), 1);
        assert_eq!(result.breakdown[0].name, "Gaming");
    }

    #[test]
    fn test_no_usable_breakdown_is_empty_not_error() {
        let result = normalize(&raw(json!({
            "self_discipline_score": 0.5,
            "breakdown": [{ "name": "Study", "value": "n/a" }]
        })));
        assert!(result.breakdown.is_empty());
    }

    #[test]
    fn test_breakdown_values_clamped() {
        let result = normalize(&raw(json!({
            "breakdown": [{ "name": "Study", "value": 130.0 }]
        })));
        assert_eq!(result.breakdown[0].value_percent, 100.0);
    }

    #[test]
    fn test_full_modern_response() {
        let result = normalize(&raw(json!({
            "self_discipline_score": 0.68,
            "stem_fit_probability": 0.74,
            "stem_fit_label": "more likely STEM",
            "components": { "study": 60.0, "attendance": 80.0, "gaming": 40.0, "work": 55.0 }
        })));
        assert_eq!(result.self_discipline_percent, 68.0);
        assert_eq!(result.stem_fit_probability, 0.74);
        assert_eq!(result.breakdown.len(), 4);
    }
}
