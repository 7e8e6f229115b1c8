use super::*;
use crate::retriever::Candidate;
use serde_json::json;

fn metadata(value: serde_json::Value) -> Metadata {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn legacy_record() -> Metadata {
    metadata(json!({
        "name": "Java 8 (New)",
        "url": "https://example.com/catalog/java-8-new/",
        "description": "Multi-choice test that measures knowledge of Java class design.",
        "duration": "18.0",
        "test_type": "['Knowledge & Skills']",
        "remote_support": "Yes",
    }))
}

#[test]
fn test_legacy_test_type_string_is_split() {
    let record = metadata(json!({
        "name": "X",
        "url": "https://example.com/x",
        "test_type": "['A','B']",
    }));

    let canonical = normalize_metadata(&record).unwrap();
    assert_eq!(canonical.test_type, vec!["A", "B"]);
}

#[test]
fn test_legacy_test_type_with_double_quotes_and_spaces() {
    assert_eq!(
        split_legacy_list(r#"[ "Personality & Behavior" ,  "Simulations", '' ]"#),
        vec!["Personality & Behavior", "Simulations"]
    );
}

#[test]
fn test_structured_test_type_passes_through() {
    let value = json!(["Knowledge & Skills", "Simulations"]);
    assert_eq!(
        coerce_test_types(Some(&value)).unwrap(),
        vec!["Knowledge & Skills", "Simulations"]
    );
}

#[test]
fn test_scalar_test_type_becomes_single_element_list() {
    assert_eq!(coerce_test_types(Some(&json!("Competencies"))).unwrap(), vec!["Competencies"]);
    assert_eq!(coerce_test_types(Some(&json!(7))).unwrap(), vec!["7"]);
    assert!(coerce_test_types(None).unwrap().is_empty());
    assert!(coerce_test_types(Some(&json!("[]"))).unwrap().is_empty());
}

#[test]
fn test_object_test_type_is_malformed() {
    let err = coerce_test_types(Some(&json!({"code": "K"}))).unwrap_err();
    assert_eq!(
        err,
        NormalizeError::UnsupportedShape {
            field: "test_type",
            found: "object"
        }
    );
}

#[test]
fn test_duration_coercion() {
    assert_eq!(coerce_duration(Some(&json!("7.0"))), 7);
    assert_eq!(coerce_duration(Some(&json!("30.9"))), 30);
    assert_eq!(coerce_duration(Some(&json!(" 45 "))), 45);
    assert_eq!(coerce_duration(Some(&json!(12))), 12);
    assert_eq!(coerce_duration(Some(&json!(12.75))), 12);
}

#[test]
fn test_duration_defaults_to_zero() {
    assert_eq!(coerce_duration(None), 0);
    assert_eq!(coerce_duration(Some(&Value::Null)), 0);
    assert_eq!(coerce_duration(Some(&json!(""))), 0);
    assert_eq!(coerce_duration(Some(&json!("about 20 minutes"))), 0);
    assert_eq!(coerce_duration(Some(&json!("-5"))), 0);
    assert_eq!(coerce_duration(Some(&json!("NaN"))), 0);
    assert_eq!(coerce_duration(Some(&json!(true))), 0);
}

#[test]
fn test_support_flags_default_to_no() {
    let record = metadata(json!({"name": "X", "url": "https://example.com/x"}));
    let canonical = normalize_metadata(&record).unwrap();

    assert_eq!(canonical.remote_support, "No");
    assert_eq!(canonical.adaptive_support, "No");
}

#[test]
fn test_support_flag_spellings() {
    assert_eq!(coerce_support(Some(&json!(true))), "Yes");
    assert_eq!(coerce_support(Some(&json!("yes"))), "Yes");
    assert_eq!(coerce_support(Some(&json!(" Y "))), "Yes");
    assert_eq!(coerce_support(Some(&json!("TRUE"))), "Yes");
    assert_eq!(coerce_support(Some(&json!(1))), "Yes");
    assert_eq!(coerce_support(Some(&json!(false))), "No");
    assert_eq!(coerce_support(Some(&json!("No"))), "No");
    assert_eq!(coerce_support(Some(&json!(""))), "No");
    assert_eq!(coerce_support(Some(&json!(0))), "No");
}

#[test]
fn test_missing_url_is_malformed() {
    let record = metadata(json!({"name": "X"}));
    assert_eq!(
        normalize_metadata(&record).unwrap_err(),
        NormalizeError::MissingField { field: "url" }
    );
}

#[test]
fn test_blank_name_is_malformed() {
    let record = metadata(json!({"name": "   ", "url": "https://example.com/x"}));
    assert_eq!(
        normalize_metadata(&record).unwrap_err(),
        NormalizeError::MissingField { field: "name" }
    );
}

#[test]
fn test_full_legacy_record() {
    let canonical = normalize_metadata(&legacy_record()).unwrap();

    assert_eq!(
        canonical,
        CanonicalRecommendation {
            url: "https://example.com/catalog/java-8-new/".to_string(),
            name: "Java 8 (New)".to_string(),
            adaptive_support: "No".to_string(),
            description: "Multi-choice test that measures knowledge of Java class design."
                .to_string(),
            duration: 18,
            remote_support: "Yes".to_string(),
            test_type: vec!["Knowledge & Skills".to_string()],
        }
    );
}

#[test]
fn test_normalize_is_idempotent_on_canonical_record() {
    let once = normalize_metadata(&legacy_record()).unwrap();
    let twice = normalize_metadata(&once.to_metadata()).unwrap();

    assert_eq!(once, twice);
}

#[test]
fn test_serialized_field_order() {
    let canonical = normalize_metadata(&legacy_record()).unwrap();
    let json = serde_json::to_string(&canonical).unwrap();

    let order: Vec<usize> = [
        "\"url\"",
        "\"name\"",
        "\"adaptive_support\"",
        "\"description\"",
        "\"duration\"",
        "\"remote_support\"",
        "\"test_type\"",
    ]
    .iter()
    .map(|key| json.find(key).expect("key present"))
    .collect();

    assert!(order.windows(2).all(|w| w[0] < w[1]), "{json}");
}

#[test]
fn test_normalize_recommendation_uses_candidate_metadata() {
    let recommendation = Recommendation {
        rank: 1,
        candidate: Candidate {
            id: "abc".to_string(),
            ordinal: 0,
            document: "Name: Java 8 (New).".to_string(),
            metadata: legacy_record(),
            distance: 0.12,
        },
    };

    let canonical = normalize(&recommendation).unwrap();
    assert_eq!(canonical.name, "Java 8 (New)");
    assert_eq!(canonical.duration, 18);
}
