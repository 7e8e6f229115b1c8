use super::*;
use crate::normalize::{Metadata, NormalizeError};
use serde_json::json;
use std::io::Write;
use tempfile::TempDir;

const CSV_CATALOG: &str = "\
name,url,description,duration,test_type,remote_support,adaptive_support
Java 8 (New),https://example.com/java-8/,Measures Java knowledge.,18.0,['Knowledge & Skills'],Yes,No
OPQ32r,https://example.com/opq32r/,Workplace personality.,25,\"['P', 'Personality & Behavior']\",Yes,Yes
,https://example.com/nameless/,Row without a name.,10,['K'],No,No
Verify G+,https://example.com/verify-g/,General ability.,36,['A'],yes,
";

fn row(value: serde_json::Value) -> Metadata {
    value.as_object().cloned().expect("object")
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn test_test_type_parses_codes_and_labels() {
    assert_eq!(TestType::parse("K"), Some(TestType::KnowledgeSkills));
    assert_eq!(TestType::parse("p"), Some(TestType::PersonalityBehavior));
    assert_eq!(
        TestType::parse("biodata & situational judgement"),
        Some(TestType::BiodataSituationalJudgement)
    );
    assert_eq!(TestType::parse(" Simulations "), Some(TestType::Simulations));
    assert_eq!(TestType::parse("Z"), None);
    assert_eq!(TestType::parse("Leadership"), None);
}

#[test]
fn test_test_type_code_label_round_trip() {
    for t in TestType::ALL {
        assert_eq!(TestType::parse(&t.code().to_string()), Some(t));
        assert_eq!(TestType::parse(t.label()), Some(t));
        assert_eq!(t.to_string(), t.label());
    }
}

#[test]
fn test_from_row_coerces_fields() {
    let assessment = Assessment::from_row(
        3,
        &row(json!({
            "name": " Java 8 (New) ",
            "url": "https://example.com/java-8/",
            "description": "Measures Java knowledge.",
            "duration": "18.0",
            "test_type": "['K', 'Knowledge & Skills', 'S']",
            "remote_support": "Yes",
        })),
    )
    .unwrap();

    assert_eq!(assessment.name, "Java 8 (New)");
    assert_eq!(assessment.ordinal, 3);
    assert_eq!(assessment.duration, 18);
    assert_eq!(
        assessment.test_type,
        vec![TestType::KnowledgeSkills, TestType::Simulations]
    );
    assert!(assessment.remote_support);
    assert!(!assessment.adaptive_support);
    assert_eq!(
        assessment.id,
        crate::hashing::assessment_id("https://example.com/java-8/")
    );
}

#[test]
fn test_from_row_rejects_unknown_label() {
    let err = Assessment::from_row(
        0,
        &row(json!({"name": "X", "url": "https://example.com/x", "test_type": ["Leadership"]})),
    )
    .unwrap_err();

    assert_eq!(
        err,
        RowRejection::UnknownTestType {
            label: "Leadership".to_string()
        }
    );
}

#[test]
fn test_from_row_requires_url() {
    let err = Assessment::from_row(0, &row(json!({"name": "X"}))).unwrap_err();
    assert_eq!(
        err,
        RowRejection::Malformed(NormalizeError::MissingField { field: "url" })
    );
}

#[test]
fn test_to_metadata_is_canonical() {
    let assessment = Assessment::from_row(
        0,
        &row(json!({
            "name": "OPQ32r",
            "url": "https://example.com/opq32r/",
            "duration": 25,
            "test_type": ["P"],
            "adaptive_support": true,
        })),
    )
    .unwrap();

    let metadata = assessment.to_metadata();
    assert_eq!(metadata["test_type"], json!(["Personality & Behavior"]));
    assert_eq!(metadata["duration"], json!(25));
    assert_eq!(metadata["remote_support"], json!("No"));
    assert_eq!(metadata["adaptive_support"], json!("Yes"));
    assert_eq!(metadata["description"], json!(""));
}

#[test]
fn test_assessments_from_rows_reports_duplicates_and_keeps_order() {
    let load = assessments_from_rows(vec![
        row(json!({"name": "A", "url": "https://example.com/a"})),
        row(json!({"name": "B", "url": "https://example.com/b"})),
        row(json!({"name": "A again", "url": "https://example.com/a"})),
        row(json!({"name": "C", "url": "https://example.com/c"})),
    ]);

    let names: Vec<_> = load.assessments.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B", "C"]);
    let ordinals: Vec<_> = load.assessments.iter().map(|a| a.ordinal).collect();
    assert_eq!(ordinals, vec![0, 1, 2]);

    assert_eq!(load.rejected.len(), 1);
    assert_eq!(load.rejected[0].row, 3);
    assert_eq!(load.rejected[0].name.as_deref(), Some("A again"));
    assert_eq!(
        load.rejected[0].reason,
        RowRejection::DuplicateUrl { first_row: 1 }
    );
    assert_eq!(load.rows(), 4);
}

#[test]
fn test_load_csv_catalog() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "catalog.csv", CSV_CATALOG);

    let load = load_catalog(&path).unwrap();

    assert_eq!(load.assessments.len(), 3);
    assert_eq!(load.rejected.len(), 1);
    assert_eq!(load.rejected[0].row, 3);
    assert_eq!(
        load.rejected[0].reason,
        RowRejection::Malformed(NormalizeError::MissingField { field: "name" })
    );

    let opq = &load.assessments[1];
    assert_eq!(opq.name, "OPQ32r");
    assert_eq!(opq.test_type, vec![TestType::PersonalityBehavior]);
    assert!(opq.adaptive_support);

    let verify = &load.assessments[2];
    assert!(verify.remote_support);
    assert!(!verify.adaptive_support);
    assert_eq!(verify.ordinal, 2);
}

#[test]
fn test_load_json_catalog() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "catalog.json",
        r#"[
            {"Name": "Java 8 (New)", "URL": "https://example.com/java-8/", "duration": 18, "test_type": ["K"]},
            {"name": "Broken"}
        ]"#,
    );

    let load = load_catalog(&path).unwrap();
    assert_eq!(load.assessments.len(), 1);
    assert_eq!(load.assessments[0].test_type, vec![TestType::KnowledgeSkills]);
    assert_eq!(load.rejected.len(), 1);
}

#[test]
fn test_missing_catalog_is_data_not_found() {
    let dir = TempDir::new().unwrap();
    let err = load_catalog(&dir.path().join("missing.csv")).unwrap_err();
    assert!(matches!(err, CatalogError::DataNotFound { .. }));
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "catalog.xlsx", "binary");
    let err = load_catalog(&path).unwrap_err();
    assert!(matches!(err, CatalogError::UnsupportedFormat { .. }));
}

#[test]
fn test_json_catalog_must_be_array_of_objects() {
    let err = read_json_rows(r#"{"name": "X"}"#.as_bytes()).unwrap_err();
    assert!(matches!(err, CatalogError::Shape { .. }));

    let err = read_json_rows(r#"[1, 2]"#.as_bytes()).unwrap_err();
    assert!(matches!(err, CatalogError::Shape { .. }));
}

#[test]
fn test_empty_catalog_loads_cleanly() {
    let rows = read_csv_rows(
        "name,url,description,duration,test_type,remote_support,adaptive_support\n".as_bytes(),
    )
    .unwrap();
    let load = assessments_from_rows(rows);
    assert!(load.assessments.is_empty());
    assert!(load.rejected.is_empty());
}
