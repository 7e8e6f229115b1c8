//! Catalog fixtures shared by integration tests.

use std::io::Write;
use std::path::{Path, PathBuf};

use recommender::normalize::Metadata;
use recommender::{Assessment, catalog};

/// Axis keywords for `MockEmbedder`; one per fixture assessment.
pub const KEYWORDS: [&str; 3] = ["java", "teamwork", "sales"];

/// Three assessments with distinct embeddings: X (java), Y (teamwork), Z (sales).
pub const XYZ_CSV: &str = "\
name,url,description,duration,test_type,remote_support,adaptive_support
Java Programming,https://example.com/x-java,Core Java knowledge.,7.0,\"['K']\",Yes,No
Team Collaboration,https://example.com/y-team,Measures teamwork.,20,\"['P', 'C']\",yes,true
Sales Aptitude,https://example.com/z-sales,Closing deals.,,\"['A']\",No,No
";

pub fn write_catalog(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::File::create(&path)
        .unwrap()
        .write_all(contents.as_bytes())
        .unwrap();
    path
}

pub fn xyz() -> Vec<Assessment> {
    catalog::read_csv_rows(XYZ_CSV.as_bytes())
        .map(catalog::assessments_from_rows)
        .unwrap()
        .assessments
}

/// `count` assessments under `https://example.com/{prefix}-{i}`, all mentioning java.
pub fn generated(prefix: &str, count: usize) -> Vec<Assessment> {
    let rows: Vec<Metadata> = (0..count)
        .map(|i| {
            serde_json::json!({
                "name": format!("{prefix} java {i}"),
                "url": format!("https://example.com/{prefix}-{i}"),
                "description": "Java skills.",
                "test_type": ["K"],
            })
            .as_object()
            .cloned()
            .unwrap()
        })
        .collect();
    catalog::assessments_from_rows(rows).assessments
}
