use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use super::assessment::Assessment;
use super::error::{CatalogError, RowRejection};
use crate::normalize::Metadata;

/// A catalog row that was not indexed, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    /// 1-based data row (header excluded).
    pub row: usize,
    /// Raw `name` cell, when present.
    pub name: Option<String>,
    pub reason: RowRejection,
}

/// Result of reading a catalog snapshot.
#[derive(Debug, Clone, Default)]
pub struct CatalogLoad {
    pub assessments: Vec<Assessment>,
    pub rejected: Vec<RejectedRow>,
}

impl CatalogLoad {
    /// Total rows seen.
    pub fn rows(&self) -> usize {
        self.assessments.len() + self.rejected.len()
    }
}

/// Reads a `.csv` or `.json` catalog file.
pub fn load_catalog(path: &Path) -> Result<CatalogLoad, CatalogError> {
    if !path.exists() {
        return Err(CatalogError::DataNotFound {
            path: path.to_path_buf(),
        });
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let file = File::open(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    let rows = match extension.as_deref() {
        Some("csv") => read_csv_rows(reader)?,
        Some("json") => read_json_rows(reader)?,
        _ => {
            return Err(CatalogError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
    };

    let load = assessments_from_rows(rows);
    info!(
        path = %path.display(),
        accepted = load.assessments.len(),
        rejected = load.rejected.len(),
        "Catalog loaded"
    );
    Ok(load)
}

/// Reads CSV rows keyed by (trimmed, lowercased) header. Empty cells are left out.
pub fn read_csv_rows<R: Read>(reader: R) -> Result<Vec<Metadata>, CatalogError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let row: Metadata = headers
            .iter()
            .zip(record.iter())
            .filter(|(_, cell)| !cell.trim().is_empty())
            .map(|(header, cell)| (header.clone(), Value::from(cell)))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

/// Reads a JSON array of row objects.
pub fn read_json_rows<R: Read>(reader: R) -> Result<Vec<Metadata>, CatalogError> {
    let value: Value = serde_json::from_reader(reader)?;

    let Value::Array(items) = value else {
        return Err(CatalogError::Shape {
            reason: "top level must be an array".to_string(),
        });
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::Object(map) => Ok(map
                .into_iter()
                .map(|(k, v)| (k.trim().to_ascii_lowercase(), v))
                .collect()),
            _ => Err(CatalogError::Shape {
                reason: format!("row {} is not an object", idx + 1),
            }),
        })
        .collect()
}

/// Validates rows into assessments; invalid rows are reported, never silently dropped.
pub fn assessments_from_rows(rows: Vec<Metadata>) -> CatalogLoad {
    let mut load = CatalogLoad::default();
    let mut seen_urls: HashMap<String, usize> = HashMap::new();

    for (idx, row) in rows.iter().enumerate() {
        let row_number = idx + 1;
        let ordinal = load.assessments.len() as u64;

        let outcome = Assessment::from_row(ordinal, row).and_then(|assessment| {
            match seen_urls.get(&assessment.url) {
                Some(&first_row) => Err(RowRejection::DuplicateUrl { first_row }),
                None => Ok(assessment),
            }
        });

        match outcome {
            Ok(assessment) => {
                seen_urls.insert(assessment.url.clone(), row_number);
                load.assessments.push(assessment);
            }
            Err(reason) => {
                let name = row
                    .get(crate::normalize::fields::NAME)
                    .and_then(|v| v.as_str())
                    .map(str::to_string);
                warn!(row = row_number, name = ?name, %reason, "Rejected catalog row");
                load.rejected.push(RejectedRow {
                    row: row_number,
                    name,
                    reason,
                });
            }
        }
    }

    load
}
