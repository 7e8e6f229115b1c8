use crate::catalog::Assessment;
use crate::constants::DOCUMENT_DESCRIPTION_CHARS;
use crate::hashing::point_id;
use crate::normalize::Metadata;
use crate::vectordb::{DocumentPayload, VectorPoint};

/// Text embedded for an assessment.
///
/// `Name: {name}. Type: {labels}. Description: {description prefix}`. Only the first
/// [`DOCUMENT_DESCRIPTION_CHARS`] characters of the description are used.
pub fn compose_document(assessment: &Assessment) -> String {
    let labels = assessment.type_labels().join(",");
    let description: String = assessment
        .description
        .chars()
        .take(DOCUMENT_DESCRIPTION_CHARS)
        .collect();

    format!(
        "Name: {}. Type: {}. Description: {}",
        assessment.name, labels, description
    )
}

/// One embedded assessment, ready to be written to a generation.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedDocument {
    pub id: String,
    pub point_id: u64,
    pub ordinal: u64,
    pub document: String,
    pub metadata: Metadata,
    pub vector: Vec<f32>,
}

impl IndexedDocument {
    pub fn new(assessment: &Assessment, document: String, vector: Vec<f32>) -> Self {
        Self {
            id: assessment.id.clone(),
            point_id: point_id(&assessment.url),
            ordinal: assessment.ordinal,
            document,
            metadata: assessment.to_metadata(),
            vector,
        }
    }

    pub fn into_point(self) -> VectorPoint {
        VectorPoint::new(
            self.point_id,
            self.vector,
            DocumentPayload {
                assessment_id: self.id,
                ordinal: self.ordinal,
                document: self.document,
                metadata: self.metadata,
            },
        )
    }
}
