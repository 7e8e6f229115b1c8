use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::RowRejection;
use crate::constants::{SUPPORT_NO, SUPPORT_YES};
use crate::hashing::assessment_id;
use crate::normalize::{Metadata, coerce, fields};

/// Closed set of assessment categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TestType {
    #[serde(rename = "Ability & Aptitude")]
    AbilityAptitude,
    #[serde(rename = "Biodata & Situational Judgement")]
    BiodataSituationalJudgement,
    #[serde(rename = "Competencies")]
    Competencies,
    #[serde(rename = "Development & 360")]
    Development360,
    #[serde(rename = "Assessment Exercises")]
    AssessmentExercises,
    #[serde(rename = "Knowledge & Skills")]
    KnowledgeSkills,
    #[serde(rename = "Personality & Behavior")]
    PersonalityBehavior,
    #[serde(rename = "Simulations")]
    Simulations,
}

impl TestType {
    /// Every variant, in catalog code order.
    pub const ALL: [TestType; 8] = [
        TestType::AbilityAptitude,
        TestType::BiodataSituationalJudgement,
        TestType::Competencies,
        TestType::Development360,
        TestType::AssessmentExercises,
        TestType::KnowledgeSkills,
        TestType::PersonalityBehavior,
        TestType::Simulations,
    ];

    /// Single-letter code used on catalog pages.
    pub fn code(self) -> char {
        match self {
            TestType::AbilityAptitude => 'A',
            TestType::BiodataSituationalJudgement => 'B',
            TestType::Competencies => 'C',
            TestType::Development360 => 'D',
            TestType::AssessmentExercises => 'E',
            TestType::KnowledgeSkills => 'K',
            TestType::PersonalityBehavior => 'P',
            TestType::Simulations => 'S',
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            TestType::AbilityAptitude => "Ability & Aptitude",
            TestType::BiodataSituationalJudgement => "Biodata & Situational Judgement",
            TestType::Competencies => "Competencies",
            TestType::Development360 => "Development & 360",
            TestType::AssessmentExercises => "Assessment Exercises",
            TestType::KnowledgeSkills => "Knowledge & Skills",
            TestType::PersonalityBehavior => "Personality & Behavior",
            TestType::Simulations => "Simulations",
        }
    }

    /// Parses a code letter or a label (case-insensitive).
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let mut chars = raw.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            let c = c.to_ascii_uppercase();
            return Self::ALL.into_iter().find(|t| t.code() == c);
        }

        Self::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(raw))
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    /// Content-derived id (see [`assessment_id`]).
    pub id: String,
    /// Position in the catalog; secondary sort key for equal distances.
    pub ordinal: u64,
    pub name: String,
    pub url: String,
    pub description: String,
    /// Minutes.
    pub duration: u32,
    pub test_type: Vec<TestType>,
    pub remote_support: bool,
    pub adaptive_support: bool,
}

impl Assessment {
    /// Validates and coerces one catalog row.
    pub fn from_row(ordinal: u64, row: &Metadata) -> Result<Self, RowRejection> {
        let name = coerce::required_text(row.get(fields::NAME), fields::NAME)?;
        let url = coerce::required_text(row.get(fields::URL), fields::URL)?;

        let mut test_type = Vec::new();
        for label in coerce::coerce_test_types(row.get(fields::TEST_TYPE))? {
            let parsed =
                TestType::parse(&label).ok_or(RowRejection::UnknownTestType { label })?;
            if !test_type.contains(&parsed) {
                test_type.push(parsed);
            }
        }

        Ok(Self {
            id: assessment_id(&url),
            ordinal,
            name,
            description: coerce::coerce_text(row.get(fields::DESCRIPTION))
                .map(|d| d.trim().to_string())
                .unwrap_or_default(),
            url,
            duration: coerce::coerce_duration(row.get(fields::DURATION)),
            test_type,
            remote_support: coerce::is_truthy(row.get(fields::REMOTE_SUPPORT)),
            adaptive_support: coerce::is_truthy(row.get(fields::ADAPTIVE_SUPPORT)),
        })
    }

    /// Labels of [`Self::test_type`], in order.
    pub fn type_labels(&self) -> Vec<&'static str> {
        self.test_type.iter().map(|t| t.label()).collect()
    }

    /// Display-field snapshot persisted with the indexed document.
    pub fn to_metadata(&self) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert(fields::NAME.into(), Value::from(self.name.clone()));
        metadata.insert(fields::URL.into(), Value::from(self.url.clone()));
        metadata.insert(
            fields::DESCRIPTION.into(),
            Value::from(self.description.clone()),
        );
        metadata.insert(fields::DURATION.into(), Value::from(self.duration));
        metadata.insert(
            fields::TEST_TYPE.into(),
            Value::Array(self.type_labels().into_iter().map(Value::from).collect()),
        );
        metadata.insert(
            fields::REMOTE_SUPPORT.into(),
            Value::from(support_literal(self.remote_support)),
        );
        metadata.insert(
            fields::ADAPTIVE_SUPPORT.into(),
            Value::from(support_literal(self.adaptive_support)),
        );
        metadata
    }
}

fn support_literal(flag: bool) -> &'static str {
    if flag { SUPPORT_YES } else { SUPPORT_NO }
}
