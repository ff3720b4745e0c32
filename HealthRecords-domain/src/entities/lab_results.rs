use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Interpretation flag the lab attached to a result line
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum LabFlag {
    /// Within the reference range
    #[default]
    Normal,

    /// Above the reference range
    High,

    /// Below the reference range
    Low,

    /// Outside the critical limits
    Critical,
}

impl LabFlag {
    /// Values flagged high or critical are framed as "lower is better"
    pub fn is_adverse_high(self) -> bool {
        matches!(self, LabFlag::High | LabFlag::Critical)
    }
}

/// Processing state of a lab order.
///
/// An entry that omits its status is `Pending` and is not used as history.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum LabStatus {
    /// Ordered or collected, results not final
    #[default]
    Pending,

    /// Results are final
    Completed,

    /// Order was cancelled
    Cancelled,
}

/// One measured analyte within a lab result entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct LabResultLine {
    /// Analyte name, e.g. "LDL"
    #[validate(length(min = 1, max = 128, message = "Result name must be between 1 and 128 characters"))]
    pub name: String,

    /// Reported value as entered; usually numeric
    #[serde(default)]
    pub value: String,

    /// Unit of the value
    #[serde(default)]
    pub unit: String,

    /// Reference range as printed on the report
    #[serde(default)]
    pub reference_range: String,

    /// Interpretation flag
    #[serde(default)]
    pub flag: LabFlag,
}

/// A lab report: one test with its result lines
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct LabResultEntry {
    /// Identifier of the entry within the owner's document
    #[validate(length(min = 1, max = 64, message = "Entry id must be between 1 and 64 characters"))]
    pub id: String,

    /// Test or panel name, e.g. "Lipid Panel"
    #[validate(length(min = 1, max = 128, message = "Test name must be between 1 and 128 characters"))]
    pub test_name: String,

    /// Optional category, e.g. "Hormones"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Date the sample was collected
    #[cfg_attr(feature = "with-api", schema(value_type = String, format = Date))]
    pub date: NaiveDate,

    /// Processing state
    #[serde(default)]
    pub status: LabStatus,

    /// Result lines in report order
    #[validate(length(min = 1, message = "An entry needs at least one result"))]
    #[validate]
    pub results: Vec<LabResultLine>,

    /// Clinician who ordered the test
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordering_provider: Option<String>,

    /// Laboratory that performed the test
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab_name: Option<String>,

    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000, message = "Notes cannot exceed 2000 characters"))]
    pub notes: Option<String>,
}

impl LabResultEntry {
    /// Find a result line by name
    pub fn result(&self, name: &str) -> Option<&LabResultLine> {
        self.results.iter().find(|line| line.name == name)
    }
}

/// The whole lab results document an owner keeps
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct LabResultsDocument {
    /// Every lab result entry, in document order
    #[serde(default)]
    #[validate]
    pub entries: Vec<LabResultEntry>,
}
