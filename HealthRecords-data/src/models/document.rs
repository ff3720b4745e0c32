use serde::{Deserialize, Serialize};

/// Kind of document stored under an owner
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCollection {
    /// Vital-sign readings
    Vitals,

    /// Lab result entries
    LabResults,
}

impl DocumentCollection {
    /// Name used as the storage key
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentCollection::Vitals => "vitals",
            DocumentCollection::LabResults => "lab_results",
        }
    }
}

impl std::fmt::Display for DocumentCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage model for a whole JSON document owned by one user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredDocument {
    /// Identifier of the user that owns the document
    pub owner_id: String,

    /// Which collection the document belongs to
    pub collection: DocumentCollection,

    /// The document body, stored as-is
    pub body: serde_json::Value,

    /// RFC 3339 timestamp of the last replace
    pub updated_at: String,
}
