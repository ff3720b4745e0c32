use std::collections::HashSet;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};
use validator::Validate;

use health_records_data::models::document::DocumentCollection;
use health_records_data::repository::{DocumentRepositoryTrait, RepositoryError};

use crate::entities::conversions::{self, parse_lab_value};
use crate::entities::lab_results::{LabResultEntry, LabResultsDocument, LabStatus};
use crate::entities::trend::{LabLineTrend, TrendResult};
use crate::services::insights::{compute_trend, POINT_STABILITY_THRESHOLD_PERCENT};
use crate::services::validation_message;

/// Most recent completed entry of the same test that predates `current`.
///
/// Entries are matched by `test_name` only; `category` is not considered.
/// Among entries sharing the latest date the first in document order wins.
pub fn find_prior_entry<'a>(entries: &'a [LabResultEntry], current: &LabResultEntry) -> Option<&'a LabResultEntry> {
    entries
        .iter()
        .filter(|entry| {
            entry.test_name == current.test_name
                && entry.id != current.id
                && entry.date < current.date
                && entry.status == LabStatus::Completed
        })
        .fold(None::<&LabResultEntry>, |latest, entry| match latest {
            Some(found) if found.date >= entry.date => Some(found),
            _ => Some(entry),
        })
}

/// Trend of one result line against the previous completed result of the
/// same test.
///
/// Returns `None` when there is no prior entry, when either entry lacks the
/// line, or when either value is not numeric. Values currently flagged high
/// or critical are marked inverse.
pub fn compute_lab_trend(
    entries: &[LabResultEntry],
    current: &LabResultEntry,
    result_name: &str,
) -> Option<TrendResult> {
    let current_line = current.result(result_name)?;
    let prior_line = find_prior_entry(entries, current)?.result(result_name)?;

    let current_value = parse_lab_value(&current_line.value)?;
    let prior_value = parse_lab_value(&prior_line.value)?;

    Some(
        compute_trend(current_value, prior_value, POINT_STABILITY_THRESHOLD_PERCENT)
            .with_inverse(current_line.flag.is_adverse_high()),
    )
}

/// Trends for every result line of one entry, in report order
pub fn compute_entry_trends(entries: &[LabResultEntry], current: &LabResultEntry) -> Vec<LabLineTrend> {
    current
        .results
        .iter()
        .map(|line| LabLineTrend {
            name: line.name.clone(),
            trend: compute_lab_trend(entries, current, &line.name),
        })
        .collect()
}

/// Lab results service errors
#[derive(Debug, Error)]
pub enum LabResultsServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Not found error
    #[error("Lab result not found: {0}")]
    NotFound(String),

    /// Stored document could not be decoded
    #[error("Malformed lab results document: {0}")]
    MalformedDocument(String),

    /// Repository error
    #[error("Repository error: {0}")]
    RepositoryError(String),
}

impl From<RepositoryError> for LabResultsServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => LabResultsServiceError::NotFound(msg),
            RepositoryError::Validation(msg) => LabResultsServiceError::ValidationError(msg),
            other => LabResultsServiceError::RepositoryError(other.to_string()),
        }
    }
}

/// Trait for lab results service operations
#[async_trait]
pub trait LabResultsServiceTrait {
    /// Fetch every lab result entry the owner has recorded
    async fn get_entries(&self, owner_id: &str) -> Result<Vec<LabResultEntry>, LabResultsServiceError>;

    /// Replace every lab result entry the owner has recorded
    async fn replace_entries(
        &self,
        owner_id: &str,
        entries: Vec<LabResultEntry>,
    ) -> Result<Vec<LabResultEntry>, LabResultsServiceError>;

    /// Trends for every line of one entry
    async fn entry_trends(
        &self,
        owner_id: &str,
        entry_id: &str,
    ) -> Result<(LabResultEntry, Vec<LabLineTrend>), LabResultsServiceError>;
}

/// Lab results service over a document repository
pub struct LabResultsService<R: DocumentRepositoryTrait> {
    repository: R,
}

impl<R: DocumentRepositoryTrait> LabResultsService<R> {
    /// Create a new lab results service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    fn validate_document(document: &LabResultsDocument) -> Result<(), LabResultsServiceError> {
        document
            .validate()
            .map_err(|errors| LabResultsServiceError::ValidationError(validation_message(&errors)))?;

        let mut seen = HashSet::new();
        if let Some(duplicate) = document.entries.iter().find(|e| !seen.insert(e.id.as_str())) {
            return Err(LabResultsServiceError::ValidationError(format!(
                "Duplicate lab result id: {}",
                duplicate.id
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl<R: DocumentRepositoryTrait + Send + Sync> LabResultsServiceTrait for LabResultsService<R> {
    async fn get_entries(&self, owner_id: &str) -> Result<Vec<LabResultEntry>, LabResultsServiceError> {
        let stored = self
            .repository
            .get_document(owner_id, DocumentCollection::LabResults)
            .await?;

        let document = conversions::convert_to_domain_lab_results(stored)
            .map_err(|e| LabResultsServiceError::MalformedDocument(e.to_string()))?;

        debug!("Loaded {} lab results for {}", document.entries.len(), owner_id);
        Ok(document.entries)
    }

    async fn replace_entries(
        &self,
        owner_id: &str,
        entries: Vec<LabResultEntry>,
    ) -> Result<Vec<LabResultEntry>, LabResultsServiceError> {
        let document = LabResultsDocument { entries };
        if let Err(e) = Self::validate_document(&document) {
            warn!("Rejected lab results document for {}: {}", owner_id, e);
            return Err(e);
        }

        let body = conversions::convert_to_data_lab_results(&document)
            .map_err(|e| LabResultsServiceError::MalformedDocument(e.to_string()))?;

        self.repository
            .put_document(owner_id, DocumentCollection::LabResults, body)
            .await?;

        Ok(document.entries)
    }

    async fn entry_trends(
        &self,
        owner_id: &str,
        entry_id: &str,
    ) -> Result<(LabResultEntry, Vec<LabLineTrend>), LabResultsServiceError> {
        let entries = self.get_entries(owner_id).await?;
        let current = entries
            .iter()
            .find(|entry| entry.id == entry_id)
            .cloned()
            .ok_or_else(|| LabResultsServiceError::NotFound(format!("Lab result with ID {} not found", entry_id)))?;

        let trends = compute_entry_trends(&entries, &current);
        Ok((current, trends))
    }
}

/// Create a default lab results service using the repository from the data layer
pub fn create_default_lab_results_service() -> impl LabResultsServiceTrait + Send + Sync {
    LabResultsService::new(health_records_data::repository::DocumentRepository::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::lab_results::{LabFlag, LabResultLine};
    use crate::entities::trend::TrendDirection;
    use chrono::NaiveDate;
    use health_records_data::repository::tests::MockDocumentRepository;

    fn line(name: &str, value: &str, flag: LabFlag) -> LabResultLine {
        LabResultLine {
            name: name.to_string(),
            value: value.to_string(),
            unit: "mg/dL".to_string(),
            reference_range: "0-100".to_string(),
            flag,
        }
    }

    fn entry(id: &str, test_name: &str, on: (i32, u32, u32), results: Vec<LabResultLine>) -> LabResultEntry {
        LabResultEntry {
            id: id.to_string(),
            test_name: test_name.to_string(),
            category: None,
            date: NaiveDate::from_ymd_opt(on.0, on.1, on.2).unwrap(),
            status: LabStatus::Completed,
            results,
            ordering_provider: None,
            lab_name: None,
            notes: None,
        }
    }

    #[test]
    fn test_lab_trend_uses_most_recent_prior_completed_entry() {
        let oldest = entry("a", "Lipid Panel", (2023, 6, 1), vec![line("LDL", "160", LabFlag::High)]);
        let prior = entry("b", "Lipid Panel", (2023, 12, 1), vec![line("LDL", "150", LabFlag::High)]);
        let mut pending = entry("c", "Lipid Panel", (2024, 1, 15), vec![line("LDL", "200", LabFlag::High)]);
        pending.status = LabStatus::Pending;
        let current = entry("d", "Lipid Panel", (2024, 2, 1), vec![line("LDL", "120", LabFlag::High)]);
        let entries = vec![oldest, prior, pending, current.clone()];

        let trend = compute_lab_trend(&entries, &current, "LDL").unwrap();
        assert_eq!(trend.direction, TrendDirection::Down);
        assert_eq!(trend.percent_change, 20.0);
        assert!(trend.is_inverse);
    }

    #[test]
    fn test_lab_trend_ignores_later_and_same_day_entries() {
        let same_day = entry("a", "CBC", (2024, 2, 1), vec![line("WBC", "9", LabFlag::Normal)]);
        let later = entry("b", "CBC", (2024, 3, 1), vec![line("WBC", "4", LabFlag::Normal)]);
        let current = entry("c", "CBC", (2024, 2, 1), vec![line("WBC", "6", LabFlag::Normal)]);
        let entries = vec![same_day, later, current.clone()];

        assert!(compute_lab_trend(&entries, &current, "WBC").is_none());
    }

    #[test]
    fn test_lab_trend_matches_test_name_across_categories() {
        let mut prior = entry("a", "Estradiol", (2024, 1, 1), vec![line("E2", "100", LabFlag::Normal)]);
        prior.category = Some("Hormones".to_string());
        let mut current = entry("b", "Estradiol", (2024, 2, 1), vec![line("E2", "102", LabFlag::Normal)]);
        current.category = Some("Endocrine".to_string());
        let other_test = entry("c", "Testosterone", (2024, 1, 20), vec![line("E2", "10", LabFlag::Normal)]);
        let entries = vec![prior, other_test, current.clone()];

        let trend = compute_lab_trend(&entries, &current, "E2").unwrap();
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert_eq!(trend.percent_change, 2.0);
        assert!(!trend.is_inverse);
    }

    #[test]
    fn test_lab_trend_missing_line_or_unparseable_value() {
        let prior = entry(
            "a",
            "Metabolic Panel",
            (2024, 1, 1),
            vec![line("Glucose", "pending", LabFlag::Normal)],
        );
        let current = entry(
            "b",
            "Metabolic Panel",
            (2024, 2, 1),
            vec![line("Glucose", "95", LabFlag::Normal), line("Sodium", "140", LabFlag::Normal)],
        );
        let entries = vec![prior, current.clone()];

        assert!(compute_lab_trend(&entries, &current, "Glucose").is_none());
        assert!(compute_lab_trend(&entries, &current, "Sodium").is_none());
        assert!(compute_lab_trend(&entries, &current, "Potassium").is_none());
    }

    #[test]
    fn test_lab_trend_without_history() {
        let current = entry("a", "TSH", (2024, 2, 1), vec![line("TSH", "2.1", LabFlag::Normal)]);
        assert!(compute_lab_trend(std::slice::from_ref(&current), &current, "TSH").is_none());
    }

    #[test]
    fn test_entry_is_never_its_own_prior() {
        let stored = entry("a", "Lipid Panel", (2024, 1, 1), vec![line("LDL", "150", LabFlag::Normal)]);
        let older = entry("b", "Lipid Panel", (2023, 12, 1), vec![line("LDL", "100", LabFlag::Normal)]);
        let edited = entry("a", "Lipid Panel", (2024, 3, 1), vec![line("LDL", "90", LabFlag::Normal)]);
        let entries = vec![stored, older];

        assert_eq!(find_prior_entry(&entries, &edited).map(|e| e.id.as_str()), Some("b"));

        let trend = compute_lab_trend(&entries, &edited, "LDL").unwrap();
        assert_eq!(trend.direction, TrendDirection::Down);
        assert_eq!(trend.percent_change, 10.0);

        // With only the stored copy there is no history
        assert!(compute_lab_trend(&entries[..1], &edited, "LDL").is_none());
    }

    #[test]
    fn test_entry_without_status_is_not_history() {
        let unstated: LabResultEntry = serde_json::from_value(serde_json::json!({
            "id": "a",
            "testName": "TSH",
            "date": "2024-01-01",
            "results": [{ "name": "TSH", "value": "4.0" }]
        }))
        .unwrap();
        let current = entry("b", "TSH", (2024, 2, 1), vec![line("TSH", "2.0", LabFlag::Normal)]);
        let entries = vec![unstated, current.clone()];

        assert!(find_prior_entry(&entries, &current).is_none());
        assert!(compute_lab_trend(&entries, &current, "TSH").is_none());
    }

    #[test]
    fn test_prior_entry_tie_keeps_document_order() {
        let first = entry("a", "A1C", (2024, 1, 1), vec![line("A1C", "6.0", LabFlag::Normal)]);
        let second = entry("b", "A1C", (2024, 1, 1), vec![line("A1C", "7.0", LabFlag::Normal)]);
        let current = entry("c", "A1C", (2024, 4, 1), vec![line("A1C", "6.0", LabFlag::Normal)]);
        let entries = vec![first, second, current.clone()];

        assert_eq!(find_prior_entry(&entries, &current).map(|e| e.id.as_str()), Some("a"));
    }

    #[test]
    fn test_entry_trends_cover_every_line() {
        let prior = entry(
            "a",
            "Lipid Panel",
            (2024, 1, 1),
            vec![line("LDL", "100", LabFlag::Normal), line("HDL", "50", LabFlag::Normal)],
        );
        let current = entry(
            "b",
            "Lipid Panel",
            (2024, 2, 1),
            vec![
                line("LDL", "130", LabFlag::Critical),
                line("HDL", "40", LabFlag::Low),
                line("Triglycerides", "150", LabFlag::Normal),
            ],
        );
        let trends = compute_entry_trends(&[prior, current.clone()], &current);

        assert_eq!(trends.len(), 3);
        let ldl = trends[0].trend.unwrap();
        assert_eq!(ldl.direction, TrendDirection::Up);
        assert_eq!(ldl.percent_change, 30.0);
        assert!(ldl.is_inverse);
        let hdl = trends[1].trend.unwrap();
        assert_eq!(hdl.direction, TrendDirection::Down);
        assert!(!hdl.is_inverse);
        assert!(trends[2].trend.is_none());
    }

    #[tokio::test]
    async fn test_entry_trends_through_service() {
        let service = LabResultsService::new(MockDocumentRepository::new());
        let entries = vec![
            entry("a", "TSH", (2024, 1, 1), vec![line("TSH", "2.0", LabFlag::Normal)]),
            entry("b", "TSH", (2024, 2, 1), vec![line("TSH", "3.0", LabFlag::High)]),
        ];
        service.replace_entries("owner-1", entries).await.unwrap();

        let (current, trends) = service.entry_trends("owner-1", "b").await.unwrap();
        assert_eq!(current.id, "b");
        assert_eq!(trends[0].trend.unwrap().direction, TrendDirection::Up);

        let missing = service.entry_trends("owner-1", "zzz").await;
        assert!(matches!(missing, Err(LabResultsServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_replace_entries_validation() {
        let service = LabResultsService::new(MockDocumentRepository::new());

        let no_results = vec![entry("a", "TSH", (2024, 1, 1), vec![])];
        let result = service.replace_entries("owner-1", no_results).await;
        assert!(matches!(result, Err(LabResultsServiceError::ValidationError(_))));

        let blank_line = vec![entry("a", "TSH", (2024, 1, 1), vec![line("", "1", LabFlag::Normal)])];
        let result = service.replace_entries("owner-1", blank_line).await;
        assert!(matches!(result, Err(LabResultsServiceError::ValidationError(_))));

        let duplicate = vec![
            entry("a", "TSH", (2024, 1, 1), vec![line("TSH", "1", LabFlag::Normal)]),
            entry("a", "TSH", (2024, 2, 1), vec![line("TSH", "2", LabFlag::Normal)]),
        ];
        let result = service.replace_entries("owner-1", duplicate).await;
        assert!(result.unwrap_err().to_string().contains("Duplicate lab result id"));

        // Non-numeric values are accepted; they only suppress trends.
        let qualitative = vec![entry("a", "Urinalysis", (2024, 1, 1), vec![line("Protein", "negative", LabFlag::Normal)])];
        assert!(service.replace_entries("owner-1", qualitative).await.is_ok());
    }
}
