use health_records_data::models::document::StoredDocument;

use crate::entities::lab_results::LabResultsDocument;
use crate::entities::vitals::VitalsDocument;

/// Conversion functions between domain documents and stored JSON bodies.
/// These functions follow the pattern convert_to_[target_layer]_[model_name].

/// Convert a stored document into the domain vitals document.
///
/// A missing document reads as an empty one.
pub fn convert_to_domain_vitals(stored: Option<StoredDocument>) -> Result<VitalsDocument, serde_json::Error> {
    match stored {
        Some(document) => serde_json::from_value(document.body),
        None => Ok(VitalsDocument::default()),
    }
}

/// Convert a domain vitals document into a storable JSON body
pub fn convert_to_data_vitals(document: &VitalsDocument) -> Result<serde_json::Value, serde_json::Error> {
    serde_json::to_value(document)
}

/// Convert a stored document into the domain lab results document.
///
/// A missing document reads as an empty one.
pub fn convert_to_domain_lab_results(
    stored: Option<StoredDocument>,
) -> Result<LabResultsDocument, serde_json::Error> {
    match stored {
        Some(document) => serde_json::from_value(document.body),
        None => Ok(LabResultsDocument::default()),
    }
}

/// Convert a domain lab results document into a storable JSON body
pub fn convert_to_data_lab_results(document: &LabResultsDocument) -> Result<serde_json::Value, serde_json::Error> {
    serde_json::to_value(document)
}

/// Parse a lab value for comparison.
///
/// Surrounding whitespace is ignored; anything that is not a finite number
/// yields `None`.
pub fn parse_lab_value(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use health_records_data::models::document::DocumentCollection;
    use serde_json::json;

    #[test]
    fn test_missing_document_is_empty() {
        assert!(convert_to_domain_vitals(None).unwrap().readings.is_empty());
        assert!(convert_to_domain_lab_results(None).unwrap().entries.is_empty());
    }

    #[test]
    fn test_stored_vitals_body_is_decoded() {
        let stored = StoredDocument {
            owner_id: "owner-1".to_string(),
            collection: DocumentCollection::Vitals,
            body: json!({
                "readings": [
                    { "id": "r1", "type": "weight", "value": 70.5, "date": "2024-03-01", "unit": "kg" }
                ]
            }),
            updated_at: "2024-03-01T08:00:00+00:00".to_string(),
        };

        let document = convert_to_domain_vitals(Some(stored)).unwrap();
        assert_eq!(document.readings.len(), 1);
        assert_eq!(document.readings[0].vital_type, "weight");
        assert_eq!(document.readings[0].time, None);

        let body = convert_to_data_vitals(&document).unwrap();
        assert_eq!(body["readings"][0]["type"], "weight");
    }

    #[test]
    fn test_malformed_body_is_an_error() {
        let stored = StoredDocument {
            owner_id: "owner-1".to_string(),
            collection: DocumentCollection::LabResults,
            body: json!({ "entries": "not a list" }),
            updated_at: "2024-03-01T08:00:00+00:00".to_string(),
        };
        assert!(convert_to_domain_lab_results(Some(stored)).is_err());
    }

    #[test]
    fn test_parse_lab_value() {
        assert_eq!(parse_lab_value(" 5.4 "), Some(5.4));
        assert_eq!(parse_lab_value("-2"), Some(-2.0));
        assert_eq!(parse_lab_value("positive"), None);
        assert_eq!(parse_lab_value(""), None);
        assert_eq!(parse_lab_value("NaN"), None);
        assert_eq!(parse_lab_value("inf"), None);
    }
}
