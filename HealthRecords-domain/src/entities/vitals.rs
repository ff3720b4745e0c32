use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// A single vital-sign measurement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Reading {
    /// Identifier of the reading within the owner's document
    #[validate(length(min = 1, max = 64, message = "Reading id must be between 1 and 64 characters"))]
    pub id: String,

    /// Vital-sign type, e.g. "weight" or "heart_rate"
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 64, message = "Vital type must be between 1 and 64 characters"))]
    pub vital_type: String,

    /// Measured value
    #[validate(custom = "validate_finite")]
    pub value: f64,

    /// Calendar date of the measurement
    #[cfg_attr(feature = "with-api", schema(value_type = String, format = Date))]
    pub date: NaiveDate,

    /// Optional clock time of the measurement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "with-api", schema(value_type = Option<String>, example = "08:30:00"))]
    pub time: Option<NaiveTime>,

    /// Optional unit, e.g. "kg"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Optional notes about the reading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,
}

fn validate_finite(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        let mut error = ValidationError::new("finite");
        error.message = Some("Value must be a finite number".into());
        Err(error)
    }
}

/// The whole vitals document an owner keeps
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct VitalsDocument {
    /// Every recorded reading, in document order
    #[serde(default)]
    #[validate]
    pub readings: Vec<Reading>,
}
