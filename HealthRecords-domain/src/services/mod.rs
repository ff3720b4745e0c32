pub mod insights;
pub mod lab_results;
pub mod vitals;

// Domain services
// This module contains business logic implementations.

use validator::ValidationErrors;

// Re-export service traits and factory functions
pub use insights::compute_trend;
pub use lab_results::{
    compute_entry_trends, compute_lab_trend, create_default_lab_results_service, LabResultsServiceError,
    LabResultsServiceTrait,
};
pub use vitals::{
    compute_pairwise_trends, compute_period_trend, create_default_vitals_service, summarize_period,
    VitalsServiceError, VitalsServiceTrait,
};

/// Flatten validator errors into one readable message.
///
/// Nested list errors are reported with their path, e.g.
/// `readings[2].value: Value must be a finite number`.
pub(crate) fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect_messages(errors, String::new(), &mut messages);
    messages.sort();
    messages.join("; ")
}

fn collect_messages(errors: &ValidationErrors, prefix: String, messages: &mut Vec<String>) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let text: Vec<String> = field_errors
                    .iter()
                    .map(|err| match &err.message {
                        Some(msg) => msg.to_string(),
                        None => format!("Invalid {}", field),
                    })
                    .collect();
                messages.push(format!("{}: {}", path, text.join(", ")));
            }
            ValidationErrorsKind::Struct(nested) => collect_messages(nested, path, messages),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_messages(nested, format!("{}[{}]", path, index), messages);
                }
            }
        }
    }
}
