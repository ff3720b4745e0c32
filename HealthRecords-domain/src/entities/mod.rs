// Domain entities and value objects
pub mod conversions;
pub mod lab_results;
pub mod trend;
pub mod vitals;

// Re-export common types for easier imports
pub use lab_results::{LabFlag, LabResultEntry, LabResultLine, LabResultsDocument, LabStatus};
pub use trend::{LabLineTrend, PairwiseTrend, PeriodSummary, TrendDirection, TrendResult};
pub use vitals::{Reading, VitalsDocument};
