pub mod health;
pub mod lab_results;
pub mod vitals;

// Re-export handlers for easier imports
pub use health::health_check;
pub use lab_results::{get_lab_result_trends, get_lab_results, put_lab_results};
pub use vitals::{get_recent_vitals, get_vital_trend, get_vitals, put_vitals};
