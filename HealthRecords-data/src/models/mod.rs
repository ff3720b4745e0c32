// Storage models
pub mod document;

pub use document::{DocumentCollection, StoredDocument};
