// Repository module structure
pub mod errors;
mod document;
mod in_memory;
mod storage;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use document::{DocumentRepository, DocumentRepositoryTrait};
pub use in_memory::InMemoryStorage;

// Re-export test modules for both testing and when mock feature is enabled
#[cfg(any(test, feature = "mock"))]
pub use document::tests;
