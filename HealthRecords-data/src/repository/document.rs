use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, error};

use crate::database::get_db_pool;
use crate::models::document::{DocumentCollection, StoredDocument};
use super::errors::RepositoryError;
use super::in_memory::InMemoryStorage;
use super::storage::DatabaseStorage;

/// Repository trait for owner documents.
///
/// Documents are fetched whole and replaced whole. There is no versioning:
/// the last replace wins.
#[async_trait]
pub trait DocumentRepositoryTrait {
    /// Get the document an owner keeps in a collection
    async fn get_document(
        &self,
        owner_id: &str,
        collection: DocumentCollection,
    ) -> Result<Option<StoredDocument>, RepositoryError>;

    /// Replace the document an owner keeps in a collection
    async fn put_document(
        &self,
        owner_id: &str,
        collection: DocumentCollection,
        body: serde_json::Value,
    ) -> Result<StoredDocument, RepositoryError>;
}

/// Repository for owner documents.
/// Uses the SQLite pool when it is initialized and in-memory storage otherwise.
#[derive(Debug, Clone, Default)]
pub struct DocumentRepository {
    /// In-memory storage for when database is not available
    storage: InMemoryStorage,
}

impl DocumentRepository {
    /// Create a new repository
    pub fn new() -> Self {
        Self {
            storage: InMemoryStorage::new(),
        }
    }
}

fn validate_owner(owner_id: &str) -> Result<(), RepositoryError> {
    if owner_id.trim().is_empty() {
        return Err(RepositoryError::Validation("owner id must not be empty".to_string()));
    }
    Ok(())
}

#[async_trait]
impl DocumentRepositoryTrait for DocumentRepository {
    async fn get_document(
        &self,
        owner_id: &str,
        collection: DocumentCollection,
    ) -> Result<Option<StoredDocument>, RepositoryError> {
        validate_owner(owner_id)?;

        match get_db_pool() {
            Ok(pool) => {
                debug!("Getting {} document for {} from database", collection, owner_id);
                match DatabaseStorage::get_document(&pool, owner_id, collection).await {
                    Ok(document) => Ok(document),
                    Err(e) => {
                        error!("Failed to get document from database: {}", e);
                        self.storage.get_document(owner_id, collection).await
                    }
                }
            }
            Err(e) => {
                debug!("Database not available ({}), using in-memory storage for get_document", e);
                self.storage.get_document(owner_id, collection).await
            }
        }
    }

    async fn put_document(
        &self,
        owner_id: &str,
        collection: DocumentCollection,
        body: serde_json::Value,
    ) -> Result<StoredDocument, RepositoryError> {
        validate_owner(owner_id)?;

        let document = StoredDocument {
            owner_id: owner_id.to_string(),
            collection,
            body,
            updated_at: Utc::now().to_rfc3339(),
        };

        match get_db_pool() {
            Ok(pool) => {
                debug!("Storing {} document for {} in database", collection, owner_id);
                match DatabaseStorage::put_document(&pool, &document).await {
                    Ok(()) => Ok(document),
                    Err(e) => {
                        error!("Failed to store document in database: {}", e);
                        self.storage.put_document(&document).await
                    }
                }
            }
            Err(e) => {
                debug!("Database not available ({}), using in-memory storage", e);
                self.storage.put_document(&document).await
            }
        }
    }
}

/// Mock document repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Mock implementation of DocumentRepositoryTrait for testing
    #[derive(Default)]
    pub struct MockDocumentRepository {
        documents: Mutex<HashMap<(String, DocumentCollection), serde_json::Value>>,
        fail_writes: bool,
    }

    impl MockDocumentRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a mock repository with one predefined document
        pub fn with_document(owner_id: &str, collection: DocumentCollection, body: serde_json::Value) -> Self {
            let repo = Self::new();
            if let Ok(mut documents) = repo.documents.lock() {
                documents.insert((owner_id.to_string(), collection), body);
            }
            repo
        }

        /// Make every write fail with a database error
        pub fn with_write_failure(mut self) -> Self {
            self.fail_writes = true;
            self
        }
    }

    #[async_trait]
    impl DocumentRepositoryTrait for MockDocumentRepository {
        async fn get_document(
            &self,
            owner_id: &str,
            collection: DocumentCollection,
        ) -> Result<Option<StoredDocument>, RepositoryError> {
            let documents = self.documents.lock()?;
            Ok(documents
                .get(&(owner_id.to_string(), collection))
                .map(|body| StoredDocument {
                    owner_id: owner_id.to_string(),
                    collection,
                    body: body.clone(),
                    updated_at: "2024-01-01T00:00:00+00:00".to_string(),
                }))
        }

        async fn put_document(
            &self,
            owner_id: &str,
            collection: DocumentCollection,
            body: serde_json::Value,
        ) -> Result<StoredDocument, RepositoryError> {
            if self.fail_writes {
                return Err(RepositoryError::Database(
                    crate::database::DatabaseError::PoolNotInitialized,
                ));
            }
            let mut documents = self.documents.lock()?;
            documents.insert((owner_id.to_string(), collection), body.clone());
            Ok(StoredDocument {
                owner_id: owner_id.to_string(),
                collection,
                body,
                updated_at: Utc::now().to_rfc3339(),
            })
        }
    }
}
