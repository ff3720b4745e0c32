use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::models::document::{DocumentCollection, StoredDocument};
use super::errors::RepositoryError;

type DocumentKey = (String, DocumentCollection);

/// In-memory storage implementation for owner documents
#[derive(Debug, Clone)]
pub struct InMemoryStorage {
    /// Documents keyed by owner and collection
    documents: Arc<Mutex<HashMap<DocumentKey, StoredDocument>>>,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self {
            documents: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Store a document in memory, replacing any previous version
    pub async fn put_document(&self, document: &StoredDocument) -> Result<StoredDocument, RepositoryError> {
        let mut store = self.documents.lock()?;
        store.insert(
            (document.owner_id.clone(), document.collection),
            document.clone(),
        );
        Ok(document.clone())
    }

    /// Get a document from memory
    pub async fn get_document(
        &self,
        owner_id: &str,
        collection: DocumentCollection,
    ) -> Result<Option<StoredDocument>, RepositoryError> {
        let store = self.documents.lock()?;
        Ok(store.get(&(owner_id.to_string(), collection)).cloned())
    }
}
