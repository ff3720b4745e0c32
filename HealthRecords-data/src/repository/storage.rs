use rusqlite::OptionalExtension;
use tracing::debug;

use crate::database::DatabasePool;
use crate::models::document::{DocumentCollection, StoredDocument};
use super::errors::RepositoryError;

/// Database storage operations for owner documents
pub struct DatabaseStorage;

impl DatabaseStorage {
    /// Insert or replace a document in the database
    pub async fn put_document(pool: &DatabasePool, document: &StoredDocument) -> Result<(), RepositoryError> {
        debug!(
            "Storing document in database: owner={}, collection={}",
            document.owner_id, document.collection
        );

        let body = serde_json::to_string(&document.body)?;

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;

                conn.execute(
                    "INSERT INTO documents (owner_id, collection, body, updated_at)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(owner_id, collection)
                     DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at",
                    (
                        &document.owner_id,
                        document.collection.as_str(),
                        &body,
                        &document.updated_at,
                    ),
                )?;

                Ok(())
            }
        }
    }

    /// Get a document from the database
    pub async fn get_document(
        pool: &DatabasePool,
        owner_id: &str,
        collection: DocumentCollection,
    ) -> Result<Option<StoredDocument>, RepositoryError> {
        debug!("Getting document from database: owner={}, collection={}", owner_id, collection);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;

                let row = conn
                    .query_row(
                        "SELECT body, updated_at FROM documents
                         WHERE owner_id = ?1 AND collection = ?2",
                        (owner_id, collection.as_str()),
                        |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
                    )
                    .optional()?;

                match row {
                    Some((body, updated_at)) => Ok(Some(StoredDocument {
                        owner_id: owner_id.to_string(),
                        collection,
                        body: serde_json::from_str(&body)?,
                        updated_at,
                    })),
                    None => Ok(None),
                }
            }
        }
    }
}
