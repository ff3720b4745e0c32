use rusqlite::Connection;
use tracing::info;

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    info!("Running SQLite migrations");

    create_documents_table(conn)?;
    create_documents_index(conn)?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

/// Create the documents table
///
/// One row per (owner, collection); the body is the whole JSON document.
fn create_documents_table(conn: &Connection) -> Result<(), String> {
    info!("Creating documents table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS documents (
            owner_id TEXT NOT NULL,
            collection TEXT NOT NULL,
            body TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (owner_id, collection)
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

/// Create index on updated_at for listing recently changed documents
fn create_documents_index(conn: &Connection) -> Result<(), String> {
    info!("Creating index on updated_at");

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_documents_updated_at
        ON documents (updated_at DESC)",
        [],
    ).map_err(|e| format!("Failed to create index: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
    }
}
