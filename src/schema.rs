//! Schema management for registry tables.
//!
//! Registry tables are created on demand, keyed by a runtime-supplied name:
//! every table carries the same fixed column set, a `modtime` column that
//! defaults to the current timestamp, and a named composite uniqueness
//! constraint over (address, port).

use log::info;
use sqlx::SqliteConnection;

use crate::config::MAX_FIELD_LEN;
use crate::error_handling::RegistryError;

/// Validates a runtime-supplied table identifier.
///
/// Identifiers cannot be bound as query parameters, so anything that is
/// interpolated into SQL must pass this check first: ASCII alphanumerics
/// and underscores only, not starting with a digit.
pub fn check_table_id(table: &str) -> Result<(), RegistryError> {
    let mut chars = table.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(RegistryError::InvalidTableId(table.to_string()))
    }
}

/// Returns whether a table with the given name exists in the store.
///
/// Pure catalog query, no side effects.
pub async fn table_exists(
    conn: &mut SqliteConnection,
    table: &str,
) -> Result<bool, RegistryError> {
    check_table_id(table)?;
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(table)
            .fetch_one(conn)
            .await?;
    Ok(count > 0)
}

/// Creates a registry table with the fixed column set.
///
/// `modtime` defaults to the current timestamp on insertion; the named
/// `registry_key` constraint enforces uniqueness of (address, port).
///
/// Calling this for a table that already exists is a
/// [`RegistryError::SchemaConflict`]. Two racing creators are resolved by
/// the store itself: the loser's CREATE fails and maps to the same error.
pub async fn create_table(
    conn: &mut SqliteConnection,
    table: &str,
) -> Result<(), RegistryError> {
    check_table_id(table)?;
    if table_exists(conn, table).await? {
        return Err(RegistryError::SchemaConflict(format!(
            "table '{table}' already exists"
        )));
    }

    let ddl = format!(
        r#"CREATE TABLE "{table}" (
            name      VARCHAR({len}),
            address   VARCHAR({len}) NOT NULL,
            port      INTEGER NOT NULL,
            country   VARCHAR({len}),
            stateprov VARCHAR({len}),
            city      VARCHAR({len}),
            owner     VARCHAR({len}),
            modtime   TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            CONSTRAINT registry_key UNIQUE (address, port)
        )"#,
        len = MAX_FIELD_LEN
    );
    sqlx::query(&ddl).execute(conn).await.map_err(|e| match e {
        sqlx::Error::Database(db) if db.message().contains("already exists") => {
            RegistryError::SchemaConflict(format!("table '{table}' already exists"))
        }
        other => RegistryError::Sql(other),
    })?;

    info!("Created registry table '{table}'");
    Ok(())
}
