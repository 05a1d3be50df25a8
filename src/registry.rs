//! Registry record store.
//!
//! [`RegistryDb`] performs insert/update/delete/read operations against a
//! named registry table, creating the table on first write and enriching
//! rows with geo-location data where a resolver is available.
//!
//! Every public operation opens exactly one short-lived connection to the
//! store and releases it on all exit paths (the connection is dropped when
//! the operation returns, success or error). Nothing is cached between
//! calls, so operations on different tables are fully independent; racing
//! inserts on the same table are arbitrated solely by the (address, port)
//! uniqueness constraint.

use log::{debug, error, info};
use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Connection, Row, SqliteConnection, TypeInfo, ValueRef};

use crate::error_handling::RegistryError;
use crate::geo::{GeoLocation, GeoResolver};
use crate::schema;

/// A single registry row as an ordered column-name to value mapping.
pub type RegistryRow = Map<String, Value>;

/// Record store for registry tables.
///
/// Holds only the store URI and an optional geo resolver; all state lives
/// in the backing store.
pub struct RegistryDb {
    db_uri: String,
    resolver: Option<Box<dyn GeoResolver>>,
}

impl RegistryDb {
    /// Creates a store without geo enrichment: records are written with
    /// country/stateprov/city unset.
    pub fn new(db_uri: impl Into<String>) -> Self {
        RegistryDb {
            db_uri: db_uri.into(),
            resolver: None,
        }
    }

    /// Creates a store that enriches writes through `resolver`.
    pub fn with_resolver(db_uri: impl Into<String>, resolver: Box<dyn GeoResolver>) -> Self {
        RegistryDb {
            db_uri: db_uri.into(),
            resolver: Some(resolver),
        }
    }

    async fn connect(&self) -> Result<SqliteConnection, RegistryError> {
        SqliteConnection::connect(&self.db_uri)
            .await
            .map_err(RegistryError::Connection)
    }

    /// Stage 1 of every write: best-effort enrichment.
    ///
    /// Resolution failure is logged and degrades the record, it never
    /// aborts or rolls back the write that follows.
    async fn resolve_geo(&self, address: &str) -> Option<GeoLocation> {
        let resolver = match &self.resolver {
            Some(resolver) => resolver,
            None => {
                debug!("Geo resolution disabled, writing '{address}' without location");
                return None;
            }
        };
        match resolver.resolve(address).await {
            Ok(location) => Some(location),
            Err(e) => {
                error!("Could not resolve geo-location for {address}: {e}");
                None
            }
        }
    }

    /// Inserts one registry record, creating the table if needed.
    ///
    /// Returns the affected row count (1 on success). A duplicate
    /// (address, port) pair is reported as
    /// [`RegistryError::ConstraintViolation`], never masked as success.
    pub async fn insert(
        &self,
        table: &str,
        name: &str,
        address: &str,
        port: u16,
        owner: &str,
    ) -> Result<u64, RegistryError> {
        schema::check_table_id(table)?;
        let mut conn = self.connect().await?;

        if !schema::table_exists(&mut conn, table).await? {
            schema::create_table(&mut conn, table).await?;
        }

        let geo = self.resolve_geo(address).await;
        let (country, stateprov, city) = match &geo {
            Some(loc) => (loc.country.clone(), loc.stateprov.clone(), loc.city.clone()),
            None => (None, None, None),
        };

        let sql = format!(
            r#"INSERT INTO "{table}" (name, address, port, owner, country, stateprov, city)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#
        );
        let result = sqlx::query(&sql)
            .bind(name)
            .bind(address)
            .bind(i64::from(port))
            .bind(owner)
            .bind(country)
            .bind(stateprov)
            .bind(city)
            .execute(&mut conn)
            .await;

        match result {
            Ok(done) => {
                let affected = done.rows_affected();
                info!("Insert into '{table}' complete - {affected} rows affected");
                Ok(affected)
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(RegistryError::ConstraintViolation {
                    address: address.to_string(),
                    port,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Updates name, owner, and re-resolved geo fields on the row matching
    /// (address, port), restamping `modtime`.
    ///
    /// Geo fields are only touched when resolution succeeded; a failed
    /// lookup leaves whatever the row already holds. Returns the affected
    /// row count: 0 means no matching row (not an error).
    pub async fn update(
        &self,
        table: &str,
        name: &str,
        address: &str,
        port: u16,
        owner: &str,
    ) -> Result<u64, RegistryError> {
        schema::check_table_id(table)?;
        let mut conn = self.connect().await?;

        // Location may have changed, or the insert-time attempt may have
        // failed; resolve again either way.
        let geo = self.resolve_geo(address).await;

        let result = match geo {
            Some(loc) => {
                let sql = format!(
                    r#"UPDATE "{table}"
                       SET name = ?, owner = ?, country = ?, stateprov = ?, city = ?,
                           modtime = CURRENT_TIMESTAMP
                       WHERE address = ? AND port = ?"#
                );
                sqlx::query(&sql)
                    .bind(name)
                    .bind(owner)
                    .bind(loc.country)
                    .bind(loc.stateprov)
                    .bind(loc.city)
                    .bind(address)
                    .bind(i64::from(port))
                    .execute(&mut conn)
                    .await?
            }
            None => {
                let sql = format!(
                    r#"UPDATE "{table}"
                       SET name = ?, owner = ?, modtime = CURRENT_TIMESTAMP
                       WHERE address = ? AND port = ?"#
                );
                sqlx::query(&sql)
                    .bind(name)
                    .bind(owner)
                    .bind(address)
                    .bind(i64::from(port))
                    .execute(&mut conn)
                    .await?
            }
        };

        let affected = result.rows_affected();
        info!("Update of '{table}' complete - {affected} rows affected");
        Ok(affected)
    }

    /// Deletes the row matching (address, port).
    ///
    /// Returns `true` iff exactly one row was removed, `false` if none
    /// matched. More than one match means the uniqueness invariant was
    /// violated out-of-band and is a [`RegistryError::SchemaConflict`].
    pub async fn remove(
        &self,
        table: &str,
        address: &str,
        port: u16,
    ) -> Result<bool, RegistryError> {
        schema::check_table_id(table)?;
        let mut conn = self.connect().await?;

        let sql = format!(r#"DELETE FROM "{table}" WHERE address = ? AND port = ?"#);
        let result = sqlx::query(&sql)
            .bind(address)
            .bind(i64::from(port))
            .execute(&mut conn)
            .await?;

        match result.rows_affected() {
            0 => Ok(false),
            1 => Ok(true),
            n => Err(RegistryError::SchemaConflict(format!(
                "removed {n} rows for {address}:{port}, expected at most 1"
            ))),
        }
    }

    /// Reads every row of the table as an ordered column-name to value map.
    ///
    /// Row order is whatever the store yields for the current table state;
    /// no cross-row ordering is promised.
    pub async fn read_all(&self, table: &str) -> Result<Vec<RegistryRow>, RegistryError> {
        schema::check_table_id(table)?;
        let mut conn = self.connect().await?;

        let sql = format!(r#"SELECT * FROM "{table}""#);
        let rows = sqlx::query(&sql).fetch_all(&mut conn).await?;
        rows.iter().map(row_to_entry).collect()
    }
}

fn row_to_entry(row: &SqliteRow) -> Result<RegistryRow, RegistryError> {
    let mut entry = RegistryRow::new();
    for (idx, column) in row.columns().iter().enumerate() {
        entry.insert(column.name().to_string(), column_value(row, idx)?);
    }
    Ok(entry)
}

/// Decodes one column by its runtime storage class.
fn column_value(row: &SqliteRow, idx: usize) -> Result<Value, RegistryError> {
    let raw = row.try_get_raw(idx)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let value = match raw.type_info().name() {
        "INTEGER" => Value::from(row.try_get::<i64, _>(idx)?),
        "REAL" => Value::from(row.try_get::<f64, _>(idx)?),
        // TEXT, and anything SQLite surfaces as text (timestamps included)
        _ => Value::from(row.try_get::<String, _>(idx)?),
    };
    Ok(value)
}
