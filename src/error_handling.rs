use thiserror::Error;

/// Error types for registry store operations.
///
/// Connection and schema problems are hard failures and propagate to the
/// caller. "Not found" is not an error: `update` reports it as an affected
/// count of 0 and `remove` as `false`.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The backing store is unreachable or the connection could not be
    /// established. No partial write has occurred.
    #[error("could not connect to the backing store: {0}")]
    Connection(#[source] sqlx::Error),

    /// Table creation was requested for a table that already exists, or the
    /// (address, port) uniqueness invariant was found violated out-of-band.
    #[error("schema conflict: {0}")]
    SchemaConflict(String),

    /// An insert collided with an existing (address, port) pair.
    #[error("duplicate registry entry for {address}:{port}")]
    ConstraintViolation {
        /// Address of the rejected row.
        address: String,
        /// Port of the rejected row.
        port: u16,
    },

    /// The table identifier contains characters that cannot be safely used
    /// as an SQL identifier.
    #[error("invalid table identifier '{0}'")]
    InvalidTableId(String),

    /// Any other SQL execution error.
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
}

/// Error types for geo-location resolution.
///
/// These never surface as operation failures: the record store logs them
/// and writes the record without geo fields.
#[derive(Error, Debug)]
pub enum GeoError {
    /// The lookup request could not complete (network error, timeout,
    /// malformed response body).
    #[error("geo-location request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The lookup service answered but reported an error for the address.
    #[error("geo-location service error: {0}")]
    Service(String),

    /// No API key was configured for the lookup service.
    #[error("missing API key: set the {0} environment variable")]
    MissingApiKey(&'static str),
}
