//! Constants and environment variable names used across the crate.

use std::time::Duration;

/// Maximum length of the text columns in a registry table.
///
/// SQLite does not enforce VARCHAR lengths, but the declaration documents
/// the contract and carries over to stores that do.
pub const MAX_FIELD_LEN: usize = 256;

/// Environment variable holding the db-ip.com API key.
pub const DBIP_API_KEY_ENV: &str = "DBIP_API_KEY";

/// db-ip.com address-info endpoint.
pub const DBIP_ENDPOINT: &str = "https://api.db-ip.com/addrinfo";

/// Timeout for a single geo-location lookup.
///
/// There is no retry: a lookup that misses this window degrades the record
/// (geo fields stay unset), it never fails the write.
pub const GEO_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variable overriding the backing store URI.
pub const REGISTRY_DB_URI_ENV: &str = "REGISTRY_DB_URI";

/// Default backing store URI (`mode=rwc` creates the file on first use).
pub const DEFAULT_DB_URI: &str = "sqlite://registry.db?mode=rwc";

/// Default registry table name.
pub const DEFAULT_TABLE: &str = "servers";
