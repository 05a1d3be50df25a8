//! server_registry library: registry record lifecycle management
//!
//! Tracks network-reachable entries (name, address, port, owner) in a
//! relational table, enriching each entry with geographic metadata
//! resolved from the entry's address. Tables are created on demand with a
//! fixed schema and a composite uniqueness constraint on (address, port);
//! enrichment is best-effort and never blocks the primary write.
//!
//! # Example
//!
//! ```no_run
//! use server_registry::RegistryDb;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = RegistryDb::new("sqlite://registry.db?mode=rwc");
//! let affected = registry
//!     .insert("servers", "home", "203.0.113.5", 25777, "alice")
//!     .await?;
//! assert_eq!(affected, 1);
//! for record in registry.read_all("servers").await? {
//!     println!("{}", serde_json::to_string(&record)?);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your
//! application or call these functions from an async context.

#![warn(missing_docs)]

pub mod config;
mod error_handling;
mod geo;
mod registry;
pub mod schema;

// Re-export public API
pub use error_handling::{GeoError, RegistryError};
pub use geo::{DbIpResolver, GeoLocation, GeoResolver};
pub use registry::{RegistryDb, RegistryRow};
