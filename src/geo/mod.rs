//! Geo-location resolution.
//!
//! The record store only depends on the [`GeoResolver`] capability: address
//! in, location or failure out. Any backend satisfying it is interchangeable;
//! [`DbIpResolver`] is the db-ip.com HTTP implementation.

mod dbip;

pub use dbip::DbIpResolver;

use async_trait::async_trait;

use crate::error_handling::GeoError;

/// Geographic metadata resolved from a network address.
///
/// Produced transiently per write operation and folded into the registry
/// row; never persisted on its own. Individual fields may be absent even on
/// a successful lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoLocation {
    /// The address the lookup resolved.
    pub address: String,
    /// Country name.
    pub country: Option<String>,
    /// State or province name.
    pub stateprov: Option<String>,
    /// City name.
    pub city: Option<String>,
}

/// Capability to resolve a network address to a geographic location.
#[async_trait]
pub trait GeoResolver: Send + Sync {
    /// Resolves `address` to a location, or fails.
    ///
    /// Callers treat failure as "no enrichment available", never as a
    /// reason to abort the surrounding operation.
    async fn resolve(&self, address: &str) -> Result<GeoLocation, GeoError>;
}
