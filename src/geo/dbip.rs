//! Geo-location lookup backed by the db-ip.com address-info API.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::Deserialize;

use crate::config::{DBIP_API_KEY_ENV, DBIP_ENDPOINT, GEO_LOOKUP_TIMEOUT};
use crate::error_handling::GeoError;
use crate::geo::{GeoLocation, GeoResolver};

/// Response body of the db-ip address-info endpoint.
///
/// The service signals failure in-band: a present `error` field means the
/// lookup failed, regardless of HTTP status.
#[derive(Debug, Deserialize)]
struct AddrInfoResponse {
    error: Option<String>,
    address: Option<String>,
    country: Option<String>,
    stateprov: Option<String>,
    city: Option<String>,
}

impl AddrInfoResponse {
    fn into_location(self, queried: &str) -> Result<GeoLocation, GeoError> {
        if let Some(error) = self.error {
            return Err(GeoError::Service(error));
        }
        Ok(GeoLocation {
            address: self.address.unwrap_or_else(|| queried.to_string()),
            country: self.country,
            stateprov: self.stateprov,
            city: self.city,
        })
    }
}

/// [`GeoResolver`] implementation that queries db-ip.com over HTTP.
pub struct DbIpResolver {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl DbIpResolver {
    /// Creates a resolver with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self, GeoError> {
        let client = ClientBuilder::new().timeout(GEO_LOOKUP_TIMEOUT).build()?;
        Ok(DbIpResolver {
            client,
            api_key: api_key.into(),
            endpoint: DBIP_ENDPOINT.to_string(),
        })
    }

    /// Creates a resolver from the `DBIP_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, GeoError> {
        Self::from_optional_key(std::env::var(DBIP_API_KEY_ENV).ok())
    }

    fn from_optional_key(api_key: Option<String>) -> Result<Self, GeoError> {
        match api_key {
            Some(key) => Self::new(key),
            None => Err(GeoError::MissingApiKey(DBIP_API_KEY_ENV)),
        }
    }

    /// Overrides the endpoint URL. Intended for tests.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl GeoResolver for DbIpResolver {
    async fn resolve(&self, address: &str) -> Result<GeoLocation, GeoError> {
        let response: AddrInfoResponse = self
            .client
            .get(&self.endpoint)
            .query(&[("api_key", self.api_key.as_str()), ("addr", address)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        response.into_location(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successful_body_maps_to_location() {
        let body = r#"{
            "address": "203.0.113.5",
            "country": "US",
            "stateprov": "California",
            "city": "San Francisco"
        }"#;
        let response: AddrInfoResponse = serde_json::from_str(body).expect("parse failed");
        let location = response.into_location("203.0.113.5").expect("should succeed");
        assert_eq!(location.address, "203.0.113.5");
        assert_eq!(location.country.as_deref(), Some("US"));
        assert_eq!(location.stateprov.as_deref(), Some("California"));
        assert_eq!(location.city.as_deref(), Some("San Francisco"));
    }

    #[test]
    fn test_error_body_maps_to_service_error() {
        let body = r#"{"error": "invalid address"}"#;
        let response: AddrInfoResponse = serde_json::from_str(body).expect("parse failed");
        let result = response.into_location("not-an-address");
        match result {
            Err(GeoError::Service(message)) => assert_eq!(message, "invalid address"),
            other => panic!("expected service error, got {other:?}"),
        }
    }

    #[test]
    fn test_partial_body_keeps_queried_address() {
        // db-ip may omit fields it has no data for
        let body = r#"{"country": "DE"}"#;
        let response: AddrInfoResponse = serde_json::from_str(body).expect("parse failed");
        let location = response.into_location("198.51.100.7").expect("should succeed");
        assert_eq!(location.address, "198.51.100.7");
        assert_eq!(location.country.as_deref(), Some("DE"));
        assert!(location.stateprov.is_none());
        assert!(location.city.is_none());
    }

    #[test]
    fn test_missing_api_key_is_reported() {
        let result = DbIpResolver::from_optional_key(None);
        assert!(matches!(result, Err(GeoError::MissingApiKey(_))));
    }

    #[test]
    fn test_present_api_key_builds_a_resolver() {
        let result = DbIpResolver::from_optional_key(Some("test-key".to_string()));
        assert!(result.is_ok());
    }
}
