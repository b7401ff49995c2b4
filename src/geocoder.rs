//! Pluggable geocoding backends.

use serde_json::Value;

use crate::error::SearchError;
use crate::transport::Transport;
use crate::types::{GeocodeFeature, GeocodeQuery, LookupQuery, NearQuery, ResultSet};

/// Layer tag marking an intermediate result that benefits from a follow-up
/// query (a street expanding into house-number suggestions).
const RESOLVABLE_LAYER: &str = "street";

/// Geocoding backend capability.
///
/// Calls are blocking; the [`RequestCoordinator`](crate::RequestCoordinator)
/// runs them on worker threads and reconciles completions on the control
/// thread. The matching and ranking engine lives behind this trait — the
/// core treats returned result sets as opaque and already ordered.
pub trait Geocoder: Send + Sync {
    /// Full-text forward geocode.
    fn search(&self, query: &GeocodeQuery) -> Result<ResultSet, SearchError>;

    /// Prefix/typeahead geocode. Same call shape as [`search`](Self::search);
    /// rate limiting is the caller's policy.
    fn autocomplete(&self, query: &GeocodeQuery) -> Result<ResultSet, SearchError>;

    /// Reverse geocode by coordinate and accuracy radius.
    fn near(&self, query: &NearQuery) -> Result<ResultSet, SearchError>;

    /// Follow-up query scoped to a previously returned feature.
    fn select(&self, feature: &GeocodeFeature) -> Result<ResultSet, SearchError>;

    /// House-number level lookup of a previously returned id.
    fn lookup(&self, query: &LookupQuery) -> Result<ResultSet, SearchError>;

    /// True when the feature is an intermediate result worth expanding via
    /// [`select`](Self::select). Pure predicate, no I/O.
    fn can_resolve(&self, feature: &GeocodeFeature) -> bool;
}

/// Default backend: every call fails with [`SearchError::NotConfigured`], so
/// an unconfigured widget degrades to an error message instead of panicking.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopGeocoder;

impl Geocoder for NoopGeocoder {
    fn search(&self, _query: &GeocodeQuery) -> Result<ResultSet, SearchError> {
        Err(SearchError::NotConfigured)
    }

    fn autocomplete(&self, _query: &GeocodeQuery) -> Result<ResultSet, SearchError> {
        Err(SearchError::NotConfigured)
    }

    fn near(&self, _query: &NearQuery) -> Result<ResultSet, SearchError> {
        Err(SearchError::NotConfigured)
    }

    fn select(&self, _feature: &GeocodeFeature) -> Result<ResultSet, SearchError> {
        Err(SearchError::NotConfigured)
    }

    fn lookup(&self, _query: &LookupQuery) -> Result<ResultSet, SearchError> {
        Err(SearchError::NotConfigured)
    }

    fn can_resolve(&self, _feature: &GeocodeFeature) -> bool {
        false
    }
}

/// Backend speaking the remote geocoding service's GET endpoints
/// (`/search`, `/autocomplete`, `/near`, `/get` under a base URL).
pub struct RemoteGeocoder<T> {
    base_url: String,
    api_key: Option<String>,
    transport: T,
}

impl<T: Transport> RemoteGeocoder<T> {
    pub fn new(base_url: impl Into<String>, transport: T) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            api_key: None,
            transport,
        }
    }

    /// Append this API key as a query parameter on every call.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    fn call(
        &self,
        endpoint: &str,
        mut params: Vec<(String, String)>,
    ) -> Result<ResultSet, SearchError> {
        if let Some(key) = &self.api_key {
            params.push(("api_key".to_string(), key.clone()));
        }
        let url = format!("{}{endpoint}", self.base_url);

        let body = self.transport.perform_get(&url, &params).map_err(|error| {
            log::warn!("geocoder call {endpoint} failed: {error}");
            SearchError::classify(&error)
        })?;

        // Some backend failures come back as a 200 with an error object in
        // the body.
        if let Some(error) = body.get("error") {
            let code = error.get("code").and_then(Value::as_u64).unwrap_or(500) as u16;
            log::warn!("geocoder call {endpoint} returned body error {code}");
            return Err(SearchError::classify_status(code));
        }

        ResultSet::from_body(&body).map_err(|error| {
            log::warn!("geocoder call {endpoint} returned an unreadable body: {error}");
            SearchError::ServiceUnavailable
        })
    }
}

impl<T: Transport> Geocoder for RemoteGeocoder<T> {
    fn search(&self, query: &GeocodeQuery) -> Result<ResultSet, SearchError> {
        self.call("/search", query.to_params())
    }

    fn autocomplete(&self, query: &GeocodeQuery) -> Result<ResultSet, SearchError> {
        self.call("/autocomplete", query.to_params())
    }

    fn near(&self, query: &NearQuery) -> Result<ResultSet, SearchError> {
        self.call("/near", query.to_params())
    }

    fn select(&self, feature: &GeocodeFeature) -> Result<ResultSet, SearchError> {
        let query = select_query(feature)?;
        self.call("/autocomplete", query.to_params())
    }

    fn lookup(&self, query: &LookupQuery) -> Result<ResultSet, SearchError> {
        self.call("/get", query.to_params())
    }

    fn can_resolve(&self, feature: &GeocodeFeature) -> bool {
        feature.layer.as_deref() == Some(RESOLVABLE_LAYER)
    }
}

/// Name a select follow-up is keyed on. A feature without a usable name
/// cannot be expanded and is rejected before any dispatch.
pub(crate) fn resolvable_name(feature: &GeocodeFeature) -> Result<&str, SearchError> {
    feature
        .name
        .as_deref()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| SearchError::InvalidInput("selected feature has no name".to_string()))
}

/// Build the follow-up query for a selected feature: its bare name as the
/// text, scoped to its region when present.
pub(crate) fn select_query(feature: &GeocodeFeature) -> Result<GeocodeQuery, SearchError> {
    let mut query = GeocodeQuery::new(resolvable_name(feature)?);
    if let Some(region) = &feature.region {
        query = query.with_region(region.clone());
    }
    Ok(query)
}
