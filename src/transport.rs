//! HTTP GET capability consumed by the remote geocoder backend.

use serde_json::Value;

use crate::error::TransportError;

/// Blocking GET returning the parsed JSON body.
///
/// Implementations run on request worker threads, so they must be shareable.
/// The core imposes no timeout of its own; a transport may carry one.
pub trait Transport: Send + Sync {
    fn perform_get(&self, url: &str, params: &[(String, String)]) -> Result<Value, TransportError>;
}

#[cfg(feature = "http")]
pub use self::http::HttpTransport;

#[cfg(feature = "http")]
mod http {
    use std::time::Duration;

    use serde_json::Value;

    use super::Transport;
    use crate::error::TransportError;

    const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    /// [`Transport`] backed by a blocking `reqwest` client.
    #[derive(Debug, Clone)]
    pub struct HttpTransport {
        client: reqwest::blocking::Client,
    }

    impl HttpTransport {
        pub fn new() -> Result<Self, TransportError> {
            let client = reqwest::blocking::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .map_err(|error| TransportError::Network(error.to_string()))?;
            Ok(Self { client })
        }
    }

    impl Transport for HttpTransport {
        fn perform_get(
            &self,
            url: &str,
            params: &[(String, String)],
        ) -> Result<Value, TransportError> {
            let response = self
                .client
                .get(url)
                .query(params)
                .send()
                .map_err(|error| TransportError::Network(error.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(TransportError::Status {
                    code: status.as_u16(),
                    message: status
                        .canonical_reason()
                        .unwrap_or("unknown status")
                        .to_string(),
                });
            }

            let body = response
                .text()
                .map_err(|error| TransportError::Network(error.to_string()))?;
            serde_json::from_str(&body).map_err(|error| TransportError::Parse(error.to_string()))
        }
    }
}
