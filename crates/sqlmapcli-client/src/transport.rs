//! HTTP transport to the sqlmapapi server.
//!
//! Every call decodes the body as JSON and checks the `success` field of the
//! envelope. Failures of any kind are logged with the method and path before
//! they are handed back, so callers that collapse them to `None`/`false`
//! still leave a diagnostic behind.

use crate::error::{ClientError, TransportError};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// JSON-over-HTTP connection to one sqlmapapi server.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    base_url: Url,
}

impl Transport {
    /// Create a transport for `address` (e.g. `http://127.0.0.1:8775`).
    ///
    /// # Errors
    /// Returns error if the address is not a valid URL or the HTTP client
    /// cannot be created.
    pub fn new(address: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = Url::parse(address).map_err(|source| ClientError::InvalidAddress {
            address: address.to_string(),
            source,
        })?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// Base address of the server.
    #[must_use]
    pub fn address(&self) -> &Url {
        &self.base_url
    }

    /// `GET` a path and decode the envelope payload.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, TransportError> {
        self.request(Method::GET, path, None::<&()>).await
    }

    /// `POST` a JSON body to a path and decode the envelope payload.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::POST, path, Some(body)).await
    }

    async fn request<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let result = self.send(method.clone(), path, body).await;
        if let Err(e) = &result {
            tracing::error!("Fail to {} {}: {}", method, path, e);
        }
        result
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.base_url.join(path)?;
        tracing::debug!("{} {}", method, url);

        let mut builder = self.client.request(method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<Value>(&bytes)
                .ok()
                .and_then(|v| envelope_message(&v));
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Value = serde_json::from_slice(&bytes)?;
        if envelope.get("success").and_then(Value::as_bool) != Some(true) {
            return Err(TransportError::Rejected {
                message: envelope_message(&envelope),
            });
        }

        Ok(serde_json::from_value(envelope)?)
    }
}

fn envelope_message(envelope: &Value) -> Option<String> {
    envelope.get("message").map(|m| match m {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}
