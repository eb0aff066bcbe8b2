// Hotspot backend HTTP client
//
// Wraps `reqwest::Client` with base-URL joining and envelope unwrapping.
// Endpoint groups (devices, networks) are implemented as inherent methods
// in separate files to keep this module focused on transport mechanics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::{Envelope, FailureEnvelope};
use crate::transport::TransportConfig;

/// Maximum number of body characters quoted in error messages and logs.
const BODY_PREVIEW_CHARS: usize = 200;

/// Raw HTTP client for the hotspot backend.
///
/// All methods return unwrapped `data` payloads -- the envelope is
/// stripped before the caller sees it.
#[derive(Debug, Clone)]
pub struct HotspotClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HotspotClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the API root, e.g. `https://api.konnectx.com/v1/`.
    /// Endpoint paths are appended to it verbatim.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// Parse `base_url` and build a client with default transport settings.
    pub fn from_url(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        Self::new(Url::parse(base_url)?, transport)
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/{path}`, tolerating a trailing slash on the base.
    pub(crate) fn endpoint_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and unwrap the envelope.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;

        self.parse_envelope(resp).await
    }

    /// Send a POST request with JSON body and unwrap the envelope.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        self.parse_envelope(resp).await
    }

    /// Parse the `{ success, data, error }` envelope.
    ///
    /// - HTTP 401 becomes [`Error::Authentication`].
    /// - Any other non-2xx status, or `success: false`, becomes
    ///   [`Error::Api`] with the backend's code and message when present.
    /// - A successful envelope without `data` is a deserialization error.
    async fn parse_envelope<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;
        trace!(status = status.as_u16(), body = %preview(&body), "response received");

        if status == reqwest::StatusCode::UNAUTHORIZED {
            let failure = serde_json::from_str::<FailureEnvelope>(&body).unwrap_or_default();
            let message = failure_message(&failure)
                .unwrap_or_else(|| "session expired or invalid credentials".into());
            return Err(Error::Authentication { message });
        }

        if !status.is_success() {
            let failure = serde_json::from_str::<FailureEnvelope>(&body).unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                code: failure.error.as_ref().and_then(|e| e.code()).map(String::from),
                message: failure_message(&failure).unwrap_or_else(|| {
                    let snippet = preview(&body);
                    if snippet.is_empty() {
                        format!("HTTP {status}")
                    } else {
                        format!("HTTP {status}: {snippet}")
                    }
                }),
            });
        }

        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| {
            Error::Deserialization {
                message: format!("{e} (body preview: {:?})", preview(&body)),
                body: body.clone(),
            }
        })?;

        if !envelope.success {
            let code = envelope.error.as_ref().and_then(|e| e.code()).map(String::from);
            let message = envelope
                .error
                .as_ref()
                .and_then(|e| e.message())
                .map(String::from)
                .or(envelope.message)
                .unwrap_or_else(|| "request was not successful".into());
            return Err(Error::Api {
                status: status.as_u16(),
                code,
                message,
            });
        }

        envelope.data.ok_or_else(|| Error::Deserialization {
            message: "successful response without a data payload".into(),
            body,
        })
    }
}

fn failure_message(failure: &FailureEnvelope) -> Option<String> {
    failure
        .error
        .as_ref()
        .and_then(|e| e.message())
        .map(String::from)
        .or_else(|| failure.message.clone())
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}
