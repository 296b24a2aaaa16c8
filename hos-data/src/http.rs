//! Blocking bridge over the async HTTP client shared by the service adapters.
//!
//! The provider traits in `hos-core` are synchronous so the planners stay
//! embeddable anywhere. Each adapter owns an [`HttpBridge`] that issues the
//! request on a Tokio runtime and blocks until the response is decoded.

use std::future::Future;
use std::time::Duration;

use hos_core::ProviderError;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

/// Error type for HTTP provider construction failures.
#[derive(Debug)]
pub enum ProviderBuildError {
    /// Failed to build the HTTP client.
    HttpClient(reqwest::Error),
    /// Failed to build the Tokio runtime.
    Runtime(std::io::Error),
}

impl std::fmt::Display for ProviderBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HttpClient(err) => write!(f, "failed to build HTTP client: {err}"),
            Self::Runtime(err) => write!(f, "failed to build Tokio runtime: {err}"),
        }
    }
}

impl std::error::Error for ProviderBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::HttpClient(err) => Some(err),
            Self::Runtime(err) => Some(err),
        }
    }
}

/// Default user agent for outbound requests.
pub const DEFAULT_USER_AGENT: &str = "hos-planner/0.1";

/// Default request timeout in seconds.
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP client plus the runtime used to drive it from synchronous callers.
pub(crate) struct HttpBridge {
    client: Client,
    runtime: Runtime,
    timeout: Duration,
}

impl std::fmt::Debug for HttpBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBridge")
            .field("client", &self.client)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpBridge {
    pub(crate) fn new(user_agent: &str, timeout: Duration) -> Result<Self, ProviderBuildError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            client,
            runtime,
            timeout,
        })
    }

    /// Issue a GET request without inspecting the status.
    pub(crate) async fn send(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Response, ProviderError> {
        self.client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url))
    }

    /// Issue a GET request and decode a successful JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let response = self
            .send(url, query)
            .await?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, url))?;
        decode(response).await
    }

    /// Run `future` to completion from synchronous code.
    ///
    /// Inside a multi-threaded Tokio runtime the caller's handle is reused via
    /// [`tokio::task::block_in_place`]. Outside any runtime, or inside a
    /// `current_thread` runtime, the bridge's own runtime drives the future.
    pub(crate) fn block_on<F: Future>(&self, future: F) -> F::Output {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }

    /// Convert a reqwest error to a [`ProviderError`].
    pub(crate) fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> ProviderError {
        if error.is_timeout() {
            return ProviderError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return ProviderError::HttpError {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        ProviderError::NetworkError {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

/// Decode a JSON response body.
pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
    response
        .json()
        .await
        .map_err(|err| ProviderError::ParseError {
            message: err.to_string(),
        })
}
