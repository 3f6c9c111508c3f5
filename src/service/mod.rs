// Blocking JSON-over-HTTP agent shared by the Ollama and Qdrant clients


use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};
use ureq::Body;
use ureq::http::Response;
use url::Url;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 1;
const EXPONENTIAL_BACKOFF_BASE: u32 = 2;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{service} is unavailable at {url}: {message}")]
    Unavailable {
        service: &'static str,
        url: String,
        message: String,
    },

    #[error("{service} returned HTTP {status} for {url}: {message}")]
    Status {
        service: &'static str,
        url: String,
        status: u16,
        message: String,
    },

    #[error("Invalid response from {service}: {message}")]
    InvalidResponse {
        service: &'static str,
        message: String,
    },

    #[error("Request to {service} failed: {message}")]
    Request {
        service: &'static str,
        message: String,
    },
}

impl ServiceError {
    /// HTTP status of the failed request, if the service answered at all
    #[inline]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[inline]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[derive(Debug, Clone, Copy)]
enum Method {
    Get,
    Post,
    Put,
    Delete,
}

/// A named HTTP endpoint speaking JSON in both directions
#[derive(Debug, Clone)]
pub struct ServiceAgent {
    service: &'static str,
    base_url: Url,
    agent: ureq::Agent,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl ServiceAgent {
    #[inline]
    pub fn new(service: &'static str, base_url: Url) -> Self {
        Self {
            service,
            base_url,
            agent: build_agent(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)),
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = build_agent(timeout);
        self
    }

    #[inline]
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts.max(1);
        self
    }

    /// Base delay before the first retry; doubles on every further attempt
    #[inline]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    #[inline]
    pub fn service(&self) -> &'static str {
        self.service
    }

    #[inline]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[inline]
    pub fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }

    #[inline]
    pub fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        let body = self.execute(Method::Get, path, None)?;
        self.parse(&body)
    }

    #[inline]
    pub fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        let body = self.execute(Method::Delete, path, None)?;
        self.parse(&body)
    }

    #[inline]
    pub fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ServiceError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request_json = self.serialize(body)?;
        let response = self.execute(Method::Post, path, Some(&request_json))?;
        self.parse(&response)
    }

    #[inline]
    pub fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ServiceError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request_json = self.serialize(body)?;
        let response = self.execute(Method::Put, path, Some(&request_json))?;
        self.parse(&response)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ServiceError> {
        self.base_url
            .join(path)
            .map_err(|e| ServiceError::Request {
                service: self.service,
                message: format!("Failed to build URL for '{}': {}", path, e),
            })
    }

    fn serialize<B: Serialize + ?Sized>(&self, body: &B) -> Result<String, ServiceError> {
        serde_json::to_string(body).map_err(|e| ServiceError::Request {
            service: self.service,
            message: format!("Failed to serialize request: {}", e),
        })
    }

    fn parse<T: DeserializeOwned>(&self, body: &str) -> Result<T, ServiceError> {
        serde_json::from_str(body).map_err(|e| ServiceError::InvalidResponse {
            service: self.service,
            message: format!("Failed to parse response: {}", e),
        })
    }

    fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&str>,
    ) -> Result<String, ServiceError> {
        let url = self.endpoint(path)?;
        debug!("{} {:?} {}", self.service, method, url);
        self.request_with_retry(&url, || self.send(method, &url, body))
    }

    fn send(
        &self,
        method: Method,
        url: &Url,
        body: Option<&str>,
    ) -> Result<Response<Body>, ureq::Error> {
        let body = body.unwrap_or("{}");
        match method {
            Method::Get => self.agent.get(url.as_str()).call(),
            Method::Delete => self.agent.delete(url.as_str()).call(),
            Method::Post => self
                .agent
                .post(url.as_str())
                .header("Content-Type", "application/json")
                .send(body),
            Method::Put => self
                .agent
                .put(url.as_str())
                .header("Content-Type", "application/json")
                .send(body),
        }
    }

    fn request_with_retry<F>(&self, url: &Url, mut request_fn: F) -> Result<String, ServiceError>
    where
        F: FnMut() -> Result<Response<Body>, ureq::Error>,
    {
        let mut last_error = None;

        for attempt in 1..=self.retry_attempts {
            debug!("HTTP request attempt {}/{}", attempt, self.retry_attempts);

            let error = match request_fn() {
                Ok(mut response) => {
                    let status = response.status();
                    let text = response
                        .body_mut()
                        .read_to_string()
                        .map_err(|e| self.unavailable(url, &e))?;

                    if status.is_success() {
                        debug!("Request succeeded on attempt {}", attempt);
                        return Ok(text);
                    }

                    let error = ServiceError::Status {
                        service: self.service,
                        url: url.to_string(),
                        status: status.as_u16(),
                        message: text,
                    };
                    if status.is_client_error() {
                        debug!("Client error (status {}), not retrying", status);
                        return Err(error);
                    }
                    warn!(
                        "Server error (status {}), attempt {}/{}",
                        status, attempt, self.retry_attempts
                    );
                    error
                }
                Err(
                    e @ (ureq::Error::ConnectionFailed
                    | ureq::Error::HostNotFound
                    | ureq::Error::Timeout(_)
                    | ureq::Error::Io(_)),
                ) => {
                    warn!(
                        "Transport error: {}, attempt {}/{}",
                        e, attempt, self.retry_attempts
                    );
                    self.unavailable(url, &e)
                }
                Err(e) => {
                    warn!("Non-retryable error: {}", e);
                    return Err(ServiceError::Request {
                        service: self.service,
                        message: e.to_string(),
                    });
                }
            };

            last_error = Some(error);

            if attempt < self.retry_attempts {
                let delay = self.retry_delay * EXPONENTIAL_BACKOFF_BASE.pow(attempt - 1);
                debug!("Waiting {:?} before retry", delay);
                std::thread::sleep(delay);
            }
        }

        error!("All retry attempts failed for request to {}", url);

        Err(last_error.unwrap_or_else(|| ServiceError::Request {
            service: self.service,
            message: "Request failed after retries".to_string(),
        }))
    }

    fn unavailable(&self, url: &Url, error: &ureq::Error) -> ServiceError {
        ServiceError::Unavailable {
            service: self.service,
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}
