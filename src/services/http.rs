//! Blocking REST client with a response interceptor chain.
//!
//! Every response that arrives (any status) is shown to each registered
//! interceptor before the client turns non-2xx statuses into
//! `ApiError::Status`. Interceptors observe; they cannot swallow or
//! rewrite a response. Transport failures never reach them.

use crate::services::config::Config;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{status}: {}", .detail.as_deref().unwrap_or("request failed"))]
    Status {
        status: u16,
        detail: Option<String>,
        body: Value,
        restricted: bool,
    },
    #[error("unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("response interceptor `{0}` is already registered")]
    InterceptorAlreadyRegistered(&'static str),
    #[error("invalid api url `{0}`")]
    InvalidUrl(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when a response interceptor classified this error as an
    /// administrative account restriction.
    pub fn is_restriction(&self) -> bool {
        matches!(self, ApiError::Status { restricted: true, .. })
    }
}

/// A response as interceptors see it.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub method: &'static str,
    pub path: String,
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    /// The backend's error text, when `detail` is a string.
    pub fn detail(&self) -> Option<&str> {
        self.body.get("detail").and_then(Value::as_str)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Outcome an interceptor reports back for a response. `Flagged` marks the
/// resulting error so callers can recognize it; the response still flows on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Flagged,
}

pub trait ResponseInterceptor {
    fn name(&self) -> &'static str;
    fn on_response(&self, response: &ApiResponse) -> Verdict;
}

#[derive(Default)]
struct Registry {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(u64, Rc<dyn ResponseInterceptor>)>>,
}

/// Keeps an interceptor registered for as long as it is alive.
#[must_use = "dropping the guard deregisters the interceptor"]
pub struct InterceptorGuard {
    id: u64,
    name: &'static str,
    registry: Weak<Registry>,
}

impl InterceptorGuard {
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for InterceptorGuard {
    fn drop(&mut self) {
        if let Some(reg) = self.registry.upgrade() {
            reg.entries.borrow_mut().retain(|(id, _)| *id != self.id);
            tracing::debug!(interceptor = self.name, "response interceptor released");
        }
    }
}

pub struct ApiClient {
    http: reqwest::blocking::Client,
    base_url: String,
    registry: Rc<Registry>,
}

impl ApiClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            registry: Rc::new(Registry::default()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Scheme, host and port of the backend; durable storage is scoped to it.
    pub fn origin(&self) -> Result<String, ApiError> {
        let url = reqwest::Url::parse(&self.base_url)
            .map_err(|_| ApiError::InvalidUrl(self.base_url.clone()))?;
        let origin = url.origin();
        if !origin.is_tuple() {
            return Err(ApiError::InvalidUrl(self.base_url.clone()));
        }
        Ok(origin.ascii_serialization())
    }

    /// Registers `interceptor` under its name. A second registration under
    /// the same name is refused while the first guard is alive.
    pub fn register(
        &self,
        interceptor: Rc<dyn ResponseInterceptor>,
    ) -> Result<InterceptorGuard, ApiError> {
        let name = interceptor.name();
        let mut entries = self.registry.entries.borrow_mut();
        if entries.iter().any(|(_, i)| i.name() == name) {
            return Err(ApiError::InterceptorAlreadyRegistered(name));
        }
        let id = self.registry.next_id.get();
        self.registry.next_id.set(id + 1);
        entries.push((id, interceptor));
        tracing::debug!(interceptor = name, "response interceptor registered");
        Ok(InterceptorGuard {
            id,
            name,
            registry: Rc::downgrade(&self.registry),
        })
    }

    pub fn interceptor_count(&self) -> usize {
        self.registry.entries.borrow().len()
    }

    pub fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let req = self.http.get(&url).query(query);
        self.execute("GET", path, url, req)
    }

    pub fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let req = self.http.post(&url).json(body);
        self.execute("POST", path, url, req)
    }

    pub fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let req = self.http.put(&url).json(body);
        self.execute("PUT", path, url, req)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn execute<T: DeserializeOwned>(
        &self,
        method: &'static str,
        path: &str,
        url: String,
        req: reqwest::blocking::RequestBuilder,
    ) -> Result<T, ApiError> {
        tracing::debug!(method, %url, "request");
        let resp = req.send().map_err(|source| ApiError::Transport {
            url: url.clone(),
            source,
        })?;
        let status = resp.status().as_u16();
        let text = resp.text().map_err(|source| ApiError::Transport {
            url: url.clone(),
            source,
        })?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        tracing::debug!(method, %url, status, "response");

        let response = ApiResponse {
            method,
            path: path.to_string(),
            status,
            body,
        };
        let restricted = self.dispatch(&response) == Verdict::Flagged;

        if !response.is_success() {
            return Err(ApiError::Status {
                status,
                detail: response
                    .detail()
                    .map(str::to_string)
                    .or_else(|| {
                        response
                            .body
                            .get("message")
                            .and_then(Value::as_str)
                            .map(str::to_string)
                    }),
                body: response.body,
                restricted,
            });
        }
        serde_json::from_value(response.body).map_err(|source| ApiError::Decode { url, source })
    }

    /// Runs every interceptor. The entry list is snapshotted first so an
    /// interceptor may register or release others without a borrow conflict.
    fn dispatch(&self, response: &ApiResponse) -> Verdict {
        let chain: Vec<Rc<dyn ResponseInterceptor>> = self
            .registry
            .entries
            .borrow()
            .iter()
            .map(|(_, i)| i.clone())
            .collect();
        let mut verdict = Verdict::Pass;
        for i in chain {
            if i.on_response(response) == Verdict::Flagged {
                verdict = Verdict::Flagged;
            }
        }
        verdict
    }

    #[cfg(test)]
    pub(crate) fn dispatch_for_test(&self, response: &ApiResponse) -> Verdict {
        self.dispatch(response)
    }
}
