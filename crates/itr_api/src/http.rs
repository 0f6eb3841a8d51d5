use std::time::Duration;

use itr_core::error::AppError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{normalize_base_url, ClientConfig};

/// Longest slice of an error body carried into `AppError::details`.
const MAX_DETAIL_BODY: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// Status and body of a completed exchange. Non-2xx statuses are replies, not errors; only
/// transport failures fail [`ApiClient::send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub method: Method,
    pub path: String,
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        serde_json::from_str(&self.body).map_err(|e| {
            AppError::new("API_DECODE_FAILED", "Respuesta inesperada del servidor")
                .with_details(format!(
                    "{} {}: status={}; err={e}",
                    self.method.as_str(),
                    self.path,
                    self.status
                ))
        })
    }

    pub fn status_error(&self) -> AppError {
        let mut body: String = self.body.chars().take(MAX_DETAIL_BODY).collect();
        if body.len() < self.body.len() {
            body.push_str("...");
        }
        AppError::new("API_STATUS_FAILED", "El servidor rechazó la solicitud").with_details(
            format!(
                "{} {}: status={}; body={body}",
                self.method.as_str(),
                self.path,
                self.status
            ),
        )
    }

    /// Decode a 2xx body, or turn any other status into `API_STATUS_FAILED`.
    pub fn success_json<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        if !self.is_success() {
            return Err(self.status_error());
        }
        self.json()
    }
}

/// Blocking JSON client bound to one backend base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    agent: ureq::Agent,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let base_url = normalize_base_url(base_url)?;
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Ok(Self { base_url, agent })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, AppError> {
        Self::new(&config.base_url, config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Reply, AppError> {
        self.send::<()>(Method::Get, path, query, None)
    }

    pub fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<Reply, AppError> {
        self.send(Method::Post, path, &[], Some(body))
    }

    pub fn put<B: Serialize>(&self, path: &str, body: &B) -> Result<Reply, AppError> {
        self.send(Method::Put, path, &[], Some(body))
    }

    pub fn delete(&self, path: &str) -> Result<Reply, AppError> {
        self.send::<()>(Method::Delete, path, &[], None)
    }

    pub fn send<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<Reply, AppError> {
        let mut req = self.agent.request(method.as_str(), &self.url(path));
        for (key, value) in query {
            req = req.query(key, value);
        }
        debug!(method = method.as_str(), path, "sending request");

        let result = match body {
            Some(body) => {
                let value = serde_json::to_value(body).map_err(|e| {
                    AppError::new("API_ENCODE_FAILED", "Failed to encode request body")
                        .with_details(format!("{} {path}: {e}", method.as_str()))
                })?;
                req.send_json(value)
            }
            None => req.call(),
        };

        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(transport)) => {
                warn!(method = method.as_str(), path, error = %transport, "backend unreachable");
                return Err(AppError::new(
                    "API_UNREACHABLE",
                    "No se pudo conectar con el servidor",
                )
                .with_details(format!("{}: {transport}", self.url(path)))
                .with_retryable(true));
            }
        };

        let status = response.status();
        let body = response.into_string().map_err(|e| {
            AppError::new("API_DECODE_FAILED", "Failed to read response body")
                .with_details(format!("{} {path}: status={status}; err={e}", method.as_str()))
                .with_retryable(true)
        })?;
        if !(200..300).contains(&status) {
            warn!(method = method.as_str(), path, status, "request failed");
        }

        Ok(Reply {
            method,
            path: path.to_string(),
            status,
            body,
        })
    }
}
