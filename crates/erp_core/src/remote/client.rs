//! Blocking JSON client for the REST collaborator.

use super::{RemoteError, RemoteResult};
use crate::config::ApiConfig;
use log::{debug, warn};
use serde_json::Value;
use std::time::{Duration, Instant};

const MAX_ERROR_BODY_CHARS: usize = 240;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// JSON-over-HTTP client bound to one base URL.
pub struct ApiClient {
    agent: ureq::Agent,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_millis(config.connect_timeout_ms))
            .timeout_read(Duration::from_millis(config.request_timeout_ms))
            .timeout_write(Duration::from_millis(config.request_timeout_ms))
            .build();
        Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Builds an absolute URL for a resource path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `GET path?query` and decodes the JSON body.
    pub fn get_json(&self, path: &str, query: &[(String, String)]) -> RemoteResult<Value> {
        let mut request = self.agent.get(&self.url(path));
        for (name, value) in query {
            request = request.query(name, value);
        }
        self.execute(HttpMethod::Get, path, request, None)
    }

    /// Sends `body` as JSON with `method` and decodes the JSON reply.
    pub fn send_json(&self, method: HttpMethod, path: &str, body: &Value) -> RemoteResult<Value> {
        let request = self.agent.request(method.as_str(), &self.url(path));
        self.execute(method, path, request, Some(body))
    }

    /// `DELETE path`; any 2xx reply is success.
    pub fn delete(&self, path: &str) -> RemoteResult<()> {
        let request = self.agent.delete(&self.url(path));
        self.execute(HttpMethod::Delete, path, request, None)
            .map(|_| ())
    }

    fn execute(
        &self,
        method: HttpMethod,
        path: &str,
        request: ureq::Request,
        body: Option<&Value>,
    ) -> RemoteResult<Value> {
        let started_at = Instant::now();
        let request = request.set("accept", "application/json");
        let result = match body {
            Some(body) => request.send_json(body),
            None => request.call(),
        };

        match result {
            Ok(response) => {
                let status = response.status();
                let text = response
                    .into_string()
                    .map_err(|err| RemoteError::Decode(err.to_string()))?;
                debug!(
                    "event=api_request module=remote status=ok method={} path={} http_status={} duration_ms={}",
                    method.as_str(),
                    path,
                    status,
                    started_at.elapsed().as_millis()
                );
                decode_body(&text)
            }
            Err(ureq::Error::Status(code, response)) => {
                let body = response.into_string().unwrap_or_default();
                warn!(
                    "event=api_request module=remote status=error method={} path={} http_status={} duration_ms={}",
                    method.as_str(),
                    path,
                    code,
                    started_at.elapsed().as_millis()
                );
                Err(RemoteError::Status {
                    code,
                    body: truncate(body.trim(), MAX_ERROR_BODY_CHARS),
                })
            }
            Err(ureq::Error::Transport(err)) => {
                warn!(
                    "event=api_request module=remote status=error method={} path={} duration_ms={} error_code=transport error={}",
                    method.as_str(),
                    path,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(RemoteError::Transport(err.to_string()))
            }
        }
    }
}

fn decode_body(text: &str) -> RemoteResult<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|err| RemoteError::Decode(err.to_string()))
}

fn truncate(value: &str, max_chars: usize) -> String {
    let mut truncated = value.chars().take(max_chars).collect::<String>();
    if value.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}
