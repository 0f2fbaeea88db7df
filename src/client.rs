//! HTTP client for the agent server API.
//!
//! | Operation | Endpoint |
//! |-----------|----------|
//! | [`AgentClient::list_apps`] | `GET /list-apps` |
//! | [`AgentClient::list_sessions`] | `GET /apps/{app}/users/{user}/sessions` |
//! | [`AgentClient::create_session`] | `POST /apps/{app}/users/{user}/sessions` |
//! | [`AgentClient::get_session`] | `GET /apps/{app}/users/{user}/sessions/{id}` |
//! | [`AgentClient::delete_session`] | `DELETE /apps/{app}/users/{user}/sessions/{id}` |
//! | [`AgentClient::run_sse`] | `POST /run_sse` |
//!
//! Path segments are percent-encoded.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::adapters::ReqwestHttpClient;
use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::models::{RunAgentRequest, Session, SessionSummary};
use crate::traits::{ByteStream, Headers, HttpClient, HttpError, Response};

/// Client for the agent server, over an injected [`HttpClient`].
#[derive(Clone)]
pub struct AgentClient {
    http: Arc<dyn HttpClient>,
    base_url: String,
}

impl std::fmt::Debug for AgentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl AgentClient {
    pub fn new(http: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Production client built from `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        let http = ReqwestHttpClient::from_config(config)
            .map_err(|e| TransportError::from_http(e, &config.base_url))?;
        Ok(Self::new(Arc::new(http), config.base_url.clone()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list_apps(&self) -> Result<Vec<String>, TransportError> {
        let url = format!("{}/list-apps", self.base_url);
        let response = self.http.get(&url, &json_headers()).await;
        decode(check(response, &url)?)
    }

    pub async fn list_sessions(
        &self,
        app_name: &str,
        user_id: &str,
    ) -> Result<Vec<SessionSummary>, TransportError> {
        let url = self.sessions_url(app_name, user_id);
        let response = self.http.get(&url, &json_headers()).await;
        decode(check(response, &url)?)
    }

    /// Create an empty session.
    pub async fn create_session(
        &self,
        app_name: &str,
        user_id: &str,
    ) -> Result<Session, TransportError> {
        let url = self.sessions_url(app_name, user_id);
        let response = self.http.post(&url, "", &Headers::new()).await;
        let session: Session = decode(check(response, &url)?)?;
        tracing::debug!(session_id = %session.id, app = app_name, "session created");
        Ok(session)
    }

    pub async fn get_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> Result<Session, TransportError> {
        let url = self.session_url(app_name, user_id, session_id);
        let response = self.http.get(&url, &json_headers()).await;
        decode(check(response, &url)?)
    }

    pub async fn delete_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> Result<(), TransportError> {
        let url = self.session_url(app_name, user_id, session_id);
        let response = self.http.delete(&url, &Headers::new()).await;
        check(response, &url)?;
        tracing::debug!(session_id, app = app_name, "session deleted");
        Ok(())
    }

    /// Start a turn and return the open event stream.
    ///
    /// A non-2xx status fails here, before any event is read.
    pub async fn run_sse(&self, request: &RunAgentRequest) -> Result<ByteStream, TransportError> {
        let url = format!("{}/run_sse", self.base_url);
        let body = serde_json::to_string(request).map_err(|e| TransportError::InvalidRequest {
            message: e.to_string(),
        })?;

        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Accept".to_string(), "text/event-stream".to_string());

        tracing::debug!(
            app = %request.app_name,
            session_id = %request.session_id,
            "starting turn"
        );
        self.http
            .post_stream(&url, &body, &headers)
            .await
            .map_err(|e| TransportError::from_http(e, &url))
    }

    fn sessions_url(&self, app_name: &str, user_id: &str) -> String {
        format!(
            "{}/apps/{}/users/{}/sessions",
            self.base_url,
            urlencoding::encode(app_name),
            urlencoding::encode(user_id)
        )
    }

    fn session_url(&self, app_name: &str, user_id: &str, session_id: &str) -> String {
        format!(
            "{}/{}",
            self.sessions_url(app_name, user_id),
            urlencoding::encode(session_id)
        )
    }
}

fn json_headers() -> Headers {
    let mut headers = Headers::new();
    headers.insert("Accept".to_string(), "application/json".to_string());
    headers
}

/// Map transport failures and non-2xx statuses to [`TransportError`].
fn check(result: Result<Response, HttpError>, url: &str) -> Result<Response, TransportError> {
    let response = result.map_err(|e| TransportError::from_http(e, url))?;
    if response.is_success() {
        Ok(response)
    } else {
        let message = response
            .text()
            .unwrap_or_else(|_| "Unknown error".to_string());
        tracing::debug!(status = response.status, url, "request failed");
        Err(TransportError::HttpStatus {
            status: response.status,
            message,
        })
    }
}

fn decode<T: DeserializeOwned>(response: Response) -> Result<T, TransportError> {
    response
        .json()
        .map_err(|e| TransportError::InvalidResponse {
            message: e.to_string(),
        })
}
