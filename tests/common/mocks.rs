//! Mock implementations for test fixtures.
//!
//! Re-exports the mock transport from `adk_chat::adapters::mock` and adds a
//! builder for the responses the agent server endpoints return.

pub use adk_chat::adapters::mock::{MockHttpClient, MockResponse};
pub use adk_chat::traits::{Headers, HttpClient, HttpError, Response};

use bytes::Bytes;

/// Configuration for setting up mock HTTP responses.
pub struct MockHttpConfig {
    client: MockHttpClient,
}

impl MockHttpConfig {
    /// Creates a new mock HTTP configuration.
    pub fn new() -> Self {
        Self {
            client: MockHttpClient::new(),
        }
    }

    /// Configures a JSON response.
    pub fn with_json_response(self, url: &str, status: u16, json: &str) -> Self {
        self.client.set_response(
            url,
            MockResponse::Success(Response::new(status, Bytes::from(json.to_string()))),
        );
        self
    }

    /// Configures a JSON response for one method only.
    pub fn with_method_json(self, method: &str, url: &str, json: serde_json::Value) -> Self {
        self.client
            .set_method_response(method, url, MockResponse::json(json));
        self
    }

    /// Configures a transport failure.
    pub fn with_error_response(self, url: &str, error: HttpError) -> Self {
        self.client.set_response(url, MockResponse::Error(error));
        self
    }

    /// Configures a streamed body delivered in the given chunks.
    pub fn with_sse_chunks<I, S>(self, url: &str, chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.client.set_response(url, MockResponse::sse(chunks));
        self
    }

    /// Configures a streamed body that fails after the given chunks.
    pub fn with_sse_failure(self, url: &str, chunks: &[&str], error: HttpError) -> Self {
        let chunks = chunks
            .iter()
            .map(|c| Bytes::from(c.to_string()))
            .collect();
        self.client
            .set_response(url, MockResponse::StreamThenError(chunks, error));
        self
    }

    /// Configures a streamed body that stalls after the given chunks.
    pub fn with_sse_hang(self, url: &str, chunks: &[&str]) -> Self {
        let chunks = chunks
            .iter()
            .map(|c| Bytes::from(c.to_string()))
            .collect();
        self.client
            .set_response(url, MockResponse::StreamThenHang(chunks));
        self
    }

    /// Configures a default success response for unmatched URLs.
    pub fn with_default_success(self, status: u16, body: &str) -> Self {
        self.client
            .set_default_response(MockResponse::Success(Response::new(
                status,
                Bytes::from(body.to_string()),
            )));
        self
    }

    /// Builds the configured MockHttpClient.
    pub fn build(self) -> MockHttpClient {
        self.client
    }
}

impl Default for MockHttpConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_http_config() {
        let client = MockHttpConfig::new()
            .with_json_response("http://agent.test/list-apps", 200, r#"["a"]"#)
            .build();

        assert!(client.get_requests().is_empty());
    }

    #[tokio::test]
    async fn test_mock_http_with_default() {
        let client = MockHttpConfig::new()
            .with_default_success(200, "OK")
            .build();

        let response = client
            .get("http://agent.test/anything", &Headers::new())
            .await
            .unwrap();

        assert_eq!(response.status, 200);
    }
}
