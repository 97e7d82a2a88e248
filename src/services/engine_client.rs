use std::time::Duration;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use crate::config::constants::HTTP_TIMEOUT_SECS;
use crate::enums::http_method::HttpMethod;
use crate::errors::{ClientError, ClientResult};
use crate::structs::api_response::ApiResponse;
use crate::traits::engine_api::EngineApi;

/// `EngineApi` over HTTP with bearer credentials.
#[derive(Clone)]
pub struct EngineClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl EngineClient {
    pub fn new(engine_url: &str, api_key: &str) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            base_url: engine_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn read_error(path: &str, response: reqwest::Response) -> ClientError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiResponse<Value>>(&body)
            .ok()
            .and_then(|envelope| envelope.error.or(envelope.message))
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("request failed").to_string()
                } else {
                    body
                }
            });
        map_status(status, path, &message)
    }
}

#[async_trait]
impl EngineApi for EngineClient {
    async fn send(&self, method: HttpMethod, path: &str, body: Option<Value>) -> ClientResult<ApiResponse<Value>> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("🌐 {} {}", method, url);

        let mut request = match method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Delete => self.client.delete(&url),
        };

        request = request
            .header("Content-Type", "application/json")
            .header("Accept", "application/json");
        if !self.api_key.is_empty() {
            request = request.header("Authorization", format!("Bearer {}", self.api_key));
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::connection(path, &e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::read_error(path, response).await);
        }

        response
            .json::<ApiResponse<Value>>()
            .await
            .map_err(|e| ClientError::parse("JSON", &format!("{} answered with an unreadable body: {}", path, e)))
    }
}

/// Non-2xx answer to a typed error.
pub fn map_status(status: StatusCode, path: &str, message: &str) -> ClientError {
    match status.as_u16() {
        401 | 403 => ClientError::connection(path, &format!("authentication rejected: {}", message)),
        400 | 422 => ClientError::validation(path, message),
        404 => ClientError::not_found("endpoint", path),
        code => ClientError::engine(code, message),
    }
}

/// Appends URL-encoded query parameters to an Engine path.
pub fn with_query(path: &str, params: &[(&str, String)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }
    let encoded = Url::parse_with_params("http://engine.invalid/", params.iter().map(|(k, v)| (*k, v.as_str())))
        .ok()
        .and_then(|url| url.query().map(ToString::to_string));
    match encoded {
        Some(query) if !query.is_empty() => format!("{}?{}", path, query),
        _ => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_become_connection_errors() {
        let error = map_status(StatusCode::UNAUTHORIZED, "/health", "bad key");
        assert!(error.is_connection());
        assert!(error.to_string().contains("/health"));
    }

    #[test]
    fn client_side_rejections_become_validation_errors() {
        assert!(matches!(
            map_status(StatusCode::UNPROCESSABLE_ENTITY, "/approvals", "missing title"),
            ClientError::Validation { .. }
        ));
        assert_eq!(
            map_status(StatusCode::INTERNAL_SERVER_ERROR, "/approvals", "boom"),
            ClientError::engine(500, "boom")
        );
    }

    #[test]
    fn query_parameters_are_encoded() {
        let path = with_query("/approvals/history/search", &[("q", "a b&c".to_string()), ("page", "2".to_string())]);
        assert_eq!(path, "/approvals/history/search?q=a+b%26c&page=2");
        assert_eq!(with_query("/health", &[]), "/health");
    }

    #[test]
    fn trailing_slash_is_dropped_from_base_url() {
        let client = EngineClient::new("http://localhost:3000/", "k").unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
    }
}
