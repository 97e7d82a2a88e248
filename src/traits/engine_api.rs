use async_trait::async_trait;
use crate::enums::http_method::HttpMethod;
use crate::errors::ClientResult;
use crate::structs::api_response::ApiResponse;

/// Request/response channel to the Engine.
///
/// Implementations inject credentials and map transport failures to
/// `ClientError::Connection` carrying the failed path.
#[async_trait]
pub trait EngineApi: Send + Sync {
    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> ClientResult<ApiResponse<serde_json::Value>>;
}
