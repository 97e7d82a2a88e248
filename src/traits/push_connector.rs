use async_trait::async_trait;
use crate::errors::ClientResult;
use crate::structs::push_connection::PushConnection;

/// Opens the persistent push channel to the Engine.
#[async_trait]
pub trait PushConnector: Send + Sync {
    async fn connect(&self, engine_url: &str, api_key: &str) -> ClientResult<PushConnection>;
}
