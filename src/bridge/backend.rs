use crate::bridge::error::BridgeError;
use serde_json::Value;

/// Something that answers one JSON-RPC message with one JSON-RPC message.
#[async_trait::async_trait]
pub trait RpcBackend: Send + Sync {
    async fn forward(&self, message: &Value) -> Result<Value, BridgeError>;
}
