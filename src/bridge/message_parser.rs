use crate::bridge::error::BridgeError;
use serde_json::Value;

/// Parse one framed input line into a JSON-RPC message.
///
/// The schema is not checked: anything that is valid JSON is forwarded.
pub fn parse_message_from_slice(line: &[u8]) -> Result<Value, BridgeError> {
    serde_json::from_slice(line).map_err(BridgeError::Parse)
}

/// The `id` of a request, or `null` for notifications and non-objects.
pub fn request_id(message: &Value) -> Value {
    message.get("id").cloned().unwrap_or(Value::Null)
}
