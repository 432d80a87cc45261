use serde::Serialize;
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC "Internal error". Every error the bridge synthesizes uses it.
pub const INTERNAL_ERROR: i64 = -32603;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ErrorObject {
    pub code: i64,
    pub message: String,
}

/// A response built locally when no real server response is available.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub jsonrpc: String,
    pub id: Value,
    pub error: ErrorObject,
}

impl ErrorResponse {
    pub fn new(id: Value, code: i64, message: String) -> Self {
        ErrorResponse {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            error: ErrorObject { code, message },
        }
    }

    pub fn internal(id: Value, message: impl Into<String>) -> Self {
        ErrorResponse::new(id, INTERNAL_ERROR, message.into())
    }
}
