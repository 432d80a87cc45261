use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::bridge::backend::RpcBackend;
use crate::bridge::error::BridgeError;
use crate::bridge::message_parser::{parse_message_from_slice, request_id};
use crate::bridge::types::ErrorResponse;

/// Turns one input line into exactly one output message.
///
/// `dispatch` never fails: every per-line problem becomes an `ErrorResponse`.
pub struct Dispatcher<B: ?Sized> {
    backend: Arc<B>,
    timeout: Duration,
}

impl<B: ?Sized> Clone for Dispatcher<B> {
    fn clone(&self) -> Self {
        Dispatcher {
            backend: Arc::clone(&self.backend),
            timeout: self.timeout,
        }
    }
}

impl<B> Dispatcher<B>
where
    B: RpcBackend + ?Sized,
{
    pub fn new(backend: Arc<B>, timeout: Duration) -> Self {
        Dispatcher { backend, timeout }
    }

    pub async fn dispatch(&self, line: &[u8]) -> Value {
        let message = match parse_message_from_slice(line) {
            Ok(message) => message,
            Err(err) => return error_value(Value::Null, err),
        };
        let id = request_id(&message);

        // dropping the backend future on expiry aborts the in-flight request
        match tokio::time::timeout(self.timeout, self.backend.forward(&message)).await {
            Ok(Ok(response)) => {
                debug!(%id, "request forwarded");
                response
            }
            Ok(Err(err)) => error_value(id, err),
            Err(_) => error_value(id, BridgeError::Timeout),
        }
    }
}

fn error_value(id: Value, err: BridgeError) -> Value {
    warn!(%id, error = %err, "replying with internal error");
    let response = ErrorResponse::internal(id, err.to_string());
    serde_json::to_value(&response).unwrap_or(Value::Null)
}
