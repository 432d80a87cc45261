//! Failures that a single dispatch absorbs and reports as a JSON-RPC error.
use std::error::Error as StdError;

use thiserror::Error;

/// The `Display` text of each variant becomes the `error.message` of the
/// synthesized response, so keep it free of prefixes.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("{0}")]
    Parse(#[source] serde_json::Error),

    #[error("Request timeout")]
    Timeout,

    #[error("{}", display_chain(.0))]
    Network(#[from] reqwest::Error),

    #[error("Invalid JSON response: {body}")]
    InvalidResponse { body: String },

    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),
}

/// `outer: cause: root cause`. reqwest only names the failing url at the
/// top level; connect and DNS causes live further down the chain.
fn display_chain(err: &(dyn StdError + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.ends_with(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}
