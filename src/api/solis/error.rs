use std::sync::Arc;

use reqwest::StatusCode;

/// SolisCloud client error.
///
/// It is [`Clone`] because a failed cached query is handed out to every caller of the same key.
#[derive(Clone, Debug, thiserror::Error)]
pub enum Error {
    /// The credentials cannot be used to sign a request.
    #[error("invalid credentials: {0}")]
    Signing(String),

    /// The server responded with a non-success status.
    #[error("request failed with {status}: {body}")]
    RequestFailed { status: StatusCode, body: String },

    #[error("failed to call the API")]
    Http(#[source] Arc<reqwest::Error>),

    #[error("failed to serialize the request")]
    Encode(#[source] Arc<serde_json::Error>),

    /// The response is not JSON or does not have the expected shape.
    #[error("failed to deserialize `{resource}` response")]
    Decode {
        resource: String,

        #[source]
        source: Arc<serde_json::Error>,
    },

    /// The response envelope explicitly reports a failure.
    #[error(r#"SolisCloud error {code} ("{message}")"#)]
    Api { code: String, message: String },
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Self::Http(Arc::new(error))
    }
}
