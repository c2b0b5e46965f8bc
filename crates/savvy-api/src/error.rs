use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

/// API failure taxonomy. The display string is the user-facing body
/// (localized, text/plain); storage failures keep their cause for the log
/// and show only a generic body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    NotAuthenticated(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{message}")]
    Storage {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ApiError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn storage(message: impl Into<String>) -> impl FnOnce(anyhow::Error) -> Self {
        let message = message.into();
        move |source| Self::Storage { message, source }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            // Conflict maps to 400 on this surface, not 409.
            Self::InvalidArgument(_) | Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::NotAuthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if let Self::Storage { message, source } = &self {
            error!("{}: {:#}", message, source);
        }

        (status, self.to_string()).into_response()
    }
}

/// Run a blocking store/KDF closure off the scheduler, mapping both the
/// closure's failure and a join failure to a storage error with the given
/// user-facing message.
pub(crate) async fn run_blocking<T, F>(message: &str, f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(ApiError::storage(message)(e)),
        Err(e) => Err(ApiError::storage(message)(anyhow::anyhow!("join error: {}", e))),
    }
}
