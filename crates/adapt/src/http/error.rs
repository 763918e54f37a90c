// crates/adapt/src/http/error.rs

use axum::response::{IntoResponse, Response};
use http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("serve error: {0}")]
    Serve(#[from] serve::Error),

    #[error("Invalid token")]
    InvalidToken,

    #[error("unsupported locale `{0}`")]
    UnsupportedLocale(String),
}

impl HttpError {
    pub fn to_status(&self) -> StatusCode {
        match self {
            HttpError::Serve(e) => e.to_status(),
            HttpError::InvalidToken => StatusCode::UNAUTHORIZED,
            HttpError::UnsupportedLocale(_) => StatusCode::NOT_FOUND,
        }
    }
}

/// Plain-text rendition for endpoints without an HTML page. Server-side
/// details stay in the logs.
impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.to_status();
        let body = match &self {
            HttpError::InvalidToken => self.to_string(),
            _ => status.canonical_reason().unwrap_or("error").to_string(),
        };
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn invalid_token_is_401_with_message() {
        let resp = HttpError::InvalidToken.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let bytes = to_bytes(resp.into_body(), usize::MAX).await.expect("body");
        assert_eq!(&bytes[..], b"Invalid token");
    }

    #[tokio::test]
    async fn internal_details_are_not_exposed() {
        let cause = std::io::Error::other("db password is hunter2");
        let resp = HttpError::from(serve::Error::from(cause)).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(resp.into_body(), usize::MAX).await.expect("body");
        assert_eq!(&bytes[..], b"Internal Server Error");
    }
}
