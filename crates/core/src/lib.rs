pub mod config;
pub mod content;
pub mod date;
pub mod models;
pub mod paths;
pub mod util;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

pub enum AppError {
    Status(StatusCode),
    Internal(anyhow::Error),
}

impl AppError {
    pub fn not_found() -> Self { Self::Status(StatusCode::NOT_FOUND) }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Status(status) if status == StatusCode::NOT_FOUND => {
                (status, "Not found").into_response()
            }
            Self::Status(status) => status.into_response(),
            Self::Internal(err) => {
                tracing::error!("{:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Something went wrong: {}", err))
                    .into_response()
            }
        }
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(err: E) -> Self { Self::Internal(err.into()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::not_found().into_response().status(), StatusCode::NOT_FOUND);
        let err = AppError::from(anyhow::anyhow!("layout failed"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
        let err = AppError::from(std::io::Error::other("disk full"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
