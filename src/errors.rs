use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::DomainError;

/// HTTP-facing error. Every variant carries a stable machine-readable `kind`
/// that ends up in the `error` field of the JSON body, next to a
/// human-readable `message`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("{message}")]
    BadRequest {
        kind: &'static str,
        message: String,
    },

    #[error("{message}")]
    Conflict {
        kind: &'static str,
        message: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        let message = e.to_string();
        match e {
            DomainError::NotFound => AppError::NotFound,
            DomainError::SizeRequired => AppError::BadRequest {
                kind: "size_required",
                message,
            },
            DomainError::InvalidSize(_) => AppError::BadRequest {
                kind: "invalid_size",
                message,
            },
            DomainError::Unavailable => AppError::BadRequest {
                kind: "unavailable",
                message,
            },
            DomainError::EmptyCart => AppError::BadRequest {
                kind: "empty_cart",
                message,
            },
            DomainError::InsufficientStock { .. } => AppError::Conflict {
                kind: "insufficient_stock",
                message,
            },
            DomainError::CartEmptied => AppError::Conflict {
                kind: "cart_emptied",
                message,
            },
            DomainError::InvalidTransition { .. } => AppError::Conflict {
                kind: "invalid_transition",
                message,
            },
            DomainError::Protected(_) => AppError::Conflict {
                kind: "protected",
                message,
            },
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::NotFound => HttpResponse::NotFound().json(serde_json::json!({
                "error": "not_found",
                "message": self.to_string(),
            })),
            AppError::BadRequest { kind, message } => {
                HttpResponse::BadRequest().json(serde_json::json!({
                    "error": kind,
                    "message": message,
                }))
            }
            AppError::Conflict { kind, message } => {
                HttpResponse::Conflict().json(serde_json::json!({
                    "error": kind,
                    "message": message,
                }))
            }
            AppError::Internal(msg) => {
                // Detail goes to the log, never to the client.
                log::error!("internal error: {msg}");
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "internal",
                    "message": "Internal server error",
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use actix_web::http::StatusCode;
    use actix_web::ResponseError;
    use serde_json::Value;

    use super::*;

    async fn body_json(err: AppError) -> Value {
        let bytes = to_bytes(err.error_response().into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn not_found_returns_404() {
        let resp = AppError::NotFound.error_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn size_required_is_a_400_with_kind() {
        let err: AppError = DomainError::SizeRequired.into();
        assert_eq!(err.error_response().status(), StatusCode::BAD_REQUEST);

        let err: AppError = DomainError::SizeRequired.into();
        let body = body_json(err).await;
        assert_eq!(body["error"], "size_required");
    }

    #[actix_web::test]
    async fn insufficient_stock_is_a_409_with_kind() {
        let err: AppError = DomainError::InsufficientStock { remaining: 2 }.into();
        assert_eq!(err.error_response().status(), StatusCode::CONFLICT);

        let err: AppError = DomainError::InsufficientStock { remaining: 2 }.into();
        let body = body_json(err).await;
        assert_eq!(body["error"], "insufficient_stock");
        assert!(body["message"].as_str().unwrap().contains('2'));
    }

    #[test]
    fn cart_emptied_and_protected_are_conflicts() {
        for e in [
            DomainError::CartEmptied,
            DomainError::Protected("product".to_string()),
        ] {
            let err: AppError = e.into();
            assert_eq!(err.error_response().status(), StatusCode::CONFLICT);
        }
    }

    #[test]
    fn invalid_size_and_unavailable_are_bad_requests() {
        for e in [
            DomainError::InvalidSize("XS".to_string()),
            DomainError::Unavailable,
            DomainError::EmptyCart,
        ] {
            let err: AppError = e.into();
            assert_eq!(err.error_response().status(), StatusCode::BAD_REQUEST);
        }
    }

    #[actix_web::test]
    async fn internal_detail_is_not_leaked() {
        let err = AppError::Internal("connection to 10.0.0.3 refused".to_string());
        assert_eq!(
            err.error_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let err = AppError::Internal("connection to 10.0.0.3 refused".to_string());
        let body = body_json(err).await;
        assert_eq!(body["message"], "Internal server error");
    }
}
