use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use catalog_infra::{CatalogError, DocumentStoreError};

pub fn catalog_error_to_response(err: CatalogError) -> axum::response::Response {
    match err {
        CatalogError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        CatalogError::Validation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        CatalogError::Insert(DocumentStoreError::DuplicateKey(msg)) => {
            json_error(StatusCode::CONFLICT, "insert_error", msg)
        }
        CatalogError::Insert(e) => {
            tracing::error!(error = %e, "insert failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "insert_error", e.to_string())
        }
        CatalogError::Mapping(e) => {
            tracing::error!(error = %e, "stored product could not be decoded");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "mapping_error", e.to_string())
        }
        CatalogError::Store(DocumentStoreError::Connection(msg)) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", msg)
        }
        CatalogError::Store(e) => {
            tracing::error!(error = %e, "store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
    }
}

/// Body rejections keep axum's status (400 for malformed JSON, 422 for a
/// well-formed body with missing or mistyped fields).
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(rejection.status(), "invalid_body", rejection.body_text())
}

pub fn query_rejection_to_response(rejection: QueryRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_query", rejection.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
