// SPDX-License-Identifier: Apache-2.0

use crate::AppState;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use lendhub_api::{ApiEnvelope, ApiError, ApiErrorCode};
use serde::Serialize;

#[must_use]
pub(crate) fn error_status(code: ApiErrorCode) -> StatusCode {
    match code {
        ApiErrorCode::ValidationFailed
        | ApiErrorCode::InvalidParameter
        | ApiErrorCode::MissingReason => StatusCode::BAD_REQUEST,
        ApiErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ApiErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
        ApiErrorCode::Conflict | ApiErrorCode::InvalidTransition => StatusCode::CONFLICT,
        ApiErrorCode::InsufficientBalance => StatusCode::UNPROCESSABLE_ENTITY,
        ApiErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        ApiErrorCode::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn request_id(headers: &HeaderMap, state: &AppState) -> String {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
        .unwrap_or_else(|| format!("req-{:012x}", state.next_seed()))
}

fn with_request_id(mut resp: Response, id: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(id) {
        resp.headers_mut().insert("x-request-id", value);
    }
    resp
}

/// Wraps a service result in the uniform envelope and tags the response with
/// the propagated (or generated) request id.
pub(crate) fn respond<T: Serialize>(
    state: &AppState,
    headers: &HeaderMap,
    result: Result<T, ApiError>,
) -> Response {
    let id = request_id(headers, state);
    let resp = match result {
        Ok(data) => match serde_json::to_value(data) {
            Ok(value) => (StatusCode::OK, Json(ApiEnvelope::success(value))).into_response(),
            Err(err) => {
                let err = ApiError::internal(&err.to_string());
                (error_status(err.code), Json(ApiEnvelope::failure(err))).into_response()
            }
        },
        Err(err) => (error_status(err.code), Json(ApiEnvelope::failure(err))).into_response(),
    };
    with_request_id(resp, &id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_covers_the_contract() {
        assert_eq!(
            error_status(ApiErrorCode::InvalidParameter),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_status(ApiErrorCode::MissingReason),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_status(ApiErrorCode::InvalidTransition),
            StatusCode::CONFLICT
        );
        assert_eq!(
            error_status(ApiErrorCode::InsufficientBalance),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            error_status(ApiErrorCode::Unauthorized),
            StatusCode::UNAUTHORIZED
        );
    }
}
