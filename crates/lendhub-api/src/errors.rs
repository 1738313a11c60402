// SPDX-License-Identifier: Apache-2.0

use lendhub_core::{LifecycleError, PricingError};
use lendhub_model::ParseError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ApiErrorCode {
    ValidationFailed,
    InvalidParameter,
    NotFound,
    Unauthorized,
    Forbidden,
    Conflict,
    InvalidTransition,
    MissingReason,
    InsufficientBalance,
    PayloadTooLarge,
    StoreUnavailable,
    InternalError,
}

impl ApiErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidationFailed => "validation_failed",
            Self::InvalidParameter => "invalid_parameter",
            Self::NotFound => "not_found",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::Conflict => "conflict",
            Self::InvalidTransition => "invalid_transition",
            Self::MissingReason => "missing_reason",
            Self::InsufficientBalance => "insufficient_balance",
            Self::PayloadTooLarge => "payload_too_large",
            Self::StoreUnavailable => "store_unavailable",
            Self::InternalError => "internal_error",
        }
    }
}

impl std::fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    #[serde(default)]
    pub details: Value,
}

impl ApiError {
    #[must_use]
    pub fn new(code: ApiErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
        }
    }

    #[must_use]
    pub fn validation_failed(field_errors: Value) -> Self {
        Self::new(
            ApiErrorCode::ValidationFailed,
            "validation failed",
            json!({"field_errors": field_errors}),
        )
    }

    #[must_use]
    pub fn invalid_param(name: &str, reason: &str) -> Self {
        Self::new(
            ApiErrorCode::InvalidParameter,
            format!("invalid parameter: {name}"),
            json!({"field_errors": [{"field": name, "reason": reason}]}),
        )
    }

    #[must_use]
    pub fn not_found(what: &str, id: &str) -> Self {
        Self::new(
            ApiErrorCode::NotFound,
            format!("{what} not found"),
            json!({"id": id}),
        )
    }

    #[must_use]
    pub fn unauthorized() -> Self {
        Self::new(ApiErrorCode::Unauthorized, "invalid or missing token", Value::Null)
    }

    #[must_use]
    pub fn forbidden(action: &str) -> Self {
        Self::new(
            ApiErrorCode::Forbidden,
            format!("not permitted: {action}"),
            Value::Null,
        )
    }

    #[must_use]
    pub fn insufficient_balance(requested: &str, available: &str) -> Self {
        Self::new(
            ApiErrorCode::InsufficientBalance,
            "requested amount exceeds available balance",
            json!({"requested": requested, "available": available}),
        )
    }

    #[must_use]
    pub fn internal(message: &str) -> Self {
        Self::new(ApiErrorCode::InternalError, message.to_string(), Value::Null)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<ParseError> for ApiError {
    fn from(value: ParseError) -> Self {
        Self::new(
            ApiErrorCode::ValidationFailed,
            value.to_string(),
            Value::Null,
        )
    }
}

impl From<PricingError> for ApiError {
    fn from(value: PricingError) -> Self {
        let code = match value {
            PricingError::DuplicateActiveTerm(_) => ApiErrorCode::Conflict,
            _ => ApiErrorCode::ValidationFailed,
        };
        Self::new(code, value.to_string(), json!({"reason": value.code()}))
    }
}

impl From<LifecycleError> for ApiError {
    fn from(value: LifecycleError) -> Self {
        let code = match value {
            LifecycleError::MissingReason(_) => ApiErrorCode::MissingReason,
            _ => ApiErrorCode::InvalidTransition,
        };
        Self::new(code, value.to_string(), json!({"reason": value.code()}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_serialize_snake_case() {
        let json = serde_json::to_string(&ApiErrorCode::InsufficientBalance).expect("serialize");
        assert_eq!(json, "\"insufficient_balance\"");
    }

    #[test]
    fn missing_reason_maps_to_its_own_code() {
        let err: ApiError = LifecycleError::MissingReason("rejectionReason").into();
        assert_eq!(err.code, ApiErrorCode::MissingReason);
        assert!(err.message.contains("rejectionReason"));
    }

    #[test]
    fn duplicate_term_maps_to_conflict() {
        let term = lendhub_model::TermMonths::parse(12).expect("term");
        let err: ApiError = PricingError::DuplicateActiveTerm(term).into();
        assert_eq!(err.code, ApiErrorCode::Conflict);
    }
}
