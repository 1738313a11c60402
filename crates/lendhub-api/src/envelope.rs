// SPDX-License-Identifier: Apache-2.0

use crate::errors::ApiError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The uniform `{status, data, message}` JSON envelope every endpoint speaks.
/// `status` is the literal string `"success"` or `"error"`; error envelopes
/// additionally carry the machine-readable error object under `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEnvelope {
    pub status: EnvelopeStatus,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Error,
}

impl ApiEnvelope {
    #[must_use]
    pub fn success(data: Value) -> Self {
        Self {
            status: EnvelopeStatus::Success,
            data,
            message: None,
            error: None,
        }
    }

    #[must_use]
    pub fn success_with_message(data: Value, message: impl Into<String>) -> Self {
        Self {
            status: EnvelopeStatus::Success,
            data,
            message: Some(message.into()),
            error: None,
        }
    }

    #[must_use]
    pub fn failure(error: ApiError) -> Self {
        Self {
            status: EnvelopeStatus::Error,
            data: Value::Null,
            message: Some(error.message.clone()),
            error: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_shape() {
        let env = ApiEnvelope::success(json!({"id": "loan-1"}));
        let value = serde_json::to_value(&env).expect("serialize");
        assert_eq!(value["status"], "success");
        assert_eq!(value["data"]["id"], "loan-1");
        assert!(value.get("error").is_none());
    }

    #[test]
    fn error_envelope_carries_message_and_code() {
        let env = ApiEnvelope::failure(ApiError::not_found("loan", "loan-9"));
        let value = serde_json::to_value(&env).expect("serialize");
        assert_eq!(value["status"], "error");
        assert_eq!(value["message"], "loan not found");
        assert_eq!(value["error"]["code"], "not_found");
    }
}
