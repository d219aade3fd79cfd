//! 响应映射

use axum::http::StatusCode;
use chrono::SecondsFormat;
use otp_errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::application::SentOtp;

/// OTP 接口响应体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl OtpResponse {
    pub fn failure(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            timestamp: None,
            message_id: None,
            error: Some(error.into()),
            details: None,
        }
    }
}

impl From<&AppError> for OtpResponse {
    fn from(err: &AppError) -> Self {
        Self {
            details: err.detail(),
            ..Self::failure(err.public_message(), err.classification())
        }
    }
}

impl From<&SentOtp> for OtpResponse {
    fn from(sent: &SentOtp) -> Self {
        Self {
            success: true,
            message: "OTP sent successfully".to_string(),
            timestamp: Some(sent.sent_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
            message_id: Some(sent.receipt.message_id.clone()),
            error: None,
            details: None,
        }
    }
}

/// 将处理结果映射为状态码和响应体
///
/// 每一种错误分类都有确定的映射，不存在落空分支。
pub fn to_response(outcome: &AppResult<SentOtp>) -> (StatusCode, OtpResponse) {
    match outcome {
        Ok(sent) => (StatusCode::OK, OtpResponse::from(sent)),
        Err(err) => {
            let status = StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, OtpResponse::from(err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use otp_adapter_email::DeliveryReceipt;
    use otp_errors::{DeliveryError, TransportError, ValidationError};

    #[test]
    fn test_success_response() {
        let sent = SentOtp {
            receipt: DeliveryReceipt {
                message_id: "abc123".to_string(),
            },
            sent_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap(),
        };

        let (status, body) = to_response(&Ok(sent));
        assert_eq!(status, StatusCode::OK);
        assert!(body.success);
        assert_eq!(body.message, "OTP sent successfully");
        assert_eq!(body.message_id.as_deref(), Some("abc123"));
        assert_eq!(body.timestamp.as_deref(), Some("2026-03-01T12:30:00.000Z"));
    }

    #[test]
    fn test_error_mapping_is_total() {
        let cases: Vec<(AppError, StatusCode)> = vec![
            (ValidationError::MissingField.into(), StatusCode::BAD_REQUEST),
            (ValidationError::InvalidEmailFormat.into(), StatusCode::BAD_REQUEST),
            (ValidationError::InvalidOtpFormat.into(), StatusCode::BAD_REQUEST),
            (
                ValidationError::MalformedBody("eof".to_string()).into(),
                StatusCode::BAD_REQUEST,
            ),
            (AppError::configuration("missing"), StatusCode::INTERNAL_SERVER_ERROR),
            (
                TransportError::Authentication("535".to_string()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                TransportError::Connection("refused".to_string()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                DeliveryError::MalformedMessage("bad".to_string()).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                DeliveryError::Unknown("451".to_string()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (AppError::internal("template"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            let (status, body) = to_response(&Err(err));
            assert_eq!(status, expected);
            assert!(!body.success);
            assert!(body.error.is_some());
            assert!(body.message_id.is_none());
        }
    }

    #[test]
    fn test_unknown_error_carries_detail() {
        let (_, body) = to_response(&Err(DeliveryError::Unknown("452 mailbox full".to_string()).into()));
        assert_eq!(body.message, "Failed to send OTP email");
        assert_eq!(body.details.as_deref(), Some("452 mailbox full"));
    }

    #[test]
    fn test_failure_serialization_omits_success_fields() {
        let (_, body) = to_response(&Err(ValidationError::MissingField.into()));
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "missing_field");
        assert!(json.get("message_id").is_none());
        assert!(json.get("timestamp").is_none());
        assert!(json.get("details").is_none());
    }
}
