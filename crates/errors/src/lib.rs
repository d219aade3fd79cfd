//! otp-errors - 统一错误处理
//!
//! 封闭的错误分类，每个变体都有确定的 HTTP 状态码和对外消息。

use thiserror::Error;

/// 请求校验错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required fields: to_email and otp")]
    MissingField,

    #[error("Invalid email format")]
    InvalidEmailFormat,

    #[error("Invalid OTP format. Must be 6 digits")]
    InvalidOtpFormat,

    #[error("Invalid request body: {0}")]
    MalformedBody(String),
}

/// 邮件传输层错误（连接验证或发送时产生）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("SMTP authentication failed: {0}")]
    Authentication(String),

    #[error("SMTP connection failed: {0}")]
    Connection(String),
}

/// 邮件投递错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    #[error("Delivery failed: {0}")]
    Unknown(String),
}

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<TransportError> for AppError {
    fn from(err: TransportError) -> Self {
        Self::Delivery(DeliveryError::Transport(err))
    }
}

impl AppError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// 转换为 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Configuration(_) => 500,
            Self::Delivery(DeliveryError::MalformedMessage(_)) => 400,
            Self::Delivery(DeliveryError::Transport(_)) => 500,
            Self::Delivery(DeliveryError::Unknown(_)) => 500,
            Self::Internal(_) => 500,
        }
    }

    /// 稳定的机器可读分类
    pub fn classification(&self) -> &'static str {
        match self {
            Self::Validation(ValidationError::MissingField) => "missing_field",
            Self::Validation(ValidationError::InvalidEmailFormat) => "invalid_email_format",
            Self::Validation(ValidationError::InvalidOtpFormat) => "invalid_otp_format",
            Self::Validation(ValidationError::MalformedBody(_)) => "invalid_request_body",
            Self::Configuration(_) => "configuration_error",
            Self::Delivery(DeliveryError::Transport(TransportError::Authentication(_))) => {
                "authentication_failed"
            }
            Self::Delivery(DeliveryError::Transport(TransportError::Connection(_))) => {
                "connection_failed"
            }
            Self::Delivery(DeliveryError::MalformedMessage(_)) => "malformed_message",
            Self::Delivery(DeliveryError::Unknown(_)) => "delivery_failed",
            Self::Internal(_) => "internal_error",
        }
    }

    /// 返回给调用方的消息，不包含任何配置或凭据内容
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(ValidationError::MalformedBody(_)) => {
                "Invalid request body".to_string()
            }
            Self::Validation(e) => e.to_string(),
            Self::Configuration(_) => "Email service not configured".to_string(),
            Self::Delivery(DeliveryError::Transport(TransportError::Authentication(_))) => {
                "Email authentication failed. Please check email configuration.".to_string()
            }
            Self::Delivery(DeliveryError::Transport(TransportError::Connection(_))) => {
                "Failed to connect to email server".to_string()
            }
            Self::Delivery(DeliveryError::MalformedMessage(_)) => {
                "Invalid email message format".to_string()
            }
            Self::Delivery(DeliveryError::Unknown(_)) => "Failed to send OTP email".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// 诊断信息
    ///
    /// 只携带协作方返回的原始描述；配置错误和内部错误不对外暴露细节。
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Validation(ValidationError::MalformedBody(detail)) => Some(detail.clone()),
            Self::Validation(_) => None,
            Self::Configuration(_) | Self::Internal(_) => None,
            Self::Delivery(DeliveryError::Transport(
                TransportError::Authentication(detail) | TransportError::Connection(detail),
            )) => Some(detail.clone()),
            Self::Delivery(
                DeliveryError::MalformedMessage(detail) | DeliveryError::Unknown(detail),
            ) => Some(detail.clone()),
        }
    }

    /// 是否为调用方输入问题
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

/// Result 类型别名
pub type AppResult<T> = Result<T, AppError>;
