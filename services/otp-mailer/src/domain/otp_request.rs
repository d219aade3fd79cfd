//! OTP 发送请求

use once_cell::sync::Lazy;
use otp_errors::ValidationError;
use regex::Regex;
use serde::Deserialize;
use std::fmt;

/// `local@domain.tld`，各段不含空白和 `@`
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// 恰好 6 位 ASCII 数字
static OTP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{6}$").expect("valid otp regex"));

/// 入站请求（未校验）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OtpRequest {
    #[serde(default)]
    pub to_email: Option<String>,
    #[serde(default)]
    pub otp: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub app_name: Option<String>,
}

/// OTP 用途
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OtpKind {
    #[default]
    Verification,
    PasswordReset,
}

impl OtpKind {
    /// 只有 `password_reset` 选择重置文案，其余取值一律按验证处理
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("password_reset") => Self::PasswordReset,
            _ => Self::Verification,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verification => "verification",
            Self::PasswordReset => "password_reset",
        }
    }
}

impl fmt::Display for OtpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 校验通过的请求，默认值已填充
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub to_email: String,
    pub otp: String,
    pub kind: OtpKind,
    pub app_name: String,
}

impl OtpRequest {
    /// 校验请求字段并填充默认值
    ///
    /// 检查顺序：必填字段 → 邮箱格式 → OTP 格式。无副作用。
    pub fn validate(&self, default_app_name: &str) -> Result<ValidatedRequest, ValidationError> {
        let to_email = non_empty(&self.to_email).ok_or(ValidationError::MissingField)?;
        let otp = non_empty(&self.otp).ok_or(ValidationError::MissingField)?;

        if !EMAIL_RE.is_match(to_email) {
            return Err(ValidationError::InvalidEmailFormat);
        }

        if !OTP_RE.is_match(otp) {
            return Err(ValidationError::InvalidOtpFormat);
        }

        let app_name = self
            .app_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(default_app_name);

        Ok(ValidatedRequest {
            to_email: to_email.to_string(),
            otp: otp.to_string(),
            kind: OtpKind::parse(self.kind.as_deref()),
            app_name: app_name.to_string(),
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
