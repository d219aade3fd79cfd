//! OTP 邮件组装

use chrono::{DateTime, SecondsFormat, Utc};
use otp_adapter_email::{EmailTemplate, OtpTemplateContext, OutboundMessage};
use otp_errors::AppResult;

use crate::domain::{OtpKind, ValidatedRequest};

/// 邮件文案中声明的有效期（仅文案，不做校验）
pub const OTP_EXPIRY_MINUTES: u32 = 5;

const DISCLAIMER: &str = "If you didn't request this code, you can safely ignore this email.";

/// 邮件组装器
///
/// 纯函数：相同的请求和时间戳产生逐字节相同的邮件。
pub struct MessageComposer {
    template: EmailTemplate,
    sender_address: String,
    sender_name: Option<String>,
}

impl MessageComposer {
    pub fn new(
        template: EmailTemplate,
        sender_address: impl Into<String>,
        sender_name: Option<String>,
    ) -> Self {
        Self {
            template,
            sender_address: sender_address.into(),
            sender_name,
        }
    }

    /// 组装待投递的邮件
    pub fn compose(
        &self,
        request: &ValidatedRequest,
        sent_at: DateTime<Utc>,
    ) -> AppResult<OutboundMessage> {
        let (heading, intro) = match request.kind {
            OtpKind::PasswordReset => (
                "Password Reset",
                "We received a request to reset your password. Use the code below to continue.",
            ),
            OtpKind::Verification => (
                "Email Verification",
                "Use the code below to verify your email address.",
            ),
        };

        let sent_at = sent_at.to_rfc3339_opts(SecondsFormat::Secs, true);
        let (body_html, body_text) = self.template.render_otp(&OtpTemplateContext {
            app_name: &request.app_name,
            heading,
            intro,
            disclaimer: DISCLAIMER,
            otp: &request.otp,
            expiry_minutes: OTP_EXPIRY_MINUTES,
            sent_at: &sent_at,
        })?;

        let sender_name = self.sender_name.as_deref().unwrap_or(&request.app_name);

        Ok(OutboundMessage {
            sender_display: format!("\"{}\" <{}>", quote(sender_name), self.sender_address),
            recipient: request.to_email.clone(),
            subject: format!("{} - {} Code", request.app_name, heading),
            body_html,
            body_text,
        })
    }
}

/// 转义显示名中的引号和反斜杠
fn quote(name: &str) -> String {
    name.replace('\\', "\\\\").replace('"', "\\\"")
}
