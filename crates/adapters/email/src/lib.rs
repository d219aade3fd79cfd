//! Email 适配器
//!
//! 提供 OTP 邮件投递边界：
//! - `MailDispatcher` 接口（连接验证 + 发送）
//! - 基于 lettre 的 SMTP 实现
//! - 内嵌 tera 模板

mod client;
mod template;

pub use client::SmtpDispatcher;
pub use template::{EmailTemplate, OtpTemplateContext};

use otp_errors::{DeliveryError, TransportError};

/// 待投递的邮件
///
/// 每个合法请求构造一次，发送后即丢弃。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// 发件人，形如 `"App" <sender@example.com>`
    pub sender_display: String,
    pub recipient: String,
    pub subject: String,
    pub body_html: String,
    pub body_text: String,
}

/// 投递回执
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub message_id: String,
}

/// 邮件投递接口
#[async_trait::async_trait]
pub trait MailDispatcher: Send + Sync {
    /// 验证与邮件服务器的连接和登录
    async fn verify_connectivity(&self) -> Result<(), TransportError>;

    /// 发送邮件
    async fn send(&self, message: &OutboundMessage) -> Result<DeliveryReceipt, DeliveryError>;
}
