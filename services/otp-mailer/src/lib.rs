//! OTP Mailer
//!
//! 校验 OTP 发送请求，组装验证码邮件并交给 SMTP 投递，
//! 将投递结果映射为结构化 JSON 响应。

pub mod api;
pub mod application;
pub mod domain;

use std::sync::Arc;

use otp_adapter_email::{EmailTemplate, SmtpDispatcher};
use otp_config::AppConfig;
use otp_errors::AppResult;
use tracing::{info, warn};

use crate::application::{MessageComposer, SendOtpHandler};

/// 根据配置构建处理器
///
/// 凭据缺失时不构造投递客户端，服务照常启动，发送请求返回配置错误。
pub fn build_handler(config: &AppConfig) -> AppResult<SendOtpHandler> {
    let default_app_name = config.otp.default_app_name.clone();

    let Some(credentials) = config.email.credentials() else {
        warn!("EMAIL_USER / EMAIL_PASS not set, OTP requests will fail with a configuration error");
        return Ok(SendOtpHandler::unconfigured(default_app_name));
    };

    let dispatcher = SmtpDispatcher::new(&config.email, &credentials)?;
    let composer = MessageComposer::new(
        EmailTemplate::embedded()?,
        credentials.username.clone(),
        config.email.from_name.clone(),
    );

    info!(
        smtp_host = %config.email.smtp_host,
        sender = %credentials.username,
        "Email dispatcher configured"
    );

    Ok(SendOtpHandler::new(default_app_name, composer, Arc::new(dispatcher)))
}
