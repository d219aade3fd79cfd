//! 发送 OTP 邮件

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use otp_adapter_email::{DeliveryReceipt, MailDispatcher};
use otp_errors::{AppError, AppResult};
use tracing::{debug, info, warn};

use crate::application::MessageComposer;
use crate::domain::OtpRequest;

/// 发送成功的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentOtp {
    pub receipt: DeliveryReceipt,
    pub sent_at: DateTime<Utc>,
}

/// 已配置凭据的邮件通道
struct MailChannel {
    composer: MessageComposer,
    dispatcher: Arc<dyn MailDispatcher>,
}

/// OTP 发送处理器
///
/// 校验 → 凭据检查 → 连接验证 → 组装 → 发送，单次线性执行，不重试。
pub struct SendOtpHandler {
    default_app_name: String,
    channel: Option<MailChannel>,
}

impl SendOtpHandler {
    pub fn new(
        default_app_name: impl Into<String>,
        composer: MessageComposer,
        dispatcher: Arc<dyn MailDispatcher>,
    ) -> Self {
        Self {
            default_app_name: default_app_name.into(),
            channel: Some(MailChannel {
                composer,
                dispatcher,
            }),
        }
    }

    /// 未配置邮件凭据：所有请求在校验后返回配置错误
    pub fn unconfigured(default_app_name: impl Into<String>) -> Self {
        Self {
            default_app_name: default_app_name.into(),
            channel: None,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.channel.is_some()
    }

    pub async fn handle(&self, request: &OtpRequest) -> AppResult<SentOtp> {
        let result = self.execute(request, Utc::now()).await;

        let outcome = match &result {
            Ok(_) => "sent",
            Err(e) if e.is_client_error() => {
                debug!(error = %e, "OTP request rejected");
                e.classification()
            }
            Err(e) => {
                warn!(error = %e, kind = e.classification(), "OTP request failed");
                e.classification()
            }
        };
        counter!("otp_requests_total", "outcome" => outcome).increment(1);

        result
    }

    async fn execute(&self, request: &OtpRequest, sent_at: DateTime<Utc>) -> AppResult<SentOtp> {
        let validated = request.validate(&self.default_app_name)?;

        let channel = self
            .channel
            .as_ref()
            .ok_or_else(|| AppError::configuration("Email credentials are not configured"))?;

        debug!(to = %validated.to_email, kind = %validated.kind, "Sending OTP email");

        channel.dispatcher.verify_connectivity().await?;

        let message = channel.composer.compose(&validated, sent_at)?;

        let started = Instant::now();
        let result = channel.dispatcher.send(&message).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        let status = if result.is_ok() { "success" } else { "failure" };
        counter!("otp_email_dispatch_total", "result" => status).increment(1);
        histogram!("otp_email_dispatch_duration_ms").record(elapsed_ms);

        let receipt = result?;

        info!(
            to = %validated.to_email,
            kind = %validated.kind,
            message_id = %receipt.message_id,
            "OTP email sent"
        );

        Ok(SentOtp { receipt, sent_at })
    }
}
