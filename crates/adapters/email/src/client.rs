//! SMTP 投递实现

use crate::{DeliveryReceipt, MailDispatcher, OutboundMessage};
use lettre::message::{Mailbox, MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::Error as SmtpError;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use otp_config::{EmailConfig, SmtpCredentials};
use otp_errors::{AppError, AppResult, DeliveryError, TransportError};
use secrecy::ExposeSecret;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// 隐式 TLS（SMTPS）端口
const SMTPS_PORT: u16 = 465;

/// SMTP 投递客户端
///
/// 启动时构造一次；超时由传输层自身控制。
pub struct SmtpDispatcher {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpDispatcher {
    /// 构建 SMTP 传输
    pub fn new(config: &EmailConfig, credentials: &SmtpCredentials) -> AppResult<Self> {
        let smtp_credentials = Credentials::new(
            credentials.username.clone(),
            credentials.password.expose_secret().clone(),
        );

        let builder = if !config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
        } else if config.smtp_port == SMTPS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host).map_err(|e| {
                AppError::configuration(format!("Failed to create SMTP transport: {}", e))
            })?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host).map_err(
                |e| AppError::configuration(format!("Failed to create SMTP transport: {}", e)),
            )?
        };

        let transport = builder
            .port(config.smtp_port)
            .credentials(smtp_credentials)
            .timeout(Some(Duration::from_secs(config.timeout_secs)))
            .build();

        debug!(
            smtp_host = %config.smtp_host,
            smtp_port = config.smtp_port,
            use_tls = config.use_tls,
            "SMTP transport configured"
        );

        Ok(Self { transport })
    }
}

#[async_trait::async_trait]
impl MailDispatcher for SmtpDispatcher {
    async fn verify_connectivity(&self) -> Result<(), TransportError> {
        match self.transport.test_connection().await {
            Ok(true) => {
                debug!("SMTP connection verified");
                Ok(())
            }
            Ok(false) => {
                warn!("SMTP server did not accept the connection test");
                Err(TransportError::Connection(
                    "SMTP server rejected the connection test".to_string(),
                ))
            }
            Err(e) => {
                warn!(error = %e, "SMTP connection verification failed");
                Err(classify_verify_error(&e))
            }
        }
    }

    async fn send(&self, message: &OutboundMessage) -> Result<DeliveryReceipt, DeliveryError> {
        let (email, message_id) = build_message(message)?;

        debug!(to = %message.recipient, subject = %message.subject, "Sending email");

        let response = self.transport.send(email).await.map_err(|e| {
            warn!(to = %message.recipient, error = %e, "SMTP send failed");
            classify_send_error(&e)
        })?;

        info!(
            to = %message.recipient,
            message_id = %message_id,
            code = %response.code(),
            "Email accepted by SMTP server"
        );

        Ok(DeliveryReceipt { message_id })
    }
}

/// 构建邮件消息，返回消息及其 Message-ID
fn build_message(msg: &OutboundMessage) -> Result<(Message, String), DeliveryError> {
    let from: Mailbox = msg
        .sender_display
        .parse()
        .map_err(|e| DeliveryError::MalformedMessage(format!("Invalid from address: {}", e)))?;

    let to: Mailbox = msg
        .recipient
        .parse()
        .map_err(|e| DeliveryError::MalformedMessage(format!("Invalid to address: {}", e)))?;

    let message_id = format!("<{}@{}>", Uuid::new_v4(), from.email.domain());

    // HTML + 纯文本备用
    let body = MultiPart::alternative()
        .singlepart(
            SinglePart::builder()
                .header(header::ContentType::TEXT_PLAIN)
                .body(msg.body_text.clone()),
        )
        .singlepart(
            SinglePart::builder()
                .header(header::ContentType::TEXT_HTML)
                .body(msg.body_html.clone()),
        );

    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(&msg.subject)
        .message_id(Some(message_id.clone()))
        .multipart(body)
        .map_err(|e| DeliveryError::MalformedMessage(format!("Failed to build message: {}", e)))?;

    Ok((message, message_id))
}

fn status_of(err: &SmtpError) -> Option<u16> {
    err.status().and_then(|code| code.to_string().parse().ok())
}

fn classify_send_error(err: &SmtpError) -> DeliveryError {
    classify_status(status_of(err), err.to_string())
}

fn classify_verify_error(err: &SmtpError) -> TransportError {
    classify_verify_status(status_of(err), err.to_string())
}

/// 连接验证阶段只区分认证失败和连接失败
fn classify_verify_status(status: Option<u16>, detail: String) -> TransportError {
    match classify_status(status, detail) {
        DeliveryError::Transport(e) => e,
        DeliveryError::MalformedMessage(detail) | DeliveryError::Unknown(detail) => {
            TransportError::Connection(detail)
        }
    }
}

/// 按 SMTP 回复码分类
///
/// 没有回复码说明服务器从未给出应答（I/O、TLS、超时）。
fn classify_status(status: Option<u16>, detail: String) -> DeliveryError {
    match status {
        Some(530 | 534 | 535) => TransportError::Authentication(detail).into(),
        Some(501 | 553) => DeliveryError::MalformedMessage(detail),
        Some(_) => DeliveryError::Unknown(detail),
        None => TransportError::Connection(detail).into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outbound(sender: &str, recipient: &str) -> OutboundMessage {
        OutboundMessage {
            sender_display: sender.to_string(),
            recipient: recipient.to_string(),
            subject: "Acme - Email Verification Code".to_string(),
            body_html: "<p>123456</p>".to_string(),
            body_text: "123456".to_string(),
        }
    }

    #[test]
    fn test_build_message() {
        let msg = outbound("\"Acme\" <noreply@example.com>", "user@example.com");
        let (_, message_id) = build_message(&msg).unwrap();
        assert!(message_id.starts_with('<'));
        assert!(message_id.ends_with("@example.com>"));
    }

    #[test]
    fn test_message_ids_are_unique() {
        let msg = outbound("\"Acme\" <noreply@example.com>", "user@example.com");
        let (_, first) = build_message(&msg).unwrap();
        let (_, second) = build_message(&msg).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_invalid_recipient_is_malformed() {
        let msg = outbound("\"Acme\" <noreply@example.com>", "not an address");
        assert!(matches!(
            build_message(&msg),
            Err(DeliveryError::MalformedMessage(_))
        ));
    }

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            classify_status(Some(535), "bad credentials".to_string()),
            DeliveryError::Transport(TransportError::Authentication(_))
        ));
        assert!(matches!(
            classify_status(None, "connection refused".to_string()),
            DeliveryError::Transport(TransportError::Connection(_))
        ));
        assert!(matches!(
            classify_status(Some(553), "mailbox name not allowed".to_string()),
            DeliveryError::MalformedMessage(_)
        ));
        assert!(matches!(
            classify_status(Some(501), "syntax error in parameters".to_string()),
            DeliveryError::MalformedMessage(_)
        ));
        assert_eq!(
            classify_status(Some(554), "transaction failed".to_string()),
            DeliveryError::Unknown("transaction failed".to_string())
        );
        assert_eq!(
            classify_status(Some(451), "try again later".to_string()),
            DeliveryError::Unknown("try again later".to_string())
        );
    }

    #[test]
    fn test_classify_verify_status() {
        assert_eq!(
            classify_verify_status(Some(535), "bad credentials".to_string()),
            TransportError::Authentication("bad credentials".to_string())
        );
        assert_eq!(
            classify_verify_status(Some(553), "mailbox name not allowed".to_string()),
            TransportError::Connection("mailbox name not allowed".to_string())
        );
        assert_eq!(
            classify_verify_status(Some(451), "try again later".to_string()),
            TransportError::Connection("try again later".to_string())
        );
        assert_eq!(
            classify_verify_status(None, "connection refused".to_string()),
            TransportError::Connection("connection refused".to_string())
        );
    }

    #[tokio::test]
    async fn test_new_without_tls() {
        let config = EmailConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            use_tls: false,
            ..EmailConfig::default()
        };
        let credentials = SmtpCredentials {
            username: "user@example.com".to_string(),
            password: secrecy::Secret::new("password".to_string()),
        };

        assert!(SmtpDispatcher::new(&config, &credentials).is_ok());
    }
}
