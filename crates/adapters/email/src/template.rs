//! 邮件模板系统

use otp_errors::{AppError, AppResult};
use serde::Serialize;
use std::collections::HashMap;
use tera::Tera;
use tracing::debug;

const OTP_HTML: &str = "otp.html";
const OTP_TEXT: &str = "otp.txt";

/// OTP 邮件模板变量
#[derive(Debug, Clone, Serialize)]
pub struct OtpTemplateContext<'a> {
    pub app_name: &'a str,
    pub heading: &'a str,
    pub intro: &'a str,
    pub disclaimer: &'a str,
    pub otp: &'a str,
    pub expiry_minutes: u32,
    pub sent_at: &'a str,
}

/// 邮件模板管理器
pub struct EmailTemplate {
    tera: Tera,
}

impl EmailTemplate {
    /// 使用编译期内嵌的 OTP 模板
    pub fn embedded() -> AppResult<Self> {
        let templates = HashMap::from([
            (OTP_HTML.to_string(), include_str!("../templates/otp.html").to_string()),
            (OTP_TEXT.to_string(), include_str!("../templates/otp.txt").to_string()),
        ]);

        let template = Self::from_strings(templates)?;
        debug!("Embedded email templates loaded");
        Ok(template)
    }

    /// 从内存中的模板字符串创建
    pub fn from_strings(templates: HashMap<String, String>) -> AppResult<Self> {
        let mut tera = Tera::default();

        for (name, content) in templates {
            tera.add_raw_template(&name, &content).map_err(|e| {
                AppError::internal(format!("Failed to add template {}: {}", name, e))
            })?;
        }

        Ok(Self { tera })
    }

    /// 渲染 OTP 邮件，返回 (HTML, 纯文本)
    pub fn render_otp(&self, context: &OtpTemplateContext<'_>) -> AppResult<(String, String)> {
        let context = tera::Context::from_serialize(context)
            .map_err(|e| AppError::internal(format!("Failed to create template context: {}", e)))?;

        // 渲染 HTML 版本
        let html = self
            .tera
            .render(OTP_HTML, &context)
            .map_err(|e| AppError::internal(format!("Failed to render HTML template: {}", e)))?;

        // 渲染纯文本版本
        let text = self
            .tera
            .render(OTP_TEXT, &context)
            .map_err(|e| AppError::internal(format!("Failed to render text template: {}", e)))?;

        Ok((html, text))
    }
}
