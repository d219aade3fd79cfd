//! otp-config - 配置加载库
//!
//! 进程启动时加载一次，之后只读。请求处理过程中不再读取环境变量。

mod de;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host", deserialize_with = "de::string")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 监听地址 `host:port`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 遥测配置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level", deserialize_with = "de::string")]
    pub log_level: String,
    /// 输出 JSON 格式日志
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
        }
    }
}

/// 邮件配置
///
/// 账号和密码允许缺失：缺失时服务仍然启动，但每个发送请求都会返回配置错误。
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    #[serde(default = "default_smtp_host", deserialize_with = "de::string")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default = "default_use_tls")]
    pub use_tls: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// 发件人显示名称，未设置时使用请求中的应用名
    #[serde(default, deserialize_with = "de::opt_string")]
    pub from_name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "de::opt_secret")]
    pub password: Option<Secret<String>>,
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_use_tls() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            use_tls: default_use_tls(),
            timeout_secs: default_timeout_secs(),
            from_name: None,
            username: None,
            password: None,
        }
    }
}

/// SMTP 登录凭据
#[derive(Debug, Clone)]
pub struct SmtpCredentials {
    pub username: String,
    pub password: Secret<String>,
}

impl EmailConfig {
    /// 账号和密码都存在且非空时返回凭据
    pub fn credentials(&self) -> Option<SmtpCredentials> {
        let username = self.username.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
        let password = self
            .password
            .as_ref()
            .filter(|p| !p.expose_secret().is_empty())?;

        Some(SmtpCredentials {
            username: username.to_string(),
            password: password.clone(),
        })
    }
}

/// OTP 邮件配置
#[derive(Debug, Clone, Deserialize)]
pub struct OtpConfig {
    /// 请求未提供 app_name 时使用的名称
    #[serde(default = "default_app_name", deserialize_with = "de::string")]
    pub default_app_name: String,
}

fn default_app_name() -> String {
    "Your App".to_string()
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            default_app_name: default_app_name(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_app_env", deserialize_with = "de::string")]
    pub app_env: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub otp: OtpConfig,
}

/// 原样读取的凭据变量及其配置键，后者覆盖前者
const CREDENTIAL_VARS: [(&str, &str); 4] = [
    ("OTP_EMAIL__USERNAME", "email.username"),
    ("OTP_EMAIL__PASSWORD", "email.password"),
    ("EMAIL_USER", "email.username"),
    ("EMAIL_PASS", "email.password"),
];

fn default_app_env() -> String {
    "development".to_string()
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(config_dir).extract()?;
        Ok(config)
    }

    /// 配置来源，优先级从低到高：
    /// `default.toml` < `{APP_ENV}.toml` < `OTP_*` 环境变量 < `APP_ENV` < 凭据变量
    ///
    /// 凭据变量按原样读取，不经过 figment 的值解析，`0012` 之类的密码不会变成数字。
    pub fn figment(config_dir: &str) -> Figment {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| default_app_env());

        let mut figment = Figment::new()
            .merge(Toml::file(format!("{}/default.toml", config_dir)))
            .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
            .merge(Env::prefixed("OTP_").split("__"))
            .merge(Env::raw().only(&["APP_ENV"]).map(|_| "app_env".into()));

        for (var, key) in CREDENTIAL_VARS {
            if let Ok(value) = std::env::var(var) {
                figment = figment.merge(Serialized::default(key, value));
            }
        }

        figment
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }

}

#[cfg(test)]
mod tests;
