use crate::{AppConfig, EmailConfig};
use figment::Jail;
use secrecy::{ExposeSecret, Secret};

#[test]
fn test_secret_redaction() {
    let config = EmailConfig {
        username: Some("sender@example.com".to_string()),
        password: Some(Secret::new("app-password-123".to_string())),
        ..EmailConfig::default()
    };
    let debug_output = format!("{:?}", config);
    assert!(!debug_output.contains("app-password-123"));
    assert!(debug_output.contains("REDACTED"));
}

#[test]
fn test_credentials_require_both_fields() {
    let mut config = EmailConfig::default();
    assert!(config.credentials().is_none());

    config.username = Some("sender@example.com".to_string());
    assert!(config.credentials().is_none());

    config.password = Some(Secret::new(String::new()));
    assert!(config.credentials().is_none());

    config.password = Some(Secret::new("secret".to_string()));
    let credentials = config.credentials().unwrap();
    assert_eq!(credentials.username, "sender@example.com");
    assert_eq!(credentials.password.expose_secret(), "secret");
}

#[test]
fn test_defaults_without_any_source() {
    Jail::expect_with(|jail| {
        jail.clear_env();
        let config: AppConfig = AppConfig::figment("config").extract()?;
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.email.smtp_host, "smtp.gmail.com");
        assert_eq!(config.email.smtp_port, 587);
        assert_eq!(config.otp.default_app_name, "Your App");
        assert!(config.email.credentials().is_none());
        assert!(!config.is_production());
        assert_eq!(config.app_env, "development");
        Ok(())
    });
}

#[test]
fn test_file_and_env_layering() {
    Jail::expect_with(|jail| {
        jail.clear_env();
        jail.create_dir("config")?;
        jail.create_file(
            "config/default.toml",
            r#"
            [server]
            port = 3000

            [email]
            smtp_host = "smtp.example.com"
            from_name = "Acme"
            "#,
        )?;
        jail.set_env("OTP_SERVER__PORT", "9090");
        jail.set_env("EMAIL_USER", "sender@example.com");
        jail.set_env("EMAIL_PASS", "hunter2");

        let config: AppConfig = AppConfig::figment("config").extract()?;
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.email.smtp_host, "smtp.example.com");
        assert_eq!(config.email.from_name.as_deref(), Some("Acme"));

        let credentials = config.email.credentials().unwrap();
        assert_eq!(credentials.username, "sender@example.com");
        assert_eq!(credentials.password.expose_secret(), "hunter2");
        Ok(())
    });
}

#[test]
fn test_environment_specific_file() {
    Jail::expect_with(|jail| {
        jail.clear_env();
        jail.create_dir("config")?;
        jail.set_env("APP_ENV", "production");
        jail.create_file(
            "config/production.toml",
            r#"
            [telemetry]
            json = true
            log_level = "warn"
            "#,
        )?;

        let config: AppConfig = AppConfig::figment("config").extract()?;
        assert!(config.is_production());
        assert!(config.telemetry.json);
        assert_eq!(config.telemetry.log_level, "warn");
        Ok(())
    });
}

#[test]
fn test_numeric_environment_values_stay_strings() {
    Jail::expect_with(|jail| {
        jail.clear_env();
        jail.set_env("EMAIL_USER", "sender@example.com");
        jail.set_env("EMAIL_PASS", "12345678");
        jail.set_env("OTP_OTP__DEFAULT_APP_NAME", "2024");
        jail.set_env("OTP_EMAIL__FROM_NAME", "42");

        let config: AppConfig = AppConfig::figment("config").extract()?;
        assert_eq!(config.otp.default_app_name, "2024");
        assert_eq!(config.email.from_name.as_deref(), Some("42"));

        let credentials = config.email.credentials().unwrap();
        assert_eq!(credentials.password.expose_secret(), "12345678");
        Ok(())
    });
}

#[test]
fn test_credentials_are_read_verbatim() {
    Jail::expect_with(|jail| {
        jail.clear_env();
        jail.set_env("OTP_EMAIL__USERNAME", "0001");
        jail.set_env("OTP_EMAIL__PASSWORD", "000123");

        let config: AppConfig = AppConfig::figment("config").extract()?;
        let credentials = config.email.credentials().unwrap();
        assert_eq!(credentials.username, "0001");
        assert_eq!(credentials.password.expose_secret(), "000123");

        jail.set_env("EMAIL_PASS", "007");
        let config: AppConfig = AppConfig::figment("config").extract()?;
        assert_eq!(config.email.credentials().unwrap().password.expose_secret(), "007");
        Ok(())
    });
}
