use anyhow::{Context, Result, anyhow};
use chrono::Duration;
use std::str::FromStr;
use url::Url;

use crate::models::credential::CredentialKind;
use crate::store::StoreConfig;

const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;
const DEFAULT_CODE_TTL_MINUTES: i64 = 10;

/// Runtime settings, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: String,
    pub port: u16,
    pub base_url: Url,
    pub admin_email: String,
    pub mail_from: String,
    pub mail_api_url: Option<String>,
    pub mail_api_key: Option<String>,
    pub organization: String,
    pub notify_admin_on_intake: bool,
    pub store: StoreConfig,
    pub sweep_interval: std::time::Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &str| get(key).ok_or_else(|| anyhow!("{} must be set", key));

        let kind = match get("CREDENTIAL_KIND") {
            Some(raw) => CredentialKind::from_str(&raw).map_err(|e| anyhow!(e))?,
            None => CredentialKind::Token,
        };
        let default_ttl = match kind {
            CredentialKind::Token => DEFAULT_TOKEN_TTL_MINUTES,
            CredentialKind::Code => DEFAULT_CODE_TTL_MINUTES,
        };
        let ttl_minutes: i64 = parse_or(
            get("CREDENTIAL_TTL_MINUTES"),
            "CREDENTIAL_TTL_MINUTES",
            default_ttl,
        )?;
        if ttl_minutes <= 0 {
            return Err(anyhow!("CREDENTIAL_TTL_MINUTES must be positive"));
        }

        // tokio's interval panics on a zero period
        let sweep_secs: u64 = parse_or(get("SWEEP_INTERVAL_SECS"), "SWEEP_INTERVAL_SECS", 60)?;
        if sweep_secs == 0 {
            return Err(anyhow!("SWEEP_INTERVAL_SECS must be positive"));
        }

        let mut base_url =
            Url::parse(&require("BASE_URL")?).context("BASE_URL is not a valid URL")?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Settings {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(get("PORT"), "PORT", 3000)?,
            base_url,
            admin_email: require("ADMIN_EMAIL")?,
            mail_from: require("MAIL_FROM")?,
            mail_api_url: get("MAIL_API_URL"),
            mail_api_key: get("MAIL_API_KEY"),
            organization: get("ORGANIZATION_NAME")
                .unwrap_or_else(|| "Membership office".to_string()),
            notify_admin_on_intake: parse_or(
                get("NOTIFY_ADMIN_ON_INTAKE"),
                "NOTIFY_ADMIN_ON_INTAKE",
                true,
            )?,
            store: StoreConfig {
                kind,
                lifetime: Duration::minutes(ttl_minutes),
                max_attempts: parse_or(get("MAX_ATTEMPTS"), "MAX_ATTEMPTS", 5)?,
            },
            sweep_interval: std::time::Duration::from_secs(sweep_secs),
        })
    }

    /// Where token links point to.
    pub fn verify_url(&self) -> Result<Url> {
        self.base_url.join("verify").context("cannot build verify URL")
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{} has an invalid value '{}'", key, raw)),
        None => Ok(default),
    }
}
