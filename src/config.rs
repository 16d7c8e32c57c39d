use crate::defaults::Severity;
use crate::error::{NotifyError, Result};
use crate::message::Overrides;
use serde::Deserializer;
use serde_derive::Deserialize;
use std::{fmt::Display, fs, path::Path, time::Duration};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const GITHUB_SUFFIX: &str = "/github";

/// Webhook endpoint with the GitHub-compatibility suffix removed.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct WebhookUrl(pub String);

impl WebhookUrl {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let url = raw.strip_suffix(GITHUB_SUFFIX).unwrap_or(raw);
        if url.is_empty() {
            return Err(NotifyError::missing_webhook_url());
        }
        Ok(WebhookUrl(url.to_owned()))
    }
}

// The URL carries the webhook secret.
impl Display for WebhookUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<redacted webhook url>")
    }
}

/// Action inputs, as found in a TOML config file and/or `INPUT_*` variables.
#[derive(PartialEq, Debug, Default, Deserialize)]
pub struct Config {
    pub webhook_url: Option<String>,
    #[serde(default, deserialize_with = "severity_from_str")]
    pub severity: Option<Severity>,
    pub description: Option<String>,
    pub details: Option<String>,
    pub footer: Option<String>,
    pub text: Option<String>,
    pub username: Option<String>,
    pub color: Option<String>,
    pub avatar_url: Option<String>,
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
}

fn severity_from_str<'de, D>(deserializer: D) -> std::result::Result<Option<Severity>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    match <Option<String> as serde::Deserialize>::deserialize(deserializer)? {
        Some(s) => Severity::parse_optional(&s).map_err(D::Error::custom),
        None => Ok(None),
    }
}

fn input_var(name: &str) -> String {
    format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(file_path: P) -> Result<Self> {
        let config_s = fs::read_to_string(file_path)?;
        let config = toml::from_str(&config_s)?;
        Ok(config)
    }

    /// Reads the action inputs the runner exports as `INPUT_<NAME>`. Inputs
    /// left blank are exported as empty strings, so an empty variable counts
    /// as not provided.
    pub fn from_env<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let input = |name: &str| lookup(&input_var(name)).filter(|value| !value.is_empty());
        let severity = match input("severity") {
            Some(s) => Severity::parse_optional(&s)?,
            None => None,
        };
        Ok(Config {
            webhook_url: input("webhookUrl"),
            severity,
            description: input("description"),
            details: input("details"),
            footer: input("footer"),
            text: input("text"),
            username: input("username"),
            color: input("color"),
            avatar_url: input("avatarUrl"),
            url: input("url"),
            timeout_secs: None,
        })
    }

    /// Layers `other` on top of `self`: every value set in `other` wins.
    pub fn merge(self, other: Config) -> Config {
        Config {
            webhook_url: other.webhook_url.or(self.webhook_url),
            severity: other.severity.or(self.severity),
            description: other.description.or(self.description),
            details: other.details.or(self.details),
            footer: other.footer.or(self.footer),
            text: other.text.or(self.text),
            username: other.username.or(self.username),
            color: other.color.or(self.color),
            avatar_url: other.avatar_url.or(self.avatar_url),
            url: other.url.or(self.url),
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
        }
    }

    pub fn webhook_url(&self) -> Result<WebhookUrl> {
        match &self.webhook_url {
            Some(raw) => WebhookUrl::parse(raw),
            None => Err(NotifyError::missing_webhook_url()),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn overrides(&self) -> Overrides {
        Overrides {
            username: self.username.clone(),
            avatar_url: self.avatar_url.clone(),
            color: self.color.clone(),
            description: self.description.clone(),
            details: self.details.clone(),
            footer: self.footer.clone(),
            text: self.text.clone(),
            url: self.url.clone(),
        }
    }
}
