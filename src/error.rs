use thiserror::Error;

pub type Result<T> = std::result::Result<T, NotifyError>;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("{0}")]
    Configuration(String),
    #[error("malformed `{event}` payload: {detail}")]
    MalformedPayload { event: String, detail: String },
    #[error("webhook delivery failed: {0}")]
    Delivery(String),
}

impl NotifyError {
    pub fn missing_webhook_url() -> Self {
        NotifyError::Configuration(
            "The webhookUrl was not provided. For security reasons the secret URL must be provided \
             in the action yaml using a context expression and can not be read as a default."
                .to_owned(),
        )
    }

    pub fn missing_field(event: &str, field: &str) -> Self {
        NotifyError::MalformedPayload {
            event: event.to_owned(),
            detail: format!("missing `{}`", field),
        }
    }
}

// The request URL embeds the webhook secret and must not reach the report.
impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        NotifyError::Delivery(err.without_url().to_string())
    }
}

impl From<toml::de::Error> for NotifyError {
    fn from(err: toml::de::Error) -> Self {
        NotifyError::Configuration(format!("invalid config file: {}", err))
    }
}

impl From<std::io::Error> for NotifyError {
    fn from(err: std::io::Error) -> Self {
        NotifyError::Configuration(format!("io-error: {}", err))
    }
}
