use crate::defaults::{self, Severity};
use crate::error::Result;
use crate::github::EventContext;
use chrono::{DateTime, Utc};

/// Caller-supplied values. `None` means "not provided" and falls back to the
/// computed default, `Some("")` is an explicit empty value.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Overrides {
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
    pub details: Option<String>,
    pub footer: Option<String>,
    pub text: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub username: String,
    pub avatar_url: String,
    pub color: String,
    pub description: String,
    pub footer: String,
    pub text: String,
    pub url: String,
    pub timestamp: DateTime<Utc>,
}

fn or_default<F>(value: &Option<String>, default: F) -> Result<String>
where
    F: FnOnce() -> Result<String>,
{
    match value {
        Some(value) => Ok(value.clone()),
        None => default(),
    }
}

impl Message {
    /// Merges `overrides` with the defaults derived from `ctx`. Defaults are
    /// only computed for fields that were not provided.
    pub fn compose(
        overrides: &Overrides,
        ctx: &EventContext,
        severity: Option<Severity>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self> {
        let description = or_default(&overrides.description, || {
            defaults::default_description(ctx)
        })?;
        let details = overrides.details.as_deref().unwrap_or_default();

        Ok(Message {
            username: or_default(&overrides.username, || defaults::default_username(ctx))?,
            avatar_url: or_default(&overrides.avatar_url, || {
                defaults::default_avatar_url(ctx)
            })?,
            color: or_default(&overrides.color, || defaults::default_color(ctx, severity))?,
            description: format!("{}\n{}", description, details),
            footer: or_default(&overrides.footer, || {
                defaults::default_footer(ctx, severity)
            })?,
            text: overrides.text.clone().unwrap_or_default(),
            url: or_default(&overrides.url, || defaults::default_url(ctx))?,
            timestamp,
        })
    }
}
