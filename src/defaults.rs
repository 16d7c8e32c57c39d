//! Fallback presentation values derived from the event context.
//!
//! Each function is consulted only when the caller gave no explicit value for
//! the corresponding message field, and none of them depends on another.
use crate::error::{NotifyError, Result};
use crate::github::EventContext;
use std::{fmt::Display, str::FromStr};

pub const DEFAULT_USERNAME: &str = "GitHub";
pub const DEFAULT_AVATAR_URL: &str =
    "https://github.githubassets.com/images/modules/logos_page/GitHub-Mark.png";

const RELEASE_COLOR: &str = "#00ff00";
const PRERELEASE_COLOR: &str = "#ff9900";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl Severity {
    pub fn color(self) -> &'static str {
        match self {
            Severity::Info => "#00ff00",
            Severity::Warn => "#ff9900",
            Severity::Error => "#ff0000",
        }
    }

    /// A blank value means the severity is unset.
    pub fn parse_optional(s: &str) -> Result<Option<Self>> {
        if s.trim().is_empty() {
            Ok(None)
        } else {
            s.parse().map(Some)
        }
    }

    pub fn long_label(self) -> &'static str {
        match self {
            Severity::Info => "Informational",
            Severity::Warn => "Warning",
            Severity::Error => "Error",
        }
    }
}

impl FromStr for Severity {
    type Err = NotifyError;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match &*s.trim().to_lowercase() {
            "info" => Ok(Severity::Info),
            "warn" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            _ => Err(NotifyError::Configuration(format!(
                "Cannot parse `severity`, expected one of info|warn|error, got {}",
                s
            ))),
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = match self {
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        };
        write!(f, "{}", token)
    }
}

pub fn default_username(ctx: &EventContext) -> Result<String> {
    match ctx {
        EventContext::Release(release) => release.author_login(),
        _ => Ok(DEFAULT_USERNAME.to_owned()),
    }
}

pub fn default_avatar_url(ctx: &EventContext) -> Result<String> {
    match ctx {
        EventContext::Release(release) => release.author_avatar_url(),
        _ => Ok(DEFAULT_AVATAR_URL.to_owned()),
    }
}

/// An unset severity yields an empty color outside of releases.
pub fn default_color(ctx: &EventContext, severity: Option<Severity>) -> Result<String> {
    match ctx {
        EventContext::Release(release) => {
            let color = if release.is_prerelease()? {
                PRERELEASE_COLOR
            } else {
                RELEASE_COLOR
            };
            Ok(color.to_owned())
        }
        _ => Ok(severity.map(Severity::color).unwrap_or_default().to_owned()),
    }
}

pub fn default_url(ctx: &EventContext) -> Result<String> {
    match ctx {
        EventContext::Release(release) => release.html_url(),
        _ => Ok(String::new()),
    }
}

/// An unset severity yields an empty footer outside of releases.
pub fn default_footer(ctx: &EventContext, severity: Option<Severity>) -> Result<String> {
    match (ctx, severity) {
        (EventContext::Release(_), _) | (_, None) => Ok(String::new()),
        (_, Some(severity)) => Ok(format!("Severity: {}", severity.long_label())),
    }
}

pub fn default_description(ctx: &EventContext) -> Result<String> {
    match ctx {
        EventContext::Push { workflow, payload } => Ok(format!(
            "- **Event:** {}\n\
             - **Repo:** {}\n\
             - **Ref:** {}\n\
             - **Workflow:** {}\n\
             - **Author:** {}\n\
             - **Committer:** {}\n\
             - **Pusher:** {}\n\
             - **Commit URL:** {}\n\
             - **Commit Message:** {}\n",
            ctx.event_name(),
            payload.repository_full_name(),
            payload.git_ref(),
            workflow,
            payload.commit_author(),
            payload.committer(),
            payload.pusher(),
            payload.commit_url(),
            payload.commit_message(),
        )),
        EventContext::Release(release) if release.is_published() => Ok(format!(
            "A new {} of {} has been published: **{}**\n\n{}\n\n**It can be found here:** {}",
            if release.is_prerelease()? {
                "pre-release"
            } else {
                "release"
            },
            release.repository_name(),
            release.release_name()?,
            release.release_body()?,
            release.html_url()?,
        )),
        EventContext::Release(release) => Ok(format!(
            "- **Event:** {}\n\
             - **Repo:** {}\n\
             - **Action:** {}\n\
             - **Name**: {}\n\
             - **Author:** {}\n\
             - **Tag:** {}{}\n\
             - **Url:** {}",
            ctx.event_name(),
            release.repository_full_name(),
            release.action(),
            release.release_name()?,
            release.author_login()?,
            release.tag_name()?,
            if release.is_prerelease()? {
                " (pre-release)"
            } else {
                ""
            },
            release.html_url()?,
        )),
        EventContext::Other { name, payload } => Ok(format!(
            "- **Event:** {}\n- **Repo:** {}\n",
            name,
            payload.repository_full_name(name),
        )),
    }
}
