//! Typed views over the webhook payloads GitHub writes to `GITHUB_EVENT_PATH`.
//!
//! Every field is optional: GitHub omits or nulls fields depending on the
//! event, and a missing field must only affect the output that reads it.
use crate::error::{NotifyError, Result};
use log::warn;
use serde::Deserialize;

#[derive(Debug, Default, PartialEq, Deserialize)]
pub struct Repository {
    pub name: Option<String>,
    pub full_name: Option<String>,
}

#[derive(Debug, Default, PartialEq, Deserialize)]
pub struct GitUser {
    pub name: Option<String>,
}

#[derive(Debug, Default, PartialEq, Deserialize)]
pub struct GithubUser {
    pub login: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Default, PartialEq, Deserialize)]
pub struct Commit {
    pub url: Option<String>,
    pub message: Option<String>,
    pub author: Option<GitUser>,
    pub committer: Option<GitUser>,
}

#[derive(Debug, Default, PartialEq, Deserialize)]
pub struct PushPayload {
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
    pub repository: Option<Repository>,
    pub head_commit: Option<Commit>,
    pub pusher: Option<GitUser>,
}

#[derive(Debug, Default, PartialEq, Deserialize)]
pub struct Release {
    pub name: Option<String>,
    pub body: Option<String>,
    pub tag_name: Option<String>,
    pub prerelease: Option<bool>,
    pub html_url: Option<String>,
    pub author: Option<GithubUser>,
}

#[derive(Debug, Default, PartialEq, Deserialize)]
pub struct ReleasePayload {
    pub action: Option<String>,
    pub repository: Option<Repository>,
    pub release: Option<Release>,
}

#[derive(Debug, Default, PartialEq, Deserialize)]
pub struct OtherPayload {
    pub repository: Option<Repository>,
}

/// Degrades a missing, non-essential field to an empty string.
fn or_empty(value: Option<&String>, event: &str, field: &str) -> String {
    match value {
        Some(value) => value.clone(),
        None => {
            warn!("{}, using an empty value", NotifyError::missing_field(event, field));
            String::new()
        }
    }
}

fn full_name(repository: &Option<Repository>, event: &str) -> String {
    or_empty(
        repository.as_ref().and_then(|r| r.full_name.as_ref()),
        event,
        "repository.full_name",
    )
}

impl PushPayload {
    const EVENT: &'static str = "push";

    pub fn repository_full_name(&self) -> String {
        full_name(&self.repository, Self::EVENT)
    }

    pub fn git_ref(&self) -> String {
        or_empty(self.git_ref.as_ref(), Self::EVENT, "ref")
    }

    pub fn commit_author(&self) -> String {
        or_empty(
            self.head_commit
                .as_ref()
                .and_then(|c| c.author.as_ref())
                .and_then(|a| a.name.as_ref()),
            Self::EVENT,
            "head_commit.author.name",
        )
    }

    pub fn committer(&self) -> String {
        or_empty(
            self.head_commit
                .as_ref()
                .and_then(|c| c.committer.as_ref())
                .and_then(|a| a.name.as_ref()),
            Self::EVENT,
            "head_commit.committer.name",
        )
    }

    pub fn pusher(&self) -> String {
        or_empty(
            self.pusher.as_ref().and_then(|p| p.name.as_ref()),
            Self::EVENT,
            "pusher.name",
        )
    }

    pub fn commit_url(&self) -> String {
        or_empty(
            self.head_commit.as_ref().and_then(|c| c.url.as_ref()),
            Self::EVENT,
            "head_commit.url",
        )
    }

    pub fn commit_message(&self) -> String {
        or_empty(
            self.head_commit.as_ref().and_then(|c| c.message.as_ref()),
            Self::EVENT,
            "head_commit.message",
        )
    }
}

impl ReleasePayload {
    const EVENT: &'static str = "release";

    pub fn is_published(&self) -> bool {
        self.action.as_deref() == Some("published")
    }

    pub fn action(&self) -> String {
        or_empty(self.action.as_ref(), Self::EVENT, "action")
    }

    pub fn repository_name(&self) -> String {
        or_empty(
            self.repository.as_ref().and_then(|r| r.name.as_ref()),
            Self::EVENT,
            "repository.name",
        )
    }

    pub fn repository_full_name(&self) -> String {
        full_name(&self.repository, Self::EVENT)
    }

    /// The release object itself; without it there is nothing to announce.
    pub fn release(&self) -> Result<&Release> {
        self.release
            .as_ref()
            .ok_or_else(|| NotifyError::missing_field(Self::EVENT, "release"))
    }

    pub fn is_prerelease(&self) -> Result<bool> {
        Ok(self.release()?.prerelease.unwrap_or(false))
    }

    pub fn release_name(&self) -> Result<String> {
        Ok(or_empty(
            self.release()?.name.as_ref(),
            Self::EVENT,
            "release.name",
        ))
    }

    pub fn release_body(&self) -> Result<String> {
        Ok(or_empty(
            self.release()?.body.as_ref(),
            Self::EVENT,
            "release.body",
        ))
    }

    pub fn tag_name(&self) -> Result<String> {
        Ok(or_empty(
            self.release()?.tag_name.as_ref(),
            Self::EVENT,
            "release.tag_name",
        ))
    }

    pub fn html_url(&self) -> Result<String> {
        Ok(or_empty(
            self.release()?.html_url.as_ref(),
            Self::EVENT,
            "release.html_url",
        ))
    }

    fn author(&self) -> Result<&GithubUser> {
        self.release()?
            .author
            .as_ref()
            .ok_or_else(|| NotifyError::missing_field(Self::EVENT, "release.author"))
    }

    // A release attributed to nobody would be misleading, so the author fails
    // the run instead of degrading.
    pub fn author_login(&self) -> Result<String> {
        self.author()?
            .login
            .clone()
            .ok_or_else(|| NotifyError::missing_field(Self::EVENT, "release.author.login"))
    }

    pub fn author_avatar_url(&self) -> Result<String> {
        self.author()?
            .avatar_url
            .clone()
            .ok_or_else(|| NotifyError::missing_field(Self::EVENT, "release.author.avatar_url"))
    }
}

impl OtherPayload {
    pub fn repository_full_name(&self, event: &str) -> String {
        full_name(&self.repository, event)
    }
}
