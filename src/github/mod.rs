pub mod payload;

use crate::error::{NotifyError, Result};
use log::debug;
use payload::{OtherPayload, PushPayload, ReleasePayload};
use serde_json::Value;
use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

pub const EVENT_NAME_VAR: &str = "GITHUB_EVENT_NAME";
pub const EVENT_PATH_VAR: &str = "GITHUB_EVENT_PATH";
pub const WORKFLOW_VAR: &str = "GITHUB_WORKFLOW";

/// The raw workflow context: event name, workflow name and the JSON payload
/// GitHub wrote for the triggering event.
#[derive(Debug, PartialEq)]
pub struct GithubContext {
    pub event_name: String,
    pub workflow: String,
    pub payload: Value,
}

impl GithubContext {
    /// Reads the context the runner exposes through `GITHUB_*` variables.
    /// `event_name` and `event_file` take precedence over the environment.
    pub fn resolve<F>(
        lookup: F,
        event_name: Option<String>,
        event_file: Option<PathBuf>,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let event_name = event_name
            .or_else(|| lookup(EVENT_NAME_VAR))
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                NotifyError::Configuration(format!(
                    "no event name given, set {} or pass --event-name",
                    EVENT_NAME_VAR
                ))
            })?;
        let workflow = lookup(WORKFLOW_VAR).unwrap_or_default();
        let event_file = event_file.or_else(|| lookup(EVENT_PATH_VAR).map(PathBuf::from));

        let payload = match event_file {
            Some(path) => Self::read_payload(&event_name, path)?,
            None => Value::Object(Default::default()),
        };

        Ok(GithubContext {
            event_name,
            workflow,
            payload,
        })
    }

    pub fn read_payload<T: AsRef<Path>>(event_name: &str, path: T) -> Result<Value> {
        let file = File::open(path.as_ref()).map_err(|err| {
            NotifyError::Configuration(format!(
                "cannot open event file {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|err| NotifyError::MalformedPayload {
            event: event_name.to_owned(),
            detail: err.to_string(),
        })
    }

    pub fn event_context(&self) -> Result<EventContext> {
        if log::log_enabled!(log::Level::Debug) {
            let payload = serde_json::to_string_pretty(&self.payload).unwrap_or_default();
            debug!(
                "The event github.context: {} ({}) {}",
                self.event_name, self.workflow, payload
            );
        }
        EventContext::new(&self.event_name, &self.workflow, self.payload.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Push,
    Release,
    Other(String),
}

impl EventKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "push" => EventKind::Push,
            "release" => EventKind::Release,
            other => EventKind::Other(other.to_owned()),
        }
    }
}

/// Read-only snapshot of the triggering event, one variant per event kind.
#[derive(Debug, PartialEq)]
pub enum EventContext {
    Push {
        workflow: String,
        payload: PushPayload,
    },
    Release(ReleasePayload),
    Other {
        name: String,
        payload: OtherPayload,
    },
}

impl EventContext {
    pub fn new(event_name: &str, workflow: &str, payload: Value) -> Result<Self> {
        let malformed = |err: serde_json::Error| NotifyError::MalformedPayload {
            event: event_name.to_owned(),
            detail: err.to_string(),
        };
        let ctx = match EventKind::from_name(event_name) {
            EventKind::Push => EventContext::Push {
                workflow: workflow.to_owned(),
                payload: serde_json::from_value(payload).map_err(malformed)?,
            },
            EventKind::Release => {
                EventContext::Release(serde_json::from_value(payload).map_err(malformed)?)
            }
            EventKind::Other(name) => EventContext::Other {
                name,
                // best-effort: anything unreadable just loses the repository name
                payload: serde_json::from_value(payload).unwrap_or_default(),
            },
        };
        Ok(ctx)
    }

    pub fn event_name(&self) -> &str {
        match self {
            EventContext::Push { .. } => "push",
            EventContext::Release(_) => "release",
            EventContext::Other { name, .. } => name,
        }
    }
}
