use crate::config::{Config, WebhookUrl};
use crate::error::Result;
use crate::github::EventContext;
use crate::message::Message;
use chrono::Utc;
use log::info;
use std::{fmt::Display, io};

/// Delivers a composed message to a webhook endpoint, exactly once.
pub trait Dispatcher {
    fn dispatch(&mut self, endpoint: &WebhookUrl, message: &Message) -> Result<()>;
}

#[derive(Debug, PartialEq)]
pub enum Outcome {
    Ok,
    Failed(String),
}

impl<T, E: Display> From<std::result::Result<T, E>> for Outcome {
    fn from(result: std::result::Result<T, E>) -> Self {
        match result {
            Ok(_) => Outcome::Ok,
            Err(err) => Outcome::Failed(format!("{:#}", err)),
        }
    }
}

// Workflow command data encoding, `%` first so the escapes survive.
fn escape_data(data: &str) -> String {
    data.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

impl Outcome {
    /// Writes a failure as an `::error::` workflow command, which fails the
    /// step on an Actions runner, and returns the process exit code.
    pub fn report<W: io::Write>(&self, out: &mut W) -> i32 {
        match self {
            Outcome::Ok => 0,
            Outcome::Failed(reason) => {
                let _ = writeln!(out, "::error::{}", escape_data(reason));
                1
            }
        }
    }
}

/// Validates the inputs, composes the message for `ctx` and hands it to
/// `dispatcher`. Nothing is dispatched if any earlier step fails.
pub fn notify<D>(config: &Config, ctx: &EventContext, dispatcher: &mut D) -> Result<Message>
where
    D: Dispatcher + ?Sized,
{
    let endpoint = config.webhook_url()?;
    let overrides = config.overrides();
    info!(
        "inputs: username={:?} avatarUrl={:?} color={:?} description={:?} details={:?} footer={:?} text={:?} url={:?} severity={:?}",
        overrides.username,
        overrides.avatar_url,
        overrides.color,
        overrides.description,
        overrides.details,
        overrides.footer,
        overrides.text,
        overrides.url,
        config.severity,
    );

    let message = Message::compose(&overrides, ctx, config.severity, Utc::now())?;
    dispatcher.dispatch(&endpoint, &message)?;
    info!("{} notification delivered", ctx.event_name());
    Ok(message)
}

#[cfg(test)]
mod tests {
    extern crate pretty_assertions;

    use super::*;
    use crate::error::NotifyError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Default)]
    struct RecordingDispatcher {
        sent: Vec<(WebhookUrl, Message)>,
        fail_with: Option<String>,
    }

    impl Dispatcher for RecordingDispatcher {
        fn dispatch(&mut self, endpoint: &WebhookUrl, message: &Message) -> Result<()> {
            self.sent.push((endpoint.clone(), message.clone()));
            match &self.fail_with {
                Some(reason) => Err(NotifyError::Delivery(reason.clone())),
                None => Ok(()),
            }
        }
    }

    fn push_ctx() -> EventContext {
        EventContext::new("push", "CI", json!({ "repository": { "full_name": "o/r" } })).unwrap()
    }

    #[test]
    fn dispatches_once_to_the_stripped_endpoint() {
        let config = Config {
            webhook_url: Some("https://x/abc/github".to_owned()),
            username: Some("bot".to_owned()),
            ..Config::default()
        };
        let mut dispatcher = RecordingDispatcher::default();

        let message = notify(&config, &push_ctx(), &mut dispatcher).unwrap();

        assert_eq!(dispatcher.sent.len(), 1);
        let (endpoint, sent) = &dispatcher.sent[0];
        assert_eq!(endpoint, &WebhookUrl("https://x/abc".to_owned()));
        assert_eq!(sent, &message);
        assert_eq!(sent.username, "bot");
    }

    #[test]
    fn missing_webhook_url_never_dispatches() {
        for webhook_url in vec![None, Some("".to_owned())] {
            let config = Config {
                webhook_url,
                ..Config::default()
            };
            let mut dispatcher = RecordingDispatcher::default();

            let outcome: Outcome = notify(&config, &push_ctx(), &mut dispatcher).into();

            assert!(dispatcher.sent.is_empty());
            match outcome {
                Outcome::Failed(reason) => assert!(reason.starts_with("The webhookUrl was not provided")),
                Outcome::Ok => panic!("expected a failed run"),
            }
        }
    }

    #[test]
    fn malformed_release_never_dispatches() {
        let config = Config {
            webhook_url: Some("https://x".to_owned()),
            ..Config::default()
        };
        let ctx = EventContext::new("release", "", json!({ "action": "published" })).unwrap();
        let mut dispatcher = RecordingDispatcher::default();

        let outcome: Outcome = notify(&config, &ctx, &mut dispatcher).into();

        assert!(dispatcher.sent.is_empty());
        assert_eq!(
            outcome,
            Outcome::Failed("malformed `release` payload: missing `release`".to_owned())
        );
    }

    #[test]
    fn failures_are_reported_as_workflow_errors() {
        let mut out = Vec::new();
        let code = Outcome::Failed("webhook delivery failed:\n502".to_owned()).report(&mut out);
        assert_eq!(code, 1);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "::error::webhook delivery failed:%0A502\n"
        );

        let mut out = Vec::new();
        Outcome::Failed("webhook delivery failed: 100%0Adone\r\nx".to_owned()).report(&mut out);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "::error::webhook delivery failed: 100%250Adone%0D%0Ax\n"
        );

        let mut out = Vec::new();
        assert_eq!(Outcome::Ok.report(&mut out), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn delivery_errors_fail_the_run() {
        let config = Config {
            webhook_url: Some("https://x".to_owned()),
            ..Config::default()
        };
        let mut dispatcher = RecordingDispatcher {
            fail_with: Some("connection refused".to_owned()),
            ..RecordingDispatcher::default()
        };

        let outcome: Outcome = notify(&config, &push_ctx(), &mut dispatcher).into();

        assert_eq!(dispatcher.sent.len(), 1);
        assert_eq!(
            outcome,
            Outcome::Failed("webhook delivery failed: connection refused".to_owned())
        );
    }
}
