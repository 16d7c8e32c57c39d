use crate::config::WebhookUrl;
use crate::discord::{parse_color, WebhookBody};
use crate::error::{NotifyError, Result};
use crate::message::Message;
use crate::notify::Dispatcher;
use colored::{Color, Colorize};
use std::io;

const INDENT_STR: &str = " ";

pub trait ConsoleDisplay {
    fn display(&self, f: &mut Box<dyn io::Write>, depth: usize) -> io::Result<()>;
}

fn swatch(color: &str) -> String {
    match parse_color(color) {
        Some(rgb) => {
            let true_color = Color::TrueColor {
                r: (rgb >> 16) as u8,
                g: (rgb >> 8) as u8,
                b: rgb as u8,
            };
            format!("{} {}", "■".color(true_color), color)
        }
        None if color.is_empty() => "n/a".dimmed().to_string(),
        None => color.to_owned(),
    }
}

impl ConsoleDisplay for Message {
    fn display(&self, f: &mut Box<dyn io::Write>, depth: usize) -> io::Result<()> {
        let indent = INDENT_STR.repeat(depth);
        writeln!(f, "{}> {:<11}: {}", indent, "Username", self.username.bold())?;
        writeln!(f, "{}> {:<11}: {}", indent, "Avatar", self.avatar_url)?;
        writeln!(f, "{}> {:<11}: {}", indent, "Color", swatch(&self.color))?;
        writeln!(f, "{}> {:<11}: {}", indent, "Text", self.text)?;
        writeln!(f, "{}> {:<11}: {}", indent, "URL", self.url)?;
        writeln!(f, "{}> {:<11}: {}", indent, "Footer", self.footer)?;
        writeln!(f, "{}> {:<11}: {}", indent, "Timestamp", self.timestamp.to_rfc3339())?;
        writeln!(f, "{}> {:<11}:", indent, "Description")?;
        for line in self.description.lines() {
            writeln!(f, "{}{}  {}", indent, INDENT_STR, line)?;
        }
        writeln!(f)
    }
}

/// Prints the message instead of posting it.
pub struct ConsoleTextPreview {
    sink: Box<dyn io::Write>,
}
impl ConsoleTextPreview {
    pub fn sink_to(sink: Box<dyn io::Write>) -> Self {
        ConsoleTextPreview { sink }
    }
    pub fn stdout() -> Self {
        ConsoleTextPreview::sink_to(Box::new(io::stdout()))
    }
}

impl Dispatcher for ConsoleTextPreview {
    fn dispatch(&mut self, _endpoint: &WebhookUrl, message: &Message) -> Result<()> {
        message
            .display(&mut self.sink, 0)
            .map_err(|err| NotifyError::Delivery(err.to_string()))
    }
}

/// Prints the JSON body that would be posted to the webhook.
pub struct ConsoleJsonPreview {
    compact: bool,
    sink: Box<dyn io::Write>,
}
impl ConsoleJsonPreview {
    pub fn sink_to(compact: bool, sink: Box<dyn io::Write>) -> Self {
        ConsoleJsonPreview { compact, sink }
    }
    pub fn stdout(compact: bool) -> Self {
        ConsoleJsonPreview::sink_to(compact, Box::new(io::stdout()))
    }
}

impl Dispatcher for ConsoleJsonPreview {
    fn dispatch(&mut self, _endpoint: &WebhookUrl, message: &Message) -> Result<()> {
        let body = WebhookBody::from(message);
        let delivery = |err: &dyn std::error::Error| NotifyError::Delivery(err.to_string());
        if self.compact {
            serde_json::ser::to_writer(&mut self.sink, &body).map_err(|e| delivery(&e))?;
        } else {
            serde_json::ser::to_writer_pretty(&mut self.sink, &body).map_err(|e| delivery(&e))?;
        }
        writeln!(self.sink).map_err(|e| delivery(&e))
    }
}
