use crate::config::WebhookUrl;
use crate::error::{NotifyError, Result};
use crate::message::Message;
use crate::notify::Dispatcher;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, PartialEq, Serialize)]
pub struct WebhookBody {
    username: String,
    avatar_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    content: String,
    embeds: Vec<Embed>,
}

#[derive(Debug, PartialEq, Serialize)]
struct Embed {
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    footer: Option<Footer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, PartialEq, Serialize)]
struct Footer {
    text: String,
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_owned())
    }
}

/// Discord wants embed colors as integers; `#ff9900`, `ff9900` and
/// `0xff9900` are accepted.
pub fn parse_color(color: &str) -> Option<u32> {
    let hex = color.trim();
    let hex = hex
        .strip_prefix('#')
        .or_else(|| hex.strip_prefix("0x"))
        .unwrap_or(hex);
    if hex.is_empty() || hex.len() > 6 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

impl From<&Message> for WebhookBody {
    fn from(message: &Message) -> Self {
        let color = parse_color(&message.color);
        if color.is_none() && !message.color.is_empty() {
            warn!("Ignoring color {:?}, not a hex color", message.color);
        }
        WebhookBody {
            username: message.username.clone(),
            avatar_url: message.avatar_url.clone(),
            content: message.text.clone(),
            embeds: vec![Embed {
                description: message.description.clone(),
                color,
                footer: non_empty(&message.footer).map(|text| Footer { text }),
                url: non_empty(&message.url),
                timestamp: message.timestamp,
            }],
        }
    }
}

pub struct DiscordWebhook {
    client: reqwest::blocking::Client,
}

impl DiscordWebhook {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(DiscordWebhook { client })
    }
}

impl Dispatcher for DiscordWebhook {
    fn dispatch(&mut self, endpoint: &WebhookUrl, message: &Message) -> Result<()> {
        let body = WebhookBody::from(message);
        debug!("Posting message from {} to {}", body.username, endpoint);

        let resp = self.client.post(endpoint.0.as_str()).json(&body).send()?;
        let status = resp.status();
        if !status.is_success() {
            let response_body = resp.text().unwrap_or_default();
            warn!(
                "Server responded with non-successful status code: {}",
                response_body
            );
            return Err(NotifyError::Delivery(format!(
                "{} {}",
                status, response_body
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate pretty_assertions;

    use super::*;
    use crate::notify::Outcome;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;

    fn webhook() -> DiscordWebhook {
        let client = reqwest::blocking::Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        DiscordWebhook { client }
    }

    fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(head_end) = text.find("\r\n\r\n") {
                let content_length = text[..head_end]
                    .lines()
                    .find_map(|line| {
                        let line = line.to_lowercase();
                        line.strip_prefix("content-length:")
                            .map(|len| len.trim().parse::<usize>().unwrap())
                    })
                    .unwrap_or(0);
                if buf.len() >= head_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8(buf).unwrap()
    }

    /// Answers a single request with `response` and hands back the raw request.
    fn serve_once(response: String) -> (WebhookUrl, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            stream.write_all(response.as_bytes()).unwrap();
            request
        });
        (
            WebhookUrl(format!("http://{}/api/webhooks/1/token", addr)),
            handle,
        )
    }

    fn message() -> Message {
        Message {
            username: "GitHub".to_owned(),
            avatar_url: "https://avatar".to_owned(),
            color: "#ff9900".to_owned(),
            description: "- **Event:** push\n".to_owned(),
            footer: "Severity: Warning".to_owned(),
            text: "".to_owned(),
            url: "".to_owned(),
            timestamp: Utc.ymd(2020, 10, 1).and_hms(12, 0, 0),
        }
    }

    #[test]
    fn colors_are_converted_to_integers() {
        assert_eq!(parse_color("#00ff00"), Some(0x00ff00));
        assert_eq!(parse_color("ff0000"), Some(0xff0000));
        assert_eq!(parse_color("0xff9900"), Some(0xff9900));
        assert_eq!(parse_color(""), None);
        assert_eq!(parse_color("orange"), None);
        assert_eq!(parse_color("#ff99000"), None);
    }

    #[test]
    fn serialize_message() {
        assert_eq!(
            json!({
                "username": "GitHub",
                "avatar_url": "https://avatar",
                "embeds": [
                    {
                        "description": "- **Event:** push\n",
                        "color": 0xff9900,
                        "footer": { "text": "Severity: Warning" },
                        "timestamp": "2020-10-01T12:00:00Z"
                    }
                ]
            }),
            serde_json::to_value(&WebhookBody::from(&message())).unwrap()
        )
    }

    #[test]
    fn serialize_message_with_text_and_url() {
        let message = Message {
            color: "".to_owned(),
            footer: "".to_owned(),
            text: "@here".to_owned(),
            url: "https://github.com/o/r/releases/tag/v1".to_owned(),
            ..message()
        };

        assert_eq!(
            json!({
                "username": "GitHub",
                "avatar_url": "https://avatar",
                "content": "@here",
                "embeds": [
                    {
                        "description": "- **Event:** push\n",
                        "url": "https://github.com/o/r/releases/tag/v1",
                        "timestamp": "2020-10-01T12:00:00Z"
                    }
                ]
            }),
            serde_json::to_value(&WebhookBody::from(&message)).unwrap()
        )
    }

    #[test]
    fn dispatch_posts_the_json_body() {
        let (endpoint, server) =
            serve_once("HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n".to_owned());

        webhook().dispatch(&endpoint, &message()).unwrap();

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /api/webhooks/1/token HTTP/1.1\r\n"));
        assert!(request
            .to_lowercase()
            .contains("content-type: application/json"));
        let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(body).unwrap(),
            serde_json::to_value(&WebhookBody::from(&message())).unwrap()
        );
    }

    #[test]
    fn rejected_dispatch_carries_status_and_body() {
        let body = r#"{"message": "Invalid Form Body"}"#;
        let (endpoint, server) = serve_once(format!(
            "HTTP/1.1 400 Bad Request\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        ));

        let err = webhook().dispatch(&endpoint, &message()).unwrap_err();
        server.join().unwrap();

        match err {
            NotifyError::Delivery(reason) => {
                assert_eq!(reason, format!("400 Bad Request {}", body))
            }
            other => panic!("expected a delivery error, got {:?}", other),
        }
    }

    #[test]
    fn unreachable_endpoint_does_not_leak_the_secret() {
        let addr = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let endpoint =
            WebhookUrl::parse(&format!("http://{}/api/webhooks/1/SECRETTOKEN/github", addr))
                .unwrap();

        let result = webhook().dispatch(&endpoint, &message());
        assert!(matches!(result, Err(NotifyError::Delivery(_))));

        let mut out = Vec::new();
        Outcome::from(result).report(&mut out);
        let reported = String::from_utf8(out).unwrap();
        assert!(reported.starts_with("::error::webhook delivery failed"));
        assert!(!reported.contains("SECRETTOKEN"));
        assert!(!reported.contains("/api/webhooks"));
    }
}
