//! Inbound message types: frame decoding and notification classification.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_tungstenite::tungstenite::Message;

use crate::error::ProbeError;

/// Decodes one WebSocket frame into JSON.
///
/// Text and binary frames are parsed as JSON. Control frames carry no
/// application data and yield `Ok(None)`.
///
/// # Errors
///
/// Returns [`ProbeError::Decode`] for a data frame that is not valid JSON
/// and [`ProbeError::ConnectionClosed`] for a close frame.
pub fn decode_frame(message: &Message) -> Result<Option<serde_json::Value>, ProbeError> {
    match message {
        Message::Text(text) => Ok(Some(serde_json::from_str(text.as_str())?)),
        Message::Binary(data) => Ok(Some(serde_json::from_slice(data)?)),
        Message::Close(_) => Err(ProbeError::ConnectionClosed),
        Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => Ok(None),
    }
}

/// A decoded inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// `{"type": "notification", ...}` with the well-known fields extracted.
    Notification(Notification),
    /// Any other JSON value.
    Other(serde_json::Value),
}

impl InboundMessage {
    /// Classifies a decoded JSON value.
    ///
    /// Objects whose `type` is `"notification"` are viewed as a
    /// [`Notification`]; when the fields have unexpected types the value is
    /// kept as [`InboundMessage::Other`] instead of being rejected.
    #[must_use]
    pub fn classify(value: serde_json::Value, received_at: DateTime<Utc>) -> Self {
        let is_notification = value.get("type").and_then(|t| t.as_str()) == Some("notification");
        if !is_notification {
            return Self::Other(value);
        }
        match serde_json::from_value::<RawNotification>(value.clone()) {
            Ok(raw) => Self::Notification(raw.into_notification(received_at)),
            Err(err) => {
                tracing::debug!(error = %err, "notification fields not understood");
                Self::Other(value)
            }
        }
    }
}

/// Notification severity as emitted by the notification service.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational.
    Low,
    /// Default level.
    #[default]
    Medium,
    /// Needs attention soon.
    High,
    /// Needs attention now.
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// Typed view of a `notification` message.
///
/// Missing fields get the same defaults the web frontend applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Server-assigned ID, or `notification_<unix millis>` when absent.
    pub id: String,
    /// `notification_type` (`low_stock`, `expiry`, `system`, ...).
    pub kind: String,
    /// Short headline.
    pub title: String,
    /// Body text, possibly empty.
    pub message: String,
    /// When the server created it, or when it was received.
    pub timestamp: DateTime<Utc>,
    /// Urgency.
    pub severity: Severity,
    /// Link to the related page, if any.
    pub action_url: Option<String>,
    /// Inventory item the notification refers to, if any.
    pub item_id: Option<String>,
}

impl Notification {
    /// One-line human summary, e.g. `[high] low_stock: Low Stock Alert: Milk is low`.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.message.is_empty() {
            format!("[{}] {}: {}", self.severity, self.kind, self.title)
        } else {
            format!(
                "[{}] {}: {}: {}",
                self.severity, self.kind, self.title, self.message
            )
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawNotification {
    #[serde(default)]
    id: Option<IdValue>,
    #[serde(default)]
    notification_type: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    severity: Option<Severity>,
    #[serde(default)]
    action_url: Option<String>,
    #[serde(default)]
    item_id: Option<IdValue>,
}

/// IDs arrive as strings or numbers depending on the producer.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IdValue {
    Text(String),
    Number(serde_json::Number),
}

impl From<IdValue> for String {
    fn from(id: IdValue) -> Self {
        match id {
            IdValue::Text(s) => s,
            IdValue::Number(n) => n.to_string(),
        }
    }
}

impl RawNotification {
    fn into_notification(self, received_at: DateTime<Utc>) -> Notification {
        let id = non_empty(self.id.map(String::from))
            .unwrap_or_else(|| format!("notification_{}", received_at.timestamp_millis()));
        let timestamp = self
            .timestamp
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or(received_at);

        Notification {
            id,
            kind: non_empty(self.notification_type).unwrap_or_else(|| "system".to_string()),
            title: non_empty(self.title).unwrap_or_else(|| "New Notification".to_string()),
            message: self.message.unwrap_or_default(),
            timestamp,
            severity: self.severity.unwrap_or_default(),
            action_url: self.action_url,
            item_id: self.item_id.map(String::from),
        }
    }
}

/// Empty strings count as missing.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Accepts RFC 3339 and zone-less ISO-8601 (read as UTC).
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn received_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .single()
            .unwrap_or_default()
    }

    #[test]
    fn text_frame_decodes_json() {
        let msg = Message::text(r#"{"type":"alert","id":1}"#.to_string());
        let Ok(Some(value)) = decode_frame(&msg) else {
            panic!("expected a JSON value");
        };
        assert_eq!(value, json!({"type": "alert", "id": 1}));
    }

    #[test]
    fn binary_frame_decodes_json() {
        let msg = Message::binary(br#"[1,2,3]"#.to_vec());
        let Ok(Some(value)) = decode_frame(&msg) else {
            panic!("expected a JSON value");
        };
        assert_eq!(value, json!([1, 2, 3]));
    }

    #[test]
    fn malformed_text_is_decode_error() {
        let msg = Message::text("pong".to_string());
        assert!(matches!(decode_frame(&msg), Err(ProbeError::Decode(_))));
    }

    #[test]
    fn control_frames_are_skipped() {
        assert!(matches!(decode_frame(&Message::Ping(Default::default())), Ok(None)));
        assert!(matches!(decode_frame(&Message::Pong(Default::default())), Ok(None)));
    }

    #[test]
    fn close_frame_ends_stream() {
        assert!(matches!(
            decode_frame(&Message::Close(None)),
            Err(ProbeError::ConnectionClosed)
        ));
    }

    #[test]
    fn non_notification_kept_verbatim() {
        let value = json!({"type": "alert", "id": 1});
        let msg = InboundMessage::classify(value.clone(), received_at());
        assert_eq!(msg, InboundMessage::Other(value));
    }

    #[test]
    fn notification_fields_extracted() {
        let value = json!({
            "type": "notification",
            "id": "n-42",
            "notification_type": "low_stock",
            "title": "Low Stock Alert",
            "message": "Milk is running low",
            "timestamp": "2024-05-01T09:30:00Z",
            "severity": "high",
            "action_url": "/inventory",
            "item_id": 7
        });
        let InboundMessage::Notification(n) = InboundMessage::classify(value, received_at())
        else {
            panic!("expected a notification");
        };
        assert_eq!(n.id, "n-42");
        assert_eq!(n.kind, "low_stock");
        assert_eq!(n.severity, Severity::High);
        assert_eq!(n.action_url.as_deref(), Some("/inventory"));
        assert_eq!(n.item_id.as_deref(), Some("7"));
        assert_eq!(n.timestamp.to_rfc3339(), "2024-05-01T09:30:00+00:00");
        assert_eq!(
            n.summary(),
            "[high] low_stock: Low Stock Alert: Milk is running low"
        );
    }

    #[test]
    fn notification_defaults_applied() {
        let value = json!({"type": "notification"});
        let InboundMessage::Notification(n) = InboundMessage::classify(value, received_at())
        else {
            panic!("expected a notification");
        };
        assert_eq!(n.id, format!("notification_{}", received_at().timestamp_millis()));
        assert_eq!(n.kind, "system");
        assert_eq!(n.title, "New Notification");
        assert_eq!(n.severity, Severity::Medium);
        assert_eq!(n.timestamp, received_at());
        assert_eq!(n.summary(), "[medium] system: New Notification");
    }

    #[test]
    fn empty_strings_take_defaults() {
        let value = json!({"type": "notification", "id": "", "notification_type": "", "title": ""});
        let InboundMessage::Notification(n) = InboundMessage::classify(value, received_at())
        else {
            panic!("expected a notification");
        };
        assert_eq!(n.id, format!("notification_{}", received_at().timestamp_millis()));
        assert_eq!(n.kind, "system");
        assert_eq!(n.title, "New Notification");
    }

    #[test]
    fn any_numeric_id_is_kept() {
        for (raw, expected) in [
            (json!(18_446_744_073_709_551_615_u64), "18446744073709551615"),
            (json!(12.5), "12.5"),
            (json!(-3), "-3"),
        ] {
            let value = json!({"type": "notification", "id": raw, "item_id": raw});
            let InboundMessage::Notification(n) = InboundMessage::classify(value, received_at())
            else {
                panic!("numeric id {expected} should stay a notification");
            };
            assert_eq!(n.id, expected);
            assert_eq!(n.item_id.as_deref(), Some(expected));
        }
    }

    #[test]
    fn naive_timestamp_read_as_utc() {
        let value = json!({"type": "notification", "timestamp": "2024-05-01T08:15:30.250000"});
        let InboundMessage::Notification(n) = InboundMessage::classify(value, received_at())
        else {
            panic!("expected a notification");
        };
        assert_eq!(n.timestamp.timestamp_millis() % 1000, 250);
    }

    #[test]
    fn mistyped_notification_falls_back_to_other() {
        let value = json!({"type": "notification", "title": 12});
        assert!(matches!(
            InboundMessage::classify(value, received_at()),
            InboundMessage::Other(_)
        ));
    }
}
