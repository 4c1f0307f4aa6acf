//! Push payload decoding and notification-click handling.

use crate::constants::NOTIFICATION_ICON_PATH;
use serde::Serialize;
use serde_json::Value;

/// A system notification ready to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
}

/// Build the notification for a raw push payload `{title, message}`.
///
/// Each field is read on its own: a missing or non-string field is left
/// empty, and a payload that is not a JSON object yields an empty
/// notification instead of an error.
pub fn notification_from_push(data: &[u8]) -> Notification {
    let payload = match serde_json::from_slice::<Value>(data) {
        Ok(Value::Object(fields)) => fields,
        Ok(other) => {
            tracing::warn!("Ignoring push payload that is not an object: {}", other);
            Default::default()
        }
        Err(err) => {
            tracing::warn!("Ignoring malformed push payload: {}", err);
            Default::default()
        }
    };
    let text_field = |name: &str| match payload.get(name) {
        Some(Value::String(text)) => text.clone(),
        Some(other) => {
            tracing::warn!("Push field `{}` is not a string: {}", name, other);
            String::new()
        }
        None => String::new(),
    };
    Notification {
        title: text_field("title"),
        body: text_field("message"),
        icon: NOTIFICATION_ICON_PATH.to_string(),
    }
}

/// An open client window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientWindow {
    pub id: String,
    pub url: String,
    pub focused: bool,
}

/// What to do when a notification is clicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickAction {
    Focus { client_id: String },
    OpenWindow { url: String },
}

/// Prefer the focused window, then any window, else open `/`.
pub fn on_notification_click(clients: &[ClientWindow]) -> ClickAction {
    clients
        .iter()
        .find(|client| client.focused)
        .or_else(|| clients.first())
        .map(|client| ClickAction::Focus {
            client_id: client.id.clone(),
        })
        .unwrap_or_else(|| ClickAction::OpenWindow {
            url: "/".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(id: &str, focused: bool) -> ClientWindow {
        ClientWindow {
            id: id.to_string(),
            url: format!("/tr/{}", id),
            focused,
        }
    }

    #[test]
    fn push_payload_becomes_notification_with_fixed_icon() {
        let note =
            notification_from_push(r#"{"title":"Yeni rozet","message":"İlk kelime"}"#.as_bytes());
        assert_eq!(note.title, "Yeni rozet");
        assert_eq!(note.body, "İlk kelime");
        assert_eq!(note.icon, "/icons/icon-192x192.png");
    }

    #[test]
    fn malformed_push_payload_defaults_to_empty_title() {
        for raw in [&b"not json"[..], b"", b"[1,2]", br#"{"message":5}"#] {
            let note = notification_from_push(raw);
            assert_eq!(note.title, "");
            assert_eq!(note.icon, NOTIFICATION_ICON_PATH);
        }
        assert_eq!(
            notification_from_push(r#"{"message":"yalnız"}"#.as_bytes()).body,
            "yalnız"
        );
    }

    #[test]
    fn mistyped_field_keeps_the_other_fields() {
        let note = notification_from_push(br#"{"title":"x","message":5}"#);
        assert_eq!(note.title, "x");
        assert_eq!(note.body, "");

        let note = notification_from_push(r#"{"title":null,"message":"Günün kelimesi"}"#.as_bytes());
        assert_eq!(note.title, "");
        assert_eq!(note.body, "Günün kelimesi");
    }

    #[test]
    fn click_prefers_focused_then_any_then_new_window() {
        assert_eq!(
            on_notification_click(&[window("a", false), window("b", true)]),
            ClickAction::Focus {
                client_id: "b".to_string()
            }
        );
        assert_eq!(
            on_notification_click(&[window("a", false), window("c", false)]),
            ClickAction::Focus {
                client_id: "a".to_string()
            }
        );
        assert_eq!(
            on_notification_click(&[]),
            ClickAction::OpenWindow {
                url: "/".to_string()
            }
        );
    }
}
