//! Wire shapes for the Messenger webhook.

use serde::Deserialize;

/// Query parameters of the GET verification exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Top-level POST envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct PageEventEnvelope {
    /// Event source object type; only `"page"` is accepted.
    pub object: String,
    #[serde(default)]
    pub entry: Vec<PageEntry>,
}

/// One page entry; only the first messaging event is processed.
#[derive(Debug, Clone, Deserialize)]
pub struct PageEntry {
    #[serde(default)]
    pub messaging: Vec<MessagingEvent>,
}

/// One messaging event inside an entry.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagingEvent {
    pub sender: Option<EventSender>,
    pub message: Option<IncomingMessage>,
}

/// Who sent the event.
#[derive(Debug, Clone, Deserialize)]
pub struct EventSender {
    #[serde(default)]
    pub id: String,
}

/// The message payload: text, attachments, or both.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub text: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// A non-text payload item.
#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_event_decodes() {
        let body = r#"{
            "object": "page",
            "entry": [{"messaging": [{"sender": {"id": "24031"}, "message": {"text": "你好"}}]}]
        }"#;
        let envelope: PageEventEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.object, "page");
        let event = &envelope.entry[0].messaging[0];
        assert_eq!(event.sender.as_ref().unwrap().id, "24031");
        assert_eq!(event.message.as_ref().unwrap().text.as_deref(), Some("你好"));
    }

    #[test]
    fn attachment_event_decodes() {
        let body = r#"{
            "object": "page",
            "entry": [{"messaging": [{"sender": {"id": "24031"},
                "message": {"attachments": [{"type": "image", "payload": {"url": "x"}}]}}]}]
        }"#;
        let envelope: PageEventEnvelope = serde_json::from_str(body).unwrap();
        let message = envelope.entry[0].messaging[0].message.as_ref().unwrap();
        assert!(message.text.is_none());
        assert_eq!(message.attachments[0].kind, "image");
    }

    #[test]
    fn missing_entry_defaults_to_empty() {
        let envelope: PageEventEnvelope = serde_json::from_str(r#"{"object":"page"}"#).unwrap();
        assert!(envelope.entry.is_empty());
    }
}
