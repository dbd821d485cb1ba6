//! Webhook request handlers.
//!
//! Event processing is detached from the request: the platform expects a
//! fast ACK, so each messaging event is spawned onto the runtime and the
//! handler returns `EVENT_RECEIVED` immediately.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use tracing::{debug, info, warn};

use crate::application::InboundMessageHandler;
use crate::domain::foundation::SenderId;

use super::dto::{MessagingEvent, PageEventEnvelope, VerifyQuery};
use super::signature::SignatureVerifier;

const SIGNATURE_HEADER: &str = "x-hub-signature-256";
const EVENT_RECEIVED: &str = "EVENT_RECEIVED";

/// Shared state for the webhook routes.
#[derive(Clone)]
pub struct WebhookAppState {
    /// The inbound orchestrator every event is handed to.
    pub handler: Arc<InboundMessageHandler>,
    /// Token echoed back during the GET verification exchange.
    pub verify_token: String,
    /// Payload signature verifier; `None` disables verification (dev).
    pub signature: Option<Arc<SignatureVerifier>>,
}

/// GET verification exchange.
pub async fn verify_webhook(
    State(state): State<WebhookAppState>,
    Query(query): Query<VerifyQuery>,
) -> impl IntoResponse {
    let (Some(mode), Some(token)) = (query.mode, query.verify_token) else {
        warn!("webhook verification missing mode or token");
        return (StatusCode::BAD_REQUEST, String::new());
    };

    if mode == "subscribe" && token == state.verify_token {
        info!("webhook verification succeeded");
        (StatusCode::OK, query.challenge.unwrap_or_default())
    } else {
        warn!("webhook verification failed: bad mode or token");
        (StatusCode::FORBIDDEN, String::new())
    }
}

/// POST page-event envelope.
pub async fn receive_event(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    if let Some(verifier) = &state.signature {
        let header = headers
            .get(SIGNATURE_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        if !verifier.verify(&body, header) {
            warn!("webhook payload signature rejected");
            return (StatusCode::FORBIDDEN, String::new());
        }
    }

    let envelope: PageEventEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(error) => {
            warn!(%error, "webhook body is not a valid event envelope");
            return (StatusCode::BAD_REQUEST, String::new());
        }
    };

    if envelope.object != "page" {
        warn!(object = %envelope.object, "non-page webhook object");
        return (StatusCode::NOT_FOUND, String::new());
    }

    if envelope.entry.is_empty() {
        warn!("page event with empty entry array");
        return (StatusCode::BAD_REQUEST, String::new());
    }

    for entry in envelope.entry {
        // Only the first messaging event per entry carries the message.
        let Some(event) = entry.messaging.into_iter().next() else {
            warn!("entry without messaging events; skipping");
            continue;
        };
        dispatch_event(&state, event);
    }

    (StatusCode::OK, EVENT_RECEIVED.to_string())
}

/// Hands one messaging event to the orchestrator on a detached task.
fn dispatch_event(state: &WebhookAppState, event: MessagingEvent) {
    let sender = match event
        .sender
        .map(|s| s.id)
        .filter(|id| !id.trim().is_empty())
        .map(SenderId::new)
    {
        Some(Ok(sender)) => sender,
        _ => {
            warn!("messaging event without sender id; skipping");
            return;
        }
    };

    let Some(message) = event.message else {
        debug!(sender = %sender, "non-message event; ignoring");
        return;
    };

    let handler = Arc::clone(&state.handler);
    if let Some(text) = message.text {
        info!(sender = %sender, "text message received");
        tokio::spawn(async move {
            handler.handle_text(&sender, &text).await;
        });
    } else if !message.attachments.is_empty() {
        let kind = message.attachments[0].kind.clone();
        tokio::spawn(async move {
            handler.handle_attachment(&sender, &kind).await;
        });
    } else {
        debug!(sender = %sender, "message with neither text nor attachments; ignoring");
    }
}
