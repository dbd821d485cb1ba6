//! Axum router for the webhook endpoint.

use axum::routing::get;
use axum::Router;

use super::handlers::{receive_event, verify_webhook, WebhookAppState};

/// Builds the webhook router.
///
/// - `GET /webhook` - verification exchange
/// - `POST /webhook` - page events
pub fn webhook_router() -> Router<WebhookAppState> {
    Router::new().route("/webhook", get(verify_webhook).post(receive_event))
}
