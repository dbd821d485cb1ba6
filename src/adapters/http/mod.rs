//! HTTP adapters - the inbound webhook surface.

pub mod webhook;

pub use webhook::{webhook_router, WebhookAppState};
