//! Messenger webhook endpoint.
//!
//! - `GET /webhook` - subscription verification exchange (echoes
//!   `hub.challenge` when `hub.mode` and `hub.verify_token` check out)
//! - `POST /webhook` - page-event envelope; signed with
//!   `X-Hub-Signature-256` when an app secret is configured

pub mod dto;
pub mod handlers;
pub mod routes;
pub mod signature;

pub use handlers::WebhookAppState;
pub use routes::webhook_router;
pub use signature::SignatureVerifier;
