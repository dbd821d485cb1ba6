//! Adapters - concrete implementations of the ports.
//!
//! - `ai`: oracle adapters over LLM HTTP APIs, plus scripted doubles
//! - `http`: the inbound webhook surface (axum)
//! - `messenger`: outbound reply dispatch over the Graph API
//! - `store`: knowledge store and turn recorder backends

pub mod ai;
pub mod http;
pub mod messenger;
pub mod store;
