//! Support Relay - Customer-Support Messenger Bot
//!
//! This crate bridges a Messenger-style webhook, a multi-turn input-completion
//! state machine, a confidence-gated classification pipeline, and a canned-answer
//! store into a single customer-support chatbot service.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
