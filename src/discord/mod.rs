//! Discord integration.
//!
//! This module observes source channels through the gateway and delivers
//! mirrored messages through webhooks.

pub mod client;
pub mod convert;
pub mod webhook;

// Re-export main types for external use
pub use client::{build_http, DiscordBot};
pub use webhook::WebhookTransport;
