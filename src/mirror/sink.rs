//! Destinations mirrored messages are delivered to.

use std::fmt;

use async_trait::async_trait;

use crate::common::error::DispatchError;

use super::payload::Payload;

/// A webhook endpoint bound to a mirror.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sink {
    url: String,
}

impl Sink {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Shows the URL without its token.
impl fmt::Display for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.url.rsplit_once('/') {
            Some((base, _token)) => write!(f, "{}/***", base),
            None => write!(f, "{}", self.url),
        }
    }
}

/// Delivers payloads to sinks.
#[async_trait]
pub trait SinkTransport: Send + Sync {
    async fn send(&self, sink: &Sink, payload: Payload) -> Result<(), DispatchError>;
}
