//! Channel-backed sink
//!
//! Forwards every published message over an unbounded tokio channel. The
//! connector can be gated on a [`Notify`] so the caller decides when the
//! "connection" completes.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};

use super::{BrokerConnector, BrokerEndpoint, PublishSink, SinkError};

/// A message handed to a [`ChannelSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    /// Topic the message was published on
    pub topic: String,
    /// Serialized payload
    pub payload: String,
}

/// Connector producing [`ChannelSink`]s that share one receiver
#[derive(Debug, Clone)]
pub struct ChannelConnector {
    sender: mpsc::UnboundedSender<PublishedMessage>,
    gate: Option<Arc<Notify>>,
    attempts: Arc<AtomicUsize>,
}

impl ChannelConnector {
    /// Create a connector that connects immediately
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PublishedMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender, gate: None, attempts: Arc::new(AtomicUsize::new(0)) }, receiver)
    }

    /// Create a connector whose connections complete only when the returned
    /// [`Notify`] is signalled, once per connection
    pub fn gated() -> (Self, Arc<Notify>, mpsc::UnboundedReceiver<PublishedMessage>) {
        let (mut connector, receiver) = Self::new();
        let gate = Arc::new(Notify::new());
        connector.gate = Some(Arc::clone(&gate));
        (connector, gate, receiver)
    }

    /// Number of connection attempts started so far
    pub fn connection_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrokerConnector for ChannelConnector {
    type Sink = ChannelSink;

    async fn connect(&self, _endpoint: &BrokerEndpoint) -> Result<ChannelSink, SinkError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        Ok(ChannelSink { sender: self.sender.clone() })
    }
}

/// Sink forwarding messages to a [`ChannelConnector`]'s receiver
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<PublishedMessage>,
}

impl PublishSink for ChannelSink {
    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), SinkError> {
        self.sender
            .send(PublishedMessage { topic: topic.to_string(), payload: payload.to_string() })
            .map_err(|_| SinkError::Closed)
    }
}
