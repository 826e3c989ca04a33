//! Publish sinks
//!
//! The simulation engine hands each serialized event to a [`PublishSink`]
//! together with its topic and never looks at delivery. Sinks are obtained from
//! a [`BrokerConnector`], whose `connect` future resolves only once the
//! connection is established.
//!
//! # Overview
//!
//! - **MqttConnector**: publishes to an MQTT broker through `rumqttc`
//! - **StdoutConnector**: prints `topic payload` lines, connecting immediately
//! - **ChannelConnector**: forwards messages over a channel, for tests and embedding

pub mod channel;
pub mod mqtt;
pub mod stdout;

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

use crate::types::MqttConfig;

pub use channel::{ChannelConnector, ChannelSink, PublishedMessage};
pub use mqtt::{MqttConnector, MqttSink};
pub use stdout::{StdoutConnector, StdoutSink};

/// Errors raised by publish sinks and connectors
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The broker client refused to queue the message
    #[error("Broker client rejected publish to {topic}: {reason}")]
    Rejected {
        /// Topic of the rejected message
        topic: String,
        /// Client-reported reason
        reason: String,
    },

    /// The connection could not be set up
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The receiving side of the sink is gone
    #[error("Sink is closed")]
    Closed,

    /// Writing the message failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Username/password pair sent when broker authentication is enabled
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Broker username
    pub username: String,
    /// Broker password
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Where and how to connect a sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerEndpoint {
    /// Broker host name
    pub host: String,
    /// Broker port
    pub port: u16,
    /// Client identifier presented to the broker
    pub client_id: String,
    /// Credentials, present only when authentication is enabled
    pub credentials: Option<Credentials>,
    /// Bound on a single connection attempt
    pub connection_timeout: Duration,
}

impl BrokerEndpoint {
    /// Build the endpoint for an MQTT configuration
    ///
    /// A missing client id is replaced by `rfid-tag-simulator-<uuid>`.
    pub fn from_config(config: &MqttConfig) -> Self {
        let client_id = config
            .client_id
            .clone()
            .unwrap_or_else(|| format!("rfid-tag-simulator-{}", uuid::Uuid::new_v4().simple()));

        let credentials = config.auth.then(|| Credentials {
            username: config.username.clone(),
            password: config.password.clone(),
        });

        Self {
            host: config.host.clone(),
            port: config.port,
            client_id,
            credentials,
            connection_timeout: config.connection_timeout(),
        }
    }

    /// Broker URL for log messages
    pub fn url(&self) -> String {
        format!("mqtt://{}:{}", self.host, self.port)
    }
}

/// Accepts serialized events for delivery
pub trait PublishSink: Send {
    /// Hand `payload` over for delivery on `topic`; fire-and-forget
    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), SinkError>;
}

/// Establishes publish sinks
#[async_trait]
pub trait BrokerConnector: Send + Sync + 'static {
    /// Sink produced by a successful connection
    type Sink: PublishSink + 'static;

    /// Connect to `endpoint`; resolves once the connection is established
    async fn connect(&self, endpoint: &BrokerEndpoint) -> Result<Self::Sink, SinkError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_without_auth_has_no_credentials() {
        let config = MqttConfig { username: "ignored".to_string(), ..MqttConfig::default() };
        let endpoint = BrokerEndpoint::from_config(&config);

        assert_eq!(endpoint.url(), "mqtt://localhost:1883");
        assert!(endpoint.credentials.is_none());
        assert!(endpoint.client_id.starts_with("rfid-tag-simulator-"));
        assert_eq!(endpoint.connection_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_endpoint_with_auth_and_client_id() {
        let config = MqttConfig {
            auth: true,
            username: "sim".to_string(),
            password: "secret".to_string(),
            client_id: Some("fixed".to_string()),
            ..MqttConfig::default()
        };
        let endpoint = BrokerEndpoint::from_config(&config);

        assert_eq!(endpoint.client_id, "fixed");
        let credentials = endpoint.credentials.unwrap();
        assert_eq!(credentials.username, "sim");
        assert!(!format!("{:?}", credentials).contains("secret"));
    }
}
