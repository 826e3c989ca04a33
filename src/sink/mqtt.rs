//! MQTT sink backed by `rumqttc`

use async_trait::async_trait;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use std::fmt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::{BrokerConnector, BrokerEndpoint, PublishSink, SinkError};

/// Keep-alive interval sent to the broker
const KEEP_ALIVE: Duration = Duration::from_secs(30);

/// Pause between failed connection attempts
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Default capacity of the client request queue
pub const DEFAULT_REQUEST_CAPACITY: usize = 1024;

/// Connector producing [`MqttSink`]s
///
/// Each attempt is bounded by the endpoint's connection timeout. Failed
/// attempts are retried until the broker accepts the connection, or until
/// `max_attempts` is reached when one is set.
#[derive(Debug, Clone)]
pub struct MqttConnector {
    capacity: usize,
    max_attempts: Option<u32>,
}

impl Default for MqttConnector {
    fn default() -> Self {
        Self { capacity: DEFAULT_REQUEST_CAPACITY, max_attempts: None }
    }
}

impl MqttConnector {
    /// Create a connector that retries until connected
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the client request queue capacity
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Give up after `attempts` failed connection attempts
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts.max(1));
        self
    }

    fn options(endpoint: &BrokerEndpoint) -> MqttOptions {
        let mut options =
            MqttOptions::new(endpoint.client_id.clone(), endpoint.host.clone(), endpoint.port);
        options.set_keep_alive(KEEP_ALIVE);
        if let Some(credentials) = &endpoint.credentials {
            options.set_credentials(credentials.username.clone(), credentials.password.clone());
        }
        options
    }

    async fn await_connack(
        &self,
        event_loop: &mut EventLoop,
        endpoint: &BrokerEndpoint,
    ) -> Result<(), SinkError> {
        let mut failures: u32 = 0;
        loop {
            let failure = match tokio::time::timeout(endpoint.connection_timeout, event_loop.poll())
                .await
            {
                Ok(Ok(Event::Incoming(Packet::ConnAck(_)))) => return Ok(()),
                Ok(Ok(event)) => {
                    trace!("Ignoring {:?} while connecting", event);
                    continue;
                }
                Ok(Err(e)) => e.to_string(),
                Err(_) => format!("timed out after {}ms", endpoint.connection_timeout.as_millis()),
            };

            failures += 1;
            let attempt = failures;
            warn!("Connection attempt {} to {} failed: {}", attempt, endpoint.url(), failure);
            if self.max_attempts.is_some_and(|max| attempt >= max) {
                return Err(SinkError::Connection(format!(
                    "{} unreachable after {} attempts: {}",
                    endpoint.url(),
                    attempt,
                    failure
                )));
            }
            tokio::time::sleep(RECONNECT_DELAY).await;
        }
    }
}

#[async_trait]
impl BrokerConnector for MqttConnector {
    type Sink = MqttSink;

    async fn connect(&self, endpoint: &BrokerEndpoint) -> Result<MqttSink, SinkError> {
        info!("Connecting to {} as {}", endpoint.url(), endpoint.client_id);

        let (client, mut event_loop) = AsyncClient::new(Self::options(endpoint), self.capacity);
        self.await_connack(&mut event_loop, endpoint).await?;

        info!("Connected to {}", endpoint.url());
        let driver = tokio::spawn(drive_event_loop(event_loop, endpoint.url()));
        Ok(MqttSink { client, driver })
    }
}

/// Keeps the event loop polled so queued publishes reach the broker.
/// `rumqttc` reconnects on the next poll after an error.
async fn drive_event_loop(mut event_loop: EventLoop, url: String) {
    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => info!("Reconnected to {}", url),
            Ok(event) => trace!("MQTT event: {:?}", event),
            Err(e) => {
                debug!("MQTT connection to {} interrupted: {}", url, e);
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
}

/// Sink publishing through an `rumqttc` client
///
/// Publishes at QoS 0 without the retain flag. Dropping the sink stops the
/// background event loop.
pub struct MqttSink {
    client: AsyncClient,
    driver: JoinHandle<()>,
}

impl fmt::Debug for MqttSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MqttSink").field("driver_finished", &self.driver.is_finished()).finish()
    }
}

impl PublishSink for MqttSink {
    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), SinkError> {
        self.client.try_publish(topic, QoS::AtMostOnce, false, payload.as_bytes().to_vec()).map_err(
            |e| SinkError::Rejected { topic: topic.to_string(), reason: e.to_string() },
        )
    }
}

impl Drop for MqttSink {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::Credentials;

    fn endpoint() -> BrokerEndpoint {
        BrokerEndpoint {
            host: "127.0.0.1".to_string(),
            port: 1,
            client_id: "test-client".to_string(),
            credentials: Some(Credentials {
                username: "user".to_string(),
                password: "pass".to_string(),
            }),
            connection_timeout: Duration::from_millis(200),
        }
    }

    #[test]
    fn test_options_carry_endpoint_settings() {
        let options = MqttConnector::options(&endpoint());

        assert_eq!(options.client_id(), "test-client");
        assert_eq!(options.broker_address(), ("127.0.0.1".to_string(), 1));
        assert_eq!(options.keep_alive(), KEEP_ALIVE);
        assert_eq!(options.credentials(), Some(("user".to_string(), "pass".to_string())));
    }

    #[test]
    fn test_connector_builder_clamps_values() {
        let connector = MqttConnector::new().with_capacity(0).with_max_attempts(0);
        assert_eq!(connector.capacity, 1);
        assert_eq!(connector.max_attempts, Some(1));
    }

    #[tokio::test]
    async fn test_unreachable_broker_gives_up_after_max_attempts() {
        let connector = MqttConnector::new().with_max_attempts(1);
        let result = connector.connect(&endpoint()).await;

        assert!(matches!(result, Err(SinkError::Connection(_))));
    }
}
