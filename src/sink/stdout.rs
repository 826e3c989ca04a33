//! Standard output sink
//!
//! Prints one `topic payload` line per event. Used by `--stdout` to inspect the
//! event stream without a broker.

use async_trait::async_trait;
use std::io::{self, Write};

use super::{BrokerConnector, BrokerEndpoint, PublishSink, SinkError};

/// Connector producing [`StdoutSink`]s; connects immediately
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutConnector;

impl StdoutConnector {
    /// Create a new stdout connector
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BrokerConnector for StdoutConnector {
    type Sink = StdoutSink<io::Stdout>;

    async fn connect(&self, _endpoint: &BrokerEndpoint) -> Result<Self::Sink, SinkError> {
        Ok(StdoutSink::new(io::stdout()))
    }
}

/// Sink writing `topic payload` lines to a writer
#[derive(Debug)]
pub struct StdoutSink<W> {
    writer: W,
}

impl<W: Write> StdoutSink<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consume the sink and return the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> PublishSink for StdoutSink<W> {
    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), SinkError> {
        writeln!(self.writer, "{} {}", topic, payload)?;
        self.writer.flush()?;
        Ok(())
    }
}
