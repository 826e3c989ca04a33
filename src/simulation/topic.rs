//! Topic naming: `{prefix}/{eventType}/{suffix}` with empty segments left out

use crate::types::{EventType, MqttConfig};

/// Builds publish topics from the configured prefix and suffix
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TopicBuilder {
    prefix: String,
    suffix: String,
}

impl TopicBuilder {
    /// Create a builder; surrounding slashes are stripped from both parts
    pub fn new(prefix: impl AsRef<str>, suffix: impl AsRef<str>) -> Self {
        Self {
            prefix: prefix.as_ref().trim_matches('/').to_string(),
            suffix: suffix.as_ref().trim_matches('/').to_string(),
        }
    }

    /// Create a builder from the MQTT configuration
    pub fn from_config(config: &MqttConfig) -> Self {
        Self::new(&config.prefix, &config.suffix)
    }

    /// Topic for events of `event_type`
    pub fn topic_for(&self, event_type: EventType) -> String {
        [self.prefix.as_str(), event_type.topic_segment(), self.suffix.as_str()]
            .iter()
            .filter(|segment| !segment.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_without_prefix_or_suffix() {
        let topics = TopicBuilder::default();
        assert_eq!(topics.topic_for(EventType::Item), "item");
        assert_eq!(topics.topic_for(EventType::Threshold), "threshold");
    }

    #[test]
    fn test_topic_with_prefix_and_suffix() {
        let topics = TopicBuilder::new("site/a", "raw");
        assert_eq!(topics.topic_for(EventType::Item), "site/a/item/raw");
    }

    #[test]
    fn test_topic_trims_slashes() {
        assert_eq!(TopicBuilder::new("/site/", "").topic_for(EventType::Threshold), "site/threshold");
        assert_eq!(TopicBuilder::new("", "/raw").topic_for(EventType::Item), "item/raw");
    }
}
