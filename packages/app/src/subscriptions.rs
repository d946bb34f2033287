use std::collections::BTreeSet;

/// Topics and bindings the application wants events from.
///
/// Fixed once the app is built; the proxy reads it during its handshake and
/// the answer never changes afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subscriptions {
    topics: BTreeSet<String>,
    bindings: BTreeSet<String>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topics.insert(topic.into());
        self
    }

    pub fn with_binding(mut self, binding: impl Into<String>) -> Self {
        self.bindings.insert(binding.into());
        self
    }

    pub(crate) fn add_topic(&mut self, topic: String) {
        self.topics.insert(topic);
    }

    pub(crate) fn add_binding(&mut self, binding: String) {
        self.bindings.insert(binding);
    }

    pub fn topics(&self) -> &BTreeSet<String> {
        &self.topics
    }

    pub fn bindings(&self) -> &BTreeSet<String> {
        &self.bindings
    }

    pub fn has_topic(&self, topic: &str) -> bool {
        self.topics.contains(topic)
    }

    pub fn has_binding(&self, binding: &str) -> bool {
        self.bindings.contains(binding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sets_are_sorted_and_deduplicated() {
        let subs = Subscriptions::new()
            .with_topic("TopicB")
            .with_topic("TopicA")
            .with_topic("TopicB")
            .with_binding("storage");

        let topics: Vec<_> = subs.topics().iter().cloned().collect();
        assert_eq!(topics, vec!["TopicA", "TopicB"]);
        assert!(subs.has_binding("storage"));
        assert!(!subs.has_binding("queue"));
        assert!(!subs.has_topic("TopicC"));
    }
}
