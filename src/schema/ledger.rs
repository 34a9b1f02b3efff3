//! Per-topic schema version store
//!
//! An append-only, ordered history of the schema versions registered on one
//! topic. The full history is kept because transitive strategies compare a
//! candidate against every prior version, not only the latest.

use super::SchemaVersion;
use crate::topic::TopicName;

/// Append-only history of schema versions for one topic.
///
/// Created lazily on the first registration attempt. Entries are appended
/// only through the registration coordinator, which assigns the sequence
/// numbers; they are never mutated or deleted.
#[derive(Debug, Clone)]
pub struct SchemaLedger {
    topic: TopicName,
    versions: Vec<SchemaVersion>,
}

impl SchemaLedger {
    pub(crate) fn new(topic: TopicName) -> Self {
        Self {
            topic,
            versions: Vec::new(),
        }
    }

    /// The topic this ledger belongs to.
    pub fn topic(&self) -> &TopicName {
        &self.topic
    }

    /// Whether any version has been registered.
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Number of registered versions.
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// The current (latest) version, if any.
    pub fn current(&self) -> Option<&SchemaVersion> {
        self.versions.last()
    }

    /// The full history, oldest first.
    pub fn all(&self) -> &[SchemaVersion] {
        &self.versions
    }

    /// The sequence number the next appended version will carry.
    ///
    /// Sequence numbers are strictly increasing by 1 with no gaps, starting
    /// at 0 on the first registration.
    pub fn next_version(&self) -> u64 {
        self.versions.len() as u64
    }

    /// Append a version whose sequence number was assigned by the
    /// coordinator.
    pub(crate) fn push(&mut self, version: SchemaVersion) {
        debug_assert_eq!(version.version, self.next_version());
        self.versions.push(version);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SchemaData, SchemaTypeTag};

    fn test_topic() -> TopicName {
        "persistent://public/default/ledger-test"
            .parse()
            .unwrap()
    }

    #[test]
    fn test_empty_ledger() {
        let ledger = SchemaLedger::new(test_topic());
        assert!(ledger.is_empty());
        assert_eq!(ledger.len(), 0);
        assert!(ledger.current().is_none());
        assert_eq!(ledger.next_version(), 0);
    }

    #[test]
    fn test_sequence_numbers_are_gapless() {
        let mut ledger = SchemaLedger::new(test_topic());

        for (seq, tag) in [
            SchemaTypeTag::String,
            SchemaTypeTag::Int32,
            SchemaTypeTag::Bool,
        ]
        .into_iter()
        .enumerate()
        {
            let version = SchemaVersion::new(ledger.next_version(), SchemaData::primitive(tag));
            assert_eq!(version.version, seq as u64);
            ledger.push(version);
        }

        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.current().unwrap().version, 2);
        let sequence: Vec<u64> = ledger.all().iter().map(|v| v.version).collect();
        assert_eq!(sequence, vec![0, 1, 2]);
    }

    #[test]
    fn test_current_is_tail_of_history() {
        let mut ledger = SchemaLedger::new(test_topic());
        ledger.push(SchemaVersion::new(
            0,
            SchemaData::primitive(SchemaTypeTag::Bytes),
        ));
        ledger.push(SchemaVersion::new(
            1,
            SchemaData::primitive(SchemaTypeTag::Int64),
        ));

        assert_eq!(
            ledger.current().unwrap().version,
            ledger.all().last().unwrap().version
        );
    }
}
