use std::collections::BTreeSet;

use crate::domain::ChatId;

/// The set of chat identities eligible for broadcasts.
///
/// Grows on first interaction from a new identity and never shrinks:
/// delivery failures are recorded in the broadcast report, not here.
#[derive(Debug, Default)]
pub struct SubscriberSet {
    inner: BTreeSet<ChatId>,
}

impl SubscriberSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent add. Returns true if the identity was new.
    pub fn register(&mut self, chat_id: ChatId) -> bool {
        self.inner.insert(chat_id)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Owned snapshot for fan-out iteration: identities registered mid-fan-out
    /// are not included in that run.
    pub fn snapshot(&self) -> Vec<ChatId> {
        self.inner.iter().copied().collect()
    }
}
