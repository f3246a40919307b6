use crate::domain::{ClientId, MessageRef, ViewKind};

/// Per-operator cursor over a filtered view of the registry.
///
/// The snapshot is captured when the view is opened. For `ViewKind::All` the
/// list is re-derived live on navigation, so the snapshot is only a fallback;
/// for the filtered views it is the authoritative order until the view is
/// reopened.
#[derive(Clone, Debug)]
pub struct BrowseState {
    pub view: ViewKind,
    pub index: usize,
    pub snapshot: Vec<ClientId>,
    /// The currently rendered card, replaced (delete-then-send) on navigation.
    pub rendered: Option<MessageRef>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavDirection {
    Prev,
    Next,
}

/// Circular index step: next past the last wraps to 0, prev before 0 wraps to
/// the last. With a single item both directions re-render the same card.
pub fn wrap_index(index: usize, len: usize, direction: NavDirection) -> usize {
    debug_assert!(len > 0);
    match direction {
        NavDirection::Next => (index + 1) % len,
        NavDirection::Prev => (index + len - 1) % len,
    }
}

/// Draft of a broadcast being composed, step by step.
#[derive(Clone, Debug)]
pub struct BroadcastDraft {
    pub step: BroadcastStep,
    pub text: Option<String>,
    /// Prompt message carrying the "send without image" / cancel buttons,
    /// deleted once the draft resolves.
    pub prompt: Option<MessageRef>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BroadcastStep {
    AwaitingText,
    AwaitingImage,
}

/// The modal conversational flow an operator is in. At most one is active per
/// operator: starting a new flow replaces whatever was pending.
#[derive(Clone, Debug, Default)]
pub enum Flow {
    #[default]
    Idle,
    AwaitingPaymentPassword {
        client_id: ClientId,
        origin: Option<MessageRef>,
    },
    ComposingBroadcast(BroadcastDraft),
}

impl Flow {
    pub fn is_idle(&self) -> bool {
        matches!(self, Flow::Idle)
    }
}

/// Everything the bot remembers about one operator chat. Owned exclusively by
/// that chat identity; never leaks across identities.
#[derive(Clone, Debug, Default)]
pub struct OperatorSession {
    pub browse: Option<BrowseState>,
    pub flow: Flow,
}
