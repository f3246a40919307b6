use chrono::{DateTime, Utc};

/// Chat id (numeric). Doubles as the operator identity on the admin side and
/// the subscriber identity on the public side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChatId(pub i64);

/// Message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a previously sent message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Opaque unique client id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClientId(pub String);

impl ClientId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Payment status. Transitions Pending -> Paid via the chat-driven
/// confirmation protocol; the HTTP surface may also force Paid -> Pending
/// (privileged administrative channel).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClientStatus {
    Pending,
    Paid,
}

impl ClientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientStatus::Pending => "pending",
            ClientStatus::Paid => "paid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ClientStatus::Pending),
            "paid" => Some(ClientStatus::Paid),
            _ => None,
        }
    }
}

/// A registered client.
///
/// `price` is snapshotted from the catalog at creation and never recomputed.
/// `paid_at` is present iff `status == Paid`.
#[derive(Clone, Debug)]
pub struct Client {
    pub id: ClientId,
    pub first_name: String,
    pub phone: String,
    pub package_code: String,
    pub price: i64,
    pub status: ClientStatus,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub comment: Option<String>,
}

/// Which filtered view of the registry an operator is browsing.
///
/// `All` re-derives the list live from the registry on every navigation step
/// (newly created clients appear without reopening); the filtered views use
/// the point-in-time snapshot captured when the view was opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewKind {
    All,
    Pending,
    Paid,
}

impl ViewKind {
    pub fn status_filter(&self) -> Option<ClientStatus> {
        match self {
            ViewKind::All => None,
            ViewKind::Pending => Some(ClientStatus::Pending),
            ViewKind::Paid => Some(ClientStatus::Paid),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewKind::All => "all",
            ViewKind::Pending => "pending",
            ViewKind::Paid => "paid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "all" => Some(ViewKind::All),
            "pending" => Some(ViewKind::Pending),
            "paid" => Some(ViewKind::Paid),
            _ => None,
        }
    }
}
