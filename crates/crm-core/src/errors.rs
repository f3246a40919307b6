/// Core error type.
///
/// Adapter crates should map their specific errors into this type so both
/// surfaces (Telegram, HTTP) can handle failures consistently. Per-subscriber
/// broadcast delivery failures are deliberately *not* represented here: they
/// are tallied into a report, never raised.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Auth(String),

    #[error("invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
