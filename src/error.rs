use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `sysbrain`.
///
/// Each pipeline stage defines its own error variant. The orchestrator
/// matches on these to render the single error document; internal code
/// continues to use `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum BrainError {
    // ── Input capture ────────────────────────────────────────────────────
    #[error("No input provided.")]
    EmptyInput,

    // ── Inference transport ──────────────────────────────────────────────
    #[error("{0}")]
    Transport(#[from] TransportError),

    // ── Reply contract ───────────────────────────────────────────────────
    #[error("{0}")]
    Validation(#[from] ValidationError),

    // ── Memory log ───────────────────────────────────────────────────────
    #[error("{0}")]
    Persistence(#[from] PersistenceError),

    // ── Generic fallthrough (wraps anyhow for interop) ───────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Transport errors ────────────────────────────────────────────────────────

/// Failures between this process and the Ollama endpoint: the connection
/// itself, or an envelope that is not what the generate API promises.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Ollama connection failed: {0}")]
    Connection(String),

    #[error("Ollama returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid payload from inference server")]
    InvalidPayload,

    #[error("missing reply field")]
    MissingReply,
}

// ─── Validation errors ───────────────────────────────────────────────────────

/// The reply arrived but fails the response contract.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("model did not return valid JSON")]
    NotJson,

    #[error("missing required key: {0}")]
    MissingKey(&'static str),

    #[error("{key} must be {expected}")]
    WrongType {
        key: &'static str,
        expected: &'static str,
    },

    #[error("confidence must be numeric")]
    ConfidenceNotNumeric,

    #[error("confidence must be between 0.0 and 1.0")]
    ConfidenceOutOfBounds,
}

// ─── Persistence errors ──────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to open memory store: {0}")]
    Open(String),

    #[error("failed to append memory record: {0}")]
    Append(String),
}

// ─── Convenience re-exports ──────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, BrainError>;
