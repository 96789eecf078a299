use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `storybot`.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide recovery strategy; the binary and glue code continue to use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum BotError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Story engine ────────────────────────────────────────────────────
    #[error("story: {0}")]
    Story(#[from] StoryError),

    // ── Save collaborator ───────────────────────────────────────────────
    #[error("store: {0}")]
    Store(#[from] StoreError),

    // ── Transport / Channel ─────────────────────────────────────────────
    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("validation failed: {0}")]
    Validation(String),
}

// ─── Story errors ────────────────────────────────────────────────────────────

/// Configuration-class failures of the story engine. A failed match is never
/// one of these: it resolves to the step's fail message.
#[derive(Debug, Error)]
pub enum StoryError {
    #[error("story has no ordered steps to resolve against")]
    EmptyStory,

    #[error("failed to load story definition: {0}")]
    StoryLoad(String),

    #[error("failed to load i18n table: {0}")]
    I18nLoad(String),

    #[error("step {step} sets conflicting expectations ({first} and {second})")]
    ConflictingExpectation {
        step: String,
        first: &'static str,
        second: &'static str,
    },
}

// ─── Save collaborator errors ────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("save to {target} failed: {source}")]
    Io {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("save rejected: {0}")]
    Rejected(String),
}

// ─── Transport errors ────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("channel {channel} request failed: {message}")]
    Request { channel: String, message: String },

    #[error("channel {channel} rejected {method} ({status}): {body}")]
    Rejected {
        channel: String,
        method: String,
        status: u16,
        body: String,
    },

    #[error("gave up after {attempts} attempts: {last}")]
    GaveUp { attempts: u32, last: String },
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, BotError>;
