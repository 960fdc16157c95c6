//! Pipeline orchestration.
//!
//! Linear state machine, no branching loops:
//! input capture → empty-check → prompt → inference → validation →
//! persistence branch → rendering. Any stage failure short-circuits the
//! rest and is rendered as a single-field error document. Exactly one JSON
//! document is ever produced per invocation; the exit code is the only
//! other machine-readable signal.

use crate::config::Config;
use crate::error::BrainError;
use crate::memory::MemoryStore;
use crate::providers::InferenceProvider;
use crate::{prompt, schema};
use serde_json::json;

/// What the process reports: the one document for stdout plus the exit code.
#[derive(Debug)]
pub struct Outcome {
    pub document: String,
    pub exit_code: i32,
}

/// Captured-input metadata carried into the final document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputMeta {
    pub original_length: usize,
    pub truncated: bool,
}

/// Apply the truncation policy: anything past `max_chars` Unicode scalar
/// values is cut and flagged, then surrounding whitespace is trimmed.
pub fn capture(raw: &str, max_chars: usize) -> (String, InputMeta) {
    let original_length = raw.chars().count();
    let truncated = original_length > max_chars;

    let text = if truncated {
        raw.chars().take(max_chars).collect::<String>()
    } else {
        raw.to_string()
    };

    (
        text.trim().to_string(),
        InputMeta {
            original_length,
            truncated,
        },
    )
}

/// Run the whole pipeline over raw stdin text.
pub async fn run(raw_input: &str, config: &Config, provider: &dyn InferenceProvider) -> Outcome {
    match execute(raw_input, config, provider).await {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::warn!(%err, "pipeline failed");
            Outcome {
                document: json!({ "error": err.to_string() }).to_string(),
                exit_code: 1,
            }
        }
    }
}

async fn execute(
    raw_input: &str,
    config: &Config,
    provider: &dyn InferenceProvider,
) -> Result<Outcome, BrainError> {
    let (user_input, meta) = capture(raw_input, config.max_input_chars);
    if user_input.is_empty() {
        return Err(BrainError::EmptyInput);
    }
    tracing::debug!(
        input_chars = meta.original_length,
        truncated = meta.truncated,
        "input captured"
    );

    let prompt = prompt::build(&user_input, config.mode);

    let raw_reply = provider.generate(&config.model, &prompt).await?;
    tracing::debug!(reply_chars = raw_reply.len(), "inference reply received");

    let result = schema::validate(
        &raw_reply,
        config.mode,
        &config.model,
        meta.original_length,
        meta.truncated,
    )?;

    // Persistence failure must not void an already-validated result: the
    // success document keeps exit code 0 and carries the failure in a
    // `warning` field instead.
    let warning = if config.memory {
        persist(config, &user_input, &result)
            .await
            .err()
            .map(|e| e.to_string())
    } else {
        None
    };

    let mut document = serde_json::to_value(&result)
        .map_err(|e| BrainError::Other(anyhow::Error::new(e)))?;
    if let Some(warning) = warning {
        tracing::warn!(%warning, "memory write failed; result preserved");
        document["warning"] = json!(warning);
    }

    Ok(Outcome {
        document: serde_json::to_string_pretty(&document)
            .map_err(|e| BrainError::Other(anyhow::Error::new(e)))?,
        exit_code: 0,
    })
}

/// Scoped acquisition: the store lives only for this one append and is
/// closed on both exit paths.
async fn persist(
    config: &Config,
    user_input: &str,
    result: &schema::ValidatedResult,
) -> Result<(), BrainError> {
    let store = MemoryStore::open(&config.db_path).await?;
    let written = store
        .record(user_input, &result.summary, result.confidence)
        .await;
    store.close().await;
    written?;
    Ok(())
}
