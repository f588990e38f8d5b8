use serde::{Deserialize, Serialize};

/// Outcome of validating (and, on success, rendering) one data record
/// against a template.
///
/// Validation problems are data, not errors: every applicable message is
/// collected so a client can show all of them at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    /// Fully substituted document text, present only when `valid`.
    pub text: Option<String>,
}

impl GenerationResult {
    pub fn failure(errors: Vec<String>) -> Self {
        Self {
            valid: false,
            errors,
            text: None,
        }
    }

    pub fn success(text: String) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            text: Some(text),
        }
    }
}

/// One successfully rendered row of a bulk batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedRow {
    /// 0-based index of the row in the batch (header excluded).
    pub row_index: usize,
    pub text: String,
}

/// One failed row of a bulk batch, with every validation message retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowFailure {
    pub row_index: usize,
    pub errors: Vec<String>,
}

/// Immutable summary of a completed batch. Counts only ever describe the
/// finished fold; there is no shared mutable progress state in the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<RowFailure>,
}
