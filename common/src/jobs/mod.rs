use serde::{Deserialize, Serialize};

/// Status of a long-running background job (CSV verification, bulk
/// generation), as exposed by the polling endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    /// Progress as a percentage of processed rows.
    InProgress(u32),
    Completed(String),
    Failed(String),
}
