use crate::model::record::DataRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Payload for single-document generation: one data record for one template.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub template_id: String,
    pub data: DataRecord,
}

/// Payload for starting a bulk-generation job over a previously uploaded and
/// verified data source.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartBulkRequest {
    pub template_id: String,
    /// Optional explicit column -> placeholder-key mapping. When absent,
    /// columns are matched to keys by name, then by placeholder label.
    #[serde(default)]
    pub mapping: Option<HashMap<String, String>>,
}

/// JSON part sent ahead of the file in a CSV upload: identifies which
/// template the data source belongs to.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadCsvMeta {
    pub template_id: String,
}

/// Request payload for the CSV verification endpoint.
/// Contains the template identifier whose data source should be verified.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCsvRequest {
    pub template_id: String,
}
