use std::collections::HashMap;

/// A flat key -> raw string value mapping for one recipient, supplied
/// directly (single generation) or built from one row of an ingested CSV
/// file (bulk generation). Transient; never persisted as-is.
pub type DataRecord = HashMap<String, String>;
