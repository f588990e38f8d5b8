//! Bulk orchestration: validating and rendering a whole batch of records
//! against one template.
//!
//! A thin wrapper over `validate` and `render`. Records are independent: rows
//! are processed in parallel, each failure is retained with its row index,
//! and the batch result is produced as one immutable fold rather than shared
//! counters. The only batch-level rejection is the size cap, checked before
//! any per-record work starts.

use crate::engine::render::{render, RenderConfig};
use crate::engine::validate::validate;
use common::model::generation::{BatchSummary, RenderedRow, RowFailure};
use common::model::placeholder::PlaceholderSpec;
use common::model::record::DataRecord;
use rayon::prelude::*;
use std::collections::HashMap;

/// Hard cap on records per batch; larger batches are rejected outright.
pub const MAX_BATCH_SIZE: usize = 500;

/// Result of a completed batch: rendered texts for the rows that passed
/// validation plus the summary covering every row.
#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub documents: Vec<RenderedRow>,
    pub summary: BatchSummary,
}

/// Normalizes an ingested column title the way the CSV reader does: trimmed,
/// lower-cased, spaces replaced by underscores. Label matching during column
/// resolution goes through the same transform.
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase().replace(' ', "_")
}

/// Builds the record actually fed to validation/rendering for one row.
///
/// Column resolution per spec, first match wins: the column an explicit
/// `column -> key` mapping assigns to this key, then the column named exactly
/// like the key, then the column matching the normalized label.
pub(crate) fn resolve_record(
    specs: &[PlaceholderSpec],
    row: &DataRecord,
    mapping: Option<&HashMap<String, String>>,
) -> DataRecord {
    let mut resolved = DataRecord::new();
    for spec in specs {
        let mapped_column = mapping.and_then(|m| {
            m.iter()
                .find(|(_, key)| key.as_str() == spec.key)
                .map(|(column, _)| column.as_str())
        });
        let value = mapped_column
            .and_then(|column| row.get(column))
            .or_else(|| row.get(&spec.key))
            .or_else(|| row.get(&normalize_title(&spec.label)));
        if let Some(value) = value {
            resolved.insert(spec.key.clone(), value.clone());
        }
    }
    resolved
}

/// Validates and renders every record of a batch.
///
/// Fails only on the size cap; per-row problems land in the summary and never
/// abort sibling rows. Row order is preserved in both outputs.
pub fn run_batch(
    specs: &[PlaceholderSpec],
    body: &str,
    records: &[DataRecord],
    mapping: Option<&HashMap<String, String>>,
    config: &RenderConfig,
) -> Result<BatchOutput, String> {
    if records.len() > MAX_BATCH_SIZE {
        return Err(format!(
            "Batch of {} records exceeds the limit of {}",
            records.len(),
            MAX_BATCH_SIZE
        ));
    }

    let rows: Vec<Result<RenderedRow, RowFailure>> = records
        .par_iter()
        .enumerate()
        .map(|(row_index, row)| {
            let record = resolve_record(specs, row, mapping);
            let errors = validate(specs, &record);
            if errors.is_empty() {
                Ok(RenderedRow {
                    row_index,
                    text: render(specs, body, &record, config),
                })
            } else {
                Err(RowFailure { row_index, errors })
            }
        })
        .collect();

    let mut documents = Vec::new();
    let mut failures = Vec::new();
    for row in rows {
        match row {
            Ok(rendered) => documents.push(rendered),
            Err(failure) => failures.push(failure),
        }
    }

    let summary = BatchSummary {
        total: records.len(),
        succeeded: documents.len(),
        failed: failures.len(),
        failures,
    };
    Ok(BatchOutput { documents, summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::reconcile::reconcile;

    fn record(pairs: &[(&str, &str)]) -> DataRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn config() -> RenderConfig {
        RenderConfig::inr().unwrap()
    }

    #[test]
    fn oversized_batches_are_rejected_before_any_work() {
        let body = "Dear {{name}}";
        let specs = reconcile(&[], body);
        let records = vec![record(&[("name", "A")]); MAX_BATCH_SIZE + 1];
        let err = run_batch(&specs, body, &records, None, &config()).unwrap_err();
        assert!(err.contains("501"), "{err}");
    }

    #[test]
    fn a_full_cap_batch_is_accepted() {
        let body = "Dear {{name}}";
        let specs = reconcile(&[], body);
        let records = vec![record(&[("name", "A")]); MAX_BATCH_SIZE];
        let output = run_batch(&specs, body, &records, None, &config()).unwrap();
        assert_eq!(output.summary.succeeded, MAX_BATCH_SIZE);
    }

    #[test]
    fn failed_rows_do_not_abort_siblings() {
        let body = "Dear {{name}}, salary {{salary}}.";
        let specs = reconcile(&[], body);
        let records = vec![
            record(&[("name", "Jane"), ("salary", "50000")]),
            record(&[("name", "Bob"), ("salary", "lots")]),
            record(&[("name", "Ada"), ("salary", "70000")]),
        ];
        let output = run_batch(&specs, body, &records, None, &config()).unwrap();

        assert_eq!(output.summary.total, 3);
        assert_eq!(output.summary.succeeded, 2);
        assert_eq!(output.summary.failed, 1);
        assert_eq!(output.summary.failures[0].row_index, 1);
        assert_eq!(output.summary.failures[0].errors, vec!["Salary must be a number"]);

        let indices: Vec<usize> = output.documents.iter().map(|d| d.row_index).collect();
        assert_eq!(indices, vec![0, 2]);
        assert!(output.documents[0].text.contains("Dear Jane, salary ₹50,000."));
    }

    #[test]
    fn explicit_mapping_routes_columns_to_keys() {
        let body = "Dear {{name}}";
        let specs = reconcile(&[], body);
        let mapping: HashMap<String, String> =
            [("employee".to_string(), "name".to_string())].into();
        let records = vec![record(&[("employee", "Jane")])];
        let output = run_batch(&specs, body, &records, Some(&mapping), &config()).unwrap();
        assert_eq!(output.documents[0].text, "Dear Jane");
    }

    #[test]
    fn unmapped_keys_fall_back_to_same_named_column_then_label() {
        let body = "{{name}} / {{emp_code}}";
        let mut specs = reconcile(&[], body);
        specs.iter_mut().find(|s| s.key == "emp_code").unwrap().label =
            "Badge Number".to_string();

        // Row has a same-named column for `name` and a normalized-label
        // column for `emp_code`.
        let records = vec![record(&[("name", "Jane"), ("badge_number", "E-17")])];
        let output = run_batch(&specs, body, &records, None, &config()).unwrap();
        assert_eq!(output.documents[0].text, "Jane / E-17");
    }

    #[test]
    fn normalize_title_matches_ingestion_contract() {
        assert_eq!(normalize_title("  Joining Date "), "joining_date");
        assert_eq!(normalize_title("SALARY"), "salary");
    }
}
