//! Schema reconciliation: keeping a template's placeholder list in sync with
//! the tokens actually present in its body.
//!
//! Runs as a pure function in the service layer before every persist, for
//! both newly created templates (empty existing list) and edits. The
//! invariant it maintains: the set of keys in the stored spec list is exactly
//! the set of distinct `{{key}}` tokens in the stored body.

use crate::engine::tokens::extract_keys;
use common::model::placeholder::PlaceholderSpec;

/// Reconciles an existing placeholder list against a (possibly new) body.
///
/// For every key referenced by `body`, the existing spec is carried over
/// untouched when present, so user edits to labels, types, required flags and
/// default values survive body edits; keys new to the body get a synthesized
/// default spec. Specs whose key no longer appears in the body are dropped.
/// The result is ordered by first appearance in the body.
///
/// Idempotent: reconciling an already reconciled list against the same body
/// returns it unchanged.
pub fn reconcile(existing: &[PlaceholderSpec], body: &str) -> Vec<PlaceholderSpec> {
    extract_keys(body)
        .into_iter()
        .map(|key| {
            existing
                .iter()
                .find(|spec| spec.key == key)
                .cloned()
                .unwrap_or_else(|| PlaceholderSpec::synthesized(&key))
        })
        .collect()
}
