//! The template placeholder engine.
//!
//! Everything in this module is pure and synchronous: deterministic functions
//! of their inputs with no I/O and no shared state, safe to call concurrently
//! from any number of request handlers or worker threads. The service layer
//! owns persistence, jobs and rendering to bytes; this module owns the four
//! operations with real invariants:
//!
//! - `tokens::extract_keys`: scans `{{key}}` tokens out of body text.
//! - `reconcile::reconcile`: keeps a template's placeholder schema in sync
//!   with the tokens actually present in its body, preserving user edits.
//! - `validate::validate`: checks one data record against the schema,
//!   collecting every error instead of failing fast.
//! - `render::render`: substitutes values into the body with type-aware
//!   formatting; best-effort by contract, it never fails.
//!
//! `bulk::run_batch` wraps the last two for whole batches of records.
//!
//! The token grammar is fixed in `tokens` and shared by all of the above:
//! `{{` + one or more ASCII word characters + `}}`, nothing else.

pub mod bulk;
pub mod reconcile;
pub mod render;
pub mod tokens;
pub mod validate;
