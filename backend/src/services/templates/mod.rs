//! # Template Service Module
//!
//! API endpoints for managing templates under `/api/templates`.
//!
//! ## Sub-modules:
//! - `save`: Creates or updates a template. Reconciles the placeholder schema
//!   against the new body before anything is persisted.
//! - `get`: Retrieves one template or lists all of them.
//! - `deactivate`: Soft-deactivates a template. Templates referenced by
//!   generated documents are never deleted.

mod deactivate;
mod get;
mod save;

pub(crate) use get::load_template;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/templates";

/// Configures and returns the Actix `Scope` for all template-related routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/save", post().to(save::process))
        .route("", get().to(get::process_list))
        .route("/{template_id}", get().to(get::process))
        .route("/{template_id}/deactivate", post().to(deactivate::process))
}
