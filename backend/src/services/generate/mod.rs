//! Document generation endpoints under `/api/generate`.
//!
//! - `POST /single`: validate one data record against a template and, when it
//!   passes, persist the substituted text, bump the template's usage counter
//!   and write the PDF. Validation failures come back as data (HTTP 422 with
//!   every error), never as a generation attempt.
//! - `POST /bulk`: start a background job producing one document per row of
//!   the template's verified CSV data source. Returns a `job_id` for polling
//!   via the data-source status endpoint.

mod bulk;
mod pdf;
mod single;

use actix_web::web::{post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/generate";

/// Configures and returns the Actix scope for generation routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/single", post().to(single::process))
        .route("/bulk", post().to(bulk::process))
}
