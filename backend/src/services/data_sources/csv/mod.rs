//! CSV data-source management: upload, schema verification, job polling.
//!
//! Uploaded files feed bulk generation. The flow under
//! `/api/data_sources/csv` is:
//!
//! - `POST /upload`: multipart with a `json` part (template id) followed by a
//!   `file` part. Header cells are validated, the content is MD5-hashed and
//!   stored as `{template_id}_{md5}.csv`, and the template row records the
//!   hash with its verified flag reset.
//! - `POST /verify`: starts a background job checking every row of the stored
//!   file against the template's placeholder schema, returning a `job_id`
//!   immediately for polling.
//! - `GET /status/{job_id}`: current `JobStatus` of a verification or bulk
//!   generation job.

use actix_web::web::{get, post, scope};
use actix_web::Scope;

mod get_status;
mod upload;
mod verify;

pub(crate) use upload::datasource_path;
pub(crate) use verify::read_records;

const API_PATH: &str = "/api/data_sources/csv";

/// Configures and returns the Actix scope for CSV data source routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/upload", post().to(upload::process))
        .route("/verify", post().to(verify::process))
        .route("/status/{job_id}", get().to(get_status::process))
}
