//! Soft-deactivation: `POST /api/templates/{template_id}/deactivate`.
//!
//! Templates referenced by generated documents must stay resolvable, so there
//! is no delete endpoint; deactivation takes a template out of the generation
//! flows instead.

use crate::db;
use actix_web::{web, HttpResponse, Responder};
use rusqlite::params;

pub(crate) async fn process(template_id: web::Path<String>) -> impl Responder {
    match deactivate_template(&template_id) {
        Ok(true) => HttpResponse::Ok().body("Template deactivated"),
        Ok(false) => HttpResponse::NotFound().body("Template not found"),
        Err(e) => {
            HttpResponse::ServiceUnavailable().body(format!("Error deactivating template: {}", e))
        }
    }
}

fn deactivate_template(template_id: &str) -> Result<bool, String> {
    let conn = db::open()?;
    let updated = conn
        .execute(
            "UPDATE templates SET is_active = 0 WHERE id = ?1",
            params![template_id],
        )
        .map_err(|e| e.to_string())?;
    Ok(updated > 0)
}
