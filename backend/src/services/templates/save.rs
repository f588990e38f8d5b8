//! # Template Save Service
//!
//! Handles `POST /api/templates/save` for both creation and update.
//!
//! Reconciliation happens here, in the service layer, before the SQL write:
//! the payload's placeholder list (carrying any user edits to labels, types,
//! required flags and defaults) is reconciled against the payload's body, and
//! only the reconciled list is persisted. The stored schema therefore always
//! covers exactly the tokens present in the stored body.

use crate::db;
use crate::engine::reconcile::reconcile;
use actix_web::{web, HttpResponse, Responder};
use common::model::template::TemplateDocument;
use rusqlite::{params, Connection, OptionalExtension};

pub(crate) async fn process(payload: web::Json<TemplateDocument>) -> impl Responder {
    match save_template(payload.into_inner()) {
        Ok(saved) => HttpResponse::Ok().json(saved),
        Err(e) => HttpResponse::ServiceUnavailable().body(format!("Error saving template: {}", e)),
    }
}

/// Reconciles and persists a template, returning it as stored.
///
/// `usage_count` and the data-source columns are owned by other services and
/// survive the write; the payload cannot reset them.
pub fn save_template(mut payload: TemplateDocument) -> Result<TemplateDocument, String> {
    if payload.id.trim().is_empty() {
        return Err("Template id must not be empty".to_string());
    }
    if payload.name.trim().is_empty() {
        return Err("Template name must not be empty".to_string());
    }

    payload.placeholders = reconcile(&payload.placeholders, &payload.body);
    let placeholders_json =
        serde_json::to_string(&payload.placeholders).map_err(|e| e.to_string())?;

    let conn = db::open()?;
    let existing = existing_state(&conn, &payload.id)?;
    if let Some((is_active, usage_count)) = existing {
        payload.is_active = is_active;
        payload.usage_count = usage_count;
        conn.execute(
            "UPDATE templates SET name = ?1, category = ?2, body = ?3, placeholders = ?4
             WHERE id = ?5",
            params![
                payload.name,
                payload.category.as_str(),
                payload.body,
                placeholders_json,
                payload.id
            ],
        )
        .map_err(|e| e.to_string())?;
    } else {
        payload.usage_count = 0;
        conn.execute(
            "INSERT INTO templates (id, name, category, body, placeholders, is_active, usage_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)",
            params![
                payload.id,
                payload.name,
                payload.category.as_str(),
                payload.body,
                placeholders_json,
                payload.is_active as i64
            ],
        )
        .map_err(|e| e.to_string())?;
    }

    Ok(payload)
}

fn existing_state(conn: &Connection, id: &str) -> Result<Option<(bool, u64)>, String> {
    conn.query_row(
        "SELECT is_active, usage_count FROM templates WHERE id = ?1",
        params![id],
        |row| Ok((row.get::<_, i64>(0)? != 0, row.get::<_, i64>(1)? as u64)),
    )
    .optional()
    .map_err(|e| e.to_string())
}
