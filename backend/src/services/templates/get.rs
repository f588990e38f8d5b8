//! # Template Retrieval Service
//!
//! Backend logic for `GET /api/templates/{template_id}` and
//! `GET /api/templates`. Rows are mapped back into `TemplateDocument`,
//! deserializing the placeholder schema from its JSON column. `load_template`
//! is shared with the generation and verification services.

use crate::db;
use actix_web::web;
use common::model::template::{TemplateCategory, TemplateDocument};
use rusqlite::{params, Connection, Row};

/// Actix web handler for `GET /api/templates/{template_id}`.
pub(crate) async fn process(template_id: web::Path<String>) -> impl actix_web::Responder {
    let result = db::open().and_then(|conn| load_template(&conn, &template_id));
    match result {
        Ok(template) => actix_web::HttpResponse::Ok().json(template),
        Err(e) if e == "Template not found" => actix_web::HttpResponse::NotFound().body(e),
        Err(e) => actix_web::HttpResponse::ServiceUnavailable()
            .body(format!("Error retrieving template: {}", e)),
    }
}

/// Actix web handler for `GET /api/templates`.
pub(crate) async fn process_list() -> impl actix_web::Responder {
    match list_templates() {
        Ok(templates) => actix_web::HttpResponse::Ok().json(templates),
        Err(e) => actix_web::HttpResponse::ServiceUnavailable()
            .body(format!("Error listing templates: {}", e)),
    }
}

fn template_from_row(row: &Row) -> Result<TemplateDocument, String> {
    let category_raw: String = row.get(2).map_err(|e| e.to_string())?;
    let placeholders_json: String = row.get(4).map_err(|e| e.to_string())?;
    Ok(TemplateDocument {
        id: row.get(0).map_err(|e| e.to_string())?,
        name: row.get(1).map_err(|e| e.to_string())?,
        category: TemplateCategory::parse(&category_raw)
            .ok_or_else(|| format!("Unknown template category: {}", category_raw))?,
        body: row.get(3).map_err(|e| e.to_string())?,
        placeholders: serde_json::from_str(&placeholders_json).map_err(|e| e.to_string())?,
        is_active: row.get::<_, i64>(5).map_err(|e| e.to_string())? != 0,
        usage_count: row.get::<_, i64>(6).map_err(|e| e.to_string())? as u64,
    })
}

const TEMPLATE_COLUMNS: &str =
    "id, name, category, body, placeholders, is_active, usage_count";

/// Fetches one template by id. Returns `"Template not found"` for a missing
/// row so handlers can map it to 404.
pub(crate) fn load_template(conn: &Connection, template_id: &str) -> Result<TemplateDocument, String> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {} FROM templates WHERE id = ?1",
            TEMPLATE_COLUMNS
        ))
        .map_err(|e| e.to_string())?;
    let mut rows = stmt
        .query_map(params![template_id], |row| {
            Ok(template_from_row(row))
        })
        .map_err(|e| e.to_string())?;

    match rows.next() {
        Some(Ok(result)) => result,
        Some(Err(e)) => Err(e.to_string()),
        None => Err("Template not found".to_string()),
    }
}

fn list_templates() -> Result<Vec<TemplateDocument>, String> {
    let conn = db::open()?;
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {} FROM templates ORDER BY name",
            TEMPLATE_COLUMNS
        ))
        .map_err(|e| e.to_string())?;
    let rows = stmt
        .query_map([], |row| Ok(template_from_row(row)))
        .map_err(|e| e.to_string())?;

    let mut templates = Vec::new();
    for row in rows {
        templates.push(row.map_err(|e| e.to_string())??);
    }
    Ok(templates)
}
