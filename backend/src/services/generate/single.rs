//! # Single Document Generation
//!
//! `POST /api/generate/single`: one template, one data record, one document.
//!
//! ## Workflow
//!
//! 1. Load the template; inactive templates are refused.
//! 2. `engine::validate` the record against the placeholder schema. Any
//!    errors short-circuit into a `422` carrying the full `GenerationResult`
//!    so the client can show every problem at once.
//! 3. `engine::render` the body (INR formatting convention) and write the
//!    PDF under `./pdfs/{doc_id}.pdf`.
//! 4. Persist the generated text and bump the template's usage counter; the
//!    counter only reflects generations that actually produced a document.

use crate::db;
use crate::engine::render::{render, RenderConfig};
use crate::engine::validate::validate;
use crate::services::generate::pdf;
use crate::services::templates::load_template;
use actix_web::{web, HttpResponse, Responder};
use common::model::generation::GenerationResult;
use common::requests::GenerateRequest;
use log::info;
use rusqlite::params;
use std::fs;
use std::path::Path;
use uuid::Uuid;

pub(crate) async fn process(payload: web::Json<GenerateRequest>) -> impl Responder {
    match generate_single(payload.into_inner()) {
        Ok(result) if result.valid => HttpResponse::Ok().json(result),
        Ok(result) => HttpResponse::UnprocessableEntity().json(result),
        Err(e) => HttpResponse::ServiceUnavailable().body(format!("Generation failed: {}", e)),
    }
}

fn generate_single(req: GenerateRequest) -> Result<GenerationResult, String> {
    let conn = db::open()?;
    let template = load_template(&conn, &req.template_id)?;
    if !template.is_active {
        return Err("Template is inactive".to_string());
    }

    let errors = validate(&template.placeholders, &req.data);
    if !errors.is_empty() {
        return Ok(GenerationResult::failure(errors));
    }

    let config = RenderConfig::inr()?;
    let text = render(&template.placeholders, &template.body, &req.data, &config);

    let doc_id = Uuid::new_v4().to_string();
    let output_path = Path::new("./pdfs").join(format!("{}.pdf", doc_id));
    pdf::render_to_file(&template.name, &text, &output_path)?;

    if let Err(e) = persist_generated(&conn, &doc_id, &template.id, &text) {
        // Do not leave a PDF on disk that no record points at.
        let _ = fs::remove_file(&output_path);
        return Err(e);
    }

    info!("generated document {} from template {}", doc_id, template.id);
    Ok(GenerationResult::success(text))
}

/// Records the generated text and bumps the template's usage counter. The
/// counter only ever counts generations that also left a document row.
fn persist_generated(
    conn: &rusqlite::Connection,
    doc_id: &str,
    template_id: &str,
    text: &str,
) -> Result<(), String> {
    conn.execute(
        "INSERT INTO generated_docs (id, template_id, text, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![doc_id, template_id, text, chrono::Utc::now().to_rfc3339()],
    )
    .map_err(|e| e.to_string())?;
    conn.execute(
        "UPDATE templates SET usage_count = usage_count + 1 WHERE id = ?1",
        params![template_id],
    )
    .map_err(|e| e.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn memory_db_with_template() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO templates (id, name, category, body, placeholders, is_active, usage_count)
             VALUES ('t1', 'Offer', 'offer_letter', 'Dear {{name}}', '[]', 1, 0)",
            [],
        )
        .unwrap();
        conn
    }

    #[test]
    fn persist_records_the_document_and_bumps_usage() {
        let conn = memory_db_with_template();
        persist_generated(&conn, "d1", "t1", "Dear Jane").unwrap();

        let (count, usage): (i64, i64) = conn
            .query_row(
                "SELECT (SELECT COUNT(*) FROM generated_docs WHERE template_id = 't1'),
                        (SELECT usage_count FROM templates WHERE id = 't1')",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(usage, 1);
    }

    #[test]
    fn persist_fails_cleanly_without_a_schema() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(persist_generated(&conn, "d1", "t1", "text").is_err());
    }
}
