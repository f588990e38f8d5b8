//! CSV upload: streams the file to disk while hashing it, validating the
//! header line before any data is accepted.
//!
//! The multipart request must carry the `json` part (an `UploadCsvMeta`
//! naming the template) before the `file` part. The file lands at
//! `{template_id}_{md5}.csv`; re-uploading identical content is detected by
//! hash and leaves the template's verified flag untouched, anything else
//! resets it.

use crate::db;
use actix_multipart::Multipart;
use actix_web::{HttpResponse, Responder};
use common::requests::UploadCsvMeta;
use futures_util::StreamExt;
use md5::Context;
use regex::Regex;
use rusqlite::{params, Connection};
use std::fs::{self, File};
use std::io::{BufWriter, Write};

/// Where the data source for a template/content-hash pair lives on disk.
pub(crate) fn datasource_path(template_id: &str, md5: &str) -> String {
    format!("./{}_{}.csv", template_id, md5)
}

/// Validate each CSV header cell: letters, marks, digits, spaces, hyphen,
/// underscore, nothing empty. Cells become column names after normalization,
/// so anything unmappable is rejected at the door.
fn validate_header_cells(header_str: &str, header_re: &Regex) -> Result<(), String> {
    for cell in header_str.split(',') {
        let mut cell = cell.trim();
        if cell.starts_with('"') && cell.ends_with('"') && cell.len() >= 2 {
            cell = &cell[1..cell.len() - 1];
        }
        if cell.is_empty() {
            return Err("CSV header cells must not be empty".to_string());
        }
        if !header_re.is_match(cell) {
            return Err(format!("Invalid CSV header cell: '{}'", cell));
        }
    }
    Ok(())
}

/// HTTP handler wrapper that converts the internal result to an `HttpResponse`.
///
/// - On success: `200 OK`, body `true` when the upload was an exact duplicate
///   of the already-verified data source.
/// - On failure: `400 Bad Request` with the error message.
pub(crate) async fn process(payload: Multipart) -> impl Responder {
    match upload_data_source(payload).await {
        Ok(duplicate) => HttpResponse::Ok().body(duplicate.to_string()),
        Err(e) => HttpResponse::BadRequest().body(format!("Error: {}", e)),
    }
}

async fn upload_data_source(mut payload: Multipart) -> Result<bool, String> {
    let mut meta: Option<UploadCsvMeta> = None;
    let mut stored_md5: Option<String> = None;
    let mut hasher = Context::new();
    let mut part_path: Option<String> = None;

    let header_re = Regex::new(r"^[\p{L}\p{M}\p{N}\s\-_]+$").map_err(|e| e.to_string())?;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| e.to_string())?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        match name.as_deref() {
            Some("json") => {
                let mut bytes = Vec::new();
                while let Some(chunk) = field.next().await {
                    bytes.extend_from_slice(&chunk.map_err(|e| e.to_string())?);
                }
                let parsed: UploadCsvMeta =
                    serde_json::from_slice(&bytes).map_err(|e| e.to_string())?;

                let conn = db::open()?;
                stored_md5 = existing_md5(&conn, &parsed.template_id)?;
                meta = Some(parsed);
            }

            Some("file") => {
                let meta = meta
                    .as_ref()
                    .ok_or("The json part must be sent before the file")?;

                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
                    .unwrap_or_default();
                if !filename.ends_with(".csv") {
                    return Err("The file must end with .csv".to_string());
                }

                // Stream to a partial file while hashing; renamed to its
                // content-addressed name once the hash is known.
                let partial = format!("./{}.csv.part", meta.template_id);
                let file = File::create(&partial).map_err(|e| e.to_string())?;
                let mut writer = BufWriter::new(file);
                let mut header_buf: Vec<u8> = Vec::new();
                let mut header_validated = false;

                while let Some(chunk) = field.next().await {
                    let chunk = chunk.map_err(|e| e.to_string())?;
                    hasher.consume(&chunk);

                    if !header_validated {
                        header_buf.extend_from_slice(&chunk);
                        if let Some(pos) = header_buf.iter().position(|&b| b == b'\n') {
                            validate_header_bytes(&header_buf[..pos], &header_re)?;
                            header_validated = true;
                        }
                    }
                    writer.write_all(&chunk).map_err(|e| e.to_string())?;
                }

                if !header_validated {
                    // Single-line file without a trailing newline.
                    validate_header_bytes(&header_buf, &header_re)?;
                }
                writer.flush().map_err(|e| e.to_string())?;
                part_path = Some(partial);
            }

            _ => {}
        }
    }

    let meta = meta.ok_or("Missing json part")?;
    let partial = part_path.ok_or("Missing file part")?;
    let computed_md5 = format!("{:x}", hasher.finalize());

    if stored_md5.as_deref() == Some(computed_md5.as_str()) {
        // Identical content already on record; keep whatever verification
        // state it had.
        fs::remove_file(&partial).map_err(|e| e.to_string())?;
        return Ok(true);
    }

    fs::rename(&partial, datasource_path(&meta.template_id, &computed_md5))
        .map_err(|e| e.to_string())?;

    let conn = db::open()?;
    conn.execute(
        "UPDATE templates SET datasource_md5 = ?1, datasource_verified = 0 WHERE id = ?2",
        params![computed_md5, meta.template_id],
    )
    .map_err(|e| e.to_string())?;

    Ok(false)
}

fn validate_header_bytes(raw: &[u8], header_re: &Regex) -> Result<(), String> {
    let mut line = raw.to_vec();
    if line.ends_with(b"\r") {
        line.pop();
    }
    let header = String::from_utf8(line).map_err(|_| "Header is not valid UTF-8".to_string())?;
    validate_header_cells(&header, header_re)
}

fn existing_md5(conn: &Connection, template_id: &str) -> Result<Option<String>, String> {
    conn.query_row(
        "SELECT datasource_md5 FROM templates WHERE id = ?1",
        params![template_id],
        |row| row.get::<_, Option<String>>(0),
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => "Template not found".to_string(),
        other => other.to_string(),
    })
}
