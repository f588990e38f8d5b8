//! Background verification of an uploaded CSV against a template's
//! placeholder schema.
//!
//! Runs the same per-field validation the generation path uses, so a
//! verified data source is guaranteed to pass validation row by row later.
//! The scan happens on a blocking thread in chunks, each chunk checked in
//! parallel; the first invalid row fails the job with its row number and
//! messages, and the template's verified flag is set accordingly.

use crate::db;
use crate::engine::bulk::{normalize_title, resolve_record};
use crate::engine::validate::validate;
use crate::job_controller::state::{JobStatus, JobUpdate, JobsState};
use crate::services::data_sources::csv::datasource_path;
use crate::services::templates::load_template;
use actix_web::{web, HttpResponse, Responder};
use common::model::record::DataRecord;
use common::requests::VerifyCsvRequest;
use log::info;
use rayon::prelude::*;
use rusqlite::{params, Connection};
use std::path::Path;
use std::time::Instant;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Rows validated per progress update.
const CHUNK_SIZE: usize = 10_000;

pub(crate) async fn process(
    jobs_state: web::Data<JobsState>,
    req: web::Json<VerifyCsvRequest>,
) -> impl Responder {
    match schedule_verify_job(jobs_state, req.into_inner()).await {
        Ok(job_id) => HttpResponse::Ok().body(job_id),
        Err(err) => HttpResponse::InternalServerError().body(err),
    }
}

/// Registers the job as `Pending` and spawns the blocking scan, returning the
/// job id for polling straight away.
async fn schedule_verify_job(
    jobs_state: web::Data<JobsState>,
    req: VerifyCsvRequest,
) -> Result<String, String> {
    let job_id = Uuid::new_v4().to_string();
    jobs_state.register(&job_id).await;

    let tx = jobs_state.tx.clone();
    let job_id_for_task = job_id.clone();

    tokio::spawn(async move {
        let tx_block = tx.clone();
        let job_id_for_blocking = job_id_for_task.clone();
        let template_id = req.template_id;

        let handle = tokio::task::spawn_blocking(move || {
            verify_blocking(tx_block, &job_id_for_blocking, &template_id)
        });

        let status = match handle.await {
            Ok(Ok(message)) => JobStatus::Completed(message),
            Ok(Err(e)) => JobStatus::Failed(e),
            Err(join_err) => JobStatus::Failed(format!("Task join error: {}", join_err)),
        };
        let _ = tx
            .send(JobUpdate {
                job_id: job_id_for_task,
                status,
            })
            .await;
    });

    Ok(job_id)
}

/// Reads the uploaded CSV into flat records with normalized column names
/// (trimmed, lower-cased, spaces to underscores). Shared with the bulk
/// generation worker.
pub(crate) fn read_records(path: &str) -> Result<Vec<DataRecord>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| e.to_string())?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(normalize_title)
        .collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| e.to_string())?;
        let mut record = DataRecord::new();
        for (i, title) in headers.iter().enumerate() {
            if let Some(value) = row.get(i) {
                record.insert(title.clone(), value.to_string());
            }
        }
        records.push(record);
    }
    Ok(records)
}

/// The synchronous scan, run via `spawn_blocking`.
fn verify_blocking(
    tx: mpsc::Sender<JobUpdate>,
    job_id: &str,
    template_id: &str,
) -> Result<String, String> {
    let start = Instant::now();
    let _ = tx.blocking_send(JobUpdate {
        job_id: job_id.to_string(),
        status: JobStatus::InProgress(0),
    });

    let conn = db::open()?;
    let template = load_template(&conn, template_id)?;
    let md5 = datasource_md5(&conn, template_id)?
        .ok_or("No data source has been uploaded for this template")?;

    let file_path = datasource_path(template_id, &md5);
    if !Path::new(&file_path).exists() {
        return Err("CSV file not found".to_string());
    }

    let records = read_records(&file_path)?;
    let total = records.len();

    let mut processed = 0usize;
    for chunk in records.chunks(CHUNK_SIZE) {
        let first_invalid = chunk.par_iter().enumerate().find_map_any(|(offset, row)| {
            let record = resolve_record(&template.placeholders, row, None);
            let errors = validate(&template.placeholders, &record);
            if errors.is_empty() {
                None
            } else {
                Some((processed + offset, errors))
            }
        });

        if let Some((index, errors)) = first_invalid {
            set_verified(&conn, template_id, false)?;
            // +2: 1-based counting plus the header line.
            return Err(format!("Row {} is invalid: {}", index + 2, errors.join("; ")));
        }

        processed += chunk.len();
        let progress = if total > 0 {
            (processed as f32 / total as f32 * 100.0) as u32
        } else {
            100
        };
        let _ = tx.blocking_send(JobUpdate {
            job_id: job_id.to_string(),
            status: JobStatus::InProgress(progress),
        });
    }

    set_verified(&conn, template_id, true)?;
    info!("verify job {} checked {} rows in {:.2?}", job_id, total, start.elapsed());
    Ok(format!("All {} rows match the template schema", total))
}

fn datasource_md5(conn: &Connection, template_id: &str) -> Result<Option<String>, String> {
    conn.query_row(
        "SELECT datasource_md5 FROM templates WHERE id = ?1",
        params![template_id],
        |row| row.get::<_, Option<String>>(0),
    )
    .map_err(|e| e.to_string())
}

fn set_verified(conn: &Connection, template_id: &str, verified: bool) -> Result<(), String> {
    conn.execute(
        "UPDATE templates SET datasource_verified = ?1 WHERE id = ?2",
        params![verified as i64, template_id],
    )
    .map_err(|e| e.to_string())?;
    Ok(())
}
