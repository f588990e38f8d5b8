//! # Bulk Generation Service
//!
//! `POST /api/generate/bulk`: one document per row of a template's verified
//! CSV data source, produced by a background job.
//!
//! ## Workflow
//!
//! 1. The handler schedules the job, registers it `Pending` and immediately
//!    returns a `job_id` for status polling.
//! 2. A blocking worker loads the template, refuses unverified data sources,
//!    reads the CSV into normalized records and hands the whole batch to
//!    `engine::bulk::run_batch` (size cap, per-row validation, rendering).
//! 3. Each successfully rendered row is written as `./pdfs/{job_id}_{row}.pdf`.
//!    A renderer failure or validation failure is recorded for that row only;
//!    sibling rows always proceed.
//! 4. Per-row progress flows back over an MPSC channel and is translated into
//!    percentage `JobStatus` updates for the central job controller.
//! 5. On completion the template's usage counter grows by the number of rows
//!    that produced a document, and the job result summarizes the rest.

use crate::db;
use crate::engine::bulk::run_batch;
use crate::engine::render::RenderConfig;
use crate::job_controller::state::{JobStatus, JobUpdate, JobsState};
use crate::services::data_sources::csv::datasource_path;
use crate::services::data_sources::csv::read_records;
use crate::services::templates::load_template;
use actix_web::{web, HttpResponse, Responder};
use common::requests::StartBulkRequest;
use log::warn;
use rusqlite::{params, Connection};
use std::path::Path;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Progress message from the blocking worker to the async listener.
#[derive(Debug)]
enum BulkUpdate {
    /// Overall job status change.
    Job(JobStatus),
    /// One row finished (rendered or recorded as failed).
    Task { done: usize, total: usize },
}

pub(crate) async fn process(
    state: web::Data<JobsState>,
    payload: web::Json<StartBulkRequest>,
) -> impl Responder {
    match schedule_bulk_job(state, payload.into_inner()).await {
        Ok(job_id) => HttpResponse::Ok().json(serde_json::json!({ "job_id": job_id })),
        Err(err) => HttpResponse::InternalServerError().body(err),
    }
}

/// Registers the job and spawns its worker; returns the job id immediately.
async fn schedule_bulk_job(
    state: web::Data<JobsState>,
    req: StartBulkRequest,
) -> Result<String, String> {
    let job_id = Uuid::new_v4().to_string();
    state.register(&job_id).await;

    let tx = state.tx.clone();
    let job_id_for_task = job_id.clone();

    tokio::spawn(async move {
        // Dedicated channel for this job; a listener translates worker
        // messages into central JobUpdates.
        let (bulk_tx, bulk_rx) = mpsc::channel::<BulkUpdate>(100);
        let listener = tokio::spawn(forward_updates(bulk_rx, tx, job_id_for_task.clone()));

        let worker_tx = bulk_tx.clone();
        let job_id_for_blocking = job_id_for_task.clone();
        let handle = tokio::task::spawn_blocking(move || {
            bulk_blocking(worker_tx, &job_id_for_blocking, req)
        });

        let status = match handle.await {
            Ok(Ok(summary)) => JobStatus::Completed(summary),
            Ok(Err(e)) => JobStatus::Failed(e),
            Err(join_err) => JobStatus::Failed(format!("Task join error: {}", join_err)),
        };
        // The final status rides the same channel as the progress messages,
        // so task updates still queued in the listener can never be applied
        // after it and flip a finished job back to in-progress.
        let _ = bulk_tx.send(BulkUpdate::Job(status)).await;
        drop(bulk_tx);
        let _ = listener.await;
    });

    Ok(job_id)
}

/// Forwards this job's worker messages to the central updater, translating
/// per-task progress into a percentage. Runs until the channel closes, so
/// the last message sent is the last one applied to the jobs map.
async fn forward_updates(
    mut bulk_rx: mpsc::Receiver<BulkUpdate>,
    tx: mpsc::Sender<JobUpdate>,
    job_id: String,
) {
    while let Some(update) = bulk_rx.recv().await {
        let status = match update {
            BulkUpdate::Job(status) => status,
            BulkUpdate::Task { done, total } => {
                let progress = if total > 0 {
                    (done as f32 / total as f32 * 100.0) as u32
                } else {
                    100
                };
                JobStatus::InProgress(progress)
            }
        };
        let _ = tx
            .send(JobUpdate {
                job_id: job_id.clone(),
                status,
            })
            .await;
    }
}

/// The synchronous batch worker, run via `spawn_blocking`.
fn bulk_blocking(
    tx: mpsc::Sender<BulkUpdate>,
    job_id: &str,
    req: StartBulkRequest,
) -> Result<String, String> {
    let _ = tx.blocking_send(BulkUpdate::Job(JobStatus::InProgress(0)));

    let conn = db::open()?;
    let template = load_template(&conn, &req.template_id)?;
    if !template.is_active {
        return Err("Template is inactive".to_string());
    }

    let md5 = verified_datasource_md5(&conn, &req.template_id)?;
    let file_path = datasource_path(&req.template_id, &md5);
    if !Path::new(&file_path).exists() {
        return Err("CSV file not found".to_string());
    }

    let records = read_records(&file_path)?;
    let config = RenderConfig::inr()?;
    let output = run_batch(
        &template.placeholders,
        &template.body,
        &records,
        req.mapping.as_ref(),
        &config,
    )?;

    let total = output.documents.len();
    let mut rendered = 0usize;
    let mut render_failures = 0usize;
    for (done, row) in output.documents.iter().enumerate() {
        let output_path = Path::new("./pdfs").join(format!("{}_{}.pdf", job_id, row.row_index));
        match crate::services::generate::pdf::render_to_file(&template.name, &row.text, &output_path)
        {
            Ok(()) => rendered += 1,
            Err(e) => {
                // Isolated per row: record and move on.
                warn!("job {}: PDF for row {} failed: {}", job_id, row.row_index, e);
                render_failures += 1;
            }
        }
        let _ = tx.blocking_send(BulkUpdate::Task {
            done: done + 1,
            total,
        });
    }

    if rendered > 0 {
        conn.execute(
            "UPDATE templates SET usage_count = usage_count + ?1 WHERE id = ?2",
            params![rendered as i64, template.id],
        )
        .map_err(|e| e.to_string())?;
    }

    Ok(format!(
        "Generated {} of {} documents ({} rows failed validation, {} failed rendering)",
        rendered,
        output.summary.total,
        output.summary.failed,
        render_failures
    ))
}

fn verified_datasource_md5(conn: &Connection, template_id: &str) -> Result<String, String> {
    let (md5, verified): (Option<String>, i64) = conn
        .query_row(
            "SELECT datasource_md5, datasource_verified FROM templates WHERE id = ?1",
            params![template_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .map_err(|e| e.to_string())?;

    if verified != 1 {
        return Err("Template data source has not been verified.".to_string());
    }
    md5.ok_or("No data source has been uploaded for this template".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job_controller::state::{start_job_updater, JobsState};

    #[tokio::test]
    async fn final_status_outlives_queued_progress_updates() {
        let (state, rx) = JobsState::new();
        tokio::spawn(start_job_updater(state.clone(), rx));

        let job_id = "bulk-test-job".to_string();
        state.register(&job_id).await;

        let (bulk_tx, bulk_rx) = mpsc::channel::<BulkUpdate>(100);
        let listener = tokio::spawn(forward_updates(bulk_rx, state.tx.clone(), job_id.clone()));

        // Queue a burst of task progress and then the final status before the
        // listener has drained anything, mimicking a worker that finishes
        // while its updates are still buffered.
        for done in 1..=5 {
            bulk_tx
                .send(BulkUpdate::Task { done, total: 5 })
                .await
                .unwrap();
        }
        bulk_tx
            .send(BulkUpdate::Job(JobStatus::Completed("done".to_string())))
            .await
            .unwrap();
        drop(bulk_tx);
        listener.await.unwrap();

        // Let the central updater drain its queue.
        let mut completed = false;
        for _ in 0..1000 {
            tokio::task::yield_now().await;
            let jobs = state.jobs.read().await;
            if matches!(jobs.get(&job_id), Some(JobStatus::Completed(_))) {
                completed = true;
                break;
            }
        }
        assert!(completed, "job never reached Completed");

        // Nothing queued may flip the job back to in-progress.
        for _ in 0..50 {
            tokio::task::yield_now().await;
        }
        let jobs = state.jobs.read().await;
        assert!(matches!(jobs.get(&job_id), Some(JobStatus::Completed(_))));
    }
}
