//! AI feedback revision endpoints.
//!
//! `POST /api/revision/start` snapshots the current template, feedback list
//! and event details, schedules a background pipeline run and returns the
//! job id. Progress and the final per-step report are polled through the
//! jobs endpoints. A retry is simply a new `start` call; the pipeline always
//! begins at the first tier.

pub mod client;
pub mod pipeline;

use actix_web::web::{post, scope};
use actix_web::{web, HttpResponse, Responder, Scope};
use std::sync::Arc;
use uuid::Uuid;

use common::jobs::{JobPhase, JobProgress, JobStatus};
use common::requests::StartRevisionRequest;

use crate::job_controller::state::{JobUpdate, JobsState};
use crate::project::ProjectStore;
use client::TextGenerator;

const API_PATH: &str = "/api/revision";

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/start", post().to(start_revision))
}

async fn start_revision(
    store: web::Data<ProjectStore>,
    jobs: web::Data<JobsState>,
    generator: web::Data<Arc<dyn TextGenerator>>,
    payload: web::Json<StartRevisionRequest>,
) -> impl Responder {
    // Snapshot under one read lock so the job never sees a half-edited project.
    let (template, details, stored_feedback) = {
        let state = store.read().await;
        (
            state.template.clone(),
            state.document_details.clone(),
            state.feedback.clone(),
        )
    };

    let Some(template) = template else {
        return HttpResponse::BadRequest().body("수정할 템플릿이 없습니다");
    };
    let Some(details) = details else {
        return HttpResponse::BadRequest().body("행사 정보가 없습니다");
    };
    let feedback = payload.into_inner().feedback.unwrap_or(stored_feedback);
    if feedback.is_empty() {
        return HttpResponse::BadRequest().body("반영할 피드백이 없습니다");
    }

    let job_id = Uuid::new_v4().to_string();
    let cancel = jobs.register(&job_id).await;
    log::info!("scheduling revision job {job_id} with {} feedback items", feedback.len());

    let jobs_state = jobs.get_ref().clone();
    let store = store.clone();
    let generator = generator.get_ref().clone();
    let task_job_id = job_id.clone();

    tokio::spawn(async move {
        let tx = jobs_state.tx.clone();
        let progress_job_id = task_job_id.clone();
        let on_progress = move |completed: usize, total: usize, title: &str| {
            let progress = JobProgress {
                total,
                completed,
                current: title.to_string(),
                phase: JobPhase::Revising,
                errors: Vec::new(),
            };
            let _ = tx.try_send(JobUpdate::new(
                progress_job_id.clone(),
                JobStatus::InProgress(progress),
            ));
        };

        let result = pipeline::run_pipeline(
            generator.as_ref(),
            template,
            &feedback,
            &details,
            cancel.as_ref(),
            on_progress,
        )
        .await;

        match result {
            Ok(outcome) => {
                {
                    let mut state = store.write().await;
                    state.template = Some(outcome.template);
                    // The revised template needs a fresh approval.
                    state.approved = false;
                }
                let payload =
                    serde_json::to_string(&outcome.reports).unwrap_or_else(|_| "[]".to_string());
                log::info!("revision job {task_job_id} completed");
                jobs_state
                    .finish(&task_job_id, JobStatus::Completed(payload))
                    .await;
            }
            Err(err) => {
                log::warn!("revision job {task_job_id} stopped: {err}");
                jobs_state
                    .finish(&task_job_id, JobStatus::Failed(err.to_string()))
                    .await;
            }
        }
    });

    HttpResponse::Ok().json(serde_json::json!({ "job_id": job_id }))
}
