//! Status polling and cancellation for background jobs.
//!
//! Routes:
//! - `GET /api/jobs/{job_id}`: current `JobStatus` of a revision or
//!   generation job.
//! - `POST /api/jobs/{job_id}/cancel`: flip the job's cancellation flag;
//!   the worker notices between units of work and reports partial results.

use crate::job_controller::state::JobsState;
use actix_web::web::{get, post, scope};
use actix_web::{web, HttpResponse, Responder, Scope};

const API_PATH: &str = "/api/jobs";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/{job_id}", get().to(get_status))
        .route("/{job_id}/cancel", post().to(cancel))
}

async fn get_status(job_id: web::Path<String>, state: web::Data<JobsState>) -> impl Responder {
    let jobs = state.jobs.read().await;
    match jobs.get(&job_id.into_inner()) {
        Some(status) => HttpResponse::Ok().json(status),
        None => HttpResponse::NotFound().body("Job ID not found"),
    }
}

async fn cancel(job_id: web::Path<String>, state: web::Data<JobsState>) -> impl Responder {
    if state.request_cancel(&job_id.into_inner()).await {
        HttpResponse::Ok().finish()
    } else {
        HttpResponse::NotFound().body("Job ID not found or already finished")
    }
}
