//! Batch document generation endpoints.
//!
//! `POST /api/generation/start` snapshots the approved template, design and
//! recipient list, schedules the batch worker and returns a job id for
//! polling. The rendered files and the zip archive live in the project
//! store and are served by the `files`/`archive` endpoints.

pub mod archive;
pub mod batch;
pub mod pdf;
pub mod render;

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::web::{get, post, scope};
use actix_web::{web, HttpResponse, Responder, Scope};
use tokio::sync::mpsc;
use uuid::Uuid;

use common::jobs::{JobProgress, JobStatus};
use common::requests::StartGenerationRequest;

use crate::config::AppConfig;
use crate::job_controller::state::{JobUpdate, JobsState};
use crate::project::{ArchiveBundle, ProjectStore};
use batch::{BatchInput, BatchOutcome, RenderSettings};
use render::BitmapRasterizer;

const API_PATH: &str = "/api/generation";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/start", post().to(start_generation))
        .route("/files", get().to(list_files))
        .route("/files/{file_id}", get().to(download_file))
        .route("/archive", get().to(download_archive))
}

async fn start_generation(
    store: web::Data<ProjectStore>,
    jobs: web::Data<JobsState>,
    config: web::Data<AppConfig>,
    payload: web::Json<StartGenerationRequest>,
) -> impl Responder {
    let input = {
        let state = store.read().await;
        if state.recipients.is_empty() {
            return HttpResponse::BadRequest().body("수신자가 없습니다");
        }
        let Some(template) = state.template.clone() else {
            return HttpResponse::BadRequest().body("템플릿이 없습니다");
        };
        let Some(design) = state.design.clone() else {
            return HttpResponse::BadRequest().body("디자인이 선택되지 않았습니다");
        };
        if !state.approved {
            return HttpResponse::BadRequest().body("템플릿이 아직 승인되지 않았습니다");
        }
        BatchInput {
            recipients: state.recipients.clone(),
            template,
            design,
            format: payload.format,
        }
    };

    let settings = RenderSettings {
        fonts_dir: config.fonts_dir.clone(),
        jpeg_quality: config.jpeg_quality,
        inter_item_delay_ms: config.inter_item_delay_ms,
    };
    let render_scale = config.render_scale;

    let job_id = Uuid::new_v4().to_string();
    let cancel = jobs.register(&job_id).await;
    log::info!(
        "scheduling generation job {job_id}: {} recipients, format {:?}",
        input.recipients.len(),
        input.format
    );

    let jobs_state = jobs.get_ref().clone();
    let store = store.clone();
    let task_job_id = job_id.clone();

    tokio::spawn(async move {
        // Dedicated progress channel for this job; a listener translates
        // worker progress into job updates for the central controller.
        let (progress_tx, mut progress_rx) = mpsc::channel::<JobProgress>(100);
        let updater_tx = jobs_state.tx.clone();
        let listener_job_id = task_job_id.clone();
        let listener = tokio::spawn(async move {
            while let Some(progress) = progress_rx.recv().await {
                let _ = updater_tx
                    .send(JobUpdate::new(
                        listener_job_id.clone(),
                        JobStatus::InProgress(progress),
                    ))
                    .await;
            }
        });

        let recipient_count = input.recipients.len();
        let blocking_settings = settings.clone();
        let handle = tokio::task::spawn_blocking(move || {
            let rasterizer =
                BitmapRasterizer::from_fonts_dir(&blocking_settings.fonts_dir, render_scale)
                    .map_err(|e| e.to_string())?;
            let outcome = batch::generate_blocking(
                &rasterizer,
                &input,
                &blocking_settings,
                cancel.as_ref(),
                |progress| {
                    let _ = progress_tx.blocking_send(progress);
                },
            );
            let bundle = if outcome.files.is_empty() {
                None
            } else {
                let (bytes, entry_count) =
                    archive::pack(&outcome.files).map_err(|e| e.to_string())?;
                Some(ArchiveBundle {
                    file_name: archive::archive_name(recipient_count),
                    size: bytes.len(),
                    bytes,
                    entry_count,
                })
            };
            Ok::<(BatchOutcome, Option<ArchiveBundle>), String>((outcome, bundle))
        });

        let status = match handle.await {
            Ok(Ok((outcome, bundle))) => {
                let generated = outcome.files.len();
                {
                    let mut state = store.write().await;
                    state.generated_files = outcome.files;
                    state.archive = bundle;
                }
                if outcome_is_clean(&outcome.errors, outcome.cancelled) {
                    log::info!("generation job {task_job_id} completed: {generated} files");
                    JobStatus::Completed(
                        serde_json::json!({
                            "total": recipient_count,
                            "generated": generated,
                        })
                        .to_string(),
                    )
                } else if outcome.cancelled {
                    JobStatus::Failed(format!("취소되었습니다 ({generated}개 생성됨)"))
                } else {
                    JobStatus::Failed(format!(
                        "{generated}개 생성, {}건 실패: {}",
                        outcome.errors.len(),
                        outcome.errors.join("; ")
                    ))
                }
            }
            Ok(Err(e)) => JobStatus::Failed(e),
            Err(e) => JobStatus::Failed(format!("작업 스레드 오류: {e}")),
        };
        // The worker has dropped its progress sender by now; wait for the
        // listener to forward the last queued updates so the terminal status
        // lands behind them in the channel.
        let _ = listener.await;
        jobs_state.finish(&task_job_id, status).await;
    });

    HttpResponse::Ok().json(serde_json::json!({ "job_id": job_id }))
}

fn outcome_is_clean(errors: &[String], cancelled: bool) -> bool {
    errors.is_empty() && !cancelled
}

async fn list_files(store: web::Data<ProjectStore>) -> impl Responder {
    let state = store.read().await;
    HttpResponse::Ok().json(&state.generated_files)
}

async fn download_file(
    store: web::Data<ProjectStore>,
    file_id: web::Path<String>,
) -> impl Responder {
    let state = store.read().await;
    let Some(file) = state
        .generated_files
        .iter()
        .find(|f| f.id == *file_id)
    else {
        return HttpResponse::NotFound().body("해당 파일이 없습니다");
    };
    HttpResponse::Ok()
        .content_type(file.file_type.mime_type())
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(file.file_name.clone())],
        })
        .body(file.bytes.clone())
}

async fn download_archive(store: web::Data<ProjectStore>) -> impl Responder {
    let state = store.read().await;
    let Some(bundle) = &state.archive else {
        return HttpResponse::NotFound().body("생성된 압축 파일이 없습니다");
    };
    HttpResponse::Ok()
        .content_type("application/zip")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(bundle.file_name.clone())],
        })
        .body(bundle.bytes.clone())
}
