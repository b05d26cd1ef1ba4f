//! In-memory project state and the endpoints that manipulate it.
//!
//! The whole wizard works on a single project held in process memory; there
//! is no persistence across restarts. Long-running jobs snapshot the parts
//! they need at start, so concurrent edits never race a running pipeline.

pub mod wizard;

use actix_web::web::{delete, get, post, scope};
use actix_web::{web, HttpResponse, Responder, Scope};
use serde::Serialize;
use tokio::sync::RwLock;

use common::model::design::DesignTemplate;
use common::model::document::DocumentDetails;
use common::model::feedback::FeedbackItem;
use common::model::generated::GeneratedFile;
use common::model::recipient::Recipient;
use common::model::template::DocumentTemplate;

use wizard::WizardStep;

/// The zip archive produced by the last successful generation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArchiveBundle {
    pub file_name: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub size: usize,
    pub entry_count: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectState {
    pub current_step: WizardStep,
    pub recipients: Vec<Recipient>,
    pub document_details: Option<DocumentDetails>,
    pub design: Option<DesignTemplate>,
    pub template: Option<DocumentTemplate>,
    pub feedback: Vec<FeedbackItem>,
    pub approved: bool,
    pub generated_files: Vec<GeneratedFile>,
    pub archive: Option<ArchiveBundle>,
}

/// Shared handle to the single in-memory project.
pub type ProjectStore = RwLock<ProjectState>;

const API_PATH: &str = "/api/project";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(get_project))
        .route("/details", post().to(set_details))
        .route("/advance", post().to(advance_step))
        .route("/back", post().to(back_step))
        .route("/approve", post().to(approve))
        .route("/reset", post().to(reset))
        .route("/feedback", get().to(list_feedback))
        .route("/feedback", post().to(add_feedback))
        .route("/feedback/{index}", delete().to(remove_feedback))
}

async fn get_project(store: web::Data<ProjectStore>) -> impl Responder {
    let state = store.read().await;
    HttpResponse::Ok().json(&*state)
}

async fn set_details(
    store: web::Data<ProjectStore>,
    payload: web::Json<DocumentDetails>,
) -> impl Responder {
    let mut state = store.write().await;
    state.document_details = Some(payload.into_inner());
    // Editing the event invalidates an earlier approval.
    state.approved = false;
    HttpResponse::Ok().finish()
}

fn step_body(step: WizardStep) -> serde_json::Value {
    serde_json::json!({ "step": step, "number": step.number() })
}

async fn advance_step(store: web::Data<ProjectStore>) -> impl Responder {
    let mut state = store.write().await;
    match wizard::advance(&state) {
        Ok(next) => {
            state.current_step = next;
            HttpResponse::Ok().json(step_body(next))
        }
        Err(err) => HttpResponse::BadRequest().body(err.to_string()),
    }
}

async fn back_step(store: web::Data<ProjectStore>) -> impl Responder {
    let mut state = store.write().await;
    state.current_step = wizard::back(state.current_step);
    HttpResponse::Ok().json(step_body(state.current_step))
}

async fn approve(store: web::Data<ProjectStore>) -> impl Responder {
    let mut state = store.write().await;
    if state.template.is_none() {
        return HttpResponse::BadRequest().body("템플릿이 없습니다");
    }
    state.approved = true;
    HttpResponse::Ok().finish()
}

async fn reset(store: web::Data<ProjectStore>) -> impl Responder {
    let mut state = store.write().await;
    *state = ProjectState::default();
    HttpResponse::Ok().finish()
}

async fn list_feedback(store: web::Data<ProjectStore>) -> impl Responder {
    let state = store.read().await;
    HttpResponse::Ok().json(&state.feedback)
}

async fn add_feedback(
    store: web::Data<ProjectStore>,
    payload: web::Json<FeedbackItem>,
) -> impl Responder {
    let mut state = store.write().await;
    state.feedback.push(payload.into_inner());
    HttpResponse::Ok().json(state.feedback.len())
}

async fn remove_feedback(
    store: web::Data<ProjectStore>,
    index: web::Path<usize>,
) -> impl Responder {
    let mut state = store.write().await;
    let index = index.into_inner();
    if index >= state.feedback.len() {
        return HttpResponse::NotFound().body("해당 피드백이 없습니다");
    }
    state.feedback.remove(index);
    HttpResponse::Ok().finish()
}
