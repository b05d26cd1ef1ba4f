//! Template generation and preview.
//!
//! Routes under `/api/templates`:
//! - `GET /designs`: the built-in design gallery.
//! - `POST /generate`: build the initial template for the chosen design from
//!   the stored event details; stores template and design on the project and
//!   clears any earlier approval.
//! - `GET /preview/{recipient_id}`: HTML preview of one recipient's
//!   personalized invitation.

pub mod generate;
pub mod html;
pub mod placeholder;

use actix_web::web::{get, post, scope};
use actix_web::{web, HttpResponse, Responder, Scope};

use common::model::design::{builtin_designs, find_design};
use common::requests::GenerateTemplateRequest;

use crate::project::ProjectStore;

const API_PATH: &str = "/api/templates";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/designs", get().to(designs))
        .route("/generate", post().to(generate_template))
        .route("/preview/{recipient_id}", get().to(preview))
}

async fn designs() -> impl Responder {
    HttpResponse::Ok().json(builtin_designs())
}

async fn generate_template(
    store: web::Data<ProjectStore>,
    payload: web::Json<GenerateTemplateRequest>,
) -> impl Responder {
    let design = match find_design(&payload.design_id) {
        Some(design) => design,
        None => return HttpResponse::NotFound().body("해당 디자인이 없습니다"),
    };

    let mut state = store.write().await;
    let details = match &state.document_details {
        Some(details) if details.is_complete() => details.clone(),
        Some(details) => {
            return HttpResponse::BadRequest().body(format!(
                "이벤트 정보가 완성되지 않았습니다: {}",
                details.missing_required_fields().join(", ")
            ))
        }
        None => return HttpResponse::BadRequest().body("이벤트 정보가 없습니다"),
    };

    let template = generate::initial_template(&details, &design);
    state.template = Some(template.clone());
    state.design = Some(design);
    state.approved = false;
    HttpResponse::Ok().json(template)
}

async fn preview(store: web::Data<ProjectStore>, recipient_id: web::Path<String>) -> impl Responder {
    let state = store.read().await;
    let (template, design) = match (&state.template, &state.design) {
        (Some(t), Some(d)) => (t, d),
        _ => return HttpResponse::BadRequest().body("템플릿을 먼저 생성해주세요"),
    };
    let recipient_id = recipient_id.into_inner();
    match state.recipients.iter().find(|r| r.id == recipient_id) {
        Some(recipient) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(html::render_preview(template, design, recipient)),
        None => HttpResponse::NotFound().body("해당 수신자가 없습니다"),
    }
}
