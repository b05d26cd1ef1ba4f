//! Recipient management: manual entry, bulk import, validation and export.
//!
//! Routes under `/api/recipients`:
//! - `GET ""`: current recipient list.
//! - `POST ""`: add one recipient from a form row; rejected with the
//!   validation reasons if name/email are missing or malformed.
//! - `DELETE /{id}`: remove by id (list is filtered, never mutated in place).
//! - `POST /import`: multipart upload of a `.csv` or `.json` file. Parses,
//!   validates and returns the `ValidationReport` without touching the
//!   stored list — the caller decides what to do with it.
//! - `POST /confirm`: store a list of recipients (typically the `valid`
//!   half of an import report), replacing the current list.
//! - `GET /template.csv`: downloadable import skeleton
//!   (`?lang=en|ko&sample=true|false`).
//! - `GET /export.csv`: current list as CSV with UTF-8 BOM.

pub mod export;
pub mod import;
pub mod validate;

use actix_multipart::Multipart;
use actix_web::web::{delete, get, post, scope};
use actix_web::{web, HttpResponse, Responder, Scope};
use futures_util::StreamExt;
use serde::Deserialize;
use uuid::Uuid;

use common::model::recipient::Recipient;
use common::requests::JsonRecipientRow;

use crate::project::ProjectStore;

const API_PATH: &str = "/api/recipients";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list))
        .route("", post().to(add))
        .route("/{id}", delete().to(remove))
        .route("/import", post().to(import_file))
        .route("/confirm", post().to(confirm))
        .route("/template.csv", get().to(template_csv))
        .route("/export.csv", get().to(export_csv))
}

async fn list(store: web::Data<ProjectStore>) -> impl Responder {
    let state = store.read().await;
    HttpResponse::Ok().json(&state.recipients)
}

async fn add(
    store: web::Data<ProjectStore>,
    payload: web::Json<JsonRecipientRow>,
) -> impl Responder {
    let row = payload.into_inner();
    let recipient = Recipient {
        id: Uuid::new_v4().to_string(),
        name: row.name.trim().to_string(),
        organization: row
            .organization
            .or(row.company)
            .unwrap_or_default()
            .trim()
            .to_string(),
        email: row.email.trim().to_string(),
        phone: row.phone.trim().to_string(),
        position: row.position.trim().to_string(),
    };

    let report = validate::validate_recipients(std::slice::from_ref(&recipient));
    if let Some(invalid) = report.invalid.first() {
        return HttpResponse::BadRequest().json(&invalid.errors);
    }

    let mut state = store.write().await;
    state.recipients.push(recipient.clone());
    HttpResponse::Ok().json(recipient)
}

async fn remove(store: web::Data<ProjectStore>, id: web::Path<String>) -> impl Responder {
    let id = id.into_inner();
    let mut state = store.write().await;
    let before = state.recipients.len();
    state.recipients.retain(|r| r.id != id);
    if state.recipients.len() == before {
        HttpResponse::NotFound().body("해당 수신자가 없습니다")
    } else {
        HttpResponse::Ok().finish()
    }
}

/// Read the `file` part of a multipart upload into memory, along with its
/// original filename.
async fn read_upload(mut payload: Multipart) -> Result<(String, Vec<u8>), String> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| format!("업로드 오류: {}", e))?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        if name.as_deref() == Some("file") {
            let filename = field
                .content_disposition()
                .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
                .unwrap_or_default();

            let mut bytes = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk.map_err(|e| format!("업로드 오류: {}", e))?;
                bytes.extend_from_slice(&chunk);
            }
            return Ok((filename, bytes));
        }
    }
    Err("Missing file".to_string())
}

async fn import_file(payload: Multipart) -> impl Responder {
    let (filename, bytes) = match read_upload(payload).await {
        Ok(upload) => upload,
        Err(e) => return HttpResponse::BadRequest().body(e),
    };

    let parsed = if filename.ends_with(".json") {
        import::parse_json(&bytes)
    } else if filename.ends_with(".csv") {
        match String::from_utf8(bytes) {
            Ok(text) => import::parse_csv(&text),
            Err(_) => Err(import::ImportError::NotUtf8),
        }
    } else {
        return HttpResponse::BadRequest().body("파일은 .csv 또는 .json이어야 합니다");
    };

    match parsed {
        Ok(recipients) => {
            let report = validate::validate_recipients(&recipients);
            log::info!(
                "import parsed {} rows: {} valid, {} invalid",
                recipients.len(),
                report.valid.len(),
                report.invalid.len()
            );
            HttpResponse::Ok().json(report)
        }
        Err(e) => HttpResponse::BadRequest().body(e.to_string()),
    }
}

async fn confirm(
    store: web::Data<ProjectStore>,
    payload: web::Json<Vec<Recipient>>,
) -> impl Responder {
    let recipients = payload.into_inner();
    let report = validate::validate_recipients(&recipients);
    if !report.invalid.is_empty() {
        return HttpResponse::BadRequest().json(&report.invalid);
    }
    let mut state = store.write().await;
    state.recipients = report.valid;
    HttpResponse::Ok().json(state.recipients.len())
}

#[derive(Deserialize)]
struct TemplateQuery {
    #[serde(default)]
    lang: Option<String>,
    #[serde(default)]
    sample: Option<bool>,
}

async fn template_csv(query: web::Query<TemplateQuery>) -> impl Responder {
    let language = match query.lang.as_deref() {
        Some("en") => export::HeaderLanguage::English,
        _ => export::HeaderLanguage::Korean,
    };
    let body = export::csv_template(language, query.sample.unwrap_or(true));
    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .body(body)
}

async fn export_csv(store: web::Data<ProjectStore>) -> impl Responder {
    let state = store.read().await;
    let body = export::export_recipients(&state.recipients);
    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .body(body)
}
