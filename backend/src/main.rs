mod config;
mod job_controller;
mod project;
mod services;

use crate::config::{AppConfig, EnvSecretStore, SecretStore};
use crate::job_controller::state::JobsState;
use crate::project::{ProjectState, ProjectStore};
use crate::services::revision::client::{OpenAiChatClient, TextGenerator};
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::info;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let app_config = AppConfig::from_env();

    // Text-generation credential: GENERATION_API_KEY wins, OPENAI_API_KEY
    // is the conventional fallback.
    let secrets: Arc<dyn SecretStore> = if std::env::var("GENERATION_API_KEY").is_ok() {
        Arc::new(EnvSecretStore::new("GENERATION_API_KEY"))
    } else {
        Arc::new(EnvSecretStore::new("OPENAI_API_KEY"))
    };
    let generator: Arc<dyn TextGenerator> = Arc::new(OpenAiChatClient::new(
        app_config.generation_base_url.clone(),
        app_config.generation_model.clone(),
        secrets,
    ));

    // Initialize job controller state and start the updater task.
    let (tx, rx) = mpsc::channel(100);
    let jobs_state = JobsState::new(tx);
    let updater_state = jobs_state.clone();
    tokio::spawn(async move {
        job_controller::state::start_job_updater(updater_state, rx).await;
    });

    let project_store: web::Data<ProjectStore> =
        web::Data::new(RwLock::new(ProjectState::default()));

    let host = app_config.host.clone();
    let port = app_config.port;
    info!("Server running at http://{}:{}", host, port);

    let app_config = web::Data::new(app_config);
    let generator = web::Data::new(generator);

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(10 * 1024 * 1024)) // 10 MB
            .app_data(web::Data::new(jobs_state.clone()))
            .app_data(project_store.clone())
            .app_data(app_config.clone())
            .app_data(generator.clone())
            .service(services::recipients::configure_routes())
            .service(services::templates::configure_routes())
            .service(services::revision::configure_routes())
            .service(services::generation::configure_routes())
            .service(services::jobs::configure_routes())
            .service(project::configure_routes())
    })
    .bind((host, port))?
    .run()
    .await
}
