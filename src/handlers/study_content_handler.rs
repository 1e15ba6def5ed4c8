use actix_web::{get, post, web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::{
    app_state::AppState,
    errors::AppError,
    models::{
        domain::StructuredContent,
        dto::{
            request::StudyContentRequest,
            response::{FlashcardsResponse, InvalidateResponse, StudyContentResponse},
        },
    },
};

#[post("/api/study-content")]
async fn generate_study_content(
    state: web::Data<AppState>,
    request: web::Json<StudyContentRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let request_id = Uuid::new_v4();
    log::info!("[{}] Study content requested for '{}'", request_id, request.topic);

    let outcome = state
        .study_content_service
        .generate(&request.topic, &request.context())
        .await;
    log::info!(
        "[{}] Served study content (source: {:?}, cached: {})",
        request_id,
        outcome.source,
        outcome.cached
    );

    Ok(HttpResponse::Ok().json(StudyContentResponse::from(outcome)))
}

#[post("/api/study-content/flashcards")]
async fn generate_flashcards(
    state: web::Data<AppState>,
    request: web::Json<StudyContentRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let request_id = Uuid::new_v4();
    log::info!("[{}] Flashcards requested for '{}'", request_id, request.topic);

    let deck = state
        .study_content_service
        .generate_flashcards(&request.topic, &request.context())
        .await;
    log::info!(
        "[{}] Served {} flashcards (cached: {})",
        request_id,
        deck.flashcards.len(),
        deck.cached
    );

    Ok(HttpResponse::Ok().json(FlashcardsResponse::from(deck)))
}

#[post("/api/study-content/invalidate")]
async fn invalidate_study_content(
    state: web::Data<AppState>,
    request: web::Json<StudyContentRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    state
        .study_content_service
        .invalidate(&request.topic, &request.context())
        .await?;

    Ok(HttpResponse::Ok().json(InvalidateResponse {
        message: format!("Cached study content for '{}' was cleared", request.topic),
    }))
}

#[get("/api/study-content/schema")]
async fn study_content_schema() -> HttpResponse {
    HttpResponse::Ok().json(schemars::schema_for!(StructuredContent))
}

#[get("/health")]
async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let storage = match &state.db {
        Some(db) => {
            if db.health_check().await.is_ok() {
                "ok"
            } else {
                "error"
            }
        }
        None => "memory",
    };

    let response = serde_json::json!({
        "status": if storage == "error" { "degraded" } else { "healthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "dependencies": {
            "storage": storage
        }
    });

    if storage == "error" {
        HttpResponse::ServiceUnavailable().json(response)
    } else {
        HttpResponse::Ok().json(response)
    }
}
