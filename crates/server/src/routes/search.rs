use actix_web::{get, post, web, HttpResponse};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;
use crate::types::SearchRequest;

/// Search the FAQ corpus; responds with the ranked result list
#[post("/search")]
pub async fn search(
    body: web::Json<SearchRequest>,
    state: web::Data<std::sync::Arc<AppState>>,
) -> Result<HttpResponse, ApiError> {
    debug!("POST /search ({} chars)", body.query.len());

    let results = state.engine.search(&body.query).await?;

    Ok(HttpResponse::Ok().json(results))
}

/// Index statistics (503 until the index has been built)
#[get("/search/stats")]
pub async fn search_stats(
    state: web::Data<std::sync::Arc<AppState>>,
) -> Result<HttpResponse, ApiError> {
    let stats = state.engine.stats()?;

    Ok(HttpResponse::Ok().json(stats))
}
