use actix_web::{get, post, web, HttpResponse};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;
use crate::types::HealthResponse;

/// Liveness check; does not load anything
#[get("/health")]
pub async fn health(state: web::Data<std::sync::Arc<AppState>>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        success: true,
        message: "ok".to_string(),
        embedding_backend: state.config.embedding_backend.to_string(),
        embedding_model: state.config.embedding_model.clone(),
        ready: state.engine.built_index().is_ok(),
    })
}

/// Load the embedding model and build the index now
#[post("/warmup")]
pub async fn warmup(
    state: web::Data<std::sync::Arc<AppState>>,
) -> Result<HttpResponse, ApiError> {
    info!("Warm-up requested");

    let stats = state.engine.warm_up().await?;

    Ok(HttpResponse::Ok().json(stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configure;
    use actix_web::{http::StatusCode, test, App};
    use faqseek_common::{AppConfig, DistanceMetric};
    use faqseek_vector::testing::{CountingLoader, SAMPLE_CORPUS};
    use faqseek_vector::{CorpusSource, SearchEngine};
    use std::sync::Arc;

    fn state(loader: Arc<CountingLoader>, corpus: &str) -> web::Data<Arc<AppState>> {
        let engine = SearchEngine::new(
            loader,
            CorpusSource::Inline(corpus.to_string()),
            DistanceMetric::Cosine,
        );
        web::Data::new(Arc::new(AppState::new(AppConfig::default(), Arc::new(engine))))
    }

    #[actix_web::test]
    async fn test_health_reports_readiness() {
        let loader = Arc::new(CountingLoader::new());
        let app = test::init_service(
            App::new()
                .app_data(state(loader.clone(), SAMPLE_CORPUS))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: HealthResponse = test::call_and_read_body_json(&app, req).await;
        assert!(body.success);
        assert!(!body.ready);
        assert_eq!(body.embedding_backend, "ollama");
        assert_eq!(loader.loads(), 0);

        let req = test::TestRequest::post().uri("/warmup").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: HealthResponse = test::call_and_read_body_json(&app, req).await;
        assert!(body.ready);
        assert_eq!(loader.loads(), 1);
    }

    #[actix_web::test]
    async fn test_warmup_failure_can_be_retried() {
        let loader = Arc::new(CountingLoader::new().failing_first(1));
        let app = test::init_service(
            App::new()
                .app_data(state(loader.clone(), SAMPLE_CORPUS))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post().uri("/warmup").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let req = test::TestRequest::post().uri("/warmup").to_request();
        let stats: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(stats["entries"], 7);
        assert_eq!(loader.loads(), 2);
    }
}
