//! FaqSeek HTTP Server
//!
//! Actix-web transport over the search engine

mod error;
pub mod routes;
pub mod state;
pub mod types;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use faqseek_common::AppConfig;
use faqseek_vector::SearchEngine;
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;

pub use error::ApiError;
pub use state::AppState;

/// Register all routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(routes::search::search)
        .service(routes::search::search_stats)
        .service(routes::system::health)
        .service(routes::system::warmup);
}

/// Run the HTTP server until shutdown
pub async fn start_server(config: AppConfig, engine: Arc<SearchEngine>) -> std::io::Result<()> {
    let bind_addr = config.server_bind_address();
    let state = web::Data::new(Arc::new(AppState::new(config, engine)));

    info!("Starting HTTP server on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(TracingLogger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind(&bind_addr)?
    .run()
    .await
}
