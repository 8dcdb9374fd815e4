use std::sync::Arc;

use actix_web::{web, HttpServer};
use backend::{build_app, AppState, Config};
use inferences::{Classifier, OnnxClassifier};
use log::{error, info};

fn load_state(config: &Config) -> AppState {
    let state = match OnnxClassifier::load(&config.model_path) {
        Ok(model) => {
            info!("Model loaded successfully.");
            AppState::with_classifier(Arc::new(model) as Arc<dyn Classifier>)
        }
        Err(e) => {
            error!("Error loading model: {}", e);
            AppState::unloaded(e.to_string())
        }
    };
    state.with_max_upload_bytes(config.max_upload_bytes)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let config = Config::from_env();
    info!("Starting pet classifier with {:?}", config);

    // a missing model degrades /health instead of aborting startup
    let state = web::Data::new(load_state(&config));

    let bind_address = config.bind_address();
    info!("Listening on http://{} with {} workers", bind_address, config.workers);
    info!("   GET  /health");
    info!("   GET  /metrics");
    info!("   POST /predict");

    HttpServer::new(move || build_app(state.clone()))
        .workers(config.workers)
        .bind(&bind_address)?
        .run()
        .await
}
