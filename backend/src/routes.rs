use std::time::Instant;

use actix_multipart::Multipart;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{web, App, HttpResponse, Responder};
use inferences::classify_image;
use log::{error, info, warn};

use crate::models::{ErrorDetail, HealthResponse, PredictResponse};
use crate::state::AppState;
use crate::upload::{read_upload, UploadError};

async fn health(state: web::Data<AppState>) -> impl Responder {
    if state.model_ready() {
        HttpResponse::Ok().json(HealthResponse::healthy())
    } else {
        HttpResponse::ServiceUnavailable()
            .json(HealthResponse::unavailable(state.load_error.as_deref()))
    }
}

async fn metrics(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(state.metrics.render())
}

async fn predict(state: web::Data<AppState>, payload: Multipart) -> impl Responder {
    state.metrics.record_predict();

    let upload = match read_upload(payload, state.max_upload_bytes).await {
        Ok(Some(upload)) => upload,
        Ok(None) => {
            return HttpResponse::UnprocessableEntity().json(ErrorDetail::new("No file uploaded"))
        }
        Err(e @ UploadError::TooLarge(_)) => {
            warn!("Rejected upload: {}", e);
            return HttpResponse::PayloadTooLarge().json(ErrorDetail::new(e.to_string()));
        }
        Err(e) => {
            warn!("Rejected upload: {}", e);
            return HttpResponse::BadRequest().json(ErrorDetail::new(e.to_string()));
        }
    };

    if !upload.has_allowed_type() {
        warn!(
            "Rejected {} with content type {:?}",
            upload.filename, upload.content_type
        );
        return HttpResponse::BadRequest().json(ErrorDetail::new(
            "Invalid file type. Please upload a JPEG or PNG.",
        ));
    }

    let filename = upload.filename;
    let bytes = upload.bytes;
    let classifier = state.classifier.clone();

    let started = Instant::now();
    let outcome = web::block(move || classify_image(classifier.as_deref(), &bytes)).await;
    let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
    state.metrics.record_latency(latency_ms);

    let message = match outcome {
        Ok(Ok(result)) => {
            info!(
                "prediction filename={} label={} confidence={:.4} latency_ms={:.2}",
                filename, result.label, result.confidence, latency_ms
            );
            return HttpResponse::Ok().json(PredictResponse::new(filename, result));
        }
        Ok(Err(e)) => e.to_string(),
        Err(e) => e.to_string(),
    };

    state.metrics.record_failure();
    error!(
        "prediction failed filename={} error={} latency_ms={:.2}",
        filename, message, latency_ms
    );
    HttpResponse::InternalServerError().json(ErrorDetail::processing(&message))
}

async fn not_found() -> impl Responder {
    HttpResponse::NotFound().json(ErrorDetail::new("Not Found"))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/metrics", web::get().to(metrics))
        .route("/predict", web::post().to(predict));
}

/// The full application: routes, access log, and the request counter.
pub fn build_app(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let counter = state.clone();

    App::new()
        .app_data(state)
        .wrap(Logger::default())
        .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
        .wrap_fn(move |req, srv| {
            counter.metrics.record_request();
            srv.call(req)
        })
        .configure(configure)
        .default_service(web::route().to(not_found))
}
