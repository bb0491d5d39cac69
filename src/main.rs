mod config;
mod core;
mod models;
mod routes;
mod services;

use crate::core::{Matcher, MatcherConfig};
use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use chrono::FixedOffset;
use crate::config::Settings;
use crate::routes::shelters::AppState;
use crate::services::{
    load_catalog, ChatCompletionOracle, OpenWeatherGeocoder, SessionStore, SmsSender,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .content_type("application/json")
            .body(serde_json::to_string(self).unwrap())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(
    err: error::JsonPayloadError,
    req: &actix_web::HttpRequest,
) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(
    err: error::QueryPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting ShelterSearch matching service...");

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    // Load the shelter catalog once; scoring runs against this in-memory copy
    let catalog = load_catalog(&settings.catalog.path).unwrap_or_else(|e| {
        error!("Failed to load catalog from {}: {}", settings.catalog.path, e);
        panic!("Catalog error: {}", e);
    });

    info!(
        "Catalog loaded ({} shelter records from {})",
        catalog.len(),
        settings.catalog.path
    );

    // Oracle clients
    let geocoder = Arc::new(OpenWeatherGeocoder::new(
        settings.geocoding.base_url.clone(),
        settings.geocoding.api_key.clone(),
    ));

    let oracle = Arc::new(ChatCompletionOracle::new(
        settings.semantic.base_url.clone(),
        settings.semantic.api_key.clone(),
        settings.semantic.model.clone(),
    ));

    let sms = match &settings.sms {
        Some(sms_settings) => {
            info!("SMS notifications enabled from {}", sms_settings.from_number);
            Some(Arc::new(SmsSender::new(
                sms_settings.base_url.clone(),
                sms_settings.account_sid.clone(),
                sms_settings.auth_token.clone(),
                sms_settings.from_number.clone(),
            )))
        }
        None => {
            warn!("SMS settings absent, shortlist texting disabled");
            None
        }
    };

    // Matching engine
    let matcher_config = MatcherConfig {
        shortlist_size: settings.matching.shortlist_size,
        oracle_timeout: Duration::from_secs(settings.matching.oracle_timeout_secs),
    };

    let matcher = Arc::new(Matcher::new(geocoder, oracle, matcher_config));

    let timezone = FixedOffset::east_opt(settings.matching.utc_offset_hours * 3600)
        .unwrap_or_else(|| {
            error!(
                "Invalid UTC offset {}, falling back to UTC",
                settings.matching.utc_offset_hours
            );
            FixedOffset::east_opt(0).unwrap()
        });

    info!(
        "Matcher initialized (shortlist: {}, oracle timeout: {}s, offset: {})",
        settings.matching.shortlist_size, settings.matching.oracle_timeout_secs, timezone
    );

    // Session store for cached shortlists
    let sessions = Arc::new(SessionStore::new(
        settings.session.capacity,
        settings.session.ttl_secs,
    ));

    // Build application state
    let app_state = AppState {
        matcher,
        catalog: Arc::new(catalog),
        sessions,
        sms,
        timezone,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
