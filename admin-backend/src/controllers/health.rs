use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use heyway_types::HealthStatus;

use crate::db::json::iso_millis;
use crate::AppState;

/// Version from Cargo.toml, available at compile time
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(health_check)));
    cfg.service(web::resource("/api/health/db").route(web::get().to(database_health)));
}

async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthStatus {
        status: "healthy".to_string(),
        timestamp: iso_millis(&Utc::now()),
        uptime: state.start_time.elapsed().as_secs_f64(),
        version: VERSION.to_string(),
    })
}

async fn database_health(state: web::Data<AppState>) -> impl Responder {
    match state.store.ping().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "database": "connected",
            "environment": state.config.environment,
        })),
        Err(e) => {
            log::warn!("Database health check failed: {}", e);
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "error": "Database unreachable"
            }))
        }
    }
}
