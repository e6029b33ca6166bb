use actix_web::{web, HttpResponse};
use chrono::Utc;

use crate::stats::analytics;
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/analytics").route(web::get().to(get_analytics)));
}

/// GET /api/analytics
async fn get_analytics(state: web::Data<AppState>) -> HttpResponse {
    match analytics::load(state.store.as_ref(), Utc::now()).await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => super::store_failure("fetching analytics", &e, "Failed to fetch analytics"),
    }
}
