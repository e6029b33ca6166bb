use actix_web::{web, HttpResponse};
use chrono::Utc;

use crate::stats::dashboard;
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/dashboard/stats").route(web::get().to(get_stats)));
}

/// GET /api/dashboard/stats
async fn get_stats(state: web::Data<AppState>) -> HttpResponse {
    match dashboard::load(state.store.as_ref(), Utc::now()).await {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => super::store_failure(
            "fetching dashboard stats",
            &e,
            "Failed to fetch dashboard statistics",
        ),
    }
}
