pub mod analytics;
pub mod collections;
pub mod dashboard;
pub mod health;

use actix_web::{HttpRequest, HttpResponse};
use heyway_types::ErrorResponse;

use crate::db::StoreError;

/// Log the store failure and answer with a generic 500; details stay in the log.
pub fn store_failure(context: &str, err: &StoreError, message: &str) -> HttpResponse {
    log::error!("Error {}: {}", context, err);
    HttpResponse::InternalServerError().json(ErrorResponse::new(message))
}

/// Fallback for unmatched routes.
pub async fn not_found(req: HttpRequest) -> HttpResponse {
    let message = if req.path().starts_with("/api") {
        "API endpoint not found"
    } else {
        "Not found"
    };
    HttpResponse::NotFound().json(ErrorResponse::new(message))
}

#[cfg(test)]
pub mod test_support {
    use std::sync::Arc;
    use std::time::Instant;

    use actix_web::web;

    use crate::config::Config;
    use crate::db::memory::MemoryStore;
    use crate::AppState;

    pub fn state(store: MemoryStore) -> web::Data<AppState> {
        let config = Config::from_lookup(|name| {
            (name == "MONGO_URI").then(|| "mongodb://localhost:27017/heyway_test".to_string())
        })
        .expect("test config");
        web::Data::new(AppState {
            store: Arc::new(store),
            config,
            start_time: Instant::now(),
        })
    }
}
