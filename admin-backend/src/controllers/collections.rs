//! Raw collection dumps and the activity-enriched user list.

use actix_web::{web, HttpResponse};
use chrono::Utc;

use mongodb::bson::Document;

use crate::db::{json, Collection, StoreError};
use crate::stats::activity;
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/users").route(web::get().to(list_users)));
    cfg.service(web::resource("/api/users/activity").route(web::get().to(users_activity)));
    cfg.service(web::resource("/api/users/activity/summary").route(web::get().to(users_activity_summary)));
    cfg.service(web::resource("/api/calls").route(web::get().to(list_calls)));
    cfg.service(web::resource("/api/subscriptions").route(web::get().to(list_subscriptions)));
    cfg.service(web::resource("/api/automations").route(web::get().to(list_automations)));
    cfg.service(web::resource("/api/feedbacks").route(web::get().to(list_feedbacks)));
}

async fn list(state: &AppState, collection: Collection) -> HttpResponse {
    match state.store.find_all(collection).await {
        Ok(docs) => HttpResponse::Ok().json(json::documents_to_json(&docs)),
        Err(e) => super::store_failure(
            &format!("fetching {}", collection),
            &e,
            &format!("Failed to fetch {}", collection),
        ),
    }
}

/// GET /api/users
async fn list_users(state: web::Data<AppState>) -> HttpResponse {
    list(&state, Collection::Users).await
}

/// GET /api/calls
async fn list_calls(state: web::Data<AppState>) -> HttpResponse {
    list(&state, Collection::Calls).await
}

/// GET /api/subscriptions
async fn list_subscriptions(state: web::Data<AppState>) -> HttpResponse {
    list(&state, Collection::Subscriptions).await
}

/// GET /api/automations
async fn list_automations(state: web::Data<AppState>) -> HttpResponse {
    list(&state, Collection::Automations).await
}

/// GET /api/feedbacks
async fn list_feedbacks(state: web::Data<AppState>) -> HttpResponse {
    list(&state, Collection::Feedbacks).await
}

async fn users_and_calls(state: &AppState) -> Result<(Vec<Document>, Vec<Document>), StoreError> {
    futures_util::try_join!(
        state.store.find_all(Collection::Users),
        state.store.find_all(Collection::Calls),
    )
}

/// GET /api/users/activity: users with last activity, recent call count and minutes
async fn users_activity(state: web::Data<AppState>) -> HttpResponse {
    match users_and_calls(&state).await {
        Ok((users, calls)) => {
            HttpResponse::Ok().json(activity::users_with_activity(&users, &calls, Utc::now()))
        }
        Err(e) => super::store_failure("fetching user activity", &e, "Failed to fetch user activity"),
    }
}

/// GET /api/users/activity/summary
async fn users_activity_summary(state: web::Data<AppState>) -> HttpResponse {
    match users_and_calls(&state).await {
        Ok((users, calls)) => HttpResponse::Ok().json(activity::summarize(&users, &calls, Utc::now())),
        Err(e) => super::store_failure(
            "summarising user activity",
            &e,
            "Failed to fetch user activity summary",
        ),
    }
}
