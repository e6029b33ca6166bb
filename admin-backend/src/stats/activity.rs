//! Per-user call activity: the leaderboard ranking and the enriched user list.

use chrono::{DateTime, Utc};
use heyway_types::{ActivitySummary, UserActivity};
use mongodb::bson::{Bson, Document};
use serde_json::Value;

use crate::db::{fields, json, CallerActivity};

/// Calls are timed by `createdAt`, falling back to `startedAt`.
const CALL_TIME_FIELDS: [&str; 2] = ["createdAt", "startedAt"];

/// Group calls created at or after `since` by `userId` and keep the `limit`
/// busiest callers. Ties go to the caller with the most recent call.
pub fn rank_callers(calls: &[Document], since: DateTime<Utc>, limit: usize) -> Vec<CallerActivity> {
    let mut ranked: Vec<CallerActivity> = Vec::new();

    for call in calls {
        let Some(at) = fields::get_datetime(call, "createdAt") else {
            continue;
        };
        if at < since {
            continue;
        }
        let user_id = call.get("userId").cloned().unwrap_or(Bson::Null);
        match ranked.iter_mut().find(|entry| entry.user_id == user_id) {
            Some(entry) => {
                entry.call_count += 1;
                if entry.last_call.map_or(true, |last| at > last) {
                    entry.last_call = Some(at);
                }
            }
            None => ranked.push(CallerActivity {
                user_id,
                call_count: 1,
                last_call: Some(at),
            }),
        }
    }

    ranked.sort_by(|a, b| {
        b.call_count
            .cmp(&a.call_count)
            .then_with(|| b.last_call.cmp(&a.last_call))
    });
    ranked.truncate(limit);
    ranked
}

/// Calls placed by the user with this `_id`.
fn calls_of<'a>(user: &Document, calls: &'a [Document]) -> Vec<&'a Document> {
    match user.get("_id") {
        Some(id) => calls.iter().filter(|c| c.get("userId") == Some(id)).collect(),
        None => Vec::new(),
    }
}

/// Activity summary for one user. Returns the raw last-activity time too,
/// so callers can sort without reparsing.
pub fn activity_for(
    user: &Document,
    calls: &[Document],
    now: DateTime<Utc>,
) -> (UserActivity, Option<DateTime<Utc>>) {
    let since = super::window_start(now);
    let own = calls_of(user, calls);

    let last_call = own
        .iter()
        .filter_map(|c| fields::first_datetime(c, &CALL_TIME_FIELDS))
        .max();
    let last_activity = last_call.or_else(|| fields::first_datetime(user, &["updatedAt", "createdAt"]));

    let call_count = own
        .iter()
        .filter(|c| fields::first_datetime(c, &CALL_TIME_FIELDS).is_some_and(|at| at >= since))
        .count() as u64;

    let total_minutes: f64 = own.iter().map(|c| fields::number_or_zero(c, "duration")).sum();

    let subscription_status = match fields::get_str(user, "subscription.status") {
        Some(status) if !status.is_empty() => status.to_string(),
        _ if fields::is_true(user, "hasActiveSubscription") => "active".to_string(),
        _ => "inactive".to_string(),
    };

    let activity = UserActivity {
        last_activity: last_activity.as_ref().map(json::iso_millis),
        call_count,
        total_minutes: total_minutes.round() as i64,
        subscription_status,
        is_active: call_count > 0,
    };
    (activity, last_activity)
}

/// Every user document with its activity fields merged in, most recently
/// active first. Users with no known activity time sort last.
pub fn users_with_activity(users: &[Document], calls: &[Document], now: DateTime<Utc>) -> Vec<Value> {
    let mut rows: Vec<(Option<DateTime<Utc>>, Value)> = users
        .iter()
        .map(|user| {
            let (activity, last) = activity_for(user, calls, now);
            let mut row = json::document_to_json(user);
            if let (Value::Object(target), Ok(Value::Object(extra))) =
                (&mut row, serde_json::to_value(&activity))
            {
                target.extend(extra);
            }
            (last, row)
        })
        .collect();

    // Option orders None first, so reverse puts users without activity last
    rows.sort_by(|a, b| b.0.cmp(&a.0));
    rows.into_iter().map(|(_, row)| row).collect()
}

/// Headline counts for the user activity view.
pub fn summarize(users: &[Document], calls: &[Document], now: DateTime<Utc>) -> ActivitySummary {
    let mut summary = ActivitySummary {
        total_users: users.len() as u64,
        ..ActivitySummary::default()
    };
    for user in users {
        let (activity, _) = activity_for(user, calls, now);
        if activity.is_active {
            summary.active_users += 1;
        }
        match activity.subscription_status.as_str() {
            "active" => summary.paid_users += 1,
            "trial" => summary.trial_users += 1,
            _ => {}
        }
        summary.total_calls += activity.call_count;
    }
    summary
}
