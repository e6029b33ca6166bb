//! Dashboard summary: counts, ratios, revenue, the 30-day growth curve and the
//! most-active-users leaderboard.

use chrono::{DateTime, Duration, Utc};
use heyway_types::{ActiveUser, DailyGrowth, DashboardStats};
use mongodb::bson::{Bson, Document};

use crate::db::{fields, json, CallerActivity, Collection, CollectionStore, StoreError};

/// Leaderboard size.
pub const MOST_ACTIVE_LIMIT: usize = 10;

const UNKNOWN: &str = "Unknown";

/// Everything the summary is computed from, fetched up front.
#[derive(Debug, Default)]
pub struct DashboardInputs {
    pub users: Vec<Document>,
    pub calls: Vec<Document>,
    pub subscriptions: Vec<Document>,
    pub automations: Vec<Document>,
    pub contacts: Vec<Document>,
    pub recordings: Vec<Document>,
    pub usage: Vec<Document>,
    pub contact_lists: Vec<Document>,
    /// Distinct caller ids inside the activity window.
    pub recent_callers: Vec<Bson>,
    pub top_callers: Vec<CallerActivity>,
}

/// Fetch all inputs concurrently and compute the summary.
pub async fn load(store: &dyn CollectionStore, now: DateTime<Utc>) -> Result<DashboardStats, StoreError> {
    let since = super::window_start(now);
    let (users, calls, subscriptions, automations, contacts, recordings, usage, contact_lists) =
        futures_util::try_join!(
            store.find_all(Collection::Users),
            store.find_all(Collection::Calls),
            store.find_all(Collection::Subscriptions),
            store.find_all(Collection::Automations),
            store.find_all(Collection::Contacts),
            store.find_all(Collection::Recordings),
            store.find_all(Collection::Usage),
            store.find_all(Collection::ContactLists),
        )?;
    let (recent_callers, top_callers) = futures_util::try_join!(
        store.distinct_callers_since(since),
        store.top_callers_since(since, MOST_ACTIVE_LIMIT),
    )?;

    let inputs = DashboardInputs {
        users,
        calls,
        subscriptions,
        automations,
        contacts,
        recordings,
        usage,
        contact_lists,
        recent_callers,
        top_callers,
    };
    Ok(compute(&inputs, now))
}

fn count(docs: &[Document], pred: impl Fn(&Document) -> bool) -> u64 {
    docs.iter().filter(|d| pred(d)).count() as u64
}

fn sum(docs: &[Document], path: &str) -> f64 {
    docs.iter().map(|d| fields::number_or_zero(d, path)).sum()
}

pub fn compute(inputs: &DashboardInputs, now: DateTime<Utc>) -> DashboardStats {
    let users = &inputs.users;
    let calls = &inputs.calls;

    let total_calls = calls.len() as u64;
    let successful_calls = count(calls, |c| fields::get_str(c, "status") == Some("completed"));

    DashboardStats {
        total_users: users.len() as u64,
        active_users: count(users, |u| {
            fields::get_str(u, "subscription.status") == Some("active")
                || fields::is_true(u, "hasActiveSubscription")
        }),
        last_active_users: count(users, |u| {
            u.get("_id").is_some_and(|id| inputs.recent_callers.contains(id))
        }),

        total_calls,
        successful_calls,
        call_success_rate: super::percentage(successful_calls, total_calls),
        inbound_calls: count(calls, |c| fields::is_true(c, "isInbound")),
        outbound_calls: count(calls, |c| fields::is_false(c, "isInbound")),

        active_automations: count(&inputs.automations, |a| fields::is_true(a, "isActive")),
        total_automations: inputs.automations.len() as u64,

        total_minutes_used: sum(&inputs.usage, "minutesUsed"),
        free_users: count(users, |u| fields::get_f64(u, "freeMinutes").is_some_and(|m| m > 0.0)),
        paid_users: count(users, |u| fields::is_true(u, "hasActiveSubscription")),

        total_contacts: inputs.contacts.len() as u64,
        total_recordings: inputs.recordings.len() as u64,
        contact_list_activity: count(&inputs.contact_lists, |cl| {
            fields::is_truthy(cl, "metadata.lastUsed")
        }),

        total_revenue: sum(&inputs.subscriptions, "amount"),
        monthly_revenue: monthly_revenue(&inputs.subscriptions, now),

        user_growth_by_day: user_growth_by_day(users, now),
        most_active_users: most_active_users(users, &inputs.top_callers),
    }
}

/// Revenue from subscriptions created in the calendar month containing `now`.
pub fn monthly_revenue(subscriptions: &[Document], now: DateTime<Utc>) -> f64 {
    let month = super::months_back(now, 0);
    subscriptions
        .iter()
        .filter(|s| fields::get_datetime(s, "createdAt").is_some_and(|at| super::in_month(at, month)))
        .map(|s| fields::number_or_zero(s, "amount"))
        .sum()
}

/// Signups per UTC day for the window ending today, oldest first.
pub fn user_growth_by_day(users: &[Document], now: DateTime<Utc>) -> Vec<DailyGrowth> {
    let today = super::day_start(now);
    let created: Vec<DateTime<Utc>> = users
        .iter()
        .filter_map(|u| fields::get_datetime(u, "createdAt"))
        .collect();

    let mut cumulative = 0;
    (0..super::ACTIVITY_WINDOW_DAYS)
        .rev()
        .map(|back| {
            let start = today - Duration::days(back);
            let end = start + Duration::days(1);
            let signups = created.iter().filter(|at| **at >= start && **at < end).count() as u64;
            cumulative += signups;
            DailyGrowth {
                date: start.format("%Y-%m-%d").to_string(),
                users: signups,
                cumulative,
            }
        })
        .collect()
}

/// Join leaderboard rows with the user profiles they refer to.
pub fn most_active_users(users: &[Document], top_callers: &[CallerActivity]) -> Vec<ActiveUser> {
    top_callers
        .iter()
        .map(|caller| {
            let user = users.iter().find(|u| u.get("_id") == Some(&caller.user_id));
            let text = |path: &str, fallback: &str| {
                user.and_then(|u| fields::get_str(u, path))
                    .filter(|s| !s.is_empty())
                    .unwrap_or(fallback)
                    .to_string()
            };
            ActiveUser {
                user_id: json::to_json(&caller.user_id),
                name: text("name", UNKNOWN),
                email: text("email", UNKNOWN),
                call_count: caller.call_count,
                last_call_date: caller.last_call.as_ref().map(json::iso_millis),
                subscription: text("subscription.status", "inactive"),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use chrono::TimeZone;
    use mongodb::bson::{doc, oid::ObjectId};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 30, 15, 30, 0).unwrap()
    }

    fn date(days_ago: i64) -> mongodb::bson::DateTime {
        mongodb::bson::DateTime::from_millis((now() - Duration::days(days_ago)).timestamp_millis())
    }

    #[test]
    fn test_empty_inputs() {
        let stats = compute(&DashboardInputs::default(), now());
        assert_eq!(stats.total_users, 0);
        assert_eq!(stats.total_calls, 0);
        assert_eq!(stats.call_success_rate, 0.0);
        assert_eq!(stats.total_revenue, 0.0);
        assert_eq!(stats.user_growth_by_day.len(), 30);
        assert!(stats.user_growth_by_day.iter().all(|d| d.users == 0 && d.cumulative == 0));
        assert!(stats.most_active_users.is_empty());
    }

    #[test]
    fn test_user_and_call_counts() {
        let inputs = DashboardInputs {
            users: vec![
                doc! { "subscription": { "status": "active" }, "freeMinutes": 0 },
                doc! { "hasActiveSubscription": true, "freeMinutes": 15 },
                doc! { "hasActiveSubscription": false, "freeMinutes": 5.5 },
                doc! { "subscription": { "status": "canceled" } },
            ],
            calls: vec![
                doc! { "status": "completed", "isInbound": true },
                doc! { "status": "completed", "isInbound": false },
                doc! { "status": "failed", "isInbound": false },
                doc! { "status": "in-progress" },
            ],
            automations: vec![
                doc! { "isActive": true },
                doc! { "isActive": false },
                doc! { "isActive": "yes" },
            ],
            ..Default::default()
        };

        let stats = compute(&inputs, now());
        assert_eq!(stats.total_users, 4);
        assert_eq!(stats.active_users, 2);
        assert_eq!(stats.paid_users, 1);
        assert_eq!(stats.free_users, 2);
        assert_eq!(stats.total_calls, 4);
        assert_eq!(stats.successful_calls, 2);
        assert_eq!(stats.call_success_rate, 50.0);
        assert_eq!(stats.inbound_calls, 1);
        assert_eq!(stats.outbound_calls, 2);
        assert_eq!(stats.active_automations, 1);
        assert_eq!(stats.total_automations, 3);
    }

    #[test]
    fn test_revenue_and_usage_sums() {
        let inputs = DashboardInputs {
            subscriptions: vec![
                doc! { "amount": 20, "createdAt": date(2) },
                doc! { "amount": 9.5, "createdAt": date(45) },
                doc! { "createdAt": date(1) },
                doc! { "amount": 100_i64, "createdAt": "2025-06-01T00:00:00Z" },
            ],
            usage: vec![doc! { "minutesUsed": 12 }, doc! { "minutesUsed": 3.5 }, doc! {}],
            contact_lists: vec![
                doc! { "metadata": { "lastUsed": date(3) } },
                doc! { "metadata": { "lastUsed": null } },
                doc! { "metadata": {} },
            ],
            contacts: vec![doc! {}, doc! {}],
            recordings: vec![doc! {}],
            ..Default::default()
        };

        let stats = compute(&inputs, now());
        assert_eq!(stats.total_revenue, 129.5);
        assert_eq!(stats.monthly_revenue, 120.0);
        assert_eq!(stats.total_minutes_used, 15.5);
        assert_eq!(stats.contact_list_activity, 1);
        assert_eq!(stats.total_contacts, 2);
        assert_eq!(stats.total_recordings, 1);
    }

    #[test]
    fn test_growth_by_day_window() {
        let users = vec![
            doc! { "createdAt": date(0) },
            doc! { "createdAt": date(0) },
            doc! { "createdAt": date(29) },
            doc! { "createdAt": date(30) },
            doc! { "createdAt": "not a date" },
        ];

        let growth = user_growth_by_day(&users, now());
        assert_eq!(growth.len(), 30);
        assert_eq!(growth[0].date, "2025-06-01");
        assert_eq!(growth[0].users, 1);
        assert_eq!(growth[29].date, "2025-06-30");
        assert_eq!(growth[29].users, 2);
        assert_eq!(growth[29].cumulative, 3);
        assert!(growth.windows(2).all(|w| w[0].cumulative <= w[1].cumulative));
    }

    #[test]
    fn test_last_active_users_match_by_id() {
        let active = ObjectId::new();
        let inputs = DashboardInputs {
            users: vec![doc! { "_id": active }, doc! { "_id": ObjectId::new() }],
            recent_callers: vec![Bson::ObjectId(active), Bson::String("orphan".into())],
            ..Default::default()
        };
        assert_eq!(compute(&inputs, now()).last_active_users, 1);
    }

    #[test]
    fn test_most_active_users_join_profiles() {
        let known = ObjectId::new();
        let users = vec![doc! {
            "_id": known,
            "name": "Grace",
            "email": "grace@example.com",
            "subscription": { "status": "active" },
        }];
        let top = vec![
            CallerActivity {
                user_id: Bson::ObjectId(known),
                call_count: 7,
                last_call: Some(now() - Duration::days(1)),
            },
            CallerActivity {
                user_id: Bson::ObjectId(ObjectId::new()),
                call_count: 2,
                last_call: None,
            },
        ];

        let rows = most_active_users(&users, &top);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].user_id, serde_json::Value::String(known.to_hex()));
        assert_eq!(rows[0].name, "Grace");
        assert_eq!(rows[0].subscription, "active");
        assert_eq!(rows[0].last_call_date.as_deref(), Some("2025-06-29T15:30:00.000Z"));
        assert_eq!(rows[1].name, "Unknown");
        assert_eq!(rows[1].email, "Unknown");
        assert_eq!(rows[1].subscription, "inactive");
        assert!(rows[1].last_call_date.is_none());
    }

    #[actix_web::test]
    async fn test_load_from_store() {
        let caller = ObjectId::new();
        let store = MemoryStore::new()
            .with(Collection::Users, vec![doc! { "_id": caller, "name": "Lin", "createdAt": date(3) }])
            .with(
                Collection::Calls,
                vec![
                    doc! { "userId": caller, "status": "completed", "createdAt": date(1) },
                    doc! { "userId": caller, "status": "failed", "createdAt": date(2) },
                ],
            );

        let stats = load(&store, now()).await.unwrap();
        assert_eq!(stats.total_users, 1);
        assert_eq!(stats.last_active_users, 1);
        assert_eq!(stats.call_success_rate, 50.0);
        assert_eq!(stats.most_active_users.len(), 1);
        assert_eq!(stats.most_active_users[0].name, "Lin");
        assert_eq!(stats.most_active_users[0].call_count, 2);
        assert_eq!(stats.user_growth_by_day[26].users, 1);
    }
}
