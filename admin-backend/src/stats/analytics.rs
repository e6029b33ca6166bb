//! Analytics report: monthly growth and revenue, weekly call volume,
//! retention, plan mix and satisfaction.

use chrono::{DateTime, Duration, Utc};
use heyway_types::{
    AnalyticsReport, DailyCallMetrics, MonthlyGrowth, MonthlyRevenue, PlanShare, RecentActivity,
    RetentionPoint,
};
use mongodb::bson::Document;

use crate::db::{fields, Collection, CollectionStore, StoreError};

const MONTHS_SHOWN: u32 = 6;
const DAYS_SHOWN: i64 = 7;
const RETENTION_DAYS: [i64; 5] = [1, 7, 30, 90, 180];
const PLAN_COLORS: [&str; 6] = ["#8884d8", "#82ca9d", "#ffc658", "#ff8042", "#0088fe", "#00c49f"];
const MAX_RATING: f64 = 5.0;
const NEW_USER_DAYS: i64 = 7;

#[derive(Debug, Default)]
pub struct AnalyticsInputs {
    pub users: Vec<Document>,
    pub calls: Vec<Document>,
    pub subscriptions: Vec<Document>,
    pub feedbacks: Vec<Document>,
}

pub async fn load(store: &dyn CollectionStore, now: DateTime<Utc>) -> Result<AnalyticsReport, StoreError> {
    let (users, calls, subscriptions, feedbacks) = futures_util::try_join!(
        store.find_all(Collection::Users),
        store.find_all(Collection::Calls),
        store.find_all(Collection::Subscriptions),
        store.find_all(Collection::Feedbacks),
    )?;
    let inputs = AnalyticsInputs {
        users,
        calls,
        subscriptions,
        feedbacks,
    };
    Ok(compute(&inputs, now))
}

pub fn compute(inputs: &AnalyticsInputs, now: DateTime<Utc>) -> AnalyticsReport {
    AnalyticsReport {
        user_growth: user_growth(&inputs.users, now),
        call_metrics: call_metrics(&inputs.calls, now),
        revenue_data: revenue_data(&inputs.subscriptions, now),
        user_retention: user_retention(&inputs.users, &inputs.calls, now),
        plan_distribution: plan_distribution(&inputs.subscriptions),
        monthly_growth: monthly_growth(&inputs.users, now),
        customer_satisfaction: customer_satisfaction(&inputs.feedbacks),
        recent_activity: recent_activity(inputs, now),
    }
}

fn created_in(docs: &[Document], month: (i32, u32)) -> Vec<&Document> {
    docs.iter()
        .filter(|d| fields::get_datetime(d, "createdAt").is_some_and(|at| super::in_month(at, month)))
        .collect()
}

/// Oldest month first.
fn months_shown(now: DateTime<Utc>) -> impl Iterator<Item = (i32, u32)> {
    (0..MONTHS_SHOWN).rev().map(move |back| super::months_back(now, back))
}

pub fn user_growth(users: &[Document], now: DateTime<Utc>) -> Vec<MonthlyGrowth> {
    let mut total = 0;
    months_shown(now)
        .map(|month| {
            let new_users = created_in(users, month).len() as u64;
            total += new_users;
            MonthlyGrowth {
                month: super::month_name(month.1).to_string(),
                new_users,
                total_users: total,
            }
        })
        .collect()
}

pub fn call_metrics(calls: &[Document], now: DateTime<Utc>) -> Vec<DailyCallMetrics> {
    let today = super::day_start(now);
    (0..DAYS_SHOWN)
        .rev()
        .map(|back| {
            let start = today - Duration::days(back);
            let end = start + Duration::days(1);
            let on_day: Vec<&Document> = calls
                .iter()
                .filter(|c| fields::get_datetime(c, "startedAt").is_some_and(|at| at >= start && at < end))
                .collect();
            let successful = on_day
                .iter()
                .filter(|c| fields::get_str(c, "status") == Some("completed"))
                .count() as u64;
            let total = on_day.len() as u64;
            DailyCallMetrics {
                day: start.format("%a").to_string(),
                calls: total,
                successful,
                failed: total - successful,
            }
        })
        .collect()
}

pub fn revenue_data(subscriptions: &[Document], now: DateTime<Utc>) -> Vec<MonthlyRevenue> {
    months_shown(now)
        .map(|month| {
            let created = created_in(subscriptions, month);
            MonthlyRevenue {
                month: super::month_name(month.1).to_string(),
                revenue: created.iter().map(|s| fields::number_or_zero(s, "amount")).sum(),
                subscriptions: created.len() as u64,
            }
        })
        .collect()
}

/// For each period N: of the users who signed up at least N days ago, the
/// share that placed a call N or more days after signing up.
pub fn user_retention(users: &[Document], calls: &[Document], now: DateTime<Utc>) -> Vec<RetentionPoint> {
    let signups: Vec<(&Document, DateTime<Utc>)> = users
        .iter()
        .filter_map(|u| fields::get_datetime(u, "createdAt").map(|at| (u, at)))
        .collect();

    RETENTION_DAYS
        .iter()
        .map(|&days| {
            let period = Duration::days(days);
            let eligible: Vec<&(&Document, DateTime<Utc>)> =
                signups.iter().filter(|(_, at)| *at + period <= now).collect();
            let retained = eligible
                .iter()
                .filter(|(user, at)| {
                    let Some(id) = user.get("_id") else {
                        return false;
                    };
                    calls.iter().any(|c| {
                        c.get("userId") == Some(id)
                            && fields::first_datetime(c, &["createdAt", "startedAt"])
                                .is_some_and(|call_at| call_at >= *at + period)
                    })
                })
                .count() as u64;
            RetentionPoint {
                period: format!("Day {}", days),
                retention: round1(super::percentage(retained, eligible.len() as u64)),
            }
        })
        .collect()
}

pub fn plan_distribution(subscriptions: &[Document]) -> Vec<PlanShare> {
    let mut counts: Vec<(String, u64)> = Vec::new();
    for sub in subscriptions {
        let plan = fields::get_str(sub, "plan")
            .filter(|p| !p.is_empty())
            .unwrap_or("unknown");
        match counts.iter_mut().find(|(name, _)| name == plan) {
            Some((_, n)) => *n += 1,
            None => counts.push((plan.to_string(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
        .into_iter()
        .enumerate()
        .map(|(i, (plan, count))| PlanShare {
            plan,
            count,
            color: PLAN_COLORS[i % PLAN_COLORS.len()].to_string(),
        })
        .collect()
}

pub fn monthly_growth(users: &[Document], now: DateTime<Utc>) -> f64 {
    let current = created_in(users, super::months_back(now, 0)).len() as f64;
    let previous = created_in(users, super::months_back(now, 1)).len() as f64;
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}

/// Mean rating over every feedback, unrated ones counting as 0, scaled so a
/// perfect score is 100.
pub fn customer_satisfaction(feedbacks: &[Document]) -> f64 {
    if feedbacks.is_empty() {
        return 0.0;
    }
    let total: f64 = feedbacks.iter().map(|f| fields::number_or_zero(f, "rating")).sum();
    let mean = total / feedbacks.len() as f64;
    if mean > 0.0 {
        mean * 100.0 / MAX_RATING
    } else {
        0.0
    }
}

pub fn recent_activity(inputs: &AnalyticsInputs, now: DateTime<Utc>) -> RecentActivity {
    let today = super::day_start(now);
    let tomorrow = today + Duration::days(1);
    let new_since = now - Duration::days(NEW_USER_DAYS);
    let is_today = |at: DateTime<Utc>| at >= today && at < tomorrow;

    RecentActivity {
        new_users_last_7_days: inputs
            .users
            .iter()
            .filter(|u| fields::get_datetime(u, "createdAt").is_some_and(|at| at >= new_since))
            .count() as u64,
        calls_today: inputs
            .calls
            .iter()
            .filter(|c| fields::get_datetime(c, "startedAt").is_some_and(is_today))
            .count() as u64,
        revenue_today: inputs
            .subscriptions
            .iter()
            .filter(|s| fields::get_datetime(s, "createdAt").is_some_and(is_today))
            .map(|s| fields::number_or_zero(s, "amount"))
            .sum(),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
