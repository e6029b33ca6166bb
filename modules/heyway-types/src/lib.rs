//! Shared response types for the GetHeyway admin API and its dashboard clients.

use serde::{Deserialize, Serialize};

// =====================================================
// Dashboard Stats
// =====================================================

/// Summary returned by `GET /api/dashboard/stats`, recomputed on every request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    // User activity
    pub total_users: u64,
    pub active_users: u64,
    pub last_active_users: u64,

    // Call performance
    pub total_calls: u64,
    pub successful_calls: u64,
    pub call_success_rate: f64,
    pub inbound_calls: u64,
    pub outbound_calls: u64,

    // Automations
    pub active_automations: u64,
    pub total_automations: u64,

    // Usage
    pub total_minutes_used: f64,
    pub free_users: u64,
    pub paid_users: u64,

    // Content & engagement
    pub total_contacts: u64,
    pub total_recordings: u64,
    pub contact_list_activity: u64,

    // Revenue
    pub total_revenue: f64,
    pub monthly_revenue: f64,

    pub user_growth_by_day: Vec<DailyGrowth>,
    pub most_active_users: Vec<ActiveUser>,
}

/// New signups on one UTC day, with the running total inside the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyGrowth {
    /// `YYYY-MM-DD`
    pub date: String,
    pub users: u64,
    pub cumulative: u64,
}

/// One row of the most-active-users leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveUser {
    /// The raw `userId` as stored on the calls, rendered as JSON.
    pub user_id: serde_json::Value,
    pub name: String,
    pub email: String,
    pub call_count: u64,
    pub last_call_date: Option<String>,
    pub subscription: String,
}

// =====================================================
// Analytics
// =====================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub user_growth: Vec<MonthlyGrowth>,
    pub call_metrics: Vec<DailyCallMetrics>,
    pub revenue_data: Vec<MonthlyRevenue>,
    pub user_retention: Vec<RetentionPoint>,
    pub plan_distribution: Vec<PlanShare>,
    /// Percent change of this month's signups against last month's.
    pub monthly_growth: f64,
    /// Mean feedback rating scaled to a percentage.
    pub customer_satisfaction: f64,
    pub recent_activity: RecentActivity,
}

/// Short-horizon figures for the "Recent Activity" panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    /// Users created in the last 7 days.
    pub new_users_last_7_days: u64,
    /// Calls started on the current UTC day.
    pub calls_today: u64,
    /// Sum of `amount` over subscriptions created on the current UTC day.
    pub revenue_today: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyGrowth {
    pub month: String,
    pub new_users: u64,
    pub total_users: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCallMetrics {
    pub day: String,
    pub calls: u64,
    pub successful: u64,
    pub failed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    pub month: String,
    pub revenue: f64,
    pub subscriptions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetentionPoint {
    pub period: String,
    pub retention: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanShare {
    pub plan: String,
    pub count: u64,
    pub color: String,
}

// =====================================================
// User Activity
// =====================================================

/// Per-user activity fields merged into each user document by
/// `GET /api/users/activity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActivity {
    pub last_activity: Option<String>,
    pub call_count: u64,
    pub total_minutes: i64,
    pub subscription_status: String,
    pub is_active: bool,
}

/// Totals over the activity-enriched user list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    pub total_users: u64,
    /// Users with at least one call in the activity window.
    pub active_users: u64,
    /// Users whose subscription status is `active`.
    pub paid_users: u64,
    /// Users whose subscription status is `trial`.
    pub trial_users: u64,
    /// Sum of every user's recent call count.
    pub total_calls: u64,
}

// =====================================================
// Service
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    /// Seconds since the server started.
    pub uptime: f64,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}
