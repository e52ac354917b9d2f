use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum LeaveType {
    PaidTimeOff,
    SickLeave,
    UnpaidLeave,
    Other,
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    /// `approved` and `rejected` are terminal; only `pending` can move.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LeaveStatus::Pending)
    }
}

/// A leave request. The register keeps these newest-first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeOffRequest {
    /// Timestamp-derived, strictly increasing.
    pub id: i64,
    pub employee_id: String,
    pub employee_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub leave_type: LeaveType,
    #[serde(default)]
    pub reason: Option<String>,
    /// Inclusive day count of the range.
    pub days: i64,
    pub status: LeaveStatus,
    pub created_at: DateTime<Utc>,
}

impl TimeOffRequest {
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }

    /// Search-box match over name, type and status.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.employee_name.to_lowercase().contains(&term)
            || self.leave_type.to_string().contains(&term)
            || self.status.to_string().contains(&term)
    }
}
