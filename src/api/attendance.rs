use crate::auth::auth::AuthUser;
use crate::model::attendance::AttendanceRecord;
use crate::model::employee::Employee;
use crate::store::Stores;
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AttendanceQuery {
    /// Day to list, defaults to today
    #[param(value_type = Option<String>, example = "2025-11-03")]
    pub date: Option<NaiveDate>,
    /// Search by employee name
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceRow {
    pub employee_id: String,
    pub employee_name: String,
    #[schema(example = "2025-11-03T09:00:00Z", format = "date-time", value_type = String)]
    pub check_in: Option<DateTime<Utc>>,
    #[schema(example = "2025-11-03T17:30:00Z", format = "date-time", value_type = String)]
    pub check_out: Option<DateTime<Utc>>,
    #[schema(example = "Present")]
    pub status: String,
    /// Worked time so far, e.g. "8h 30m"
    #[schema(example = "8h 30m")]
    pub duration: String,
}

impl AttendanceRow {
    fn new(account: Employee, record: AttendanceRecord, now: DateTime<Utc>) -> Self {
        let status = if record.checked_out {
            "Checked Out"
        } else {
            "Present"
        };
        Self {
            employee_id: account.id,
            employee_name: account.name,
            check_in: record.check_in_time,
            check_out: record.check_out_time,
            status: status.to_string(),
            duration: worked_duration(&record, now),
        }
    }
}

/// "Xh Ym" between check-in and check-out, or until now while still in.
fn worked_duration(record: &AttendanceRecord, now: DateTime<Utc>) -> String {
    let Some(started) = record.check_in_time else {
        return "-".to_string();
    };
    let ended = record.check_out_time.unwrap_or(now);
    let minutes = (ended - started).num_minutes().max(0);
    format!("{}h {}m", minutes / 60, minutes % 60)
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<AttendanceRow>,
    #[schema(example = 1)]
    pub total: usize,
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-in",
    responses(
        (status = 200, description = "Checked in successfully", body = Object, example = json!({
            "message": "Checked in successfully"
        })),
        (status = 400, description = "Already checked in today", body = Object, example = json!({
            "message": "Already checked in today"
        })),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    stores: web::Data<Stores>,
) -> actix_web::Result<impl Responder> {
    let account_id = auth.account.id.clone();
    let now = Utc::now();

    if stores
        .attendance
        .is_checked_in(&account_id, now.date_naive())?
    {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Already checked in today"
        })));
    }

    let record = stores.attendance.check_in(&account_id, now)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Checked in successfully",
        "check_in_time": record.check_in_time
    })))
}

/// Check-out endpoint
#[utoipa::path(
    put,
    path = "/api/attendance/check-out",
    responses(
        (status = 200, description = "Checked out successfully", body = Object, example = json!({
            "message": "Checked out successfully"
        })),
        (status = 400, description = "No active check-in found for today", body = Object, example = json!({
            "message": "No active check-in found for today"
        })),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    stores: web::Data<Stores>,
) -> actix_web::Result<impl Responder> {
    let account_id = auth.account.id.clone();

    match stores.attendance.check_out(&account_id, Utc::now())? {
        Some(record) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "message": "Checked out successfully",
            "check_out_time": record.check_out_time
        }))),
        None => Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "No active check-in found for today"
        }))),
    }
}

/// Current check-in state of the session account, for the indicator popup
#[utoipa::path(
    get,
    path = "/api/attendance/status",
    responses(
        (status = 200, description = "Check-in state", body = Object, example = json!({
            "checked_in": true,
            "check_in_time": "2025-11-03T09:00:00Z"
        })),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Attendance"
)]
pub async fn attendance_status(
    auth: AuthUser,
    stores: web::Data<Stores>,
) -> actix_web::Result<impl Responder> {
    let account_id = auth.account.id.clone();
    let now = Utc::now();

    let checked_in = stores
        .attendance
        .is_checked_in(&account_id, now.date_naive())?;
    let check_in_time = if checked_in {
        stores.attendance.check_in_time(&account_id)?
    } else {
        None
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "checked_in": checked_in,
        "check_in_time": check_in_time
    })))
}

/// Attendance table for a day: all accounts for admins, own row otherwise
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Attendance records for the day", body = AttendanceListResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    auth: AuthUser,
    stores: web::Data<Stores>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    let now = Utc::now();
    let day = query.date.unwrap_or_else(|| now.date_naive());

    let mut rows = stores.attendance.day_overview(day)?;
    if !auth.is_admin() {
        rows.retain(|(account, _)| account.id == auth.account.id);
    }
    if let Some(term) = query.search.as_deref().filter(|t| !t.trim().is_empty()) {
        let term = term.trim().to_lowercase();
        rows.retain(|(account, _)| account.name.to_lowercase().contains(&term));
    }

    let data: Vec<AttendanceRow> = rows
        .into_iter()
        .map(|(account, record)| AttendanceRow::new(account, record, now))
        .collect();

    Ok(HttpResponse::Ok().json(AttendanceListResponse {
        total: data.len(),
        data,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(start_h: u32, end_h: Option<u32>) -> AttendanceRecord {
        let start = Utc.with_ymd_and_hms(2025, 11, 3, start_h, 0, 0).unwrap();
        AttendanceRecord {
            date: start.date_naive(),
            checked_in: true,
            checked_out: end_h.is_some(),
            check_in_time: Some(start),
            check_out_time: end_h.map(|h| Utc.with_ymd_and_hms(2025, 11, 3, h, 30, 0).unwrap()),
        }
    }

    #[test]
    fn duration_uses_check_out_when_present() {
        let now = Utc.with_ymd_and_hms(2025, 11, 3, 23, 0, 0).unwrap();
        assert_eq!(worked_duration(&record(9, Some(17)), now), "8h 30m");
    }

    #[test]
    fn duration_runs_until_now_while_checked_in() {
        let now = Utc.with_ymd_and_hms(2025, 11, 3, 10, 15, 0).unwrap();
        assert_eq!(worked_duration(&record(9, None), now), "1h 15m");
    }
}
