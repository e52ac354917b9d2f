use crate::auth::auth::AuthUser;
use crate::model::leave_request::{LeaveStatus, LeaveType, TimeOffRequest};
use crate::store::Stores;
use crate::store::timeoff::{LeaveDecision, NewTimeOffRequest};
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "sick-leave")]
    pub leave_type: LeaveType, // enum ensures Swagger dropdown
    pub reason: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    /// Filter by employee ID (admins only; others always see their own)
    #[param(example = "EMP1767312000000")]
    pub employee_id: Option<String>,
    /// Filter by leave status
    #[param(example = "pending")]
    pub status: Option<LeaveStatus>,
    /// Search by employee name, type or status
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveResponse {
    #[schema(example = 1767312000000i64, value_type = i64)]
    pub id: i64,
    pub employee_id: String,
    pub employee_name: String,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "sick-leave")]
    pub leave_type: LeaveType,
    pub reason: Option<String>,
    /// Inclusive day count
    #[schema(example = 3)]
    pub days: i64,
    #[schema(example = "pending")]
    pub status: LeaveStatus,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}

impl From<TimeOffRequest> for LeaveResponse {
    fn from(request: TimeOffRequest) -> Self {
        Self {
            id: request.id,
            employee_id: request.employee_id,
            employee_name: request.employee_name,
            start_date: request.start_date,
            end_date: request.end_date,
            leave_type: request.leave_type,
            reason: request.reason,
            days: request.days,
            status: request.status,
            created_at: request.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveResponse>,
    #[schema(example = 1)]
    pub total: usize,
}

/* =========================
Create leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted", body = LeaveResponse),
        (status = 400, description = "start_date cannot be after end_date"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    stores: web::Data<Stores>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    let payload = payload.into_inner();

    let request = stores.timeoff.submit(
        NewTimeOffRequest {
            employee_id: auth.account.id.clone(),
            start_date: payload.start_date,
            end_date: payload.end_date,
            leave_type: payload.leave_type,
            reason: payload.reason,
        },
        Utc::now(),
    )?;

    Ok(HttpResponse::Created().json(LeaveResponse::from(request)))
}

/* =========================
Approve leave (Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/approve",
    params(
        ("leave_id" = i64, Path, description = "ID of the leave request to approve")
    ),
    responses(
        (status = 200, description = "Leave approved", body = Object, example = json!({
            "message": "Leave approved"
        })),
        (status = 400, description = "Already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    stores: web::Data<Stores>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let leave_id = path.into_inner();
    stores
        .timeoff
        .decide(leave_id, LeaveDecision::Approve, Utc::now().date_naive())?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave approved"
    })))
}

/* =========================
Reject leave (Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/reject",
    params(
        ("leave_id" = i64, Path, description = "ID of the leave request to reject")
    ),
    responses(
        (status = 200, description = "Leave rejected", body = Object, example = json!({
            "message": "Leave rejected"
        })),
        (status = 400, description = "Already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    stores: web::Data<Stores>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let leave_id = path.into_inner();
    stores
        .timeoff
        .decide(leave_id, LeaveDecision::Reject, Utc::now().date_naive())?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave rejected"
    })))
}

/// for getting a leave application details endpoint
#[utoipa::path(
    get,
    path = "/api/leave/{leave_id}",
    params(
        ("leave_id" = i64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    stores: web::Data<Stores>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();
    let request = stores.timeoff.get(leave_id)?;

    if !auth.can_manage(&request.employee_id) {
        return Err(actix_web::error::ErrorForbidden("Admin only"));
    }

    Ok(HttpResponse::Ok().json(LeaveResponse::from(request)))
}

/// for getting leave applications endpoint
#[utoipa::path(
    get,
    path = "/api/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Leave request list", body = LeaveListResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    stores: web::Data<Stores>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    // Admins see everything (optionally narrowed to one employee);
    // everyone else is pinned to their own requests.
    let for_account = if auth.is_admin() {
        query.employee_id.clone()
    } else {
        Some(auth.account.id.clone())
    };

    let mut requests = stores.timeoff.list(for_account.as_deref())?;

    if let Some(status) = query.status {
        requests.retain(|request| request.status == status);
    }
    if let Some(term) = query.search.as_deref().filter(|t| !t.trim().is_empty()) {
        let term = term.trim();
        requests.retain(|request| request.matches_search(term));
    }

    let data: Vec<LeaveResponse> = requests.into_iter().map(LeaveResponse::from).collect();

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        total: data.len(),
        data,
    }))
}
