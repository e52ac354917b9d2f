use crate::{
    auth::auth::AuthUser,
    model::employee::{AttendanceStatus, Employee, Role, SalaryInfo},
    store::Stores,
    store::identity::NewAccount,
};
use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "John")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "john@email.com", format = "email", value_type = String)]
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    #[schema(example = "employee")]
    pub role: Option<Role>,
    pub job_position: Option<String>,
    pub department: Option<String>,
    pub manager: Option<String>,
    pub location: Option<String>,
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
    pub nationality: Option<String>,
    pub personal_email: Option<String>,
    pub gender: Option<String>,
    pub marital_status: Option<String>,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date_of_joining: Option<NaiveDate>,
}

impl From<CreateEmployee> for NewAccount {
    fn from(payload: CreateEmployee) -> Self {
        NewAccount {
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
            phone: payload.phone.unwrap_or_default(),
            password: payload.password,
            company_name: payload.company_name,
            role: payload.role,
            job_position: payload.job_position,
            department: payload.department,
            manager: payload.manager,
            location: payload.location,
            date_of_birth: payload.date_of_birth,
            address: payload.address,
            nationality: payload.nationality,
            personal_email: payload.personal_email,
            gender: payload.gender,
            marital_status: payload.marital_status,
            date_of_joining: payload.date_of_joining,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EmployeeQuery {
    /// Search by name, email or job position
    pub search: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateEmployee {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub role: Option<Role>,
    pub job_position: Option<String>,
    pub department: Option<String>,
    pub manager: Option<String>,
    pub location: Option<String>,
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
    pub nationality: Option<String>,
    pub personal_email: Option<String>,
    pub gender: Option<String>,
    pub marital_status: Option<String>,
    pub salary: Option<SalaryInfo>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeResponse {
    #[schema(example = "EMP1767312000000")]
    pub id: String,
    #[schema(example = "ODOOXJODO20250001")]
    pub login_id: String,
    pub first_name: String,
    pub last_name: String,
    pub name: String,
    #[schema(example = "john.doe@company.com")]
    pub email: String,
    pub phone: String,
    pub company_name: String,
    pub role: Role,
    #[schema(example = "present")]
    pub attendance_status: AttendanceStatus,
    pub job_position: String,
    pub department: String,
    pub manager: String,
    pub location: String,
    pub date_of_birth: String,
    pub address: String,
    pub nationality: String,
    pub personal_email: String,
    pub gender: String,
    pub marital_status: String,
    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub date_of_joining: NaiveDate,
    pub avatar: String,
    /// Admin-only; stripped for everyone else.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<SalaryInfo>,
}

impl EmployeeResponse {
    pub fn from_account(account: Employee, include_salary: bool) -> Self {
        Self {
            id: account.id,
            login_id: account.login_id,
            first_name: account.first_name,
            last_name: account.last_name,
            name: account.name,
            email: account.email,
            phone: account.phone,
            company_name: account.company_name,
            role: account.role,
            attendance_status: account.attendance_status,
            job_position: account.job_position,
            department: account.department,
            manager: account.manager,
            location: account.location,
            date_of_birth: account.date_of_birth,
            address: account.address,
            nationality: account.nationality,
            personal_email: account.personal_email,
            gender: account.gender,
            marital_status: account.marital_status,
            date_of_joining: account.date_of_joining,
            avatar: account.avatar,
            salary: if include_salary { account.salary } else { None },
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<EmployeeResponse>,
    #[schema(example = 10)]
    pub total: usize,
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employee",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created successfully", body = EmployeeResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Email already exists", body = Object, example = json!({
            "message": "Email already exists"
        }))
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    auth: AuthUser,
    stores: web::Data<Stores>,
    payload: web::Json<CreateEmployee>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let employee = stores
        .identity
        .create_account(payload.into_inner().into(), Utc::now())
        .await?;

    info!(login_id = %employee.login_id, "Employee account created");
    Ok(HttpResponse::Created().json(EmployeeResponse::from_account(employee, auth.is_admin())))
}

/// Employee directory
#[utoipa::path(
    get,
    path = "/api/employee",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Employee directory", body = EmployeeListResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    _auth: AuthUser,
    stores: web::Data<Stores>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    let mut accounts = stores.identity.list_accounts()?;
    if let Some(term) = query.search.as_deref().filter(|t| !t.trim().is_empty()) {
        accounts.retain(|account| account.matches_search(term.trim()));
    }

    let data: Vec<EmployeeResponse> = accounts
        .into_iter()
        .map(|account| EmployeeResponse::from_account(account, false))
        .collect();

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        total: data.len(),
        data,
    }))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/employee/{employee_id}",
    params(
        ("employee_id" = String, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = EmployeeResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        }))
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    auth: AuthUser,
    stores: web::Data<Stores>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    match stores.identity.find_by_id(&employee_id)? {
        Some(account) => {
            Ok(HttpResponse::Ok().json(EmployeeResponse::from_account(account, auth.is_admin())))
        }
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        }))),
    }
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/employee/{employee_id}",
    params(
        ("employee_id" = String, Path, description = "Employee ID")
    ),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated successfully", body = EmployeeResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        }))
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    auth: AuthUser,
    stores: web::Data<Stores>,
    path: web::Path<String>,
    payload: web::Json<UpdateEmployee>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    if !auth.can_manage(&employee_id) {
        return Err(actix_web::error::ErrorForbidden("Admin only"));
    }

    let Some(mut account) = stores.identity.find_by_id(&employee_id)? else {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    };

    let payload = payload.into_inner();

    // Role and salary stay with admins even on self-service edits.
    if !auth.is_admin() && (payload.role.is_some() || payload.salary.is_some()) {
        return Err(actix_web::error::ErrorForbidden("Admin only"));
    }

    apply_update(&mut account, payload);
    let updated = stores.identity.upsert_account(account).await?;

    Ok(HttpResponse::Ok().json(EmployeeResponse::from_account(updated, auth.is_admin())))
}

fn apply_update(account: &mut Employee, payload: UpdateEmployee) {
    let mut name_changed = false;
    if let Some(first_name) = payload.first_name {
        account.first_name = first_name;
        name_changed = true;
    }
    if let Some(last_name) = payload.last_name {
        account.last_name = last_name;
        name_changed = true;
    }
    if name_changed {
        account.name = Employee::display_name(&account.first_name, &account.last_name);
        account.avatar = Employee::avatar_url(&account.name);
    }

    if let Some(email) = payload.email {
        account.email = email;
    }
    if let Some(phone) = payload.phone {
        account.phone = phone;
    }
    if let Some(company_name) = payload.company_name {
        account.company_name = company_name;
    }
    if let Some(role) = payload.role {
        account.role = role;
    }
    if let Some(job_position) = payload.job_position {
        account.job_position = job_position;
    }
    if let Some(department) = payload.department {
        account.department = department;
    }
    if let Some(manager) = payload.manager {
        account.manager = manager;
    }
    if let Some(location) = payload.location {
        account.location = location;
    }
    if let Some(date_of_birth) = payload.date_of_birth {
        account.date_of_birth = date_of_birth;
    }
    if let Some(address) = payload.address {
        account.address = address;
    }
    if let Some(nationality) = payload.nationality {
        account.nationality = nationality;
    }
    if let Some(personal_email) = payload.personal_email {
        account.personal_email = personal_email;
    }
    if let Some(gender) = payload.gender {
        account.gender = gender;
    }
    if let Some(marital_status) = payload.marital_status {
        account.marital_status = marital_status;
    }
    if let Some(salary) = payload.salary {
        account.salary = Some(salary);
    }
}
