use crate::{
    api::employee::EmployeeResponse,
    models::{ChangePasswordReq, LoginReqDto},
    store::Stores,
};
use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, error, info, instrument};

use crate::error::EmsError;

// auth end points

#[derive(Serialize)]
struct LoginResponse {
    message: &'static str,
    account: EmployeeResponse,
}

#[instrument(
    name = "auth_login",
    skip(stores, user),
    fields(identifier = %user.identifier)
)]
pub async fn login(user: web::Json<LoginReqDto>, stores: web::Data<Stores>) -> impl Responder {
    info!("Login request received");

    // Basic validation
    if user.identifier.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty identifier or password");
        return HttpResponse::BadRequest().body("Identifier or password required");
    }

    debug!("Matching identifier against the account store");

    let account = match stores.identity.authenticate(&user.identifier, &user.password) {
        Ok(account) => account,
        Err(EmsError::InvalidCredentials) => {
            info!("Invalid credentials");
            return HttpResponse::Unauthorized().body("Invalid credentials");
        }
        Err(e) => {
            error!(error = %e, "Account lookup failed during login");
            return HttpResponse::InternalServerError().finish();
        }
    };

    debug!(account_id = %account.id, "Establishing session");

    if let Err(e) = stores.sessions.establish(&account) {
        error!(error = %e, "Failed to persist session");
        return HttpResponse::InternalServerError().finish();
    }

    info!("Login successful");

    let include_salary = account.role == crate::model::employee::Role::Admin;
    HttpResponse::Ok().json(LoginResponse {
        message: "Login successful",
        account: EmployeeResponse::from_account(account, include_salary),
    })
}

pub async fn logout(stores: web::Data<Stores>) -> impl Responder {
    // Clearing an absent session is fine; logout is idempotent.
    if let Err(e) = stores.sessions.clear() {
        error!(error = %e, "Failed to clear session");
        return HttpResponse::InternalServerError().finish();
    }
    HttpResponse::NoContent().finish()
}

/// The account currently holding the session, if any.
pub async fn current_session(stores: web::Data<Stores>) -> actix_web::Result<impl Responder> {
    match stores.sessions.current()? {
        Some(account) => {
            let include_salary = account.role == crate::model::employee::Role::Admin;
            Ok(HttpResponse::Ok().json(EmployeeResponse::from_account(account, include_salary)))
        }
        None => Ok(HttpResponse::Unauthorized().json(json!({
            "message": "No active session"
        }))),
    }
}

pub async fn change_password(
    payload: web::Json<ChangePasswordReq>,
    stores: web::Data<Stores>,
) -> actix_web::Result<impl Responder> {
    if payload.new_password.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "New password must not be empty"
        })));
    }

    stores
        .identity
        .change_password(&payload.current_password, &payload.new_password)?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Password changed"
    })))
}
