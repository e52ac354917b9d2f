use crate::auth::auth::AuthUser;
use crate::store::Stores;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use serde_json::json;
use tracing::error;

/// Gate for the protected scope: the request is authenticated as whatever
/// account currently holds the session partition.
pub async fn auth_middleware(
    mut req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let stores = req
        .app_data::<Data<Stores>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App state missing"))?;

    let session = match stores.sessions.current() {
        Ok(session) => session,
        Err(e) => {
            error!(error = %e, "Session lookup failed");
            let resp = HttpResponse::InternalServerError()
                .json(json!({"error": "Session lookup failed"}));
            return Ok(req.into_response(resp.map_into_boxed_body()));
        }
    };

    let Some(account) = session else {
        let resp = HttpResponse::Unauthorized().json(json!({"error": "No active session"}));
        return Ok(req.into_response(resp.map_into_boxed_body()));
    };

    req.extensions_mut().insert(AuthUser { account });

    next.call(req).await
}
