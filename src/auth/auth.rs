use crate::model::employee::{Employee, Role};
use actix_web::{
    FromRequest, HttpMessage, HttpRequest,
    dev::Payload,
    error::{ErrorForbidden, ErrorUnauthorized},
};
use futures::future::{Ready, ready};

/// The authenticated account of the request, inserted into the request
/// extensions by `auth_middleware`.
#[derive(Clone)]
pub struct AuthUser {
    pub account: Employee,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(ErrorUnauthorized("No active session"))),
        }
    }
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.account.role == Role::Admin
    }

    pub fn require_admin(&self) -> actix_web::Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ErrorForbidden("Admin only"))
        }
    }

    /// Admins manage everyone; everyone manages themselves.
    pub fn can_manage(&self, account_id: &str) -> bool {
        self.is_admin() || self.account.id == account_id
    }
}
