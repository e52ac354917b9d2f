use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    /// Login ID or email, matched case-insensitively.
    #[schema(example = "ADMIN001")]
    pub identifier: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ChangePasswordReq {
    pub current_password: String,
    pub new_password: String,
}
