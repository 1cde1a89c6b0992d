use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Deserialize)]
pub struct LoginReqDto {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterReqDto {
    pub username: String,
    pub password: String,
    pub role_id: u8,
}

#[derive(FromRow)]
pub struct AdminSql {
    pub id: u64,
    pub username: String,
    pub password: String,
    pub role_id: u8,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub sub: String,
    /// Role id, see model::role::Role.
    pub role: u8,
    pub exp: usize,
    pub jti: String,
}
