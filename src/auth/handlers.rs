use crate::{
    auth::{
        auth::AuthUser,
        jwt::generate_access_token,
        password::{hash_password, verify_password},
    },
    config::Config,
    models::{AdminSql, LoginReqDto, RegisterReqDto},
    utils::db_utils::is_duplicate_key,
};
use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};

#[derive(Serialize)]
struct LoginResponse {
    access_token: String,
}

#[instrument(
    name = "auth_login",
    skip(pool, config, user),
    fields(username = %user.username)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    if user.username.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty username or password");
        return HttpResponse::BadRequest().body("Username or password required");
    }

    debug!("Fetching account from database");

    let db_user = match sqlx::query_as::<_, AdminSql>(
        r#"
        SELECT id, username, password, role_id
        FROM admins
        WHERE username = ?
        "#,
    )
    .bind(&user.username)
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(Some(account)) => account,
        Ok(None) => {
            info!("Invalid credentials: account not found");
            return HttpResponse::Unauthorized().body("Invalid credentials");
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching account");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if let Err(e) = verify_password(&user.password, &db_user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().body("Invalid credentials");
    }

    let access_token = generate_access_token(
        db_user.id,
        db_user.username.clone(),
        db_user.role_id,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    // Non-fatal bookkeeping.
    if let Err(e) = sqlx::query("UPDATE admins SET last_login_at = NOW() WHERE id = ?")
        .bind(db_user.id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to update last_login_at");
    }

    info!("Login successful");

    HttpResponse::Ok().json(LoginResponse { access_token })
}

/// Create another back-office account. Admin only; the first account is
/// seeded directly in the database.
pub async fn register(
    auth: AuthUser,
    payload: web::Json<RegisterReqDto>,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let username = payload.username.trim();
    if username.is_empty() || payload.password.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "Username and password must not be empty"
        })));
    }

    let hashed = hash_password(&payload.password);

    let result = sqlx::query(
        r#"INSERT INTO admins (username, password, role_id) VALUES (?, ?, ?)"#,
    )
    .bind(username)
    .bind(&hashed)
    .bind(payload.role_id)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Created().json(json!({
            "message": "Account created successfully"
        }))),
        Err(e) => {
            if is_duplicate_key(&e) {
                return Ok(HttpResponse::Conflict().json(json!({
                    "error": "Username already exists"
                })));
            }
            error!(error = %e, "Failed to create account");
            Ok(HttpResponse::InternalServerError().json(json!({
                "error": "Failed to create account"
            })))
        }
    }
}
