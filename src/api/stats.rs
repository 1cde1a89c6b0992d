use crate::utils::stats_cache::{DashboardStats, dashboard_stats};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use sqlx::MySqlPool;
use tracing::error;

/// Dashboard counters, cached for a short TTL (every widget polls this).
#[utoipa::path(
    get,
    path = "/api/stats/dashboard",
    responses(
        (status = 200, description = "Dashboard counters", body = DashboardStats),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Stats"
)]
pub async fn get_dashboard_stats(pool: web::Data<MySqlPool>) -> actix_web::Result<impl Responder> {
    let stats = dashboard_stats(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to compute dashboard stats");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(stats))
}
