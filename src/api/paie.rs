use crate::auth::auth::AuthUser;
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::{MySqlPool, prelude::FromRow};
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateFichePaie {
    pub employe_id: u64,
    /// First day of the pay month.
    #[schema(example = "2025-06-01", value_type = String, format = "date")]
    pub mois: NaiveDate,
    #[schema(example = 5800.0)]
    pub salaire_base: f64,
    #[schema(example = 450.0)]
    pub primes: f64,
    #[schema(example = 120.0)]
    pub retenues: f64,
}

#[derive(Serialize, FromRow, ToSchema)]
pub struct FichePaieResponse {
    pub id: u64,
    pub employe_id: u64,
    #[schema(value_type = String, format = "date")]
    pub mois: NaiveDate,
    pub salaire_base: f64,
    pub primes: f64,
    pub retenues: f64,
    pub salaire_net: f64,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct FichePaieQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub employe_id: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct FichePaieListResponse {
    pub data: Vec<FichePaieResponse>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

// Widened before the multiply so a huge page number cannot overflow.
fn page_offset(page: u32, per_page: u32) -> i64 {
    (i64::from(page) - 1) * i64::from(per_page)
}

/// Issue a payslip; the net is computed here, not trusted from input.
#[utoipa::path(
    post,
    path = "/api/paie",
    request_body = CreateFichePaie,
    responses(
        (status = 201, description = "Payslip created"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "RH"
)]
pub async fn create_fiche_paie(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateFichePaie>,
) -> actix_web::Result<impl Responder> {
    auth.require_rh_or_admin()?;

    let salaire_net = payload.salaire_base + payload.primes - payload.retenues;

    sqlx::query(
        r#"
        INSERT INTO fiches_paie
        (employe_id, mois, salaire_base, primes, retenues, salaire_net)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.employe_id)
    .bind(payload.mois)
    .bind(payload.salaire_base)
    .bind(payload.primes)
    .bind(payload.retenues)
    .bind(salaire_net)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to create fiche de paie");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Fiche de paie créée",
        "salaire_net": salaire_net
    })))
}

/// List payslips, optionally for one employee.
#[utoipa::path(
    get,
    path = "/api/paie",
    params(FichePaieQuery),
    responses((status = 200, description = "Payslips", body = FichePaieListResponse)),
    security(("bearer_auth" = [])),
    tag = "RH"
)]
pub async fn list_fiches_paie(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<FichePaieQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_rh_or_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = page_offset(page, per_page);

    let (total, data) = match query.employe_id {
        Some(employe_id) => {
            let total = sqlx::query_scalar::<_, i64>(
                r#"SELECT COUNT(*) FROM fiches_paie WHERE employe_id = ?"#,
            )
            .bind(employe_id)
            .fetch_one(pool.get_ref())
            .await
            .map_err(ErrorInternalServerError)?;

            let data = sqlx::query_as::<_, FichePaieResponse>(
                r#"
                SELECT id, employe_id, mois, salaire_base, primes, retenues, salaire_net
                FROM fiches_paie WHERE employe_id = ?
                ORDER BY mois DESC LIMIT ? OFFSET ?
                "#,
            )
            .bind(employe_id)
            .bind(per_page as i64)
            .bind(offset)
            .fetch_all(pool.get_ref())
            .await
            .map_err(ErrorInternalServerError)?;

            (total, data)
        }
        None => {
            let total = sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM fiches_paie"#)
                .fetch_one(pool.get_ref())
                .await
                .map_err(ErrorInternalServerError)?;

            let data = sqlx::query_as::<_, FichePaieResponse>(
                r#"
                SELECT id, employe_id, mois, salaire_base, primes, retenues, salaire_net
                FROM fiches_paie
                ORDER BY mois DESC LIMIT ? OFFSET ?
                "#,
            )
            .bind(per_page as i64)
            .bind(offset)
            .fetch_all(pool.get_ref())
            .await
            .map_err(ErrorInternalServerError)?;

            (total, data)
        }
    };

    Ok(HttpResponse::Ok().json(FichePaieListResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/// Get one payslip.
#[utoipa::path(
    get,
    path = "/api/paie/{id}",
    params(("id" = u64, Path, description = "Payslip ID")),
    responses(
        (status = 200, description = "Payslip", body = FichePaieResponse),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "RH"
)]
pub async fn get_fiche_paie(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_rh_or_admin()?;

    let id = path.into_inner();

    let fiche = sqlx::query_as::<_, FichePaieResponse>(
        r#"
        SELECT id, employe_id, mois, salaire_base, primes, retenues, salaire_net
        FROM fiches_paie WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, id, "Failed to fetch fiche de paie");
        ErrorInternalServerError("Database error")
    })?;

    match fiche {
        Some(f) => Ok(HttpResponse::Ok().json(f)),
        None => Ok(HttpResponse::NotFound().json(json!({ "message": "Fiche introuvable" }))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_offset_survives_huge_page_numbers() {
        assert_eq!(page_offset(1, 20), 0);
        assert_eq!(page_offset(3, 20), 40);
        assert_eq!(page_offset(u32::MAX, 100), (i64::from(u32::MAX) - 1) * 100);
    }
}
