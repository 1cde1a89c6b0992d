use crate::auth::auth::AuthUser;
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::{MySqlPool, prelude::FromRow};
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TypeConge {
    Cp,
    Rtt,
    Maladie,
    SansSolde,
}

impl TypeConge {
    fn as_str(&self) -> &str {
        match self {
            TypeConge::Cp => "cp",
            TypeConge::Rtt => "rtt",
            TypeConge::Maladie => "maladie",
            TypeConge::SansSolde => "sans_solde",
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CreateConge {
    pub employe_id: u64,
    pub type_conge: TypeConge,
    #[schema(example = "2025-07-21", format = "date", value_type = String)]
    pub date_debut: NaiveDate,
    #[schema(example = "2025-08-01", format = "date", value_type = String)]
    pub date_fin: NaiveDate,
    /// Business days requested, half days allowed.
    #[schema(example = 10.0)]
    pub nombre_jours: f64,
    pub motif: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct CongeFilter {
    pub employe_id: Option<u64>,
    /// en_attente, approuve or refuse.
    pub statut: Option<String>,
    /// 1-based page number.
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Serialize, Deserialize, FromRow, ToSchema)]
pub struct CongeResponse {
    pub id: u64,
    pub employe_id: u64,
    pub type_conge: String,
    #[schema(format = "date", value_type = String)]
    pub date_debut: NaiveDate,
    #[schema(format = "date", value_type = String)]
    pub date_fin: NaiveDate,
    pub nombre_jours: f64,
    pub motif: Option<String>,
    pub statut: String,
    #[schema(format = "date-time", value_type = String, nullable = true)]
    pub date_demande: Option<NaiveDateTime>,
    pub validateur_id: Option<u64>,
    pub commentaire_validation: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct CongeListResponse {
    pub data: Vec<CongeResponse>,
    pub page: u64,
    pub per_page: u64,
    pub total: i64,
}

// Helper for typed SQLx binding of the dynamic filter.
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

/// List leave requests, filtered and paginated.
#[utoipa::path(
    get,
    path = "/api/conges",
    params(CongeFilter),
    responses(
        (status = 200, description = "Leave requests", body = CongeListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "RH"
)]
pub async fn list_conges(
    pool: web::Data<MySqlPool>,
    filter: web::Query<CongeFilter>,
) -> actix_web::Result<impl Responder> {
    let page = filter.page.unwrap_or(1).max(1);
    let per_page = filter.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let mut conditions = Vec::new();
    let mut bindings: Vec<FilterValue> = Vec::new();

    if let Some(employe_id) = filter.employe_id {
        conditions.push("employe_id = ?");
        bindings.push(FilterValue::U64(employe_id));
    }
    if let Some(statut) = &filter.statut {
        conditions.push("statut = ?");
        bindings.push(FilterValue::Str(statut));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) FROM conges {}", where_clause);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = match b {
            FilterValue::U64(v) => count_query.bind(*v),
            FilterValue::Str(v) => count_query.bind(*v),
        };
    }
    let total = count_query.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count conges");
        ErrorInternalServerError("Database error")
    })?;

    let data_sql = format!(
        "SELECT id, employe_id, type_conge, date_debut, date_fin, nombre_jours, motif, statut, \
         date_demande, validateur_id, commentaire_validation \
         FROM conges {} ORDER BY id DESC LIMIT ? OFFSET ?",
        where_clause
    );
    let mut data_query = sqlx::query_as::<_, CongeResponse>(&data_sql);
    for b in &bindings {
        data_query = match b {
            FilterValue::U64(v) => data_query.bind(*v),
            FilterValue::Str(v) => data_query.bind(*v),
        };
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let data = data_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to fetch conges");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(CongeListResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/// File a leave request; it starts in "en_attente".
#[utoipa::path(
    post,
    path = "/api/conges",
    request_body = CreateConge,
    responses(
        (status = 200, description = "Leave request created"),
        (status = 400, description = "Invalid date range")
    ),
    security(("bearer_auth" = [])),
    tag = "RH"
)]
pub async fn create_conge(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateConge>,
) -> actix_web::Result<impl Responder> {
    if payload.date_fin < payload.date_debut {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "La date de fin précède la date de début"
        })));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO conges
        (employe_id, type_conge, date_debut, date_fin, nombre_jours, motif, statut, date_demande)
        VALUES (?, ?, ?, ?, ?, ?, 'en_attente', NOW())
        "#,
    )
    .bind(payload.employe_id)
    .bind(payload.type_conge.as_str())
    .bind(payload.date_debut)
    .bind(payload.date_fin)
    .bind(payload.nombre_jours)
    .bind(&payload.motif)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to create conge");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "id": result.last_insert_id() })))
}

async fn decide_conge(
    auth: AuthUser,
    pool: &MySqlPool,
    id: u64,
    statut: &str,
    commentaire: Option<&str>,
) -> actix_web::Result<HttpResponse> {
    auth.require_rh_or_admin()?;

    let result = sqlx::query(
        r#"
        UPDATE conges
        SET statut = ?, validateur_id = ?, commentaire_validation = ?, date_validation = NOW()
        WHERE id = ? AND statut = 'en_attente'
        "#,
    )
    .bind(statut)
    .bind(auth.user_id)
    .bind(commentaire)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| {
        error!(error = %e, id, "Failed to decide conge");
        ErrorInternalServerError("Database error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Demande introuvable ou déjà traitée"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({ "success": true, "statut": statut })))
}

#[derive(Deserialize, ToSchema)]
pub struct DecisionConge {
    pub commentaire: Option<String>,
}

/// Approve a pending leave request (RH/Admin).
#[utoipa::path(
    put,
    path = "/api/conges/{id}/approve",
    params(("id" = u64, Path, description = "Leave request ID")),
    request_body = DecisionConge,
    responses(
        (status = 200, description = "Approved"),
        (status = 404, description = "Not found or already decided"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "RH"
)]
pub async fn approve_conge(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<DecisionConge>,
) -> actix_web::Result<impl Responder> {
    decide_conge(
        auth,
        pool.get_ref(),
        path.into_inner(),
        "approuve",
        payload.commentaire.as_deref(),
    )
    .await
}

/// Reject a pending leave request (RH/Admin).
#[utoipa::path(
    put,
    path = "/api/conges/{id}/reject",
    params(("id" = u64, Path, description = "Leave request ID")),
    request_body = DecisionConge,
    responses(
        (status = 200, description = "Rejected"),
        (status = 404, description = "Not found or already decided"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "RH"
)]
pub async fn reject_conge(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<DecisionConge>,
) -> actix_web::Result<impl Responder> {
    decide_conge(
        auth,
        pool.get_ref(),
        path.into_inner(),
        "refuse",
        payload.commentaire.as_deref(),
    )
    .await
}
