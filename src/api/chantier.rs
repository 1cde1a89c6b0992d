use crate::{
    model::chantier::Chantier,
    utils::db_utils::{build_update_sql, execute_update},
};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams)]
pub struct ChantierQuery {
    /// Filter by statut (planifie, en_cours, suspendu, termine).
    pub statut: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateChantier {
    pub nom: String,
    pub client_id: Option<u64>,
    pub adresse: Option<String>,
    #[schema(value_type = String, format = "date", nullable = true)]
    pub date_debut: Option<NaiveDate>,
    #[schema(value_type = String, format = "date", nullable = true)]
    pub date_fin_prevue: Option<NaiveDate>,
    pub budget_initial: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: Option<String>,
    pub chef_chantier_id: Option<u64>,
}

const CHANTIER_COLUMNS: &[&str] = &[
    "nom",
    "client_id",
    "adresse",
    "date_debut",
    "date_fin_prevue",
    "date_fin_reelle",
    "statut",
    "budget_initial",
    "budget_consomme",
    "latitude",
    "longitude",
    "description",
    "chef_chantier_id",
];

#[utoipa::path(
    get,
    path = "/api/chantiers",
    params(ChantierQuery),
    responses((status = 200, description = "Construction sites", body = [Chantier])),
    security(("bearer_auth" = [])),
    tag = "CRM"
)]
pub async fn list_chantiers(
    pool: web::Data<MySqlPool>,
    query: web::Query<ChantierQuery>,
) -> actix_web::Result<impl Responder> {
    let chantiers = match &query.statut {
        Some(statut) => {
            sqlx::query_as::<_, Chantier>(
                r#"SELECT * FROM chantiers WHERE statut = ? ORDER BY date_debut DESC"#,
            )
            .bind(statut)
            .fetch_all(pool.get_ref())
            .await
        }
        None => {
            sqlx::query_as::<_, Chantier>(r#"SELECT * FROM chantiers ORDER BY date_debut DESC"#)
                .fetch_all(pool.get_ref())
                .await
        }
    }
    .map_err(|e| {
        error!(error = %e, "Failed to list chantiers");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(chantiers))
}

#[utoipa::path(
    post,
    path = "/api/chantiers",
    request_body = CreateChantier,
    responses((status = 200, description = "Chantier created")),
    security(("bearer_auth" = [])),
    tag = "CRM"
)]
pub async fn create_chantier(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateChantier>,
) -> actix_web::Result<impl Responder> {
    let result = sqlx::query(
        r#"
        INSERT INTO chantiers
        (nom, client_id, adresse, date_debut, date_fin_prevue, statut,
         budget_initial, budget_consomme, latitude, longitude, description, chef_chantier_id)
        VALUES (?, ?, ?, ?, ?, 'planifie', ?, 0, ?, ?, ?, ?)
        "#,
    )
    .bind(&payload.nom)
    .bind(payload.client_id)
    .bind(&payload.adresse)
    .bind(payload.date_debut)
    .bind(payload.date_fin_prevue)
    .bind(payload.budget_initial.unwrap_or(0.0))
    .bind(payload.latitude)
    .bind(payload.longitude)
    .bind(&payload.description)
    .bind(payload.chef_chantier_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to create chantier");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "id": result.last_insert_id() })))
}

#[utoipa::path(
    put,
    path = "/api/chantiers/{id}",
    params(("id" = u64, Path, description = "Chantier ID")),
    responses((status = 200, description = "Chantier updated"), (status = 404, description = "Not found")),
    security(("bearer_auth" = [])),
    tag = "CRM"
)]
pub async fn update_chantier(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();

    let update = build_update_sql("chantiers", CHANTIER_COLUMNS, &body, "id", id)?;
    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({ "message": "Chantier introuvable" })));
    }

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
