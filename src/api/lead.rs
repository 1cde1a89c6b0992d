use crate::{
    model::lead::Lead,
    utils::db_utils::{build_update_sql, execute_update},
};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateLead {
    pub nom: String,
    pub entreprise: Option<String>,
    pub telephone: Option<String>,
    pub email: Option<String>,
    /// Defaults to "site_web".
    pub source: Option<String>,
    pub notes: Option<String>,
    pub potentiel_ca: Option<f64>,
    /// Win probability percent, defaults to 50.
    pub probabilite: Option<i32>,
}

const LEAD_COLUMNS: &[&str] = &[
    "nom",
    "entreprise",
    "telephone",
    "email",
    "source",
    "statut",
    "date_dernier_contact",
    "notes",
    "potentiel_ca",
    "probabilite",
];

#[utoipa::path(
    get,
    path = "/api/leads",
    responses((status = 200, description = "All leads", body = [Lead])),
    security(("bearer_auth" = [])),
    tag = "CRM"
)]
pub async fn list_leads(pool: web::Data<MySqlPool>) -> actix_web::Result<impl Responder> {
    let leads = sqlx::query_as::<_, Lead>(r#"SELECT * FROM leads ORDER BY id DESC"#)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to list leads");
            ErrorInternalServerError("Database error")
        })?;

    Ok(HttpResponse::Ok().json(leads))
}

#[utoipa::path(
    post,
    path = "/api/leads",
    request_body = CreateLead,
    responses((status = 200, description = "Lead created")),
    security(("bearer_auth" = [])),
    tag = "CRM"
)]
pub async fn create_lead(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLead>,
) -> actix_web::Result<impl Responder> {
    let result = sqlx::query(
        r#"
        INSERT INTO leads
        (nom, entreprise, telephone, email, source, statut, date_creation,
         notes, potentiel_ca, probabilite)
        VALUES (?, ?, ?, ?, ?, 'nouveau', CURDATE(), ?, ?, ?)
        "#,
    )
    .bind(&payload.nom)
    .bind(&payload.entreprise)
    .bind(&payload.telephone)
    .bind(&payload.email)
    .bind(payload.source.as_deref().unwrap_or("site_web"))
    .bind(&payload.notes)
    .bind(payload.potentiel_ca.unwrap_or(0.0))
    .bind(payload.probabilite.unwrap_or(50))
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to create lead");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "id": result.last_insert_id() })))
}

/// Move a lead through the pipeline (statut, last contact, notes...).
#[utoipa::path(
    put,
    path = "/api/leads/{id}",
    params(("id" = u64, Path, description = "Lead ID")),
    responses((status = 200, description = "Lead updated"), (status = 404, description = "Not found")),
    security(("bearer_auth" = [])),
    tag = "CRM"
)]
pub async fn update_lead(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();

    let update = build_update_sql("leads", LEAD_COLUMNS, &body, "id", id)?;
    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({ "message": "Lead introuvable" })));
    }

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
