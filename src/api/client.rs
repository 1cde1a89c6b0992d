use crate::{
    model::client::Client,
    utils::db_utils::{build_update_sql, execute_update},
};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateClient {
    pub nom: String,
    /// Defaults to "particulier".
    pub type_client: Option<String>,
    pub contact: Option<String>,
    pub telephone: Option<String>,
    pub email: Option<String>,
    pub adresse: Option<String>,
    pub ville: Option<String>,
    pub code_postal: Option<String>,
    pub notes: Option<String>,
}

const CLIENT_COLUMNS: &[&str] = &[
    "nom",
    "type_client",
    "contact",
    "telephone",
    "email",
    "adresse",
    "ville",
    "code_postal",
    "notes",
    "actif",
];

#[utoipa::path(
    get,
    path = "/api/clients",
    responses((status = 200, description = "All clients", body = [Client])),
    security(("bearer_auth" = [])),
    tag = "CRM"
)]
pub async fn list_clients(pool: web::Data<MySqlPool>) -> actix_web::Result<impl Responder> {
    let clients = sqlx::query_as::<_, Client>(r#"SELECT * FROM clients ORDER BY nom"#)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to list clients");
            ErrorInternalServerError("Database error")
        })?;

    Ok(HttpResponse::Ok().json(clients))
}

#[utoipa::path(
    post,
    path = "/api/clients",
    request_body = CreateClient,
    responses((status = 200, description = "Client created")),
    security(("bearer_auth" = [])),
    tag = "CRM"
)]
pub async fn create_client(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateClient>,
) -> actix_web::Result<impl Responder> {
    let result = sqlx::query(
        r#"
        INSERT INTO clients
        (nom, type_client, contact, telephone, email, adresse, ville, code_postal, notes,
         date_creation, actif)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, CURDATE(), TRUE)
        "#,
    )
    .bind(&payload.nom)
    .bind(payload.type_client.as_deref().unwrap_or("particulier"))
    .bind(&payload.contact)
    .bind(&payload.telephone)
    .bind(&payload.email)
    .bind(&payload.adresse)
    .bind(&payload.ville)
    .bind(&payload.code_postal)
    .bind(&payload.notes)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to create client");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "id": result.last_insert_id() })))
}

#[utoipa::path(
    put,
    path = "/api/clients/{id}",
    params(("id" = u64, Path, description = "Client ID")),
    responses((status = 200, description = "Client updated"), (status = 404, description = "Not found")),
    security(("bearer_auth" = [])),
    tag = "CRM"
)]
pub async fn update_client(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();

    let update = build_update_sql("clients", CLIENT_COLUMNS, &body, "id", id)?;
    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({ "message": "Client introuvable" })));
    }

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

/// Soft delete, same policy as employees.
#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    params(("id" = u64, Path, description = "Client ID")),
    responses((status = 200, description = "Client deactivated"), (status = 404, description = "Not found")),
    security(("bearer_auth" = [])),
    tag = "CRM"
)]
pub async fn deactivate_client(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();

    let result = sqlx::query(r#"UPDATE clients SET actif = FALSE WHERE id = ?"#)
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to deactivate client");
            ErrorInternalServerError("Database error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({ "message": "Client introuvable" })));
    }

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
