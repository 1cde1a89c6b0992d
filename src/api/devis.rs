use crate::model::devis::Devis;
use crate::utils::db_utils::{format_numero, is_duplicate_key, next_numero_seq};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::{Datelike, Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateDevis {
    pub client_id: u64,
    pub montant_ht: Option<f64>,
    pub tva: Option<f64>,
    pub montant_ttc: Option<f64>,
    pub description: Option<String>,
    pub conditions: Option<String>,
    #[schema(value_type = String, format = "date", nullable = true)]
    pub date_validite: Option<NaiveDate>,
}

#[utoipa::path(
    get,
    path = "/api/devis",
    responses((status = 200, description = "All quotes", body = [Devis])),
    security(("bearer_auth" = [])),
    tag = "CRM"
)]
pub async fn list_devis(pool: web::Data<MySqlPool>) -> actix_web::Result<impl Responder> {
    let devis = sqlx::query_as::<_, Devis>(r#"SELECT * FROM devis ORDER BY id DESC"#)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to list devis");
            ErrorInternalServerError("Database error")
        })?;

    Ok(HttpResponse::Ok().json(devis))
}

/// Create a quote; the DEV-{year}-{seq} number is assigned here.
#[utoipa::path(
    post,
    path = "/api/devis",
    request_body = CreateDevis,
    responses(
        (status = 200, description = "Quote created", body = Object, example = json!({
            "success": true, "id": 3, "numero": "DEV-2025-0003"
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "CRM"
)]
pub async fn create_devis(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateDevis>,
) -> actix_web::Result<impl Responder> {
    let prefix = format!("DEV-{}-", Local::now().year());

    // Two concurrent creates can draw the same sequence; the UNIQUE
    // numero rejects one, which retries with a fresh read.
    for attempt in 0..3 {
        let seq = next_numero_seq(pool.get_ref(), "devis", &prefix)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to compute next devis numero");
                ErrorInternalServerError("Database error")
            })?;
        let numero = format_numero(&prefix, seq);

        let result = sqlx::query(
            r#"
            INSERT INTO devis
            (numero, client_id, date_devis, date_validite, montant_ht, tva, montant_ttc,
             statut, description, conditions)
            VALUES (?, ?, CURDATE(), ?, ?, ?, ?, 'brouillon', ?, ?)
            "#,
        )
        .bind(&numero)
        .bind(payload.client_id)
        .bind(payload.date_validite)
        .bind(payload.montant_ht.unwrap_or(0.0))
        .bind(payload.tva.unwrap_or(0.0))
        .bind(payload.montant_ttc.unwrap_or(0.0))
        .bind(&payload.description)
        .bind(&payload.conditions)
        .execute(pool.get_ref())
        .await;

        match result {
            Ok(result) => {
                return Ok(HttpResponse::Ok().json(json!({
                    "success": true,
                    "id": result.last_insert_id(),
                    "numero": numero
                })));
            }
            Err(e) if is_duplicate_key(&e) && attempt < 2 => continue,
            Err(e) => {
                error!(error = %e, "Failed to create devis");
                return Err(ErrorInternalServerError("Database error"));
            }
        }
    }

    Err(ErrorInternalServerError("Database error"))
}
