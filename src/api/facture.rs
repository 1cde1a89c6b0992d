use crate::model::facture::Facture;
use crate::utils::db_utils::{format_numero, is_duplicate_key, next_numero_seq};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::{Datelike, Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams)]
pub struct FactureQuery {
    /// Filter by statut (brouillon, envoyee, payee, retard, annulee).
    pub statut: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateFacture {
    pub client_id: u64,
    pub chantier_id: Option<u64>,
    pub devis_id: Option<u64>,
    pub montant_ht: Option<f64>,
    pub tva: Option<f64>,
    pub montant_ttc: Option<f64>,
    #[schema(value_type = String, format = "date", nullable = true)]
    pub date_echeance: Option<NaiveDate>,
}

#[utoipa::path(
    get,
    path = "/api/factures",
    params(FactureQuery),
    responses((status = 200, description = "Invoices", body = [Facture])),
    security(("bearer_auth" = [])),
    tag = "CRM"
)]
pub async fn list_factures(
    pool: web::Data<MySqlPool>,
    query: web::Query<FactureQuery>,
) -> actix_web::Result<impl Responder> {
    let factures = match &query.statut {
        Some(statut) => {
            sqlx::query_as::<_, Facture>(r#"SELECT * FROM factures WHERE statut = ? ORDER BY id DESC"#)
                .bind(statut)
                .fetch_all(pool.get_ref())
                .await
        }
        None => {
            sqlx::query_as::<_, Facture>(r#"SELECT * FROM factures ORDER BY id DESC"#)
                .fetch_all(pool.get_ref())
                .await
        }
    }
    .map_err(|e| {
        error!(error = %e, "Failed to list factures");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(factures))
}

/// Create an invoice; the FAC-{year}-{seq} number is assigned here.
#[utoipa::path(
    post,
    path = "/api/factures",
    request_body = CreateFacture,
    responses(
        (status = 200, description = "Invoice created", body = Object, example = json!({
            "success": true, "id": 9, "numero": "FAC-2025-0009"
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "CRM"
)]
pub async fn create_facture(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateFacture>,
) -> actix_web::Result<impl Responder> {
    let prefix = format!("FAC-{}-", Local::now().year());

    for attempt in 0..3 {
        let seq = next_numero_seq(pool.get_ref(), "factures", &prefix)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to compute next facture numero");
                ErrorInternalServerError("Database error")
            })?;
        let numero = format_numero(&prefix, seq);

        let result = sqlx::query(
            r#"
            INSERT INTO factures
            (numero, client_id, chantier_id, devis_id, date_facture, date_echeance,
             montant_ht, tva, montant_ttc, statut)
            VALUES (?, ?, ?, ?, CURDATE(), ?, ?, ?, ?, 'brouillon')
            "#,
        )
        .bind(&numero)
        .bind(payload.client_id)
        .bind(payload.chantier_id)
        .bind(payload.devis_id)
        .bind(payload.date_echeance)
        .bind(payload.montant_ht.unwrap_or(0.0))
        .bind(payload.tva.unwrap_or(0.0))
        .bind(payload.montant_ttc.unwrap_or(0.0))
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
                error!(error = %e, "Failed to create facture");
                return Err(ErrorInternalServerError("Database error"));
            }
        }
    }

    Err(ErrorInternalServerError("Database error"))
}
