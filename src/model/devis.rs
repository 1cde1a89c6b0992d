use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Quote. Numbered DEV-{year}-{seq:04} at creation; statut moves
/// brouillon → envoye → accepte/refuse.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Devis {
    pub id: u64,
    #[schema(example = "DEV-2025-0042")]
    pub numero: String,
    pub client_id: Option<u64>,
    #[schema(value_type = String, format = "date", nullable = true)]
    pub date_devis: Option<NaiveDate>,
    #[schema(value_type = String, format = "date", nullable = true)]
    pub date_validite: Option<NaiveDate>,
    pub montant_ht: f64,
    pub tva: f64,
    pub montant_ttc: f64,
    pub statut: String,
    pub description: Option<String>,
    pub conditions: Option<String>,
}
