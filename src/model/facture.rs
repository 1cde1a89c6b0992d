use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Invoice. Numbered FAC-{year}-{seq:04}; statut one of "brouillon",
/// "envoyee", "payee", "retard", "annulee".
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Facture {
    pub id: u64,
    #[schema(example = "FAC-2025-0123")]
    pub numero: String,
    pub client_id: Option<u64>,
    pub chantier_id: Option<u64>,
    pub devis_id: Option<u64>,
    #[schema(value_type = String, format = "date", nullable = true)]
    pub date_facture: Option<NaiveDate>,
    #[schema(value_type = String, format = "date", nullable = true)]
    pub date_echeance: Option<NaiveDate>,
    pub montant_ht: f64,
    pub tva: f64,
    pub montant_ttc: f64,
    pub statut: String,
}
