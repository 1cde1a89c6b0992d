use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Lead {
    pub id: u64,
    pub nom: String,
    pub entreprise: Option<String>,
    pub telephone: Option<String>,
    pub email: Option<String>,
    /// Acquisition channel ("site_web", "recommandation", ...).
    pub source: Option<String>,
    /// "nouveau", "contacte", "qualifie", "converti", "perdu".
    pub statut: String,
    #[schema(value_type = String, format = "date", nullable = true)]
    pub date_creation: Option<NaiveDate>,
    #[schema(value_type = String, format = "date", nullable = true)]
    pub date_dernier_contact: Option<NaiveDate>,
    pub notes: Option<String>,
    /// Estimated deal size, CHF.
    pub potentiel_ca: Option<f64>,
    /// Win probability, percent.
    pub probabilite: i32,
}
