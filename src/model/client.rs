use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Client {
    pub id: u64,
    #[schema(example = "Régie du Lac SA")]
    pub nom: String,
    /// "particulier", "entreprise" or "collectivite".
    pub type_client: Option<String>,
    pub contact: Option<String>,
    pub telephone: Option<String>,
    pub email: Option<String>,
    pub adresse: Option<String>,
    pub ville: Option<String>,
    pub code_postal: Option<String>,
    #[schema(value_type = String, format = "date", nullable = true)]
    pub date_creation: Option<NaiveDate>,
    pub actif: bool,
    pub notes: Option<String>,
}
