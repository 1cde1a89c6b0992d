use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A construction site. Statut is one of "planifie", "en_cours",
/// "suspendu", "termine".
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Chantier {
    pub id: u64,
    #[schema(example = "Rénovation Quai Gustave-Ador")]
    pub nom: String,
    pub client_id: Option<u64>,
    pub adresse: Option<String>,
    #[schema(value_type = String, format = "date", nullable = true)]
    pub date_debut: Option<NaiveDate>,
    #[schema(value_type = String, format = "date", nullable = true)]
    pub date_fin_prevue: Option<NaiveDate>,
    #[schema(value_type = String, format = "date", nullable = true)]
    pub date_fin_reelle: Option<NaiveDate>,
    pub statut: String,
    pub budget_initial: f64,
    pub budget_consomme: f64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: Option<String>,
    pub chef_chantier_id: Option<u64>,
}
