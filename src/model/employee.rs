use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "matricule": "EMP001",
        "nom": "Dupont",
        "prenom": "Jean",
        "departement": "Gros œuvre",
        "position": "Chef d'équipe",
        "email": "jean.dupont@globibat.com",
        "telephone": "+41 22 555 01 01",
        "date_embauche": "2023-03-01",
        "actif": true
    })
)]
pub struct Employe {
    #[schema(example = 1)]
    pub id: u64,

    /// Unique badge code, auto-generated (EMP001, EMP002, ...).
    #[schema(example = "EMP001")]
    pub matricule: String,

    #[schema(example = "Dupont")]
    pub nom: String,

    #[schema(example = "Jean")]
    pub prenom: String,

    pub departement: Option<String>,
    pub position: Option<String>,
    pub email: Option<String>,
    pub telephone: Option<String>,

    #[schema(value_type = String, format = "date", nullable = true)]
    pub date_embauche: Option<NaiveDate>,

    /// Employees are never hard-deleted, only deactivated.
    pub actif: bool,

    /// Last position reported by a badge event.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub derniere_localisation: Option<NaiveDateTime>,

    pub photo: Option<String>,
}

impl Employe {
    pub fn nom_complet(&self) -> String {
        format!("{} {}", self.prenom, self.nom)
    }
}
