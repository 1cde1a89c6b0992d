use actix_web::{HttpResponse, Responder, web};
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams)]
pub struct PointageQuery {
    /// Day to inspect; defaults to today.
    pub date: Option<NaiveDate>,
}

/// Attendance row joined with employee identity, for the day board.
#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct PointageJour {
    pub employe_id: u64,
    pub matricule: String,
    pub nom: String,
    pub prenom: String,
    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub arrivee_matin: Option<NaiveDateTime>,
    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub depart_midi: Option<NaiveDateTime>,
    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub arrivee_apres_midi: Option<NaiveDateTime>,
    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub depart_soir: Option<NaiveDateTime>,
    pub heures_travaillees: f64,
    pub heures_supplementaires: f64,
    pub retard_matin: bool,
    pub retard_apres_midi: bool,
}

#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct Absent {
    pub employe_id: u64,
    pub matricule: String,
    pub nom: String,
    pub prenom: String,
}

#[derive(Serialize, ToSchema)]
pub struct PointageJourResponse {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub pointages: Vec<PointageJour>,
    /// Active employees with no badge at all that day.
    pub absents: Vec<Absent>,
}

/// Day attendance board: who badged, when, and who is absent.
#[utoipa::path(
    get,
    path = "/api/pointages",
    params(PointageQuery),
    responses(
        (status = 200, description = "Attendance for the day", body = PointageJourResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Badge"
)]
pub async fn list_pointages(
    pool: web::Data<MySqlPool>,
    query: web::Query<PointageQuery>,
) -> actix_web::Result<impl Responder> {
    let date = query.date.unwrap_or_else(|| Local::now().date_naive());

    let pointages = sqlx::query_as::<_, PointageJour>(
        r#"
        SELECT p.employe_id, e.matricule, e.nom, e.prenom,
               p.arrivee_matin, p.depart_midi, p.arrivee_apres_midi, p.depart_soir,
               p.heures_travaillees, p.heures_supplementaires,
               p.retard_matin, p.retard_apres_midi
        FROM pointages p
        JOIN employes e ON e.id = p.employe_id
        WHERE p.date_pointage = ?
        ORDER BY e.nom, e.prenom
        "#,
    )
    .bind(date)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, %date, "Failed to fetch day attendance");
        actix_web::error::ErrorInternalServerError("Database error")
    })?;

    let absents = sqlx::query_as::<_, Absent>(
        r#"
        SELECT e.id AS employe_id, e.matricule, e.nom, e.prenom
        FROM employes e
        WHERE e.actif = TRUE
          AND NOT EXISTS (
              SELECT 1 FROM pointages p
              WHERE p.employe_id = e.id AND p.date_pointage = ?
          )
        ORDER BY e.nom, e.prenom
        "#,
    )
    .bind(date)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, %date, "Failed to fetch absents");
        actix_web::error::ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(PointageJourResponse {
        date,
        pointages,
        absents,
    }))
}
