use crate::{
    model::employee::Employe,
    utils::db_utils::{build_update_sql, execute_update, is_duplicate_key},
};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateEmploye {
    #[schema(example = "Dupont")]
    pub nom: String,
    #[schema(example = "Jean")]
    pub prenom: String,
    pub departement: Option<String>,
    pub position: Option<String>,
    pub email: Option<String>,
    pub telephone: Option<String>,
}

const EMPLOYE_COLUMNS: &[&str] = &[
    "nom",
    "prenom",
    "departement",
    "position",
    "email",
    "telephone",
    "date_embauche",
    "photo",
    "actif",
];

/// List employees (active and inactive; the directory never forgets).
#[utoipa::path(
    get,
    path = "/api/employes",
    responses(
        (status = 200, description = "All employees", body = [Employe]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Employes"
)]
pub async fn list_employes(pool: web::Data<MySqlPool>) -> actix_web::Result<impl Responder> {
    let employes = sqlx::query_as::<_, Employe>(r#"SELECT * FROM employes ORDER BY nom, prenom"#)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to list employes");
            ErrorInternalServerError("Database error")
        })?;

    Ok(HttpResponse::Ok().json(employes))
}

/// Hire a new employee. The matricule is generated here (EMP001, ...)
/// and is what the badge kiosk will ask for.
#[utoipa::path(
    post,
    path = "/api/employes",
    request_body = CreateEmploye,
    responses(
        (status = 200, description = "Employee created", body = Object, example = json!({
            "success": true, "id": 12, "matricule": "EMP012"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Employes"
)]
pub async fn create_employe(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEmploye>,
) -> actix_web::Result<impl Responder> {
    // Concurrent hires can read the same MAX; the unique key catches
    // the loser, which retries with a fresh sequence.
    for attempt in 0..3 {
        let matricule = next_matricule(pool.get_ref()).await.map_err(|e| {
            error!(error = %e, "Failed to compute next matricule");
            ErrorInternalServerError("Database error")
        })?;

        let result = sqlx::query(
            r#"
            INSERT INTO employes
            (matricule, nom, prenom, departement, position, email, telephone, date_embauche, actif)
            VALUES (?, ?, ?, ?, ?, ?, ?, CURDATE(), TRUE)
            "#,
        )
        .bind(&matricule)
        .bind(&payload.nom)
        .bind(&payload.prenom)
        .bind(&payload.departement)
        .bind(&payload.position)
        .bind(&payload.email)
        .bind(&payload.telephone)
        .execute(pool.get_ref())
        .await;

        match result {
            Ok(result) => {
                return Ok(HttpResponse::Ok().json(json!({
                    "success": true,
                    "id": result.last_insert_id(),
                    "matricule": matricule
                })));
            }
            Err(e) if is_duplicate_key(&e) && attempt < 2 => continue,
            Err(e) => {
                error!(error = %e, "Failed to create employe");
                return Err(ErrorInternalServerError("Database error"));
            }
        }
    }

    Err(ErrorInternalServerError("Database error"))
}

async fn next_matricule(pool: &MySqlPool) -> Result<String, sqlx::Error> {
    let max: Option<u64> = sqlx::query_scalar(
        r#"
        SELECT MAX(CAST(SUBSTRING(matricule, 4) AS UNSIGNED))
        FROM employes WHERE matricule LIKE 'EMP%'
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(format_matricule(max.unwrap_or(0) + 1))
}

fn format_matricule(seq: u64) -> String {
    format!("EMP{:03}", seq)
}

/// Get one employee.
#[utoipa::path(
    get,
    path = "/api/employes/{id}",
    params(("id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee found", body = Employe),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employes"
)]
pub async fn get_employe(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();

    let employe = sqlx::query_as::<_, Employe>(r#"SELECT * FROM employes WHERE id = ?"#)
        .bind(id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to fetch employe");
            ErrorInternalServerError("Database error")
        })?;

    match employe {
        Some(e) => Ok(HttpResponse::Ok().json(e)),
        None => Ok(HttpResponse::NotFound().json(json!({ "message": "Employé introuvable" }))),
    }
}

/// Partial update from the admin UI.
#[utoipa::path(
    put,
    path = "/api/employes/{id}",
    params(("id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee updated"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employes"
)]
pub async fn update_employe(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();

    let update = build_update_sql("employes", EMPLOYE_COLUMNS, &body, "id", id)?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({ "message": "Employé introuvable" })));
    }

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

/// "Delete" = deactivate. Attendance history stays; the matricule stops
/// badging.
#[utoipa::path(
    delete,
    path = "/api/employes/{id}",
    params(("id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee deactivated"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employes"
)]
pub async fn deactivate_employe(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();

    let result = sqlx::query(r#"UPDATE employes SET actif = FALSE WHERE id = ?"#)
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to deactivate employe");
            ErrorInternalServerError("Database error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({ "message": "Employé introuvable" })));
    }

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matricule_pads_to_three_digits_then_grows() {
        assert_eq!(format_matricule(1), "EMP001");
        assert_eq!(format_matricule(12), "EMP012");
        assert_eq!(format_matricule(1234), "EMP1234");
    }
}
