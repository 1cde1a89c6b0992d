use actix_web::{HttpResponse, Responder, http::StatusCode, web};
use chrono::{Local, NaiveDateTime};
use futures_util::stream;
use std::future::Future;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, warn};
use utoipa::ToSchema;

use crate::badge::BadgeError;
use crate::badge::ledger::{BadgeOutcome, BadgeSlot};
use crate::badge::notify::{BadgeNotification, NotifyHub};
use crate::config::Config;
use crate::model::attendance::Pointage;
use crate::model::employee::Employe;

/// Kiosk badge request. Coordinates may arrive as numbers or numeric
/// strings depending on the device; both are accepted and coerced here,
/// once, at the boundary.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BadgeCheckRequest {
    #[schema(example = "EMP001")]
    pub matricule: Option<String>,

    #[serde(default, deserialize_with = "coordinate")]
    #[schema(value_type = Option<f64>, example = 46.2044)]
    pub latitude: Option<f64>,

    #[serde(default, deserialize_with = "coordinate")]
    #[schema(value_type = Option<f64>, example = 6.1432)]
    pub longitude: Option<f64>,

    /// Explicit slot; omitted on plain kiosks, which badge sequentially.
    #[serde(rename = "type")]
    pub badge_type: Option<BadgeSlot>,
}

fn coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => Ok(n.as_f64()),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| D::Error::custom("coordonnée invalide")),
        Some(_) => Err(D::Error::custom("coordonnée invalide")),
    }
}

#[derive(Serialize, ToSchema)]
pub struct BadgeEmployee {
    pub name: String,
    pub position: Option<String>,
    pub department: Option<String>,
    pub photo: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct BadgeCheckResponse {
    pub success: bool,
    #[schema(example = "Bonjour Jean! Arrivée enregistrée à 08:05")]
    pub message: String,
    #[schema(example = "arrivee_matin")]
    pub action_type: String,
    pub employee: BadgeEmployee,
}

/// French confirmation shown on the kiosk screen.
fn confirmation(prenom: &str, outcome: &BadgeOutcome, at: NaiveDateTime) -> String {
    let heure = at.format("%H:%M");
    match outcome.slot {
        BadgeSlot::MorningArrival => format!("Bonjour {prenom}! Arrivée enregistrée à {heure}"),
        BadgeSlot::MiddayDeparture => {
            format!("Bon appétit {prenom}! Départ midi enregistré à {heure}")
        }
        BadgeSlot::AfternoonArrival => format!("Bon retour {prenom}! Retour enregistré à {heure}"),
        BadgeSlot::EveningDeparture => format!(
            "Bonne soirée {prenom}! Départ enregistré à {heure}. Total: {}h",
            outcome.total_hours.unwrap_or(0.0)
        ),
    }
}

/// Badge orchestration: the location report is persisted first and
/// unconditionally. It stays true even when the slot write is then
/// refused, so it must not ride in the badge transaction.
async fn badge_flow<P, PFut, T, TFut>(
    coords: Option<(f64, f64)>,
    persist_location: P,
    badge_tx: T,
) -> Result<BadgeOutcome, BadgeError>
where
    P: FnOnce(f64, f64) -> PFut,
    PFut: Future<Output = Result<(), BadgeError>>,
    T: FnOnce() -> TFut,
    TFut: Future<Output = Result<BadgeOutcome, BadgeError>>,
{
    if let Some((lat, lon)) = coords {
        persist_location(lat, lon).await?;
    }
    badge_tx().await
}

async fn persist_location(
    pool: &MySqlPool,
    employe_id: u64,
    lat: f64,
    lon: f64,
    at: NaiveDateTime,
) -> Result<(), BadgeError> {
    sqlx::query(
        r#"
        UPDATE employes
        SET latitude = ?, longitude = ?, derniere_localisation = ?
        WHERE id = ?
        "#,
    )
    .bind(lat)
    .bind(lon)
    .bind(at)
    .bind(employe_id)
    .execute(pool)
    .await?;
    Ok(())
}

async fn process_badge(
    pool: &MySqlPool,
    config: &Config,
    req: &BadgeCheckRequest,
    at: NaiveDateTime,
) -> Result<(Employe, BadgeOutcome), BadgeError> {
    let matricule = req.matricule.as_deref().map(str::trim).unwrap_or("");
    if matricule.is_empty() {
        return Err(BadgeError::MissingMatricule);
    }

    let employe = sqlx::query_as::<_, Employe>(
        r#"SELECT * FROM employes WHERE matricule = ? AND actif = TRUE"#,
    )
    .bind(matricule)
    .fetch_optional(pool)
    .await?
    .ok_or(BadgeError::UnknownEmployee)?;

    let employe_id = employe.id;
    let outcome = badge_flow(
        req.latitude.zip(req.longitude),
        |lat, lon| persist_location(pool, employe_id, lat, lon, at),
        || badge_transaction(pool, config, employe_id, req.badge_type, at),
    )
    .await?;

    Ok((employe, outcome))
}

/// One transaction per badge: the FOR UPDATE row lock serializes
/// concurrent badges for the same employee and day, so a slot can
/// never be written twice. The unique key on (employe_id,
/// date_pointage) makes the lazy insert race-safe.
async fn badge_transaction(
    pool: &MySqlPool,
    config: &Config,
    employe_id: u64,
    requested: Option<BadgeSlot>,
    at: NaiveDateTime,
) -> Result<BadgeOutcome, BadgeError> {
    let mut tx = pool.begin().await?;

    sqlx::query(r#"INSERT IGNORE INTO pointages (employe_id, date_pointage) VALUES (?, ?)"#)
        .bind(employe_id)
        .bind(at.date())
        .execute(&mut *tx)
        .await?;

    let mut row = sqlx::query_as::<_, Pointage>(
        r#"SELECT * FROM pointages WHERE employe_id = ? AND date_pointage = ? FOR UPDATE"#,
    )
    .bind(employe_id)
    .bind(at.date())
    .fetch_one(&mut *tx)
    .await?;

    let mut sheet = row.sheet();
    // Dropping the transaction on error rolls everything back.
    let outcome = sheet.record(requested, at, &config.thresholds())?;
    row.absorb(&sheet);

    sqlx::query(
        r#"
        UPDATE pointages
        SET arrivee_matin = ?, depart_midi = ?, arrivee_apres_midi = ?, depart_soir = ?,
            retard_matin = ?, retard_apres_midi = ?,
            heures_travaillees = ?, heures_supplementaires = ?
        WHERE id = ?
        "#,
    )
    .bind(row.arrivee_matin)
    .bind(row.depart_midi)
    .bind(row.arrivee_apres_midi)
    .bind(row.depart_soir)
    .bind(row.retard_matin)
    .bind(row.retard_apres_midi)
    .bind(row.heures_travaillees)
    .bind(row.heures_supplementaires)
    .bind(row.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(outcome)
}

fn status(e: &BadgeError) -> StatusCode {
    match e {
        BadgeError::MissingMatricule | BadgeError::Ledger(_) => StatusCode::BAD_REQUEST,
        BadgeError::UnknownEmployee => StatusCode::NOT_FOUND,
        BadgeError::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Badge check-in/out endpoint (public, rate limited; the kiosk has no
/// credentials, only the matricule).
#[utoipa::path(
    post,
    path = "/api/badge/check",
    request_body = BadgeCheckRequest,
    responses(
        (status = 200, description = "Pointage enregistré", body = BadgeCheckResponse),
        (status = 400, description = "Matricule manquant, créneau déjà pointé ou journée complète", body = Object, example = json!({
            "success": false,
            "message": "Tous les pointages du jour sont déjà enregistrés"
        })),
        (status = 404, description = "Matricule invalide ou employé inactif", body = Object, example = json!({
            "success": false,
            "message": "Matricule invalide ou employé inactif"
        })),
        (status = 500, description = "Erreur lors du pointage")
    ),
    tag = "Badge"
)]
pub async fn badge_check(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    hub: web::Data<Option<NotifyHub>>,
    payload: web::Json<BadgeCheckRequest>,
) -> impl Responder {
    let at = Local::now().naive_local();

    match process_badge(pool.get_ref(), config.get_ref(), &payload, at).await {
        Ok((employe, outcome)) => {
            // Fire-and-forget; a dead or disabled hub never fails a badge.
            if let Some(hub) = hub.get_ref() {
                let reached = hub.publish(BadgeNotification {
                    employe: employe.nom_complet(),
                    matricule: employe.matricule.clone(),
                    action: outcome.slot.to_string(),
                    heure: at.format("%H:%M").to_string(),
                    timestamp: at.format("%Y-%m-%dT%H:%M:%S").to_string(),
                });
                debug!(matricule = %employe.matricule, reached, "Badge event broadcast");
            }

            HttpResponse::Ok().json(BadgeCheckResponse {
                success: true,
                message: confirmation(&employe.prenom, &outcome, at),
                action_type: outcome.slot.to_string(),
                employee: BadgeEmployee {
                    name: employe.nom_complet(),
                    position: employe.position,
                    department: employe.departement,
                    photo: employe.photo,
                },
            })
        }
        Err(e) => {
            if let BadgeError::Processing(cause) = &e {
                error!(error = %cause, "Badge processing failed");
            }
            HttpResponse::build(status(&e))
                .json(json!({ "success": false, "message": e.to_string() }))
        }
    }
}

/// Live badge feed for the back-office dashboard, as Server-Sent
/// Events. Answers 503 when the hub is disabled by configuration.
#[utoipa::path(
    get,
    path = "/api/badge/stream",
    responses(
        (status = 200, description = "SSE stream of badge events"),
        (status = 503, description = "Flux de pointage indisponible")
    ),
    tag = "Badge"
)]
pub async fn badge_stream(hub: web::Data<Option<NotifyHub>>) -> impl Responder {
    let Some(hub) = hub.get_ref() else {
        warn!("Badge stream requested while the hub is disabled");
        return HttpResponse::ServiceUnavailable().json(json!({
            "success": false,
            "message": "Flux de pointage indisponible"
        }));
    };

    let rx = hub.subscribe();
    let events = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(data) => {
                        let chunk = web::Bytes::from(format!("data: {data}\n\n"));
                        return Some((Ok::<_, actix_web::Error>(chunk), rx));
                    }
                    Err(_) => continue,
                },
                // Slow consumer skipped some events; keep streaming.
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return None,
            }
        }
    });

    HttpResponse::Ok()
        .insert_header(("Content-Type", "text/event-stream"))
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::badge::ledger::LedgerError;
    use chrono::NaiveDate;
    use std::cell::RefCell;

    fn parse(body: &str) -> BadgeCheckRequest {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn errors_map_to_the_kiosk_status_codes() {
        assert_eq!(status(&BadgeError::MissingMatricule), StatusCode::BAD_REQUEST);
        assert_eq!(status(&BadgeError::UnknownEmployee), StatusCode::NOT_FOUND);
        assert_eq!(
            status(&BadgeError::Ledger(LedgerError::SlotAlreadyRecorded(
                BadgeSlot::MorningArrival
            ))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(&BadgeError::Ledger(LedgerError::DayComplete)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(&BadgeError::Processing(sqlx::Error::RowNotFound)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_web::test]
    async fn location_is_persisted_before_a_rejected_slot_write() {
        let calls = RefCell::new(Vec::new());

        let res = badge_flow(
            Some((46.2044, 6.1432)),
            |_, _| async {
                calls.borrow_mut().push("location");
                Ok(())
            },
            || async {
                calls.borrow_mut().push("badge");
                Err(BadgeError::Ledger(LedgerError::SlotAlreadyRecorded(
                    BadgeSlot::MorningArrival,
                )))
            },
        )
        .await;

        assert!(matches!(res, Err(BadgeError::Ledger(_))));
        assert_eq!(*calls.borrow(), ["location", "badge"]);
    }

    #[actix_web::test]
    async fn badge_without_coordinates_skips_the_location_write() {
        let touched = RefCell::new(false);

        let res = badge_flow(
            None,
            |_, _| async {
                *touched.borrow_mut() = true;
                Ok(())
            },
            || async {
                Ok(BadgeOutcome {
                    slot: BadgeSlot::MorningArrival,
                    late: false,
                    total_hours: None,
                })
            },
        )
        .await;

        assert!(res.is_ok());
        assert!(!*touched.borrow());
    }

    #[test]
    fn coordinates_accept_numbers_and_numeric_strings() {
        let req = parse(r#"{"matricule":"EMP001","latitude":46.2044,"longitude":"6.1432"}"#);
        assert_eq!(req.latitude, Some(46.2044));
        assert_eq!(req.longitude, Some(6.1432));

        let req = parse(r#"{"matricule":"EMP001","latitude":"","longitude":null}"#);
        assert_eq!(req.latitude, None);
        assert_eq!(req.longitude, None);

        assert!(
            serde_json::from_str::<BadgeCheckRequest>(
                r#"{"matricule":"EMP001","latitude":"nord"}"#
            )
            .is_err()
        );
    }

    #[test]
    fn explicit_type_maps_to_a_slot() {
        let req = parse(r#"{"matricule":"EMP001","type":"reprise"}"#);
        assert_eq!(req.badge_type, Some(BadgeSlot::AfternoonArrival));

        let req = parse(r#"{"matricule":"EMP001"}"#);
        assert_eq!(req.badge_type, None);
    }

    #[test]
    fn confirmation_messages_carry_the_badge_time() {
        let at = NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_opt(8, 5, 0)
            .unwrap();
        let outcome = BadgeOutcome {
            slot: BadgeSlot::MorningArrival,
            late: false,
            total_hours: None,
        };
        let msg = confirmation("Jean", &outcome, at);
        assert!(msg.contains("08:05"), "{msg}");
        assert!(msg.starts_with("Bonjour Jean"));
    }

    #[test]
    fn evening_confirmation_includes_total_hours() {
        let at = NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_opt(18, 10, 0)
            .unwrap();
        let outcome = BadgeOutcome {
            slot: BadgeSlot::EveningDeparture,
            late: false,
            total_hours: Some(7.92),
        };
        let msg = confirmation("Jean", &outcome, at);
        assert!(msg.contains("18:10"), "{msg}");
        assert!(msg.contains("7.92h"), "{msg}");
    }
}
