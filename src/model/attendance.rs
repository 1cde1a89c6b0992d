use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::badge::ledger::DaySheet;

/// One attendance row per (employee, date); see the unique key on
/// `pointages` in schema.sql. Slot timestamps are write-once, hours
/// are derived by the ledger.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Pointage {
    pub id: u64,
    pub employe_id: u64,

    #[schema(value_type = String, format = "date")]
    pub date_pointage: NaiveDate,

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

impl Pointage {
    pub fn sheet(&self) -> DaySheet {
        DaySheet {
            arrivee_matin: self.arrivee_matin,
            depart_midi: self.depart_midi,
            arrivee_apres_midi: self.arrivee_apres_midi,
            depart_soir: self.depart_soir,
            retard_matin: self.retard_matin,
            retard_apres_midi: self.retard_apres_midi,
            heures_travaillees: self.heures_travaillees,
            heures_supplementaires: self.heures_supplementaires,
        }
    }

    /// Copy a mutated sheet back onto the row before persisting.
    pub fn absorb(&mut self, sheet: &DaySheet) {
        self.arrivee_matin = sheet.arrivee_matin;
        self.depart_midi = sheet.depart_midi;
        self.arrivee_apres_midi = sheet.arrivee_apres_midi;
        self.depart_soir = sheet.depart_soir;
        self.retard_matin = sheet.retard_matin;
        self.retard_apres_midi = sheet.retard_apres_midi;
        self.heures_travaillees = sheet.heures_travaillees;
        self.heures_supplementaires = sheet.heures_supplementaires;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::badge::ledger::Thresholds;

    #[test]
    fn sheet_round_trips_through_the_row() {
        let mut row = Pointage {
            id: 7,
            employe_id: 1,
            date_pointage: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            arrivee_matin: None,
            depart_midi: None,
            arrivee_apres_midi: None,
            depart_soir: None,
            heures_travaillees: 0.0,
            heures_supplementaires: 0.0,
            retard_matin: false,
            retard_apres_midi: false,
        };

        let mut sheet = row.sheet();
        let at = row.date_pointage.and_hms_opt(9, 30, 0).unwrap();
        let out = sheet.record(None, at, &Thresholds::default()).unwrap();
        assert!(out.late);

        row.absorb(&sheet);
        assert_eq!(row.arrivee_matin, Some(at));
        assert!(row.retard_matin);
    }
}
