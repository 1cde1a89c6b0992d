use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One of the four daily badge checkpoints, in the order they are
/// inferred when the device sends no explicit `type`.
///
/// Wire names (`matin`, ...) are what the kiosk sends; the strum
/// serialization is the `action_type` string exposed in responses and
/// broadcast events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, ToSchema)]
pub enum BadgeSlot {
    #[serde(rename = "matin")]
    #[strum(serialize = "arrivee_matin")]
    MorningArrival,
    #[serde(rename = "midi")]
    #[strum(serialize = "depart_midi")]
    MiddayDeparture,
    #[serde(rename = "reprise")]
    #[strum(serialize = "arrivee_apres_midi")]
    AfternoonArrival,
    #[serde(rename = "soir")]
    #[strum(serialize = "depart_soir")]
    EveningDeparture,
}

impl BadgeSlot {
    /// Inference order for implicit badges.
    pub const ORDER: [BadgeSlot; 4] = [
        BadgeSlot::MorningArrival,
        BadgeSlot::MiddayDeparture,
        BadgeSlot::AfternoonArrival,
        BadgeSlot::EveningDeparture,
    ];
}

/// Time-of-day limits after which an arrival is flagged late.
/// Strictly after: badging at exactly the threshold is on time.
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    pub matin: NaiveTime,
    pub apres_midi: NaiveTime,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            matin: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            apres_midi: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum LedgerError {
    /// The requested (or inferred) slot already holds a timestamp.
    /// Slots are write-once; the client must not resubmit.
    #[display(fmt = "Le pointage « {} » est déjà enregistré", _0)]
    SlotAlreadyRecorded(BadgeSlot),
    /// All four slots are filled and no explicit slot was requested.
    #[display(fmt = "Tous les pointages du jour sont déjà enregistrés")]
    DayComplete,
}

impl std::error::Error for LedgerError {}

/// Result of one accepted badge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BadgeOutcome {
    pub slot: BadgeSlot,
    pub late: bool,
    /// Total worked hours, present only when the evening departure
    /// closed the day.
    pub total_hours: Option<f64>,
}

/// In-memory image of one (employee, date) attendance row.
///
/// The daily state machine lives here: `Empty → MorningIn → MiddayOut →
/// AfternoonIn → Complete`, each transition writing one slot exactly
/// once. Hours are derived, recomputed only when the evening departure
/// lands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DaySheet {
    pub arrivee_matin: Option<NaiveDateTime>,
    pub depart_midi: Option<NaiveDateTime>,
    pub arrivee_apres_midi: Option<NaiveDateTime>,
    pub depart_soir: Option<NaiveDateTime>,
    pub retard_matin: bool,
    pub retard_apres_midi: bool,
    pub heures_travaillees: f64,
    pub heures_supplementaires: f64,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

impl DaySheet {
    pub fn slot(&self, slot: BadgeSlot) -> Option<NaiveDateTime> {
        match slot {
            BadgeSlot::MorningArrival => self.arrivee_matin,
            BadgeSlot::MiddayDeparture => self.depart_midi,
            BadgeSlot::AfternoonArrival => self.arrivee_apres_midi,
            BadgeSlot::EveningDeparture => self.depart_soir,
        }
    }

    fn set_slot(&mut self, slot: BadgeSlot, at: NaiveDateTime) {
        let field = match slot {
            BadgeSlot::MorningArrival => &mut self.arrivee_matin,
            BadgeSlot::MiddayDeparture => &mut self.depart_midi,
            BadgeSlot::AfternoonArrival => &mut self.arrivee_apres_midi,
            BadgeSlot::EveningDeparture => &mut self.depart_soir,
        };
        *field = Some(at);
    }

    /// First unset slot in badge order, if any.
    pub fn next_free(&self) -> Option<BadgeSlot> {
        BadgeSlot::ORDER
            .into_iter()
            .find(|s| self.slot(*s).is_none())
    }

    /// Apply one badge event.
    ///
    /// `requested` targets a specific slot (kiosk sent an explicit
    /// `type`); otherwise the first unset slot is taken. The write is
    /// rejected, without mutating anything, when the slot already
    /// holds a timestamp or when the day is complete.
    pub fn record(
        &mut self,
        requested: Option<BadgeSlot>,
        at: NaiveDateTime,
        thresholds: &Thresholds,
    ) -> Result<BadgeOutcome, LedgerError> {
        let slot = match requested {
            Some(s) => s,
            None => self.next_free().ok_or(LedgerError::DayComplete)?,
        };

        if self.slot(slot).is_some() {
            return Err(LedgerError::SlotAlreadyRecorded(slot));
        }

        self.set_slot(slot, at);

        let late = match slot {
            BadgeSlot::MorningArrival if at.time() > thresholds.matin => {
                self.retard_matin = true;
                true
            }
            BadgeSlot::AfternoonArrival if at.time() > thresholds.apres_midi => {
                self.retard_apres_midi = true;
                true
            }
            _ => false,
        };

        let total_hours = if slot == BadgeSlot::EveningDeparture {
            self.recompute_hours();
            Some(self.heures_travaillees)
        } else {
            None
        };

        Ok(BadgeOutcome {
            slot,
            late,
            total_hours,
        })
    }

    /// Worked hours = morning span + afternoon span, a span counting 0
    /// unless both of its bounds are set. Overtime is anything past 8h.
    fn recompute_hours(&mut self) {
        let span = |start: Option<NaiveDateTime>, end: Option<NaiveDateTime>| match (start, end) {
            (Some(s), Some(e)) => (e - s).num_seconds() as f64 / 3600.0,
            _ => 0.0,
        };

        let total = span(self.arrivee_matin, self.depart_midi)
            + span(self.arrivee_apres_midi, self.depart_soir);

        self.heures_travaillees = round2(total.max(0.0));
        self.heures_supplementaires = round2((self.heures_travaillees - 8.0).max(0.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn th() -> Thresholds {
        Thresholds::default()
    }

    #[test]
    fn implicit_badges_fill_slots_in_fixed_order() {
        let mut sheet = DaySheet::default();
        let expected = [
            BadgeSlot::MorningArrival,
            BadgeSlot::MiddayDeparture,
            BadgeSlot::AfternoonArrival,
            BadgeSlot::EveningDeparture,
        ];
        for (i, want) in expected.into_iter().enumerate() {
            let out = sheet.record(None, at(8 + 3 * i as u32, 0, 0), &th()).unwrap();
            assert_eq!(out.slot, want);
        }
        assert_eq!(sheet.next_free(), None);
    }

    #[test]
    fn fifth_implicit_badge_is_day_complete() {
        let mut sheet = DaySheet::default();
        for _ in 0..4 {
            sheet.record(None, at(8, 0, 0), &th()).unwrap();
        }
        assert_eq!(
            sheet.record(None, at(20, 0, 0), &th()),
            Err(LedgerError::DayComplete)
        );
    }

    #[test]
    fn explicit_rebadge_of_a_set_slot_is_rejected_and_mutates_nothing() {
        let mut sheet = DaySheet::default();
        sheet
            .record(Some(BadgeSlot::MorningArrival), at(8, 5, 0), &th())
            .unwrap();
        let before = sheet.clone();

        for _ in 0..3 {
            assert_eq!(
                sheet.record(Some(BadgeSlot::MorningArrival), at(9, 30, 0), &th()),
                Err(LedgerError::SlotAlreadyRecorded(BadgeSlot::MorningArrival))
            );
        }
        assert_eq!(sheet, before);
        assert_eq!(sheet.arrivee_matin, Some(at(8, 5, 0)));
        assert!(!sheet.retard_matin);
    }

    #[test]
    fn explicit_slot_can_skip_the_sequence() {
        let mut sheet = DaySheet::default();
        let out = sheet
            .record(Some(BadgeSlot::EveningDeparture), at(18, 0, 0), &th())
            .unwrap();
        // Closing an otherwise empty day yields zero hours, never negative.
        assert_eq!(out.total_hours, Some(0.0));
        assert_eq!(sheet.heures_travaillees, 0.0);
        assert_eq!(sheet.heures_supplementaires, 0.0);
        // The sequence resumes at the first unset slot.
        assert_eq!(sheet.next_free(), Some(BadgeSlot::MorningArrival));
    }

    #[test]
    fn morning_lateness_boundary_is_strict() {
        for (h, m, s, late) in [(8, 59, 59, false), (9, 0, 0, false), (9, 0, 1, true)] {
            let mut sheet = DaySheet::default();
            let out = sheet.record(None, at(h, m, s), &th()).unwrap();
            assert_eq!(out.late, late, "{h:02}:{m:02}:{s:02}");
            assert_eq!(sheet.retard_matin, late);
        }
    }

    #[test]
    fn afternoon_lateness_boundary_is_strict() {
        for (h, m, s, late) in [(13, 59, 59, false), (14, 0, 0, false), (14, 0, 1, true)] {
            let mut sheet = DaySheet::default();
            sheet.record(None, at(8, 0, 0), &th()).unwrap();
            sheet.record(None, at(12, 0, 0), &th()).unwrap();
            let out = sheet.record(None, at(h, m, s), &th()).unwrap();
            assert_eq!(out.slot, BadgeSlot::AfternoonArrival);
            assert_eq!(out.late, late, "{h:02}:{m:02}:{s:02}");
            assert_eq!(sheet.retard_apres_midi, late);
        }
    }

    #[test]
    fn departures_never_set_lateness_flags() {
        let mut sheet = DaySheet::default();
        sheet
            .record(Some(BadgeSlot::MiddayDeparture), at(15, 0, 0), &th())
            .unwrap();
        sheet
            .record(Some(BadgeSlot::EveningDeparture), at(23, 0, 0), &th())
            .unwrap();
        assert!(!sheet.retard_matin);
        assert!(!sheet.retard_apres_midi);
    }

    #[test]
    fn full_day_without_overtime() {
        // 08:05 -> 12:00 and 14:10 -> 18:10 = 3.9167 + 4.0 ≈ 7.92 h.
        let mut sheet = DaySheet::default();
        let out = sheet.record(None, at(8, 5, 0), &th()).unwrap();
        assert!(!out.late);
        sheet.record(None, at(12, 0, 0), &th()).unwrap();
        let out = sheet.record(None, at(14, 10, 0), &th()).unwrap();
        assert!(out.late);
        let out = sheet.record(None, at(18, 10, 0), &th()).unwrap();

        assert_eq!(out.total_hours, Some(7.92));
        assert_eq!(sheet.heures_travaillees, 7.92);
        assert_eq!(sheet.heures_supplementaires, 0.0);
    }

    #[test]
    fn full_day_with_overtime() {
        // Same morning, evening at 19:00: 3.9167 + 4.8333 = 8.75 h.
        let mut sheet = DaySheet::default();
        sheet.record(None, at(8, 5, 0), &th()).unwrap();
        sheet.record(None, at(12, 0, 0), &th()).unwrap();
        sheet.record(None, at(14, 10, 0), &th()).unwrap();
        let out = sheet.record(None, at(19, 0, 0), &th()).unwrap();

        assert_eq!(out.total_hours, Some(8.75));
        assert_eq!(sheet.heures_travaillees, 8.75);
        assert_eq!(sheet.heures_supplementaires, 0.75);
    }

    #[test]
    fn incomplete_morning_pair_counts_zero() {
        // No midday departure: only the afternoon span counts.
        let mut sheet = DaySheet::default();
        sheet.record(Some(BadgeSlot::MorningArrival), at(8, 0, 0), &th())
            .unwrap();
        sheet
            .record(Some(BadgeSlot::AfternoonArrival), at(13, 0, 0), &th())
            .unwrap();
        let out = sheet
            .record(Some(BadgeSlot::EveningDeparture), at(17, 30, 0), &th())
            .unwrap();
        assert_eq!(out.total_hours, Some(4.5));
    }

    #[test]
    fn hours_are_only_computed_by_the_evening_departure() {
        let mut sheet = DaySheet::default();
        sheet.record(None, at(8, 0, 0), &th()).unwrap();
        sheet.record(None, at(12, 0, 0), &th()).unwrap();
        assert_eq!(sheet.heures_travaillees, 0.0);
        sheet.record(None, at(13, 0, 0), &th()).unwrap();
        assert_eq!(sheet.heures_travaillees, 0.0);
        sheet.record(None, at(18, 0, 0), &th()).unwrap();
        assert_eq!(sheet.heures_travaillees, 9.0);
        assert_eq!(sheet.heures_supplementaires, 1.0);
    }

    #[test]
    fn hours_round_to_two_decimals() {
        // 08:00 -> 12:07 = 4.1166... rounds to 4.12.
        let mut sheet = DaySheet::default();
        sheet.record(None, at(8, 0, 0), &th()).unwrap();
        sheet.record(None, at(12, 7, 0), &th()).unwrap();
        sheet.record(None, at(13, 0, 0), &th()).unwrap();
        let out = sheet.record(None, at(13, 0, 0), &th()).unwrap();
        assert_eq!(out.total_hours, Some(4.12));
    }

    #[test]
    fn custom_thresholds_shift_the_lateness_boundary() {
        let th = Thresholds {
            matin: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
            apres_midi: NaiveTime::from_hms_opt(13, 30, 0).unwrap(),
        };
        let mut sheet = DaySheet::default();
        let out = sheet.record(None, at(8, 45, 0), &th).unwrap();
        assert!(out.late);
    }

    #[test]
    fn action_type_strings_match_the_wire_contract() {
        assert_eq!(BadgeSlot::MorningArrival.to_string(), "arrivee_matin");
        assert_eq!(BadgeSlot::MiddayDeparture.to_string(), "depart_midi");
        assert_eq!(BadgeSlot::AfternoonArrival.to_string(), "arrivee_apres_midi");
        assert_eq!(BadgeSlot::EveningDeparture.to_string(), "depart_soir");
    }

    #[test]
    fn slot_parses_from_kiosk_type_names() {
        for (wire, slot) in [
            ("\"matin\"", BadgeSlot::MorningArrival),
            ("\"midi\"", BadgeSlot::MiddayDeparture),
            ("\"reprise\"", BadgeSlot::AfternoonArrival),
            ("\"soir\"", BadgeSlot::EveningDeparture),
        ] {
            assert_eq!(serde_json::from_str::<BadgeSlot>(wire).unwrap(), slot);
        }
        assert!(serde_json::from_str::<BadgeSlot>("\"nuit\"").is_err());
    }
}
