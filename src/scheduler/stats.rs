use crate::model::{DayOutcome, Staff};
use std::collections::{HashMap, VecDeque};

/// Statistiques glissantes d'un membre du personnel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffStats {
    pub total: u32,
    pub consec_days: u32,
    pub last_shift: Option<DayOutcome>,
    /// Plus récent en dernier ; `true` = nuit.
    pub nights_in_window: VecDeque<bool>,
}

impl StaffStats {
    pub fn recent_nights(&self) -> u32 {
        self.nights_in_window.iter().filter(|n| **n).count() as u32
    }

    pub fn worked_night_last(&self) -> bool {
        self.last_shift.is_some_and(DayOutcome::is_night)
    }
}

/// Un enregistrement par membre, mis à jour une fois par jour simulé.
#[derive(Debug, Clone)]
pub struct StaffStatsTracker {
    window: usize,
    stats: HashMap<String, StaffStats>,
}

impl StaffStatsTracker {
    pub fn initialize(staff: &[Staff], window: usize) -> Self {
        let stats = staff
            .iter()
            .map(|s| (s.name.clone(), StaffStats::default()))
            .collect();
        Self { window, stats }
    }

    pub fn get(&self, name: &str) -> Option<&StaffStats> {
        self.stats.get(name)
    }

    /// Enregistre le résultat de la journée. Un nom inconnu est ignoré.
    pub fn commit_day(&mut self, name: &str, outcome: DayOutcome) {
        let Some(st) = self.stats.get_mut(name) else {
            return;
        };
        match outcome {
            DayOutcome::Rest => st.consec_days = 0,
            DayOutcome::Worked(_) => {
                st.total += 1;
                st.consec_days += 1;
            }
        }
        st.nights_in_window.push_back(outcome.is_night());
        while st.nights_in_window.len() > self.window {
            st.nights_in_window.pop_front();
        }
        st.last_shift = Some(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ShiftType;

    fn tracker() -> StaffStatsTracker {
        StaffStatsTracker::initialize(&[Staff::new("nurse", "N1")], 7)
    }

    #[test]
    fn starts_at_zero() {
        let t = tracker();
        let st = t.get("N1").unwrap();
        assert_eq!(st, &StaffStats::default());
        assert!(st.last_shift.is_none());
    }

    #[test]
    fn rest_resets_streak_but_keeps_total() {
        let mut t = tracker();
        t.commit_day("N1", DayOutcome::Worked(ShiftType::Day));
        t.commit_day("N1", DayOutcome::Worked(ShiftType::Late));
        t.commit_day("N1", DayOutcome::Rest);
        let st = t.get("N1").unwrap();
        assert_eq!(st.total, 2);
        assert_eq!(st.consec_days, 0);
        assert_eq!(st.last_shift, Some(DayOutcome::Rest));
    }

    #[test]
    fn night_window_is_bounded() {
        let mut t = tracker();
        for _ in 0..3 {
            t.commit_day("N1", DayOutcome::Worked(ShiftType::Night));
        }
        for _ in 0..6 {
            t.commit_day("N1", DayOutcome::Rest);
        }
        let st = t.get("N1").unwrap();
        assert_eq!(st.nights_in_window.len(), 7);
        // 9 jours commis : les deux premières nuits sont sorties de la fenêtre
        assert_eq!(st.recent_nights(), 1);
    }

    #[test]
    fn unknown_name_is_ignored() {
        let mut t = tracker();
        t.commit_day("ghost", DayOutcome::Rest);
        assert!(t.get("ghost").is_none());
    }
}
