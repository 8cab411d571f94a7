mod conflicts;
mod meals;
mod mutate;
mod shifts;
mod stats;
mod types;
mod util;

pub use meals::{DutyLedger, MealRun, Pass};
pub use shifts::ShiftRun;
pub use stats::{StaffStats, StaffStatsTracker};
pub use types::{AssignOptions, Conflict, ConflictKind, SchedError, SlotRef};

use crate::model::{Meal, MealRule, RoleConfig, ShiftType};
use crate::schedule::{RotationSchedule, ShiftSchedule};
use std::collections::BTreeMap;

/// Scheduler : configuration figée d'une passe d'assignation.
///
/// Chaque appel repart de zéro ; deux appels avec les mêmes entrées
/// produisent les mêmes grilles.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    roles: Vec<RoleConfig>,
    meal_rules: BTreeMap<Meal, MealRule>,
    opts: AssignOptions,
}

impl Scheduler {
    pub fn new(
        roles: Vec<RoleConfig>,
        meal_rules: BTreeMap<Meal, MealRule>,
        opts: AssignOptions,
    ) -> Self {
        Self {
            roles,
            meal_rules,
            opts,
        }
    }

    pub fn roles(&self) -> &[RoleConfig] {
        &self.roles
    }
    pub fn meal_rules(&self) -> &BTreeMap<Meal, MealRule> {
        &self.meal_rules
    }
    pub fn options(&self) -> AssignOptions {
        self.opts
    }

    /// Remplit le tableau de service jour par jour, en ordre croissant.
    pub fn assign_shifts(&self, days: &[u32]) -> ShiftSchedule {
        let mut ordered = days.to_vec();
        ordered.sort_unstable();
        ordered.dedup();
        let mut run = ShiftRun::new(&self.roles, &ordered, self.opts);
        for &day in &ordered {
            run.step_day(day);
        }
        run.finish()
    }

    /// Répartit le contrôle des repas à partir d'un tableau de service terminé.
    pub fn assign_meal_duties(&self, schedule: &ShiftSchedule, days: &[u32]) -> RotationSchedule {
        let mut ordered = days.to_vec();
        ordered.sort_unstable();
        ordered.dedup();
        let mut run = MealRun::new(&self.roles, &self.meal_rules, &ordered, self.opts);
        for &day in &ordered {
            run.step_day(day, schedule);
        }
        run.finish()
    }

    /// Détecte les conflits sur des grilles existantes (après édition manuelle
    /// ou relâchement des contraintes).
    pub fn detect_conflicts(
        &self,
        schedule: &ShiftSchedule,
        rotation: Option<&RotationSchedule>,
    ) -> Vec<Conflict> {
        conflicts::detect_conflicts(&self.roles, schedule, rotation, self.opts)
    }

    /// Remplace un créneau de poste. `None` vide le créneau.
    pub fn set_shift_slot(
        &self,
        schedule: &mut ShiftSchedule,
        day: u32,
        role: &str,
        shift: ShiftType,
        index: usize,
        name: Option<&str>,
    ) -> Result<(), SchedError> {
        mutate::set_shift_slot(&self.roles, schedule, day, role, shift, index, name)
    }

    pub fn set_meal_slot(
        &self,
        rotation: &mut RotationSchedule,
        day: u32,
        meal: Meal,
        index: usize,
        name: Option<&str>,
    ) -> Result<(), SchedError> {
        mutate::set_meal_slot(&self.roles, rotation, day, meal, index, name)
    }
}
