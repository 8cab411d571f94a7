use super::util;
use super::AssignOptions;
use crate::model::{Meal, MealRule, RoleConfig};
use crate::schedule::{RotationSchedule, ShiftSchedule, Slot};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Étape de remplissage d'un repas. Les deux passes s'enchaînent :
/// la passe relâchée ne complète que ce que la stricte a laissé vide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// Un seul repas par jour et par personne, espacement minimal respecté.
    Strict,
    /// Seul un doublon sur ce même repas est exclu.
    Relaxed,
}

/// Compteurs d'équité partagés sur toute la période.
#[derive(Debug, Clone, Default)]
pub struct DutyLedger {
    counts: HashMap<String, u32>,
    last_day: HashMap<String, u32>,
}

impl DutyLedger {
    pub fn initialize(roles: &[RoleConfig]) -> Self {
        let counts = roles
            .iter()
            .flat_map(|rc| rc.staff.iter())
            .filter(|s| s.active)
            .map(|s| (s.name.clone(), 0))
            .collect();
        Self {
            counts,
            last_day: HashMap::new(),
        }
    }

    pub fn count(&self, name: &str) -> u32 {
        self.counts.get(name).copied().unwrap_or(0)
    }

    pub fn last_day(&self, name: &str) -> Option<u32> {
        self.last_day.get(name).copied()
    }

    fn record(&mut self, name: &str, day: u32) {
        *self.counts.entry(name.to_owned()).or_insert(0) += 1;
        self.last_day.insert(name.to_owned(), day);
    }

    fn spaced_enough(&self, name: &str, day: u32, spacing: u32) -> bool {
        self.last_day(name)
            .map_or(true, |last| day.saturating_sub(last) >= spacing)
    }
}

impl Pass {
    fn admits(
        self,
        ledger: &DutyLedger,
        name: &str,
        day: u32,
        used_today: &HashSet<String>,
        meal_slots: &[Slot],
        opts: AssignOptions,
    ) -> bool {
        if meal_slots.iter().any(|s| s.as_deref() == Some(name)) {
            return false;
        }
        match self {
            Pass::Strict => {
                !used_today.contains(name)
                    && ledger.spaced_enough(name, day, opts.min_duty_spacing_days)
            }
            Pass::Relaxed => true,
        }
    }
}

/// Contexte de la rotation : grille produite et compteurs d'équité.
#[derive(Debug, Clone)]
pub struct MealRun<'a> {
    roles: &'a [RoleConfig],
    rules: &'a BTreeMap<Meal, MealRule>,
    opts: AssignOptions,
    ledger: DutyLedger,
    rotation: RotationSchedule,
}

impl<'a> MealRun<'a> {
    pub fn new(
        roles: &'a [RoleConfig],
        rules: &'a BTreeMap<Meal, MealRule>,
        days: &[u32],
        opts: AssignOptions,
    ) -> Self {
        Self {
            roles,
            rules,
            opts,
            ledger: DutyLedger::initialize(roles),
            rotation: RotationSchedule::empty(days, rules),
        }
    }

    pub fn ledger(&self) -> &DutyLedger {
        &self.ledger
    }

    /// Remplit les repas d'un jour à partir du tableau de service.
    pub fn step_day(&mut self, day: u32, schedule: &ShiftSchedule) {
        let mut used_today = HashSet::new();
        for meal in Meal::ORDER {
            let Some(rule) = self.rules.get(&meal) else {
                #[cfg(feature = "logging")]
                tracing::warn!(day, %meal, "no rule for meal, skipping");
                continue;
            };
            let mut candidates = util::candidates_for_meal(schedule, self.roles, rule, day, meal);
            candidates.sort_by(|a, b| {
                self.ledger
                    .count(a)
                    .cmp(&self.ledger.count(b))
                    .then_with(|| a.cmp(b))
            });
            for pass in [Pass::Strict, Pass::Relaxed] {
                if self.fill(pass, day, meal, &candidates, &mut used_today) {
                    break;
                }
            }
        }
    }

    /// Une passe de remplissage ; s'arrête quand tous les créneaux sont pris.
    /// Renvoie `true` si le repas est complet.
    pub fn fill(
        &mut self,
        pass: Pass,
        day: u32,
        meal: Meal,
        candidates: &[String],
        used_today: &mut HashSet<String>,
    ) -> bool {
        let Some(slots) = self.rotation.slots_mut(day, meal) else {
            return true;
        };
        for name in candidates {
            let Some(free) = slots.iter().position(Option::is_none) else {
                break;
            };
            if !pass.admits(&self.ledger, name, day, used_today, slots, self.opts) {
                continue;
            }
            #[cfg(feature = "logging")]
            if pass == Pass::Relaxed {
                tracing::debug!(day, %meal, staff = %name, "duty assigned in relaxed pass");
            }
            slots[free] = Some(name.clone());
            self.ledger.record(name, day);
            if pass == Pass::Strict {
                used_today.insert(name.clone());
            }
        }
        let complete = slots.iter().all(Option::is_some);
        #[cfg(feature = "logging")]
        if pass == Pass::Relaxed && !complete {
            tracing::warn!(day, %meal, "meal duty slots left unassigned");
        }
        complete
    }

    pub fn finish(self) -> RotationSchedule {
        self.rotation
    }
}
