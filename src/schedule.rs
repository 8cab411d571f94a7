//! Grilles de résultat : jour → rôle → poste → créneaux, et jour → repas → créneaux.
//!
//! Chaque séquence de créneaux a une longueur fixe (l'effectif requis) ;
//! un créneau vide vaut `None`.

use crate::model::{DayOutcome, Meal, MealRule, RoleConfig, ShiftType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Créneau : `None` = non assigné.
pub type Slot = Option<String>;

pub type RoleDay = BTreeMap<ShiftType, Vec<Slot>>;

/// Tableau de service : jour → rôle → poste → créneaux.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShiftSchedule {
    days: BTreeMap<u32, BTreeMap<String, RoleDay>>,
}

impl ShiftSchedule {
    /// Grille vide, dimensionnée par les besoins de chaque rôle.
    pub fn empty(days: &[u32], roles: &[RoleConfig]) -> Self {
        let mut out = BTreeMap::new();
        for &day in days {
            let mut by_role = BTreeMap::new();
            for rc in roles {
                let role_day: RoleDay = ShiftType::PRIORITY
                    .iter()
                    .map(|&s| (s, vec![None; rc.requirements.get(s) as usize]))
                    .collect();
                by_role.insert(rc.role.clone(), role_day);
            }
            out.insert(day, by_role);
        }
        Self { days: out }
    }

    /// Recale une grille chargée sur la configuration : créneaux complétés
    /// par `None` ou tronqués à l'effectif, nom vide = non assigné.
    pub fn conformed(&self, days: &[u32], roles: &[RoleConfig]) -> Self {
        let mut out = Self::empty(days, roles);
        for (&day, by_role) in &mut out.days {
            for (role, role_day) in by_role {
                for (&shift, slots) in role_day {
                    keep_stored(slots, self.slots(day, role, shift));
                }
            }
        }
        out
    }

    pub fn day_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.days.keys().copied()
    }

    pub fn contains_day(&self, day: u32) -> bool {
        self.days.contains_key(&day)
    }

    /// Créneaux d'un (jour, rôle, poste) ; vide si la référence est inconnue.
    pub fn slots(&self, day: u32, role: &str, shift: ShiftType) -> &[Slot] {
        self.days
            .get(&day)
            .and_then(|by_role| by_role.get(role))
            .and_then(|role_day| role_day.get(&shift))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub(crate) fn slots_mut(
        &mut self,
        day: u32,
        role: &str,
        shift: ShiftType,
    ) -> Option<&mut Vec<Slot>> {
        self.days
            .get_mut(&day)
            .and_then(|by_role| by_role.get_mut(role))
            .and_then(|role_day| role_day.get_mut(&shift))
    }

    pub(crate) fn has_role(&self, day: u32, role: &str) -> bool {
        self.days
            .get(&day)
            .map(|by_role| by_role.contains_key(role))
            .unwrap_or(false)
    }

    /// Noms déjà placés dans ce rôle ce jour-là, tous postes confondus.
    pub fn assigned_in_role<'a>(&'a self, day: u32, role: &str) -> Vec<&'a str> {
        ShiftType::PRIORITY
            .iter()
            .flat_map(|&s| self.slots(day, role, s))
            .filter_map(|slot| slot.as_deref())
            .collect()
    }

    /// Poste tenu par `name` : le premier dans l'ordre de priorité l'emporte.
    pub fn outcome_of(&self, day: u32, role: &str, name: &str) -> DayOutcome {
        ShiftType::PRIORITY
            .iter()
            .copied()
            .find(|&s| {
                self.slots(day, role, s)
                    .iter()
                    .any(|slot| slot.as_deref() == Some(name))
            })
            .map_or(DayOutcome::Rest, DayOutcome::Worked)
    }

    /// Postes tenus par membre du personnel sur la période, du plus chargé
    /// au moins chargé ; l'ordre des rôles et des effectifs départage.
    pub fn shift_counts<'a>(&self, roles: &'a [RoleConfig]) -> Vec<(&'a str, &'a str, u32)> {
        let mut worked: HashMap<(&str, &str), u32> = HashMap::new();
        for &day in self.days.keys() {
            for rc in roles {
                for name in self.assigned_in_role(day, &rc.role) {
                    *worked.entry((rc.role.as_str(), name)).or_insert(0) += 1;
                }
            }
        }
        let mut out: Vec<_> = roles
            .iter()
            .flat_map(|rc| rc.staff.iter().map(move |s| (s.name.as_str(), rc.role.as_str())))
            .map(|(name, role)| {
                let count = worked.get(&(role, name)).copied().unwrap_or(0);
                (name, role, count)
            })
            .collect();
        out.sort_by(|a, b| b.2.cmp(&a.2));
        out
    }
}

/// Rotation du contrôle des repas : jour → repas → créneaux.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RotationSchedule {
    days: BTreeMap<u32, BTreeMap<Meal, Vec<Slot>>>,
}

impl RotationSchedule {
    pub fn empty(days: &[u32], rules: &BTreeMap<Meal, MealRule>) -> Self {
        let mut out = BTreeMap::new();
        for &day in days {
            let by_meal = Meal::ORDER
                .iter()
                .map(|&m| {
                    let need = rules.get(&m).map_or(0, |r| r.need);
                    (m, vec![None; need as usize])
                })
                .collect();
            out.insert(day, by_meal);
        }
        Self { days: out }
    }

    pub fn conformed(&self, days: &[u32], rules: &BTreeMap<Meal, MealRule>) -> Self {
        let mut out = Self::empty(days, rules);
        for (&day, by_meal) in &mut out.days {
            for (&meal, slots) in by_meal {
                keep_stored(slots, self.slots(day, meal));
            }
        }
        out
    }

    pub fn day_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.days.keys().copied()
    }

    pub fn slots(&self, day: u32, meal: Meal) -> &[Slot] {
        self.days
            .get(&day)
            .and_then(|by_meal| by_meal.get(&meal))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub(crate) fn slots_mut(&mut self, day: u32, meal: Meal) -> Option<&mut Vec<Slot>> {
        self.days
            .get_mut(&day)
            .and_then(|by_meal| by_meal.get_mut(&meal))
    }

    /// Nombre de contrôles par personne sur la période.
    pub fn duty_counts(&self) -> BTreeMap<&str, u32> {
        let mut counts = BTreeMap::new();
        for (_, name) in self.duties() {
            *counts.entry(name).or_insert(0) += 1;
        }
        counts
    }

    /// (jour, nom) pour chaque créneau rempli, jour croissant.
    pub fn duties(&self) -> impl Iterator<Item = (u32, &str)> + '_ {
        self.days.iter().flat_map(|(&day, by_meal)| {
            by_meal
                .values()
                .flat_map(|slots| slots.iter().filter_map(|s| s.as_deref()))
                .map(move |name| (day, name))
        })
    }
}

fn keep_stored(slots: &mut [Slot], stored: &[Slot]) {
    for (slot, kept) in slots.iter_mut().zip(stored) {
        *slot = kept.clone().filter(|name| !name.trim().is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ShiftRequirements;

    fn nurse_role() -> RoleConfig {
        RoleConfig::new(
            "nurse",
            ShiftRequirements {
                night: 1,
                day: 2,
                ..Default::default()
            },
        )
        .with_staff("N1")
    }

    #[test]
    fn empty_grid_has_fixed_lengths() {
        let grid = ShiftSchedule::empty(&[1, 2], &[nurse_role()]);
        assert_eq!(grid.slots(1, "nurse", ShiftType::Day), &[None::<String>, None]);
        assert_eq!(grid.slots(2, "nurse", ShiftType::Night).len(), 1);
        assert!(grid.slots(2, "nurse", ShiftType::Early).is_empty());
        assert!(grid.slots(3, "nurse", ShiftType::Day).is_empty());
        assert!(grid.slots(1, "office", ShiftType::Day).is_empty());
    }

    #[test]
    fn outcome_prefers_first_shift_in_priority() {
        let mut grid = ShiftSchedule::empty(&[1], &[nurse_role()]);
        grid.slots_mut(1, "nurse", ShiftType::Day).unwrap()[0] = Some("N1".into());
        grid.slots_mut(1, "nurse", ShiftType::Night).unwrap()[0] = Some("N1".into());
        assert_eq!(
            grid.outcome_of(1, "nurse", "N1"),
            DayOutcome::Worked(ShiftType::Night)
        );
        assert_eq!(grid.outcome_of(1, "nurse", "N2"), DayOutcome::Rest);
    }

    #[test]
    fn shift_counts_cover_the_whole_roster() {
        let roles = [nurse_role().with_staff("N2").with_staff("N3")];
        let mut grid = ShiftSchedule::empty(&[1, 2], &roles);
        grid.slots_mut(1, "nurse", ShiftType::Night).unwrap()[0] = Some("N2".into());
        grid.slots_mut(1, "nurse", ShiftType::Day).unwrap()[0] = Some("N1".into());
        grid.slots_mut(2, "nurse", ShiftType::Day).unwrap()[1] = Some("N2".into());

        assert_eq!(
            grid.shift_counts(&roles),
            vec![("N2", "nurse", 2), ("N1", "nurse", 1), ("N3", "nurse", 0)]
        );
    }

    #[test]
    fn conformed_grid_pads_and_trims_stored_slots() {
        let roles = [nurse_role()];
        let stored: ShiftSchedule = serde_json::from_str(
            r#"{"1": {"nurse": {"day": ["N1"], "night": ["", "N1"]}}}"#,
        )
        .unwrap();
        let grid = stored.conformed(&[1, 2], &roles);

        assert_eq!(grid.slots(1, "nurse", ShiftType::Day), &[Some("N1".to_string()), None]);
        assert_eq!(grid.slots(1, "nurse", ShiftType::Night), &[None::<String>]);
        assert_eq!(grid.slots(2, "nurse", ShiftType::Day).len(), 2);
        assert!(grid.slots(1, "nurse", ShiftType::Early).is_empty());
    }
}
