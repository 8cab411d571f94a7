use crate::model::{find_role, Meal, MealRule, RoleConfig, Staff};
use crate::schedule::ShiftSchedule;
use std::collections::HashSet;

/// Personnel présent ce jour-là sur une paire (rôle, poste) éligible au repas,
/// actif et sans restriction sur ce repas. Dédoublonné, ordre de découverte.
pub(super) fn candidates_for_meal(
    schedule: &ShiftSchedule,
    roles: &[RoleConfig],
    rule: &MealRule,
    day: u32,
    meal: Meal,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for (role, shift) in &rule.eligible {
        let Some(rc) = find_role(roles, role) else {
            continue;
        };
        for name in schedule.slots(day, role, *shift).iter().flatten() {
            let eligible = rc.find_staff(name).is_some_and(|s| s.can_taste(meal));
            if eligible && seen.insert(name.as_str()) {
                out.push(name.clone());
            }
        }
    }
    out
}

/// Membre d'un rôle donné, s'il existe.
pub(super) fn find_member<'a>(
    roles: &'a [RoleConfig],
    role: &str,
    name: &str,
) -> Option<&'a Staff> {
    find_role(roles, role).and_then(|rc| rc.find_staff(name))
}

/// Membre de n'importe quel rôle.
pub(super) fn find_any<'a>(roles: &'a [RoleConfig], name: &str) -> Option<&'a Staff> {
    roles.iter().find_map(|rc| rc.find_staff(name))
}
