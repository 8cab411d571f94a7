use super::stats::{StaffStats, StaffStatsTracker};
use super::AssignOptions;
use crate::model::{RoleConfig, ShiftType};
use crate::schedule::ShiftSchedule;
use std::collections::BTreeMap;

const TOTAL_WEIGHT: u32 = 2;
const NIGHT_THEN_EARLY_PENALTY: u32 = 100;
const RECENT_NIGHT_WEIGHT: u32 = 10;

/// Contexte d'une passe d'assignation : la grille et les statistiques
/// avancent ensemble, un jour à la fois.
#[derive(Debug, Clone)]
pub struct ShiftRun<'a> {
    roles: &'a [RoleConfig],
    opts: AssignOptions,
    schedule: ShiftSchedule,
    stats: BTreeMap<String, StaffStatsTracker>,
}

impl<'a> ShiftRun<'a> {
    pub fn new(roles: &'a [RoleConfig], days: &[u32], opts: AssignOptions) -> Self {
        let stats = roles
            .iter()
            .map(|rc| {
                let tracker = StaffStatsTracker::initialize(&rc.staff, opts.night_window_days);
                (rc.role.clone(), tracker)
            })
            .collect();
        Self {
            roles,
            opts,
            schedule: ShiftSchedule::empty(days, roles),
            stats,
        }
    }

    pub fn schedule(&self) -> &ShiftSchedule {
        &self.schedule
    }

    pub fn stats(&self, role: &str) -> Option<&StaffStatsTracker> {
        self.stats.get(role)
    }

    /// Traite un jour complet. Les jours doivent être passés en ordre croissant.
    pub fn step_day(&mut self, day: u32) {
        if !self.schedule.contains_day(day) {
            return;
        }
        for rc in self.roles {
            let Some(tracker) = self.stats.get_mut(&rc.role) else {
                continue;
            };
            fill_role_day(&mut self.schedule, tracker, rc, day, self.opts);
            for member in &rc.staff {
                let outcome = self.schedule.outcome_of(day, &rc.role, &member.name);
                tracker.commit_day(&member.name, outcome);
            }
        }
    }

    pub fn finish(self) -> ShiftSchedule {
        self.schedule
    }
}

fn fill_role_day(
    schedule: &mut ShiftSchedule,
    tracker: &StaffStatsTracker,
    rc: &RoleConfig,
    day: u32,
    opts: AssignOptions,
) {
    for shift in ShiftType::PRIORITY {
        let need = rc.requirements.get(shift) as usize;
        if need == 0 {
            continue;
        }
        for index in 0..need {
            let picked = {
                let taken = schedule.assigned_in_role(day, &rc.role);
                let pool = candidate_pool(rc, tracker, shift, &taken);
                pick_candidate(&pool, shift, opts).map(str::to_owned)
            };
            let Some(name) = picked else {
                #[cfg(feature = "logging")]
                tracing::warn!(day, role = %rc.role, %shift, filled = index, need, "slots left unassigned");
                break;
            };
            if let Some(slots) = schedule.slots_mut(day, &rc.role, shift) {
                slots[index] = Some(name);
            }
        }
    }
}

/// Candidats triés par pénalité croissante ; à égalité, l'ordre du roster est conservé.
fn candidate_pool<'r>(
    rc: &'r RoleConfig,
    tracker: &'r StaffStatsTracker,
    shift: ShiftType,
    taken: &[&str],
) -> Vec<(&'r str, &'r StaffStats)> {
    let mut pool: Vec<(&str, &StaffStats)> = rc
        .staff
        .iter()
        .filter(|s| s.can_work(shift))
        .filter(|s| !taken.contains(&s.name.as_str()))
        .filter_map(|s| tracker.get(&s.name).map(|st| (s.name.as_str(), st)))
        .collect();
    pool.sort_by_key(|(_, st)| penalty(st, shift));
    pool
}

pub(crate) fn penalty(st: &StaffStats, shift: ShiftType) -> u32 {
    let mut p = st.total * TOTAL_WEIGHT + st.consec_days;
    if shift == ShiftType::Early && st.worked_night_last() {
        p += NIGHT_THEN_EARLY_PENALTY;
    }
    if shift == ShiftType::Night {
        p += RECENT_NIGHT_WEIGHT * st.recent_nights();
    }
    p
}

fn satisfies_hard_constraints(st: &StaffStats, shift: ShiftType, opts: AssignOptions) -> bool {
    st.consec_days < opts.max_consecutive_days
        && !(shift == ShiftType::Early && st.worked_night_last())
}

/// Premier candidat légal ; à défaut, le moins pénalisé (la couverture prime).
fn pick_candidate<'p>(
    pool: &[(&'p str, &StaffStats)],
    shift: ShiftType,
    opts: AssignOptions,
) -> Option<&'p str> {
    pool.iter()
        .find(|(_, st)| satisfies_hard_constraints(st, shift, opts))
        .or_else(|| {
            #[cfg(feature = "logging")]
            if let Some((name, _)) = pool.first() {
                tracing::debug!(%shift, staff = %name, "no legal candidate, relaxing hard constraints");
            }
            pool.first()
        })
        .map(|(name, _)| *name)
}
