use super::{AssignOptions, Conflict, ConflictKind, SlotRef};
use crate::model::{DayOutcome, Meal, RoleConfig, ShiftType};
use crate::schedule::{RotationSchedule, ShiftSchedule};
use std::collections::{BTreeMap, HashSet};

pub(super) fn detect_conflicts(
    roles: &[RoleConfig],
    schedule: &ShiftSchedule,
    rotation: Option<&RotationSchedule>,
    opts: AssignOptions,
) -> Vec<Conflict> {
    let mut out = Vec::new();
    let days: Vec<u32> = schedule.day_numbers().collect();

    for rc in roles {
        for &day in &days {
            let mut seen = HashSet::new();
            for shift in ShiftType::PRIORITY {
                for slot in schedule.slots(day, &rc.role, shift) {
                    let at = SlotRef::Shift {
                        day,
                        role: rc.role.clone(),
                        shift,
                    };
                    match slot {
                        None => out.push(Conflict {
                            staff: String::new(),
                            at,
                            kind: ConflictKind::Unfilled,
                        }),
                        Some(name) if !seen.insert(name.as_str()) => out.push(Conflict {
                            staff: name.clone(),
                            at,
                            kind: ConflictKind::DoubleAssignment,
                        }),
                        Some(_) => {}
                    }
                }
            }
        }

        for member in &rc.staff {
            let mut streak = 0u32;
            let mut prev: Option<(u32, DayOutcome)> = None;
            for &day in &days {
                let outcome = schedule.outcome_of(day, &rc.role, &member.name);
                let DayOutcome::Worked(shift) = outcome else {
                    streak = 0;
                    prev = Some((day, outcome));
                    continue;
                };
                let follows = prev.is_some_and(|(d, _)| d + 1 == day);
                streak = if follows { streak + 1 } else { 1 };
                let at = SlotRef::Shift {
                    day,
                    role: rc.role.clone(),
                    shift,
                };
                if streak == opts.max_consecutive_days + 1 {
                    out.push(Conflict {
                        staff: member.name.clone(),
                        at: at.clone(),
                        kind: ConflictKind::ExcessiveStreak,
                    });
                }
                let after_night = prev.is_some_and(|(d, o)| d + 1 == day && o.is_night());
                if shift == ShiftType::Early && after_night {
                    out.push(Conflict {
                        staff: member.name.clone(),
                        at,
                        kind: ConflictKind::NightThenEarly,
                    });
                }
                prev = Some((day, outcome));
            }
        }
    }

    if let Some(rotation) = rotation {
        detect_meal_conflicts(rotation, opts, &mut out);
    }

    out
}

fn detect_meal_conflicts(rotation: &RotationSchedule, opts: AssignOptions, out: &mut Vec<Conflict>) {
    let mut last_duty: BTreeMap<&str, u32> = BTreeMap::new();
    for day in rotation.day_numbers() {
        for meal in Meal::ORDER {
            for slot in rotation.slots(day, meal) {
                let at = SlotRef::Meal { day, meal };
                let Some(name) = slot.as_deref() else {
                    out.push(Conflict {
                        staff: String::new(),
                        at,
                        kind: ConflictKind::Unfilled,
                    });
                    continue;
                };
                if let Some(last) = last_duty.insert(name, day) {
                    if day - last < opts.min_duty_spacing_days {
                        out.push(Conflict {
                            staff: name.to_owned(),
                            at,
                            kind: ConflictKind::DutySpacing,
                        });
                    }
                }
            }
        }
    }
}
