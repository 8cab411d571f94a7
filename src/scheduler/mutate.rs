use super::{util, SchedError};
use crate::model::{Meal, RoleConfig, ShiftType};
use crate::schedule::{RotationSchedule, ShiftSchedule, Slot};

pub(super) fn set_shift_slot(
    roles: &[RoleConfig],
    schedule: &mut ShiftSchedule,
    day: u32,
    role: &str,
    shift: ShiftType,
    index: usize,
    name: Option<&str>,
) -> Result<(), SchedError> {
    if !schedule.contains_day(day) {
        return Err(SchedError::UnknownDay(day));
    }
    if !schedule.has_role(day, role) {
        return Err(SchedError::UnknownRole(role.to_string()));
    }
    if let Some(name) = name {
        if util::find_member(roles, role, name).is_none() {
            return Err(SchedError::UnknownStaff(name.to_string()));
        }
    }
    let slots = schedule
        .slots_mut(day, role, shift)
        .ok_or_else(|| SchedError::UnknownRole(role.to_string()))?;
    put(slots, index, name)
}

pub(super) fn set_meal_slot(
    roles: &[RoleConfig],
    rotation: &mut RotationSchedule,
    day: u32,
    meal: Meal,
    index: usize,
    name: Option<&str>,
) -> Result<(), SchedError> {
    if let Some(name) = name {
        if util::find_any(roles, name).is_none() {
            return Err(SchedError::UnknownStaff(name.to_string()));
        }
    }
    let slots = rotation
        .slots_mut(day, meal)
        .ok_or(SchedError::UnknownDay(day))?;
    put(slots, index, name)
}

fn put(slots: &mut [Slot], index: usize, name: Option<&str>) -> Result<(), SchedError> {
    let len = slots.len();
    let slot = slots
        .get_mut(index)
        .ok_or(SchedError::SlotOutOfRange { index, len })?;
    *slot = name.map(str::to_owned);
    Ok(())
}
