use crate::model::{Meal, ShiftType};
use thiserror::Error;

/// Options d'assignation
#[derive(Debug, Clone, Copy)]
pub struct AssignOptions {
    pub max_consecutive_days: u32,
    pub night_window_days: usize,
    pub min_duty_spacing_days: u32,
}

impl Default for AssignOptions {
    fn default() -> Self {
        Self {
            max_consecutive_days: 5,
            night_window_days: 7,
            min_duty_spacing_days: 2,
        }
    }
}

/// Où se situe un conflit dans les grilles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotRef {
    Shift {
        day: u32,
        role: String,
        shift: ShiftType,
    },
    Meal {
        day: u32,
        meal: Meal,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictKind {
    DoubleAssignment, // même nom deux fois dans un rôle le même jour
    ExcessiveStreak,  // plus de jours d'affilée que le maximum
    NightThenEarly,   // matin au lendemain d'une nuit
    Unfilled,         // créneau resté vide
    DutySpacing,      // deux contrôles trop rapprochés
}

impl ConflictKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictKind::DoubleAssignment => "double",
            ConflictKind::ExcessiveStreak => "streak",
            ConflictKind::NightThenEarly => "night-early",
            ConflictKind::Unfilled => "unfilled",
            ConflictKind::DutySpacing => "spacing",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Conflict {
    /// Vide pour `Unfilled`.
    pub staff: String,
    pub at: SlotRef,
    pub kind: ConflictKind,
}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("unknown day: {0}")]
    UnknownDay(u32),
    #[error("unknown role: {0}")]
    UnknownRole(String),
    #[error("unknown staff: {0}")]
    UnknownStaff(String),
    #[error("slot {index} out of range ({len} slot(s))")]
    SlotOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
