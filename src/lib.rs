#![forbid(unsafe_code)]
//! Kenshoku — tableaux de service mensuels et rotation du contrôle des repas (sans BD).
//!
//! - Assignation gloutonne, déterministe, en une seule passe.
//! - Postes traités dans l'ordre nuit → matin → jour → soir.
//! - Contrôle des repas équitable, avec repli relâché quand l'effectif manque.
//! - Stockage fichiers (JSON/CSV).

pub mod config;
pub mod io;
pub mod model;
pub mod schedule;
pub mod scheduler;
pub mod storage;

pub use config::{load_settings_from_file, MealRuleSpec, Settings};
pub use model::{
    DayOutcome, Meal, MealRule, Period, RoleConfig, ShiftRequirements, ShiftType, Staff, StaffId,
};
pub use schedule::{RotationSchedule, ShiftSchedule, Slot};
pub use scheduler::{AssignOptions, Conflict, ConflictKind, SchedError, Scheduler};
pub use storage::{JsonStorage, Plan, Storage};
