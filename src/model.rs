use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Type de poste journalier. L'ordre de déclaration est l'ordre de traitement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftType {
    #[serde(alias = "夜")]
    Night,
    #[serde(alias = "早")]
    Early,
    #[serde(alias = "日")]
    Day,
    #[serde(alias = "遅")]
    Late,
}

impl ShiftType {
    /// La nuit d'abord : elle contraint le poste du matin du lendemain.
    pub const PRIORITY: [ShiftType; 4] = [
        ShiftType::Night,
        ShiftType::Early,
        ShiftType::Day,
        ShiftType::Late,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ShiftType::Night => "night",
            ShiftType::Early => "early",
            ShiftType::Day => "day",
            ShiftType::Late => "late",
        }
    }
}

impl fmt::Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShiftType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "night" | "夜" => Ok(ShiftType::Night),
            "early" | "早" => Ok(ShiftType::Early),
            "day" | "日" => Ok(ShiftType::Day),
            "late" | "遅" => Ok(ShiftType::Late),
            other => Err(format!("unknown shift type: {other}")),
        }
    }
}

/// Repas soumis au contrôle, dans l'ordre de la journée.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Meal {
    #[serde(alias = "朝食")]
    Breakfast,
    #[serde(alias = "昼食")]
    Lunch,
    #[serde(alias = "夕食")]
    Dinner,
    #[serde(alias = "夜食")]
    LateMeal,
}

impl Meal {
    pub const ORDER: [Meal; 4] = [Meal::Breakfast, Meal::Lunch, Meal::Dinner, Meal::LateMeal];

    pub fn as_str(self) -> &'static str {
        match self {
            Meal::Breakfast => "breakfast",
            Meal::Lunch => "lunch",
            Meal::Dinner => "dinner",
            Meal::LateMeal => "late_meal",
        }
    }
}

impl fmt::Display for Meal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Meal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "breakfast" | "朝食" => Ok(Meal::Breakfast),
            "lunch" | "昼食" => Ok(Meal::Lunch),
            "dinner" | "夕食" => Ok(Meal::Dinner),
            "late_meal" | "late-meal" | "夜食" => Ok(Meal::LateMeal),
            other => Err(format!("unknown meal: {other}")),
        }
    }
}

/// Résultat d'une journée pour un membre du personnel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayOutcome {
    Worked(ShiftType),
    Rest,
}

impl DayOutcome {
    pub fn is_night(self) -> bool {
        self == DayOutcome::Worked(ShiftType::Night)
    }
}

/// Identifiant fort pour Staff
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StaffId(String);

impl StaffId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn default_true() -> bool {
    true
}

/// Membre du personnel, rattaché à exactement un rôle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    #[serde(default = "StaffId::random")]
    pub id: StaffId,
    pub name: String,
    pub role: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meal_restrictions: Vec<Meal>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shift_restrictions: Vec<ShiftType>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

impl Staff {
    pub fn new<R: Into<String>, N: Into<String>>(role: R, name: N) -> Self {
        Self {
            id: StaffId::random(),
            name: name.into(),
            role: role.into(),
            active: true,
            meal_restrictions: Vec::new(),
            shift_restrictions: Vec::new(),
            notes: String::new(),
        }
    }

    pub fn can_work(&self, shift: ShiftType) -> bool {
        self.active && !self.shift_restrictions.contains(&shift)
    }

    pub fn can_taste(&self, meal: Meal) -> bool {
        self.active && !self.meal_restrictions.contains(&meal)
    }
}

/// Effectif requis par type de poste.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftRequirements {
    #[serde(default, alias = "夜")]
    pub night: u32,
    #[serde(default, alias = "早")]
    pub early: u32,
    #[serde(default, alias = "日")]
    pub day: u32,
    #[serde(default, alias = "遅")]
    pub late: u32,
}

impl ShiftRequirements {
    pub fn get(&self, shift: ShiftType) -> u32 {
        match shift {
            ShiftType::Night => self.night,
            ShiftType::Early => self.early,
            ShiftType::Day => self.day,
            ShiftType::Late => self.late,
        }
    }
}

/// Un rôle, ses effectifs requis et son personnel.
///
/// Le personnel peut aussi être donné par simples noms, voir
/// [`crate::config::RoleConfigSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "crate::config::RoleConfigSpec")]
pub struct RoleConfig {
    pub role: String,
    pub requirements: ShiftRequirements,
    pub staff: Vec<Staff>,
}

impl RoleConfig {
    pub fn new<R: Into<String>>(role: R, requirements: ShiftRequirements) -> Self {
        Self {
            role: role.into(),
            requirements,
            staff: Vec::new(),
        }
    }

    /// Ajoute un membre en forçant son rôle sur celui de la config.
    pub fn with_staff<N: Into<String>>(mut self, name: N) -> Self {
        let member = Staff::new(self.role.clone(), name);
        self.staff.push(member);
        self
    }

    pub fn find_staff<'a>(&'a self, name: &str) -> Option<&'a Staff> {
        self.staff.iter().find(|s| s.name == name)
    }
}

pub fn find_role<'a>(roles: &'a [RoleConfig], role: &str) -> Option<&'a RoleConfig> {
    roles.iter().find(|r| r.role == role)
}

/// Règle d'éligibilité d'un repas, toujours sous forme de paires (rôle, poste).
///
/// Les deux formes de fichier sont normalisées au chargement, voir
/// [`crate::config::MealRuleSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "crate::config::MealRuleSpec", into = "crate::config::MealRuleSpec")]
pub struct MealRule {
    pub need: u32,
    pub eligible: Vec<(String, ShiftType)>,
}

impl MealRule {
    pub fn new(need: u32) -> Self {
        Self {
            need,
            eligible: Vec::new(),
        }
    }

    pub fn allow<R: Into<String>>(mut self, role: R, shifts: &[ShiftType]) -> Self {
        let role = role.into();
        for shift in shifts {
            let pair = (role.clone(), *shift);
            if !self.eligible.contains(&pair) {
                self.eligible.push(pair);
            }
        }
        self
    }

    pub fn is_eligible(&self, role: &str, shift: ShiftType) -> bool {
        self.eligible.iter().any(|(r, s)| r == role && *s == shift)
    }
}

/// Mois ciblé par un tableau de service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, String> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(format!("invalid period {year}-{month:02}"));
        }
        Ok(Self { year, month })
    }

    pub fn days_in_month(&self) -> u32 {
        let (y, m) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(y, m, 1)
            .and_then(|first| first.pred_opt())
            .map(|last| last.day())
            .unwrap_or(0)
    }

    /// Jours 1..=N du mois.
    pub fn day_numbers(&self) -> Vec<u32> {
        (1..=self.days_in_month()).collect()
    }

    pub fn date(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }
}
