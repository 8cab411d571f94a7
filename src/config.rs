use crate::model::{Meal, MealRule, Period, RoleConfig, ShiftRequirements, ShiftType, Staff};
use crate::scheduler::{AssignOptions, Scheduler};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

/// Paramètres d'un mois : rôles, effectifs et règles de contrôle des repas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub year: i32,
    pub month: u32,
    pub roles: Vec<RoleConfig>,
    #[serde(default)]
    pub meal_rules: BTreeMap<Meal, MealRule>,
}

impl Settings {
    /// Configuration de départ : soins (40), infirmerie (11), administratif (6).
    pub fn default_for(period: Period) -> Self {
        let roles = vec![
            default_role(
                "care",
                40,
                ShiftRequirements {
                    night: 2,
                    early: 3,
                    day: 6,
                    late: 3,
                },
            ),
            default_role(
                "nurse",
                11,
                ShiftRequirements {
                    night: 1,
                    day: 2,
                    ..Default::default()
                },
            ),
            default_role(
                "office",
                6,
                ShiftRequirements {
                    day: 2,
                    ..Default::default()
                },
            ),
        ];
        Self {
            year: period.year,
            month: period.month,
            roles,
            meal_rules: default_meal_rules(),
        }
    }

    pub fn period(&self) -> Result<Period> {
        Period::new(self.year, self.month).map_err(anyhow::Error::msg)
    }

    pub fn day_numbers(&self) -> Result<Vec<u32>> {
        Ok(self.period()?.day_numbers())
    }

    pub fn scheduler(&self, opts: AssignOptions) -> Scheduler {
        Scheduler::new(self.roles.clone(), self.meal_rules.clone(), opts)
    }

    pub fn find_role_mut(&mut self, role: &str) -> Option<&mut RoleConfig> {
        self.roles.iter_mut().find(|r| r.role == role)
    }

    pub fn validate(&self) -> Result<()> {
        self.period()?;
        let mut role_names = HashSet::new();
        for rc in &self.roles {
            if rc.role.trim().is_empty() {
                bail!("role name cannot be empty");
            }
            if !role_names.insert(rc.role.as_str()) {
                bail!("duplicate role: {}", rc.role);
            }
            let mut names = HashSet::new();
            for member in &rc.staff {
                if member.name.trim().is_empty() {
                    bail!("staff name cannot be empty in role {}", rc.role);
                }
                if !names.insert(member.name.as_str()) {
                    bail!("duplicate staff {} in role {}", member.name, rc.role);
                }
                if member.role != rc.role {
                    bail!(
                        "staff {} declares role {} but is listed under {}",
                        member.name,
                        member.role,
                        rc.role
                    );
                }
            }
        }
        Ok(())
    }
}

fn default_role(role: &str, count: usize, requirements: ShiftRequirements) -> RoleConfig {
    let mut rc = RoleConfig::new(role, requirements);
    rc.staff = (1..=count)
        .map(|i| {
            let name = format!("{role}{i:02}");
            let mut member = Staff::new(role, name.clone());
            member.id = crate::model::StaffId::new(format!("{role}_{i:02}"));
            member
        })
        .collect();
    rc
}

pub fn default_meal_rules() -> BTreeMap<Meal, MealRule> {
    use ShiftType::{Day, Early, Late, Night};
    BTreeMap::from([
        (
            Meal::Breakfast,
            MealRule::new(1).allow("care", &[Early]).allow("nurse", &[Early, Day]),
        ),
        (
            Meal::Lunch,
            MealRule::new(1).allow("care", &[Day]).allow("nurse", &[Day]),
        ),
        (
            Meal::Dinner,
            MealRule::new(1).allow("care", &[Late]).allow("nurse", &[Day, Late]),
        ),
        (Meal::LateMeal, MealRule::new(1).allow("nurse", &[Night])),
    ])
}

/// Forme lue d'un rôle. Les anciens fichiers listent le personnel par
/// simple nom ; ces membres prennent le rôle qui les contient.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleConfigSpec {
    pub role: String,
    #[serde(default)]
    pub requirements: ShiftRequirements,
    #[serde(default)]
    pub staff: Vec<StaffSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StaffSpec {
    Name(String),
    Member(Staff),
}

impl From<RoleConfigSpec> for RoleConfig {
    fn from(spec: RoleConfigSpec) -> Self {
        let mut rc = RoleConfig::new(spec.role, spec.requirements);
        rc.staff = spec
            .staff
            .into_iter()
            .map(|entry| match entry {
                StaffSpec::Name(name) => Staff::new(rc.role.clone(), name),
                StaffSpec::Member(member) => member,
            })
            .collect();
        rc
    }
}

/// Forme sérialisée d'une règle de repas.
///
/// `roles` est l'ancienne forme (tous les postes de chaque rôle) et
/// l'emporte sur `eligible` si les deux sont présents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealRuleSpec {
    #[serde(default)]
    pub need: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub eligible: Vec<EligibleSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibleSpec {
    pub role: String,
    #[serde(default)]
    pub shifts: Vec<ShiftType>,
}

impl From<MealRuleSpec> for MealRule {
    fn from(spec: MealRuleSpec) -> Self {
        let mut rule = MealRule::new(spec.need);
        match spec.roles {
            Some(roles) => {
                for role in roles {
                    rule = rule.allow(role, &ShiftType::PRIORITY);
                }
            }
            None => {
                for e in spec.eligible {
                    rule = rule.allow(e.role, &e.shifts);
                }
            }
        }
        rule
    }
}

impl From<MealRule> for MealRuleSpec {
    fn from(rule: MealRule) -> Self {
        let mut eligible: Vec<EligibleSpec> = Vec::new();
        for (role, shift) in rule.eligible {
            match eligible.last_mut() {
                Some(last) if last.role == role => last.shifts.push(shift),
                _ => eligible.push(EligibleSpec {
                    role,
                    shifts: vec![shift],
                }),
            }
        }
        Self {
            need: rule.need,
            roles: None,
            eligible,
        }
    }
}

pub fn load_settings_from_file<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading settings {}", path.display()))?;
    let settings: Settings = serde_json::from_slice(&data)
        .with_context(|| format!("parsing settings {}", path.display()))?;
    settings.validate()?;
    Ok(settings)
}

pub fn export_settings_json<P: AsRef<Path>>(path: P, settings: &Settings) -> Result<()> {
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_roles_form_expands_to_all_shifts() {
        let spec: MealRuleSpec =
            serde_json::from_str(r#"{"need": 2, "roles": ["nurse"]}"#).unwrap();
        let rule = MealRule::from(spec);
        assert_eq!(rule.need, 2);
        assert_eq!(rule.eligible.len(), 4);
        assert!(ShiftType::PRIORITY
            .iter()
            .all(|s| rule.is_eligible("nurse", *s)));
    }

    #[test]
    fn roles_form_wins_over_pairs() {
        let json = r#"{"need": 1, "roles": ["office"],
                       "eligible": [{"role": "nurse", "shifts": ["night"]}]}"#;
        let rule: MealRule = serde_json::from_str(json).unwrap();
        assert!(rule.is_eligible("office", ShiftType::Late));
        assert!(!rule.is_eligible("nurse", ShiftType::Night));
    }

    #[test]
    fn pair_form_serializes_grouped_by_role() {
        let rule = default_meal_rules().remove(&Meal::Breakfast).unwrap();
        let value = serde_json::to_value(&rule).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "need": 1,
                "eligible": [
                    {"role": "care", "shifts": ["early"]},
                    {"role": "nurse", "shifts": ["early", "day"]}
                ]
            })
        );
    }

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default_for(Period::new(2025, 4).unwrap());
        settings.validate().unwrap();
        assert_eq!(settings.roles[0].staff.len(), 40);
        assert_eq!(settings.roles[0].staff[0].name, "care01");
        assert_eq!(settings.day_numbers().unwrap().len(), 30);
    }

    #[test]
    fn duplicate_staff_is_rejected() {
        let mut settings = Settings::default_for(Period::new(2025, 4).unwrap());
        let dup = settings.roles[1].staff[0].clone();
        settings.roles[1].staff.push(dup);
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate staff"));
    }
}
