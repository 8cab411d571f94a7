use crate::config::Settings;
use crate::schedule::{RotationSchedule, ShiftSchedule};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Document persisté : paramètres du mois et grilles éventuelles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(flatten)]
    pub settings: Settings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ShiftSchedule>,
    #[serde(default, alias = "kenshoku", skip_serializing_if = "Option::is_none")]
    pub rotation: Option<RotationSchedule>,
}

impl Plan {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            schedule: None,
            rotation: None,
        }
    }

    /// Aligne les grilles chargées sur les jours du mois et les effectifs.
    pub fn conform(&mut self) -> anyhow::Result<()> {
        let days = self.settings.day_numbers()?;
        if let Some(schedule) = &mut self.schedule {
            *schedule = schedule.conformed(&days, &self.settings.roles);
        }
        if let Some(rotation) = &mut self.rotation {
            *rotation = rotation.conformed(&days, &self.settings.meal_rules);
        }
        Ok(())
    }
}

pub trait Storage {
    /// Charge un plan depuis un support.
    fn load(&self) -> anyhow::Result<Plan>;
    /// Sauvegarde de manière atomique.
    fn save(&self, plan: &Plan) -> anyhow::Result<()>;
}

pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl Storage for JsonStorage {
    fn load(&self) -> anyhow::Result<Plan> {
        let data =
            fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        let mut plan: Plan = serde_json::from_slice(&data)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        plan.settings.validate()?;
        plan.conform()?;
        Ok(plan)
    }

    fn save(&self, plan: &Plan) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(plan)?;
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).with_context(|| "atomic rename")?;
        Ok(())
    }
}
