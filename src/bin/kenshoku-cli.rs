#![forbid(unsafe_code)]
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use kenshoku::{
    config::Settings,
    io::{self, CsvOptions},
    model::{Meal, Period, ShiftType},
    scheduler::{AssignOptions, SlotRef},
    storage::{JsonStorage, Plan, Storage},
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de planification mensuelle et de rotation du kenshoku
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON du plan
    #[arg(long, global = true, default_value = "plan.json")]
    plan: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Créer un plan avec la configuration par défaut
    Init {
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
        /// Écraser un plan existant
        #[arg(long)]
        force: bool,
    },

    /// Importer du personnel depuis un CSV
    ImportStaff {
        #[arg(long)]
        csv: String,
    },

    /// Générer le tableau de service du mois
    Assign {
        #[arg(long, default_value_t = 5)]
        max_consecutive_days: u32,
    },

    /// Générer la rotation du contrôle des repas
    AssignMeals {
        #[arg(long, default_value_t = 2)]
        min_spacing_days: u32,
    },

    /// Modifier un créneau de poste (nom vide = libérer)
    SetSlot {
        #[arg(long)]
        day: u32,
        #[arg(long)]
        role: String,
        #[arg(long)]
        shift: ShiftType,
        /// Numéro de créneau (à partir de 1)
        #[arg(long)]
        slot: usize,
        #[arg(long, default_value = "")]
        name: String,
    },

    /// Modifier un créneau de repas (nom vide = libérer)
    SetMeal {
        #[arg(long)]
        day: u32,
        #[arg(long)]
        meal: Meal,
        #[arg(long)]
        slot: usize,
        #[arg(long, default_value = "")]
        name: String,
    },

    /// Afficher les grilles
    List,

    /// Postes tenus par personne sur le mois
    Stats,

    /// Vérifier les conflits
    Check {
        #[arg(long, default_value_t = 5)]
        max_consecutive_days: u32,
        #[arg(long, default_value_t = 2)]
        min_spacing_days: u32,
        /// Export CSV des conflits (optionnel)
        #[arg(long)]
        report: Option<String>,
    },

    /// Exporter en CSV
    Export {
        #[arg(long, value_enum)]
        kind: ExportKind,
        #[arg(long)]
        out: String,
        /// Fins de ligne CRLF
        #[arg(long)]
        crlf: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExportKind {
    Shift,
    Meals,
    ByStaff,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.plan)?;

    if let Commands::Init { year, month, force } = cli.cmd {
        if storage.exists() && !force {
            bail!("{} already exists (use --force)", cli.plan);
        }
        let period = Period::new(year, month).map_err(anyhow::Error::msg)?;
        storage.save(&Plan::new(Settings::default_for(period)))?;
        println!("Initialized {} for {year}-{month:02}", cli.plan);
        return Ok(());
    }

    let mut plan = storage
        .load()
        .with_context(|| format!("no usable plan at {} (run `init` first)", cli.plan))?;

    let code = match cli.cmd {
        Commands::Init { .. } => unreachable!("handled above"),
        Commands::ImportStaff { csv } => {
            let staff = io::import_staff_csv(csv)?;
            let n = io::merge_staff(&mut plan.settings, staff)?;
            plan.settings.validate()?;
            // les grilles ne correspondent plus au personnel
            plan.schedule = None;
            plan.rotation = None;
            storage.save(&plan)?;
            println!("Imported {n} staff member(s)");
            0
        }
        Commands::Assign {
            max_consecutive_days,
        } => {
            let opts = AssignOptions {
                max_consecutive_days,
                ..AssignOptions::default()
            };
            let days = plan.settings.day_numbers()?;
            let schedule = plan.settings.scheduler(opts).assign_shifts(&days);
            plan.schedule = Some(schedule);
            plan.rotation = None;
            storage.save(&plan)?;
            println!("Assigned shifts for {} day(s)", days.len());
            0
        }
        Commands::AssignMeals { min_spacing_days } => {
            let Some(schedule) = plan.schedule.as_ref() else {
                bail!("no shift schedule yet (run `assign` first)");
            };
            let opts = AssignOptions {
                min_duty_spacing_days: min_spacing_days,
                ..AssignOptions::default()
            };
            let days = plan.settings.day_numbers()?;
            let rotation = plan
                .settings
                .scheduler(opts)
                .assign_meal_duties(schedule, &days);
            plan.rotation = Some(rotation);
            storage.save(&plan)?;
            println!("Assigned meal duties for {} day(s)", days.len());
            0
        }
        Commands::SetSlot {
            day,
            role,
            shift,
            slot,
            name,
        } => {
            let Some(schedule) = plan.schedule.as_mut() else {
                bail!("no shift schedule yet (run `assign` first)");
            };
            let scheduler = plan.settings.scheduler(AssignOptions::default());
            let index = slot.checked_sub(1).context("slot numbers start at 1")?;
            let name = Some(name.trim()).filter(|n| !n.is_empty());
            scheduler.set_shift_slot(schedule, day, &role, shift, index, name)?;
            storage.save(&plan)?;
            0
        }
        Commands::SetMeal {
            day,
            meal,
            slot,
            name,
        } => {
            let Some(rotation) = plan.rotation.as_mut() else {
                bail!("no meal rotation yet (run `assign-meals` first)");
            };
            let scheduler = plan.settings.scheduler(AssignOptions::default());
            let index = slot.checked_sub(1).context("slot numbers start at 1")?;
            let name = Some(name.trim()).filter(|n| !n.is_empty());
            scheduler.set_meal_slot(rotation, day, meal, index, name)?;
            storage.save(&plan)?;
            0
        }
        Commands::List => {
            print_plan(&plan)?;
            0
        }
        Commands::Stats => {
            let Some(schedule) = plan.schedule.as_ref() else {
                bail!("no shift schedule yet (run `assign` first)");
            };
            for (name, role, count) in schedule.shift_counts(&plan.settings.roles) {
                println!("{name} | {role} | {count}");
            }
            0
        }
        Commands::Check {
            max_consecutive_days,
            min_spacing_days,
            report,
        } => {
            let Some(schedule) = plan.schedule.as_ref() else {
                bail!("no shift schedule yet (run `assign` first)");
            };
            let opts = AssignOptions {
                max_consecutive_days,
                min_duty_spacing_days: min_spacing_days,
                ..AssignOptions::default()
            };
            let conflicts = plan
                .settings
                .scheduler(opts)
                .detect_conflicts(schedule, plan.rotation.as_ref());
            if conflicts.is_empty() {
                println!("OK: no conflicts");
                0
            } else {
                eprintln!("Found {} conflict(s)", conflicts.len());
                if let Some(path) = report {
                    // CSV simple
                    let mut w = csv::Writer::from_path(path)?;
                    w.write_record(["day", "where", "staff", "kind"])?;
                    for c in &conflicts {
                        let (day, place) = match &c.at {
                            SlotRef::Shift { day, role, shift } => (*day, format!("{role}/{shift}")),
                            SlotRef::Meal { day, meal } => (*day, meal.to_string()),
                        };
                        w.write_record([
                            day.to_string().as_str(),
                            place.as_str(),
                            c.staff.as_str(),
                            c.kind.as_str(),
                        ])?;
                    }
                    w.flush()?;
                }
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
        Commands::Export { kind, out, crlf } => {
            let opts = CsvOptions { crlf };
            match kind {
                ExportKind::Shift | ExportKind::ByStaff => {
                    let Some(schedule) = plan.schedule.as_ref() else {
                        bail!("no shift schedule yet (run `assign` first)");
                    };
                    if matches!(kind, ExportKind::Shift) {
                        io::export_shifts_csv(&out, &plan.settings, schedule, opts)?;
                    } else {
                        io::export_by_staff_csv(&out, &plan.settings, schedule, opts)?;
                    }
                }
                ExportKind::Meals => {
                    let Some(rotation) = plan.rotation.as_ref() else {
                        bail!("no meal rotation yet (run `assign-meals` first)");
                    };
                    io::export_rotation_csv(&out, &plan.settings, rotation, opts)?;
                }
            }
            println!("Exported {out}");
            0
        }
    };

    std::process::exit(code);
}

fn print_plan(plan: &Plan) -> Result<()> {
    let period = plan.settings.period()?;
    println!("{}-{:02}", period.year, period.month);
    for day in period.day_numbers() {
        if let Some(schedule) = &plan.schedule {
            for rc in &plan.settings.roles {
                let cells: Vec<String> = ShiftType::PRIORITY
                    .iter()
                    .filter(|s| !schedule.slots(day, &rc.role, **s).is_empty())
                    .map(|s| {
                        let names: Vec<&str> = schedule
                            .slots(day, &rc.role, *s)
                            .iter()
                            .map(|slot| slot.as_deref().unwrap_or("-"))
                            .collect();
                        format!("{s}: {}", names.join(","))
                    })
                    .collect();
                println!("{day:>2} | {} | {}", rc.role, cells.join(" | "));
            }
        }
        if let Some(rotation) = &plan.rotation {
            let cells: Vec<String> = Meal::ORDER
                .iter()
                .map(|m| {
                    let names: Vec<&str> = rotation
                        .slots(day, *m)
                        .iter()
                        .map(|slot| slot.as_deref().unwrap_or("-"))
                        .collect();
                    format!("{m}: {}", names.join(","))
                })
                .collect();
            println!("{day:>2} | meals | {}", cells.join(" | "));
        }
    }
    Ok(())
}
