use crate::config::Settings;
use crate::model::{Meal, Period, ShiftType, Staff};
use crate::schedule::{RotationSchedule, ShiftSchedule};
use anyhow::{bail, Context};
use csv::{ReaderBuilder, Terminator, WriterBuilder};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Options d'export CSV.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvOptions {
    pub crlf: bool,
}

fn writer<W: Write>(out: W, opts: CsvOptions) -> csv::Writer<W> {
    let terminator = if opts.crlf {
        Terminator::CRLF
    } else {
        Terminator::Any(b'\n')
    };
    WriterBuilder::new()
        .has_headers(false)
        .terminator(terminator)
        .from_writer(out)
}

fn date_str(period: Period, day: u32) -> anyhow::Result<String> {
    let date = period
        .date(day)
        .with_context(|| format!("day {day} outside {}-{:02}", period.year, period.month))?;
    Ok(date.format("%Y-%m-%d").to_string())
}

/// Tableau de service, un créneau par ligne : `date,role,shift,slot,name`.
pub fn write_shifts_csv<W: Write>(
    out: W,
    settings: &Settings,
    schedule: &ShiftSchedule,
    opts: CsvOptions,
) -> anyhow::Result<()> {
    let period = settings.period()?;
    let mut w = writer(out, opts);
    w.write_record(["date", "role", "shift", "slot", "name"])?;
    let mut idx = itoa::Buffer::new();
    for day in period.day_numbers() {
        let date = date_str(period, day)?;
        for rc in &settings.roles {
            for shift in ShiftType::PRIORITY {
                for (i, slot) in schedule.slots(day, &rc.role, shift).iter().enumerate() {
                    let name = slot.as_deref().unwrap_or("");
                    w.write_record([
                        date.as_str(),
                        rc.role.as_str(),
                        shift.as_str(),
                        idx.format(i + 1),
                        name,
                    ])?;
                }
            }
        }
    }
    w.flush()?;
    Ok(())
}

/// Rotation des repas : `date,meal,slot,name`.
pub fn write_rotation_csv<W: Write>(
    out: W,
    settings: &Settings,
    rotation: &RotationSchedule,
    opts: CsvOptions,
) -> anyhow::Result<()> {
    let period = settings.period()?;
    let mut w = writer(out, opts);
    w.write_record(["date", "meal", "slot", "name"])?;
    let mut idx = itoa::Buffer::new();
    for day in period.day_numbers() {
        let date = date_str(period, day)?;
        for meal in Meal::ORDER {
            for (i, slot) in rotation.slots(day, meal).iter().enumerate() {
                let name = slot.as_deref().unwrap_or("");
                w.write_record([date.as_str(), meal.as_str(), idx.format(i + 1), name])?;
            }
        }
    }
    w.flush()?;
    Ok(())
}

/// Vue par personne, créneaux remplis uniquement : `name,date,role,shift`.
pub fn write_by_staff_csv<W: Write>(
    out: W,
    settings: &Settings,
    schedule: &ShiftSchedule,
    opts: CsvOptions,
) -> anyhow::Result<()> {
    let period = settings.period()?;
    let mut w = writer(out, opts);
    w.write_record(["name", "date", "role", "shift"])?;
    for day in period.day_numbers() {
        let date = date_str(period, day)?;
        for rc in &settings.roles {
            for shift in ShiftType::PRIORITY {
                for name in schedule.slots(day, &rc.role, shift).iter().flatten() {
                    w.write_record([name.as_str(), date.as_str(), rc.role.as_str(), shift.as_str()])?;
                }
            }
        }
    }
    w.flush()?;
    Ok(())
}

pub fn export_shifts_csv<P: AsRef<Path>>(
    path: P,
    settings: &Settings,
    schedule: &ShiftSchedule,
    opts: CsvOptions,
) -> anyhow::Result<()> {
    write_shifts_csv(File::create(path)?, settings, schedule, opts)
}

pub fn export_rotation_csv<P: AsRef<Path>>(
    path: P,
    settings: &Settings,
    rotation: &RotationSchedule,
    opts: CsvOptions,
) -> anyhow::Result<()> {
    write_rotation_csv(File::create(path)?, settings, rotation, opts)
}

pub fn export_by_staff_csv<P: AsRef<Path>>(
    path: P,
    settings: &Settings,
    schedule: &ShiftSchedule,
    opts: CsvOptions,
) -> anyhow::Result<()> {
    write_by_staff_csv(File::create(path)?, settings, schedule, opts)
}

/// Import du personnel :
/// header `role,name[,active][,meal_restrictions][,shift_restrictions][,notes]`,
/// restrictions séparées par `;`.
pub fn read_staff_csv<R: Read>(input: R) -> anyhow::Result<Vec<Staff>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let role = rec.get(0).context("missing role")?.trim();
        let name = rec.get(1).context("missing name")?.trim();
        if role.is_empty() || name.is_empty() {
            bail!("invalid staff row (empty)");
        }
        let mut member = Staff::new(role, name);
        if let Some(flag) = rec.get(2).map(str::trim).filter(|f| !f.is_empty()) {
            member.active =
                parse_bool(flag).with_context(|| format!("invalid active value for {name}"))?;
        }
        if let Some(raw) = rec.get(3) {
            member.meal_restrictions =
                parse_list(raw).with_context(|| format!("invalid meal_restrictions for {name}"))?;
        }
        if let Some(raw) = rec.get(4) {
            member.shift_restrictions = parse_list(raw)
                .with_context(|| format!("invalid shift_restrictions for {name}"))?;
        }
        if let Some(notes) = rec.get(5) {
            member.notes = notes.trim().to_string();
        }
        out.push(member);
    }
    Ok(out)
}

pub fn import_staff_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Staff>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_staff_csv(file)
}

/// Range le personnel importé dans ses rôles ; remplace un homonyme existant.
pub fn merge_staff(settings: &mut Settings, staff: Vec<Staff>) -> anyhow::Result<usize> {
    let mut merged = 0;
    for member in staff {
        let Some(rc) = settings.find_role_mut(&member.role) else {
            bail!("unknown role {} for staff {}", member.role, member.name);
        };
        match rc.staff.iter_mut().find(|s| s.name == member.name) {
            Some(existing) => {
                let id = existing.id.clone();
                *existing = Staff { id, ..member };
            }
            None => rc.staff.push(member),
        }
        merged += 1;
    }
    Ok(merged)
}

fn parse_bool(s: &str) -> anyhow::Result<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" => Ok(false),
        _ => bail!("expected boolean"),
    }
}

fn parse_list<T>(raw: &str) -> anyhow::Result<Vec<T>>
where
    T: std::str::FromStr<Err = String>,
{
    raw.split(';')
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| chunk.parse::<T>().map_err(anyhow::Error::msg))
        .collect()
}
