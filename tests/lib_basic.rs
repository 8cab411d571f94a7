#![forbid(unsafe_code)]
use kenshoku::scheduler::ShiftRun;
use kenshoku::{
    AssignOptions, DayOutcome, Period, RoleConfig, Scheduler, Settings, ShiftRequirements,
    ShiftSchedule, ShiftType,
};
use std::collections::{BTreeMap, HashSet};

fn role(name: &str, requirements: ShiftRequirements, staff: &[&str]) -> RoleConfig {
    staff
        .iter()
        .fold(RoleConfig::new(name, requirements), |rc, n| rc.with_staff(*n))
}

fn scheduler(roles: Vec<RoleConfig>) -> Scheduler {
    Scheduler::new(roles, BTreeMap::new(), AssignOptions::default())
}

fn names<'a>(s: &'a ShiftSchedule, day: u32, role: &str, shift: ShiftType) -> Vec<Option<&'a str>> {
    s.slots(day, role, shift).iter().map(|x| x.as_deref()).collect()
}

#[test]
fn night_rotation_between_two_nurses() {
    let nurses = role(
        "Nurse",
        ShiftRequirements {
            night: 1,
            ..Default::default()
        },
        &["N1", "N2"],
    );
    let schedule = scheduler(vec![nurses]).assign_shifts(&[1, 2, 3]);

    assert_eq!(names(&schedule, 1, "Nurse", ShiftType::Night), vec![Some("N1")]);
    assert_eq!(names(&schedule, 2, "Nurse", ShiftType::Night), vec![Some("N2")]);
    assert_eq!(names(&schedule, 3, "Nurse", ShiftType::Night), vec![Some("N1")]);
}

#[test]
fn slots_match_requirements_and_names_are_unique() {
    let settings = Settings::default_for(Period::new(2025, 10).unwrap());
    let days = settings.day_numbers().unwrap();
    let schedule = settings
        .scheduler(AssignOptions::default())
        .assign_shifts(&days);

    for &day in &days {
        for rc in &settings.roles {
            let mut seen = HashSet::new();
            for shift in ShiftType::PRIORITY {
                let slots = schedule.slots(day, &rc.role, shift);
                assert_eq!(slots.len(), rc.requirements.get(shift) as usize);
                for name in slots.iter().flatten() {
                    assert!(seen.insert(name.clone()), "{name} twice on day {day}");
                }
            }
        }
    }
}

#[test]
fn unfilled_slots_stay_explicit() {
    let tiny = role(
        "office",
        ShiftRequirements {
            day: 3,
            ..Default::default()
        },
        &["O1", "O2"],
    );
    let schedule = scheduler(vec![tiny]).assign_shifts(&[1]);
    assert_eq!(
        names(&schedule, 1, "office", ShiftType::Day),
        vec![Some("O1"), Some("O2"), None]
    );
}

#[test]
fn rolling_stats_follow_committed_days() {
    let settings = Settings::default_for(Period::new(2025, 10).unwrap());
    let nurses = settings.roles[1].clone();
    let roles = [nurses];
    let days = settings.day_numbers().unwrap();
    let mut run = ShiftRun::new(&roles, &days, AssignOptions::default());
    let mut history: BTreeMap<String, Vec<DayOutcome>> = BTreeMap::new();

    for &day in &days {
        let before: BTreeMap<String, u32> = roles[0]
            .staff
            .iter()
            .map(|s| {
                let st = run.stats("nurse").unwrap().get(&s.name).unwrap();
                (s.name.clone(), st.consec_days)
            })
            .collect();
        run.step_day(day);

        let tracker = run.stats("nurse").unwrap();
        for member in &roles[0].staff {
            let outcome = run.schedule().outcome_of(day, "nurse", &member.name);
            let seen = history.entry(member.name.clone()).or_default();
            seen.push(outcome);
            let st = tracker.get(&member.name).unwrap();
            match outcome {
                DayOutcome::Rest => assert_eq!(st.consec_days, 0),
                DayOutcome::Worked(_) => assert_eq!(st.consec_days, before[&member.name] + 1),
            }
            let recent = &seen[seen.len().saturating_sub(7)..];
            assert!(st.nights_in_window.len() <= 7);
            assert_eq!(st.nights_in_window.len(), recent.len());
            assert_eq!(
                st.recent_nights() as usize,
                recent.iter().filter(|o| o.is_night()).count()
            );
            assert_eq!(st.last_shift, Some(outcome));
        }
    }
}

#[test]
fn coverage_wins_over_streak_limit() {
    let solo = role(
        "office",
        ShiftRequirements {
            day: 1,
            ..Default::default()
        },
        &["Solo"],
    );
    let days: Vec<u32> = (1..=8).collect();
    let schedule = scheduler(vec![solo]).assign_shifts(&days);
    for day in days {
        assert_eq!(names(&schedule, day, "office", ShiftType::Day), vec![Some("Solo")]);
    }
}

#[test]
fn night_is_not_followed_by_early_when_avoidable() {
    let ward = role(
        "ward",
        ShiftRequirements {
            night: 1,
            early: 1,
            ..Default::default()
        },
        &["A", "B", "C"],
    );
    let days: Vec<u32> = (1..=30).collect();
    let schedule = scheduler(vec![ward]).assign_shifts(&days);

    assert_eq!(names(&schedule, 2, "ward", ShiftType::Early), vec![Some("B")]);
    for day in 2..=30 {
        for name in schedule.slots(day, "ward", ShiftType::Early).iter().flatten() {
            assert_ne!(
                schedule.outcome_of(day - 1, "ward", name),
                DayOutcome::Worked(ShiftType::Night),
                "{name} flipped night to early on day {day}"
            );
        }
    }
}

#[test]
fn early_after_night_when_nobody_else_is_left() {
    let ward = role(
        "ward",
        ShiftRequirements {
            night: 1,
            early: 1,
            ..Default::default()
        },
        &["A", "B"],
    );
    let scheduler = scheduler(vec![ward]);
    let schedule = scheduler.assign_shifts(&[1, 2]);

    assert_eq!(names(&schedule, 1, "ward", ShiftType::Night), vec![Some("A")]);
    assert_eq!(names(&schedule, 1, "ward", ShiftType::Early), vec![Some("B")]);
    assert_eq!(names(&schedule, 2, "ward", ShiftType::Night), vec![Some("B")]);
    assert_eq!(names(&schedule, 2, "ward", ShiftType::Early), vec![Some("A")]);

    let conflicts = scheduler.detect_conflicts(&schedule, None);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].staff, "A");
    assert_eq!(conflicts[0].kind, kenshoku::ConflictKind::NightThenEarly);
}

#[test]
fn reruns_are_deterministic() {
    let settings = Settings::default_for(Period::new(2024, 2).unwrap());
    let days = settings.day_numbers().unwrap();
    let scheduler = settings.scheduler(AssignOptions::default());
    assert_eq!(scheduler.assign_shifts(&days), scheduler.assign_shifts(&days));
}

#[test]
fn manual_edit_then_check_reports_conflicts() {
    let ward = role(
        "ward",
        ShiftRequirements {
            night: 1,
            early: 1,
            ..Default::default()
        },
        &["A", "B", "C"],
    );
    let scheduler = scheduler(vec![ward]);
    let mut schedule = scheduler.assign_shifts(&[1, 2]);
    assert!(scheduler.detect_conflicts(&schedule, None).is_empty());

    // A a fait la nuit du jour 1
    scheduler
        .set_shift_slot(&mut schedule, 2, "ward", ShiftType::Early, 0, Some("A"))
        .unwrap();
    let conflicts = scheduler.detect_conflicts(&schedule, None);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].staff, "A");
    assert_eq!(conflicts[0].kind, kenshoku::ConflictKind::NightThenEarly);

    scheduler
        .set_shift_slot(&mut schedule, 2, "ward", ShiftType::Early, 0, None)
        .unwrap();
    let kinds: Vec<_> = scheduler
        .detect_conflicts(&schedule, None)
        .into_iter()
        .map(|c| c.kind)
        .collect();
    assert_eq!(kinds, vec![kenshoku::ConflictKind::Unfilled]);
}

#[test]
fn manual_edit_rejects_bad_references() {
    let ward = role(
        "ward",
        ShiftRequirements {
            night: 1,
            ..Default::default()
        },
        &["A"],
    );
    let scheduler = scheduler(vec![ward]);
    let mut schedule = scheduler.assign_shifts(&[1]);

    let err = scheduler
        .set_shift_slot(&mut schedule, 9, "ward", ShiftType::Night, 0, Some("A"))
        .unwrap_err();
    assert!(matches!(err, kenshoku::SchedError::UnknownDay(9)));
    let err = scheduler
        .set_shift_slot(&mut schedule, 1, "ghost", ShiftType::Night, 0, Some("A"))
        .unwrap_err();
    assert!(matches!(err, kenshoku::SchedError::UnknownRole(_)));
    let err = scheduler
        .set_shift_slot(&mut schedule, 1, "ward", ShiftType::Night, 0, Some("Z"))
        .unwrap_err();
    assert!(matches!(err, kenshoku::SchedError::UnknownStaff(_)));
    let err = scheduler
        .set_shift_slot(&mut schedule, 1, "ward", ShiftType::Night, 1, Some("A"))
        .unwrap_err();
    assert!(matches!(
        err,
        kenshoku::SchedError::SlotOutOfRange { index: 1, len: 1 }
    ));
}
