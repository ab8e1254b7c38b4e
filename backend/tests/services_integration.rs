//! End-to-end planning scenarios over the demo fixture, through the service layer.

mod support;

use shiftplan::api::{
    CreateReplacementRequest, CreateScheduleRequest, EmployeeRotation, ExclusionReason,
    GenerateRotationRequest, ReplacementStatus, ScheduleQuery, SuggestionsQuery, ViewFilter,
};
use shiftplan::config::SchedulingConfig;
use shiftplan::routes::alerts::{AlertKind, AlertSeverity};
use shiftplan::services::{alerts, import, replacements, rotation, schedules, ServiceError};

use support::{date, demo_repo, employee, shift, tenant, EMP001, EMP002, EMP003, SHIFT_MORNING, SHIFT_NIGHT};

fn limits() -> SchedulingConfig {
    SchedulingConfig::default()
}

#[tokio::test]
async fn test_range_skips_recurring_holiday_and_rest_day() {
    let repo = demo_repo();
    let req = CreateScheduleRequest::new(
        employee(EMP001),
        shift(SHIFT_MORNING),
        date(2026, 4, 27),
        Some(date(2026, 5, 3)),
    );

    let res = schedules::create(&repo, tenant(), req, None, &limits())
        .await
        .unwrap();

    assert_eq!(res.created, 5);
    assert_eq!(res.skipped, 0);
    let excluded: Vec<_> = res.excluded.iter().map(|e| (e.date, e.reason)).collect();
    assert_eq!(
        excluded,
        vec![
            (date(2026, 5, 1), ExclusionReason::JourFerie),
            (date(2026, 5, 3), ExclusionReason::JourNonOuvrable),
        ]
    );
    assert_eq!(res.message, "5 planning(s) créé(s), 2 exclu(s)");
}

#[tokio::test]
async fn test_approved_leave_keeps_employee_off_the_planning() {
    let repo = demo_repo();
    let req = CreateScheduleRequest::new(
        employee(EMP003),
        shift(SHIFT_MORNING),
        date(2026, 3, 2),
        Some(date(2026, 3, 7)),
    );

    let res = schedules::create(&repo, tenant(), req.clone(), None, &limits())
        .await
        .unwrap();
    assert_eq!(res.created, 4);
    assert!(res
        .excluded
        .iter()
        .all(|e| e.reason == ExclusionReason::Conge));

    let again = schedules::create(&repo, tenant(), req, None, &limits()).await;
    assert!(matches!(
        again,
        Err(ServiceError::Conflict(ref m)) if m.starts_with("Aucun planning créé")
    ));
}

#[tokio::test]
async fn test_night_rotation_raises_alerts() {
    let repo = demo_repo();
    let req = GenerateRotationRequest {
        work_days: 6,
        rest_days: 1,
        shift_id: shift(SHIFT_NIGHT),
        end_date: date(2026, 3, 8),
        employees: vec![EmployeeRotation {
            employee_id: employee(EMP001),
            start_date: date(2026, 3, 2),
        }],
        team_id: None,
        overwrite_existing: false,
        respect_holidays: true,
        respect_leaves: true,
        respect_recovery_days: true,
    };

    let result = rotation::generate(&repo, tenant(), req, None, &limits())
        .await
        .unwrap();
    assert_eq!(result.success, 6);
    assert_eq!(result.failed, 0);

    let found = alerts::generate_alerts(&repo, tenant(), date(2026, 3, 2), date(2026, 3, 8), &limits())
        .await
        .unwrap();
    let summary: Vec<_> = found.iter().map(|a| (a.kind, a.severity)).collect();
    // 6 nights of 8h: 48h is over the 44h ceiling but not above the 48h critical one.
    assert_eq!(
        summary,
        vec![
            (AlertKind::WeeklyHoursExceeded, AlertSeverity::Warning),
            (AlertKind::NightWorkRepetitive, AlertSeverity::Critical),
        ]
    );
    assert_eq!(found[1].employee_name.as_deref(), Some("Amina Benali"));
}

#[tokio::test]
async fn test_unstaffed_working_days_are_reported() {
    let repo = demo_repo();
    let found = alerts::generate_alerts(&repo, tenant(), date(2026, 3, 2), date(2026, 3, 8), &limits())
        .await
        .unwrap();

    // Monday to Saturday; Sunday is not a working day for the site.
    assert_eq!(found.len(), 6);
    assert!(found.iter().all(|a| a.kind == AlertKind::MinimumStaffing));
    assert_eq!(found[0].message, "Aucun employé planifié sur le site Entrepôt Nord");
}

#[tokio::test]
async fn test_replacement_moves_the_day_to_the_suggested_colleague() {
    let repo = demo_repo();
    let day = date(2026, 3, 4);
    schedules::create(
        &repo,
        tenant(),
        CreateScheduleRequest::new(employee(EMP001), shift(SHIFT_MORNING), day, None),
        None,
        &limits(),
    )
    .await
    .unwrap();

    let suggestions = replacements::suggestions(
        &repo,
        tenant(),
        SuggestionsQuery {
            original_employee_id: employee(EMP001),
            date: day,
            shift_id: shift(SHIFT_MORNING),
            team_id: None,
            site_id: None,
            department_id: None,
            limit: None,
        },
        &limits(),
    )
    .await
    .unwrap();
    // EMP003 is on leave that day.
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].employee.id, employee(EMP002));

    let pending = replacements::create(
        &repo,
        tenant(),
        CreateReplacementRequest {
            date: day,
            original_employee_id: employee(EMP001),
            replacement_employee_id: suggestions[0].employee.id,
            shift_id: shift(SHIFT_MORNING),
            reason: Some("Formation".to_string()),
        },
        None,
    )
    .await
    .unwrap();
    let approved = replacements::approve(&repo, tenant(), pending.replacement.id, None)
        .await
        .unwrap();
    assert_eq!(approved.replacement.status, ReplacementStatus::Approved);

    let query = ScheduleQuery {
        employee_id: Some(employee(EMP002)),
        ..Default::default()
    };
    let covering = schedules::find_all(&repo, tenant(), query, &limits())
        .await
        .unwrap();
    assert_eq!(covering.meta.total, 1);
    assert_eq!(covering.data[0].schedule.date, day);

    let week = schedules::week_view(&repo, tenant(), day, ViewFilter::default())
        .await
        .unwrap();
    assert_eq!(week.start_date, date(2026, 3, 2));
    assert_eq!(week.replacements.len(), 1);
}

#[tokio::test]
async fn test_csv_import_ignores_leaves() {
    let repo = demo_repo();
    let csv = "\
Matricule,Date Début,Date Fin,Code Shift,Heure Début,Heure Fin,Code Équipe,Notes
EMP001,03/03/2026,,S,,,TEAM001,
EMP003,2026-03-02,2026-03-07,M,,,,Semaine complète
";

    let res = import::import_csv(&repo, tenant(), csv, None, &limits())
        .await
        .unwrap();

    assert_eq!(res.data.success, 7);
    assert_eq!(res.data.failed, 0);
    assert_eq!(res.data.imported.len(), 2);
}
