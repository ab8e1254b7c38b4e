use super::*;
use crate::db::repository::ScheduleRepository;
use crate::models::LeaveStatus;
use crate::services::exclusion::ExclusionReason;
use crate::services::test_fixtures::{d, World};

fn limits() -> SchedulingConfig {
    SchedulingConfig::default()
}

#[tokio::test]
async fn test_create_applies_exclusion_chain() {
    let w = World::new();
    // Monday 2026-03-02 to Sunday 2026-03-08.
    w.add_leave(&w.alice, d(2026, 3, 4), d(2026, 3, 4), LeaveStatus::Approved);
    w.plan(&w.alice, &w.day_shift, d(2026, 3, 5)).await;

    let req = CreateScheduleRequest::new(
        w.alice.id,
        w.day_shift.id,
        d(2026, 3, 2),
        Some(d(2026, 3, 8)),
    );
    let res = create(&w.repo, w.tenant, req, None, &limits()).await.unwrap();

    assert_eq!(res.created, 4);
    assert_eq!(res.skipped, 1);
    assert_eq!(res.excluded.len(), 3);
    let reason_of = |date| {
        res.excluded
            .iter()
            .find(|e| e.date == date)
            .map(|e| e.reason)
    };
    assert_eq!(reason_of(d(2026, 3, 4)), Some(ExclusionReason::Conge));
    assert_eq!(reason_of(d(2026, 3, 5)), Some(ExclusionReason::DejaPlanifie));
    assert_eq!(reason_of(d(2026, 3, 8)), Some(ExclusionReason::JourNonOuvrable));
    assert_eq!(
        res.message,
        "4 planning(s) créé(s), 1 ignoré(s) (déjà existants), 2 exclu(s)"
    );
    assert_eq!(w.repo.schedule_count(), 5);
}

#[tokio::test]
async fn test_pending_leave_does_not_block() {
    let w = World::new();
    w.add_leave(&w.alice, d(2026, 3, 3), d(2026, 3, 3), LeaveStatus::Pending);

    let req = CreateScheduleRequest::new(w.alice.id, w.day_shift.id, d(2026, 3, 3), None);
    let res = create(&w.repo, w.tenant, req, None, &limits()).await.unwrap();

    assert_eq!(res.created, 1);
    assert!(res.excluded.is_empty());
}

#[tokio::test]
async fn test_create_conflicts_when_everything_exists() {
    let w = World::new();
    w.plan(&w.alice, &w.day_shift, d(2026, 3, 2)).await;
    w.plan(&w.alice, &w.day_shift, d(2026, 3, 3)).await;

    let req = CreateScheduleRequest::new(
        w.alice.id,
        w.day_shift.id,
        d(2026, 3, 2),
        Some(d(2026, 3, 3)),
    );
    let err = create(&w.repo, w.tenant, req, None, &limits()).await.unwrap_err();

    match err {
        ServiceError::Conflict(msg) => {
            assert_eq!(msg, "Tous les plannings pour cette période existent déjà")
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_create_conflicts_when_every_date_is_excluded() {
    let w = World::new();
    let sunday = d(2026, 3, 8);

    let req = CreateScheduleRequest::new(w.alice.id, w.day_shift.id, sunday, None);
    let err = create(&w.repo, w.tenant, req, None, &limits()).await.unwrap_err();

    assert!(matches!(err, ServiceError::Conflict(ref m) if m.starts_with("Aucun planning créé")));
    assert_eq!(w.repo.schedule_count(), 0);
}

#[tokio::test]
async fn test_create_can_disable_working_day_check() {
    let w = World::new();
    let mut req = CreateScheduleRequest::new(w.alice.id, w.day_shift.id, d(2026, 3, 8), None);
    req.exclude_non_working_days = false;

    let res = create(&w.repo, w.tenant, req, None, &limits()).await.unwrap();
    assert_eq!(res.created, 1);
}

#[tokio::test]
async fn test_create_validates_input() {
    let w = World::new();

    let unknown = CreateScheduleRequest::new(EmployeeId::generate(), w.day_shift.id, d(2026, 3, 2), None);
    assert!(matches!(
        create(&w.repo, w.tenant, unknown, None, &limits()).await,
        Err(ServiceError::NotFound(_))
    ));

    let reversed = CreateScheduleRequest::new(
        w.alice.id,
        w.day_shift.id,
        d(2026, 3, 5),
        Some(d(2026, 3, 2)),
    );
    assert!(matches!(
        create(&w.repo, w.tenant, reversed, None, &limits()).await,
        Err(ServiceError::BadRequest(_))
    ));

    let mut bad_time = CreateScheduleRequest::new(w.alice.id, w.day_shift.id, d(2026, 3, 2), None);
    bad_time.custom_start_time = Some("25:00".to_string());
    let err = create(&w.repo, w.tenant, bad_time, None, &limits())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Heure début invalide: 25:00. Format attendu: HH:mm");
}

#[tokio::test]
async fn test_other_tenant_cannot_see_employee() {
    let w = World::new();
    let other = World::new();

    let req = CreateScheduleRequest::new(w.alice.id, w.day_shift.id, d(2026, 3, 2), None);
    assert!(matches!(
        create(&w.repo, other.tenant, req, None, &limits()).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_bulk_dedupes_across_entries_and_skips_invalid_ones() {
    let w = World::new();
    let entries = vec![
        CreateScheduleRequest::new(w.alice.id, w.day_shift.id, d(2026, 3, 2), Some(d(2026, 3, 4))),
        CreateScheduleRequest::new(w.alice.id, w.day_shift.id, d(2026, 3, 3), Some(d(2026, 3, 5))),
        CreateScheduleRequest::new(w.bob.id, w.day_shift.id, d(2026, 3, 6), Some(d(2026, 3, 2))),
    ];

    let res = create_bulk(&w.repo, w.tenant, entries, None, &limits())
        .await
        .unwrap();

    assert_eq!(res.total, 6);
    assert_eq!(res.count, 4);
    assert_eq!(res.skipped, 2);
    assert_eq!(w.repo.schedule_count(), 4);
}

#[tokio::test]
async fn test_bulk_rejects_empty_and_unknown() {
    let w = World::new();
    assert!(matches!(
        create_bulk(&w.repo, w.tenant, vec![], None, &limits()).await,
        Err(ServiceError::BadRequest(_))
    ));

    let entries = vec![CreateScheduleRequest::new(
        w.alice.id,
        ShiftId::generate(),
        d(2026, 3, 2),
        None,
    )];
    assert!(matches!(
        create_bulk(&w.repo, w.tenant, entries, None, &limits()).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_bulk_with_only_invalid_entries_is_rejected() {
    let w = World::new();
    let entries = vec![CreateScheduleRequest::new(
        w.alice.id,
        w.day_shift.id,
        d(2026, 3, 6),
        Some(d(2026, 3, 2)),
    )];
    let err = create_bulk(&w.repo, w.tenant, entries, None, &limits())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Aucun planning valide à créer");
}

#[tokio::test]
async fn test_find_all_paginates() {
    let w = World::new();
    for day in 2..=4 {
        w.plan(&w.alice, &w.day_shift, d(2026, 3, day)).await;
    }
    w.plan(&w.bob, &w.day_shift, d(2026, 3, 2)).await;

    let query = ScheduleQuery {
        employee_id: Some(w.alice.id),
        limit: Some(2),
        ..Default::default()
    };
    let res = find_all(&w.repo, w.tenant, query, &limits()).await.unwrap();

    assert_eq!(res.meta.total, 3);
    assert_eq!(res.meta.total_pages, 2);
    assert_eq!(res.meta.page, 1);
    assert_eq!(res.data.len(), 2);
    assert_eq!(res.data[0].schedule.date, d(2026, 3, 2));
    assert_eq!(res.data[0].employee.as_ref().unwrap().matricule, "EMP001");
    assert_eq!(res.data[0].shift.as_ref().unwrap().code, "M");
}

#[tokio::test]
async fn test_find_all_page_far_past_the_end_is_empty() {
    let w = World::new();
    w.plan(&w.alice, &w.day_shift, d(2026, 3, 2)).await;

    let query = ScheduleQuery {
        page: Some(usize::MAX),
        limit: Some(2),
        ..Default::default()
    };
    let res = find_all(&w.repo, w.tenant, query, &limits()).await.unwrap();

    assert_eq!(res.meta.total, 1);
    assert_eq!(res.meta.page, usize::MAX);
    assert!(res.data.is_empty());
}

#[tokio::test]
async fn test_update_moving_onto_taken_date_conflicts() {
    let w = World::new();
    let first = w.plan(&w.alice, &w.day_shift, d(2026, 3, 2)).await;
    w.plan(&w.alice, &w.day_shift, d(2026, 3, 3)).await;

    let req = UpdateScheduleRequest {
        date: Some(d(2026, 3, 3)),
        ..Default::default()
    };
    assert!(matches!(
        update(&w.repo, w.tenant, first.id, req).await,
        Err(ServiceError::Conflict(_))
    ));

    let req = UpdateScheduleRequest {
        shift_id: Some(w.night_shift.id),
        custom_start_time: Some("21:30".to_string()),
        notes: Some("Renfort".to_string()),
        ..Default::default()
    };
    let view = update(&w.repo, w.tenant, first.id, req).await.unwrap();
    assert_eq!(view.schedule.shift_id, w.night_shift.id);
    assert_eq!(view.schedule.custom_start_time.unwrap().to_string(), "21:30");
    assert_eq!(view.schedule.notes.as_deref(), Some("Renfort"));
}

#[tokio::test]
async fn test_remove_and_find_one() {
    let w = World::new();
    let schedule = w.plan(&w.alice, &w.day_shift, d(2026, 3, 2)).await;

    let view = find_one(&w.repo, w.tenant, schedule.id).await.unwrap();
    assert_eq!(view.schedule.id, schedule.id);

    remove(&w.repo, w.tenant, schedule.id).await.unwrap();
    assert!(matches!(
        find_one(&w.repo, w.tenant, schedule.id).await,
        Err(ServiceError::NotFound(_))
    ));
    assert!(matches!(
        remove(&w.repo, w.tenant, schedule.id).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_remove_bulk_is_all_or_nothing() {
    let w = World::new();
    let a = w.plan(&w.alice, &w.day_shift, d(2026, 3, 2)).await;
    let b = w.plan(&w.bob, &w.day_shift, d(2026, 3, 2)).await;

    let err = remove_bulk(&w.repo, w.tenant, vec![a.id, ScheduleId::generate()])
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::BadRequest(_)));
    assert_eq!(w.repo.schedule_count(), 2);

    let res = remove_bulk(&w.repo, w.tenant, vec![a.id, b.id, a.id])
        .await
        .unwrap();
    assert_eq!(res.deleted, 2);
    assert_eq!(w.repo.schedule_count(), 0);

    assert_eq!(
        remove_bulk(&w.repo, w.tenant, vec![]).await.unwrap_err().to_string(),
        "Aucun ID fourni pour la suppression"
    );
}

#[tokio::test]
async fn test_week_view_spans_monday_to_sunday() {
    let w = World::new();
    w.plan(&w.alice, &w.day_shift, d(2026, 3, 1)).await;
    w.plan(&w.alice, &w.day_shift, d(2026, 3, 2)).await;
    w.plan(&w.bob, &w.day_shift, d(2026, 3, 8)).await;
    w.plan(&w.bob, &w.day_shift, d(2026, 3, 9)).await;
    w.add_leave(&w.bob, d(2026, 3, 6), d(2026, 3, 12), LeaveStatus::Approved);
    w.add_leave(&w.alice, d(2026, 3, 4), d(2026, 3, 4), LeaveStatus::Rejected);

    let view = week_view(&w.repo, w.tenant, d(2026, 3, 4), ViewFilter::default())
        .await
        .unwrap();

    assert_eq!(view.start_date, d(2026, 3, 2));
    assert_eq!(view.end_date, d(2026, 3, 8));
    let dates: Vec<_> = view.schedules.iter().map(|s| s.schedule.date).collect();
    assert_eq!(dates, vec![d(2026, 3, 2), d(2026, 3, 8)]);
    assert_eq!(view.leaves.len(), 1);
    assert_eq!(view.leaves[0].employee_id, w.bob.id);
}

#[tokio::test]
async fn test_month_view_filters_by_team() {
    let w = World::new();
    let mut outsider = w.add_employee("EMP900", "Chloé", "Petit");
    outsider.team_id = None;
    w.repo.add_employee(outsider.clone());

    w.plan(&w.alice, &w.day_shift, d(2026, 2, 27)).await;
    let mut in_team = Schedule::new(w.tenant, w.alice.id, w.day_shift.id, d(2026, 3, 10));
    in_team.team_id = Some(w.team.id);
    w.repo.insert_schedule(in_team).await.unwrap();
    w.plan(&outsider, &w.day_shift, d(2026, 3, 10)).await;
    w.add_leave(&outsider, d(2026, 3, 20), d(2026, 3, 21), LeaveStatus::Approved);

    let filter = ViewFilter {
        team_id: Some(w.team.id),
        site_id: None,
    };
    let view = month_view(&w.repo, w.tenant, d(2026, 3, 15), filter)
        .await
        .unwrap();

    assert_eq!(view.start_date, d(2026, 3, 1));
    assert_eq!(view.end_date, d(2026, 3, 31));
    assert_eq!(view.schedules.len(), 1);
    assert!(view.leaves.is_empty());
}
