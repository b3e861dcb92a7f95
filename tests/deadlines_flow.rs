mod common;

use anyhow::Result;
use chrono::NaiveDate;
use common::TestCore;
use policycrate::store::deadlines::{DeadlineChanges, DeadlineFilter, NewDeadlineInput};
use policycrate::StoreError;
use serde_json::json;

fn due(year: i32, month: u32, day: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .expect("valid date")
        .and_hms_opt(9, 0, 0)
        .expect("valid time")
}

#[test]
fn create_defaults_to_not_started() -> Result<()> {
    let core = TestCore::new()?;
    let assignee = core.insert_account("officer")?;

    let deadline = core.stores.deadlines.create(NewDeadlineInput {
        title: "Annual SOC 2 audit".to_string(),
        description: Some("external auditor engaged".to_string()),
        kind: "audit".to_string(),
        due_at: due(2026, 11, 30),
        status: None,
        assignee_id: Some(assignee),
        document_id: None,
    })?;

    assert_eq!(deadline.status, "not_started");
    assert_eq!(deadline.assignee_id, Some(assignee));

    let fetched = core.stores.deadlines.get(deadline.id)?.expect("deadline exists");
    assert_eq!(fetched.title, "Annual SOC 2 audit");
    Ok(())
}

#[test]
fn nan_assignee_is_persisted_as_absent() -> Result<()> {
    let core = TestCore::new()?;

    let input: NewDeadlineInput = serde_json::from_value(json!({
        "title": "GDPR records review",
        "kind": "regulatory",
        "due_at": "2026-09-15T09:00:00",
        "assignee_id": "NaN",
    }))?;
    let deadline = core.stores.deadlines.create(input)?;
    assert_eq!(deadline.assignee_id, None, "sentinel never reaches storage");

    let fetched = core.stores.deadlines.get(deadline.id)?.expect("deadline exists");
    assert_eq!(fetched.assignee_id, None);
    Ok(())
}

#[test]
fn update_with_invalid_assignee_clears_the_column() -> Result<()> {
    let core = TestCore::new()?;
    let assignee = core.insert_account("officer")?;

    let deadline = core.stores.deadlines.create(NewDeadlineInput {
        title: "License renewal".to_string(),
        description: None,
        kind: "certification".to_string(),
        due_at: due(2026, 5, 1),
        status: None,
        assignee_id: Some(assignee),
        document_id: None,
    })?;

    let changes: DeadlineChanges = serde_json::from_value(json!({ "assignee_id": "undefined" }))?;
    let updated = core.stores.deadlines.update(deadline.id, changes)?;
    assert_eq!(updated.assignee_id, None);

    // An update that does not mention the assignee leaves it alone.
    let reassigned = core.stores.deadlines.update(
        deadline.id,
        DeadlineChanges {
            assignee_id: Some(Some(assignee)),
            ..Default::default()
        },
    )?;
    assert_eq!(reassigned.assignee_id, Some(assignee));

    let untouched: DeadlineChanges = serde_json::from_value(json!({ "status": "in_progress" }))?;
    let updated = core.stores.deadlines.update(deadline.id, untouched)?;
    assert_eq!(updated.assignee_id, Some(assignee));
    assert_eq!(updated.status, "in_progress");
    Ok(())
}

#[test]
fn any_status_value_is_accepted() -> Result<()> {
    let core = TestCore::new()?;

    let deadline = core.stores.deadlines.create(NewDeadlineInput {
        title: "Quarterly filing".to_string(),
        description: None,
        kind: "internal".to_string(),
        due_at: due(2026, 3, 31),
        status: Some("completed".to_string()),
        assignee_id: None,
        document_id: None,
    })?;
    assert_eq!(deadline.status, "completed");

    // Backwards movement is a caller-policy violation, not a store error.
    let reverted = core.stores.deadlines.update(
        deadline.id,
        DeadlineChanges {
            status: Some("not_started".to_string()),
            ..Default::default()
        },
    )?;
    assert_eq!(reverted.status, "not_started");
    Ok(())
}

#[test]
fn list_filters_by_assignee_status_and_upcoming() -> Result<()> {
    let core = TestCore::new()?;
    let officer = core.insert_account("officer")?;
    let other = core.insert_account("other")?;

    let past = core.stores.deadlines.create(NewDeadlineInput {
        title: "Lapsed filing".to_string(),
        description: None,
        kind: "regulatory".to_string(),
        due_at: due(2020, 1, 15),
        status: Some("overdue".to_string()),
        assignee_id: Some(officer),
        document_id: None,
    })?;
    let soon = core.stores.deadlines.create(NewDeadlineInput {
        title: "Soon".to_string(),
        description: None,
        kind: "internal".to_string(),
        due_at: due(2999, 1, 1),
        status: None,
        assignee_id: Some(officer),
        document_id: None,
    })?;
    let later = core.stores.deadlines.create(NewDeadlineInput {
        title: "Later".to_string(),
        description: None,
        kind: "audit".to_string(),
        due_at: due(2999, 6, 1),
        status: None,
        assignee_id: Some(other),
        document_id: None,
    })?;

    let upcoming = core.stores.deadlines.list(&DeadlineFilter {
        upcoming: true,
        ..Default::default()
    })?;
    let ids: Vec<_> = upcoming.iter().map(|deadline| deadline.id).collect();
    assert_eq!(ids, [soon.id, later.id], "due date ascending, past excluded");

    let officers = core.stores.deadlines.list(&DeadlineFilter {
        assignee_id: Some(officer),
        ..Default::default()
    })?;
    assert_eq!(officers.len(), 2);
    assert_eq!(officers[0].id, past.id, "earliest due date first");

    let overdue = core.stores.deadlines.list(&DeadlineFilter {
        status: Some("overdue".to_string()),
        ..Default::default()
    })?;
    assert_eq!(overdue.len(), 1);

    let paged = core.stores.deadlines.list(&DeadlineFilter {
        limit: Some(1),
        offset: Some(1),
        ..Default::default()
    })?;
    assert_eq!(paged.len(), 1);
    assert_eq!(paged[0].id, soon.id);
    Ok(())
}

#[test]
fn update_of_missing_deadline_is_not_found() -> Result<()> {
    let core = TestCore::new()?;
    let result = core.stores.deadlines.update(
        policycrate::Id::generate(),
        DeadlineChanges {
            status: Some("completed".to_string()),
            ..Default::default()
        },
    );
    assert!(matches!(result, Err(StoreError::NotFound { .. })));
    Ok(())
}

#[test]
fn create_requires_title_and_kind() -> Result<()> {
    let core = TestCore::new()?;
    let result = core.stores.deadlines.create(NewDeadlineInput {
        title: " ".to_string(),
        description: None,
        kind: "audit".to_string(),
        due_at: due(2026, 1, 1),
        status: None,
        assignee_id: None,
        document_id: None,
    });
    assert!(matches!(result, Err(StoreError::Integrity(_))));
    Ok(())
}
