mod common;

use anyhow::Result;
use common::TestCore;
use policycrate::store::documents::{
    DocumentChanges, DocumentFilter, NewDocumentInput, SortField, SortOrder,
};
use policycrate::StoreError;

#[test]
fn create_starts_at_version_one_with_ledger_row() -> Result<()> {
    let core = TestCore::new()?;
    let author = core.insert_account("author")?;

    let document = core.stores.documents.create(NewDocumentInput {
        title: "Policy A".to_string(),
        content: "v1".to_string(),
        status: Some("draft".to_string()),
        category: None,
        created_by: author,
        expires_at: None,
    })?;

    assert_eq!(document.version, 1);
    assert_eq!(document.status, "draft");

    let history = core.stores.versions.list_by_document(document.id)?;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].version_number, 1);
    assert_eq!(history[0].content, "v1");
    assert_eq!(history[0].created_by, author);
    Ok(())
}

#[test]
fn content_change_bumps_version_and_appends_history() -> Result<()> {
    let core = TestCore::new()?;
    let author = core.insert_account("author")?;
    let id = core.insert_document(author, "Policy A", "v1")?;

    let updated = core.stores.documents.update(
        id,
        author,
        DocumentChanges {
            content: Some("v2".to_string()),
            ..Default::default()
        },
    )?;

    assert_eq!(updated.version, 2);
    assert_eq!(updated.content, "v2");

    let history = core.stores.versions.list_by_document(id)?;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].version_number, 2);
    assert_eq!(history[0].content, "v2");
    assert_eq!(history[1].version_number, 1);
    assert_eq!(history[1].content, "v1");
    Ok(())
}

#[test]
fn identical_content_does_not_bump_version() -> Result<()> {
    let core = TestCore::new()?;
    let author = core.insert_account("author")?;
    let id = core.insert_document(author, "Policy A", "v1")?;

    let updated = core.stores.documents.update(
        id,
        author,
        DocumentChanges {
            content: Some("v1".to_string()),
            ..Default::default()
        },
    )?;
    assert_eq!(updated.version, 1);
    assert_eq!(core.stores.versions.list_by_document(id)?.len(), 1);

    // A metadata-only update never touches the counter either.
    let updated = core.stores.documents.update(
        id,
        author,
        DocumentChanges {
            title: Some("Policy A (renamed)".to_string()),
            ..Default::default()
        },
    )?;
    assert_eq!(updated.version, 1);
    assert_eq!(updated.title, "Policy A (renamed)");
    assert_eq!(core.stores.versions.list_by_document(id)?.len(), 1);
    Ok(())
}

#[test]
fn create_requires_title_and_content() -> Result<()> {
    let core = TestCore::new()?;
    let author = core.insert_account("author")?;

    let missing_content = core.stores.documents.create(NewDocumentInput {
        title: "Policy".to_string(),
        content: "   ".to_string(),
        status: None,
        category: None,
        created_by: author,
        expires_at: None,
    });
    assert!(matches!(missing_content, Err(StoreError::Integrity(_))));

    let missing_title = core.stores.documents.create(NewDocumentInput {
        title: String::new(),
        content: "body".to_string(),
        status: None,
        category: None,
        created_by: author,
        expires_at: None,
    });
    assert!(matches!(missing_title, Err(StoreError::Integrity(_))));
    Ok(())
}

#[test]
fn update_of_missing_document_is_not_found() -> Result<()> {
    let core = TestCore::new()?;
    let author = core.insert_account("author")?;

    let result = core.stores.documents.update(
        policycrate::Id::generate(),
        author,
        DocumentChanges {
            title: Some("ghost".to_string()),
            ..Default::default()
        },
    );
    assert!(matches!(result, Err(StoreError::NotFound { .. })));
    Ok(())
}

#[test]
fn get_of_missing_document_is_none() -> Result<()> {
    let core = TestCore::new()?;
    assert!(core.stores.documents.get(policycrate::Id::generate())?.is_none());
    Ok(())
}

#[test]
fn list_and_count_share_filter_semantics() -> Result<()> {
    let core = TestCore::new()?;
    let alice = core.insert_account("alice")?;
    let bob = core.insert_account("bob")?;

    let drafted = core.insert_document(alice, "Alpha", "a")?;
    core.insert_document(alice, "Beta", "b")?;
    core.insert_document(bob, "Gamma", "c")?;
    core.stores.documents.update(
        drafted,
        alice,
        DocumentChanges {
            status: Some("active".to_string()),
            ..Default::default()
        },
    )?;

    let alice_docs = core.stores.documents.list(&DocumentFilter {
        created_by: Some(alice),
        ..Default::default()
    })?;
    assert_eq!(alice_docs.len(), 2);
    assert_eq!(
        core.stores.documents.count(&DocumentFilter {
            created_by: Some(alice),
            ..Default::default()
        })?,
        2
    );

    let active = DocumentFilter {
        status: Some("active".to_string()),
        ..Default::default()
    };
    assert_eq!(core.stores.documents.list(&active)?.len(), 1);
    assert_eq!(core.stores.documents.count(&active)?, 1);
    Ok(())
}

#[test]
fn list_sorts_and_paginates() -> Result<()> {
    let core = TestCore::new()?;
    let author = core.insert_account("author")?;
    core.insert_document(author, "Charlie", "c")?;
    core.insert_document(author, "Alpha", "a")?;
    core.insert_document(author, "Bravo", "b")?;

    let by_title = core.stores.documents.list(&DocumentFilter {
        sort_by: SortField::Title,
        sort_order: SortOrder::Asc,
        ..Default::default()
    })?;
    let titles: Vec<&str> = by_title.iter().map(|doc| doc.title.as_str()).collect();
    assert_eq!(titles, ["Alpha", "Bravo", "Charlie"]);

    let page = core.stores.documents.list(&DocumentFilter {
        sort_by: SortField::Title,
        sort_order: SortOrder::Asc,
        limit: Some(1),
        offset: Some(1),
        ..Default::default()
    })?;
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].title, "Bravo");
    Ok(())
}

#[test]
fn search_is_substring_case_insensitive_and_idempotent() -> Result<()> {
    let core = TestCore::new()?;
    let author = core.insert_account("author")?;

    let by_title = core.insert_document(author, "GDPR retention policy", "body")?;
    let by_content = core.insert_document(author, "Misc", "covers gdpr obligations")?;
    core.insert_document(author, "Unrelated", "nothing here")?;
    let by_category = core.stores.documents.create(NewDocumentInput {
        title: "Filed".to_string(),
        content: "body".to_string(),
        status: None,
        category: Some("GDPR".to_string()),
        created_by: author,
        expires_at: None,
    })?;

    let first = core.stores.documents.search("gdpr", None, None)?;
    let hits: Vec<_> = first.iter().map(|doc| doc.id).collect();
    assert_eq!(hits.len(), 3);
    assert!(hits.contains(&by_title));
    assert!(hits.contains(&by_content));
    assert!(hits.contains(&by_category.id));

    let second = core.stores.documents.search("gdpr", None, None)?;
    let repeat: Vec<_> = second.iter().map(|doc| doc.id).collect();
    assert_eq!(hits, repeat);
    Ok(())
}

#[test]
fn search_orders_by_most_recent_update_and_clamps_limit() -> Result<()> {
    let core = TestCore::new()?;
    let author = core.insert_account("author")?;

    let older = core.insert_document(author, "audit plan one", "x")?;
    let newer = core.insert_document(author, "audit plan two", "y")?;
    core.stores.documents.update(
        older,
        author,
        DocumentChanges {
            content: Some("revised".to_string()),
            ..Default::default()
        },
    )?;

    let results = core.stores.documents.search("audit plan", None, None)?;
    assert_eq!(results[0].id, older, "freshly updated document ranks first");
    assert_eq!(results[1].id, newer);

    for i in 0..25 {
        core.insert_document(author, &format!("quarterly audit {i}"), "z")?;
    }
    let capped = core.stores.documents.search("audit", None, Some(500))?;
    assert_eq!(capped.len(), 20, "limit clamps to the maximum");

    let creator_scoped = core.stores.documents.search("audit", Some(author), Some(5))?;
    assert_eq!(creator_scoped.len(), 5);
    Ok(())
}

#[test]
fn search_escapes_like_wildcards() -> Result<()> {
    let core = TestCore::new()?;
    let author = core.insert_account("author")?;
    core.insert_document(author, "Totally unrelated", "no match")?;
    let literal = core.insert_document(author, "100% compliant", "body")?;

    let results = core.stores.documents.search("100%", None, None)?;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, literal);
    Ok(())
}

#[test]
fn ledger_append_rejects_duplicate_version() -> Result<()> {
    let core = TestCore::new()?;
    let author = core.insert_account("author")?;
    let id = core.insert_document(author, "Policy", "v1")?;

    let duplicate = core.stores.versions.append(id, 1, "conflicting", author);
    assert!(matches!(duplicate, Err(StoreError::Conflict(_))));

    // Seeding a fresh version number is allowed.
    core.stores.versions.append(id, 2, "imported", author)?;
    let history = core.stores.versions.list_by_document(id)?;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].version_number, 2);
    Ok(())
}
