use chrono::NaiveDateTime;
use diesel::dsl::count_star;
use diesel::prelude::*;
use serde::Deserialize;
use tracing::{debug, info};

use crate::db::{DbConnection, DbPool};
use crate::error::{StoreError, StoreResult};
use crate::models::{document_status, Document, NewDocument};
use crate::schema::documents;
use crate::store::{now, versions};
use crate::types::Id;

pub const DEFAULT_SEARCH_LIMIT: i64 = 10;
pub const MAX_SEARCH_LIMIT: i64 = 20;

#[derive(Debug, Clone, Deserialize)]
pub struct NewDocumentInput {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub created_by: Id,
    #[serde(default)]
    pub expires_at: Option<NaiveDateTime>,
}

/// Partial update. Absent fields keep their stored value; `version` and
/// `updated_at` are managed by the store and never supplied by callers.
#[derive(Debug, Clone, Default, Deserialize, AsChangeset)]
#[diesel(table_name = documents)]
pub struct DocumentChanges {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub expires_at: Option<NaiveDateTime>,
}

impl DocumentChanges {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.status.is_none()
            && self.category.is_none()
            && self.expires_at.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    UpdatedAt,
    CreatedAt,
    Title,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    pub created_by: Option<Id>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

/// Compliance documents and their status lifecycle. Content changes bump the
/// version counter and write a ledger row in the same transaction, so the
/// counter and the history can never diverge.
#[derive(Clone)]
pub struct DocumentStore {
    pool: DbPool,
}

impl DocumentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> StoreResult<DbConnection> {
        Ok(self.pool.get()?)
    }

    /// Inserts the document at version 1 together with its first ledger row.
    pub fn create(&self, input: NewDocumentInput) -> StoreResult<Document> {
        if input.title.trim().is_empty() {
            return Err(StoreError::integrity("document title must not be empty"));
        }
        if input.content.trim().is_empty() {
            return Err(StoreError::integrity("document content must not be empty"));
        }

        let mut conn = self.conn()?;
        let ts = now();
        let doc_id = Id::generate();

        let document = conn.immediate_transaction::<Document, StoreError, _>(|conn| {
            let new_document = NewDocument {
                id: doc_id,
                title: input.title.clone(),
                content: input.content.clone(),
                status: input
                    .status
                    .clone()
                    .unwrap_or_else(|| document_status::DRAFT.to_string()),
                version: 1,
                category: input.category.clone(),
                created_by: input.created_by,
                created_at: ts,
                updated_at: ts,
                expires_at: input.expires_at,
            };
            diesel::insert_into(documents::table)
                .values(&new_document)
                .execute(conn)?;

            versions::insert_version(conn, doc_id, 1, &input.content, input.created_by, ts)?;

            let document = documents::table.find(doc_id).first(conn)?;
            Ok(document)
        })?;

        info!(document_id = %document.id, title = %document.title, "created document");
        Ok(document)
    }

    pub fn get(&self, id: Id) -> StoreResult<Option<Document>> {
        let mut conn = self.conn()?;
        let document = documents::table.find(id).first(&mut conn).optional()?;
        Ok(document)
    }

    /// Ordered listing. Ties on the sort field are broken by ascending id,
    /// so repeated calls with identical arguments return identical sequences.
    pub fn list(&self, filter: &DocumentFilter) -> StoreResult<Vec<Document>> {
        let mut conn = self.conn()?;

        let mut query = documents::table.into_boxed();
        if let Some(creator) = filter.created_by {
            query = query.filter(documents::created_by.eq(creator));
        }
        if let Some(status) = &filter.status {
            query = query.filter(documents::status.eq(status.clone()));
        }

        query = match (filter.sort_by, filter.sort_order) {
            (SortField::UpdatedAt, SortOrder::Asc) => query.order(documents::updated_at.asc()),
            (SortField::UpdatedAt, SortOrder::Desc) => query.order(documents::updated_at.desc()),
            (SortField::CreatedAt, SortOrder::Asc) => query.order(documents::created_at.asc()),
            (SortField::CreatedAt, SortOrder::Desc) => query.order(documents::created_at.desc()),
            (SortField::Title, SortOrder::Asc) => query.order(documents::title.asc()),
            (SortField::Title, SortOrder::Desc) => query.order(documents::title.desc()),
        };
        query = query.then_order_by(documents::id.asc());

        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }
        if let Some(offset) = filter.offset {
            query = query.offset(offset);
        }

        let rows = query.load(&mut conn)?;
        Ok(rows)
    }

    /// Cardinality under the same filter semantics as [`DocumentStore::list`]
    /// (pagination and sorting are ignored).
    pub fn count(&self, filter: &DocumentFilter) -> StoreResult<i64> {
        let mut conn = self.conn()?;

        let mut query = documents::table.select(count_star()).into_boxed();
        if let Some(creator) = filter.created_by {
            query = query.filter(documents::created_by.eq(creator));
        }
        if let Some(status) = &filter.status {
            query = query.filter(documents::status.eq(status.clone()));
        }

        let total = query.first(&mut conn)?;
        Ok(total)
    }

    /// Case-insensitive substring match (SQLite `LIKE` semantics, ASCII
    /// case folding) over title, content, and category; most recently
    /// updated first. That is the entire algorithm — no ranking, no
    /// tokenization. Query length enforcement (minimum 2 characters) is a
    /// boundary-layer contract, not checked here.
    pub fn search(
        &self,
        query: &str,
        created_by: Option<Id>,
        limit: Option<i64>,
    ) -> StoreResult<Vec<Document>> {
        let limit = limit
            .unwrap_or(DEFAULT_SEARCH_LIMIT)
            .clamp(1, MAX_SEARCH_LIMIT);
        let pattern = like_pattern(query);
        debug!(pattern = %pattern, limit, "searching documents");

        let mut conn = self.conn()?;
        let mut search = documents::table
            .filter(
                documents::title
                    .like(pattern.clone())
                    .escape('\\')
                    .or(documents::content.like(pattern.clone()).escape('\\'))
                    .or(documents::category.like(pattern).escape('\\')),
            )
            .into_boxed();

        if let Some(creator) = created_by {
            search = search.filter(documents::created_by.eq(creator));
        }

        let rows = search
            .order(documents::updated_at.desc())
            .then_order_by(documents::id.asc())
            .limit(limit)
            .load(&mut conn)?;
        Ok(rows)
    }

    /// Applies a partial update inside one transaction. When `content` is
    /// supplied and differs from the stored content, the version counter is
    /// incremented and a ledger row is written under `actor` before the row
    /// update, all inside the same transaction — two concurrent writers
    /// serialize at the storage layer instead of both computing the same
    /// next version. After commit the row is re-read and every supplied
    /// field compared against what was requested ("belt and suspenders"
    /// against silent write failures).
    pub fn update(&self, id: Id, actor: Id, changes: DocumentChanges) -> StoreResult<Document> {
        let mut conn = self.conn()?;
        let ts = now();

        conn.immediate_transaction::<(), StoreError, _>(|conn| {
            let current: Document = documents::table
                .find(id)
                .first(conn)
                .optional()?
                .ok_or_else(|| StoreError::not_found("document", id))?;

            let mut next_version = current.version;
            if let Some(content) = changes.content.as_deref() {
                if content != current.content.as_str() {
                    next_version = current.version + 1;
                    versions::insert_version(conn, id, next_version, content, actor, ts)?;
                }
            }

            diesel::update(documents::table.find(id))
                .set((
                    changes.clone(),
                    documents::version.eq(next_version),
                    documents::updated_at.eq(ts),
                ))
                .execute(conn)?;

            if next_version != current.version {
                info!(document_id = %id, version = next_version, "document content revised");
            }
            Ok(())
        })?;

        let written: Document = documents::table
            .find(id)
            .first(&mut conn)
            .optional()?
            .ok_or_else(|| StoreError::not_found("document", id))?;
        verify_written(id, &changes, &written)?;
        Ok(written)
    }
}

fn verify_written(id: Id, requested: &DocumentChanges, written: &Document) -> StoreResult<()> {
    if requested.is_empty() {
        return Ok(());
    }
    if let Some(title) = &requested.title {
        if written.title != *title {
            return Err(StoreError::consistency("document", id, "title"));
        }
    }
    if let Some(content) = &requested.content {
        if written.content != *content {
            return Err(StoreError::consistency("document", id, "content"));
        }
    }
    if let Some(status) = &requested.status {
        if written.status != *status {
            return Err(StoreError::consistency("document", id, "status"));
        }
    }
    if let Some(category) = &requested.category {
        if written.category.as_deref() != Some(category.as_str()) {
            return Err(StoreError::consistency("document", id, "category"));
        }
    }
    if let Some(expires_at) = requested.expires_at {
        if written.expires_at != Some(expires_at) {
            return Err(StoreError::consistency("document", id, "expires_at"));
        }
    }
    Ok(())
}

fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
