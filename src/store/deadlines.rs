use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::db::{DbConnection, DbPool};
use crate::error::{StoreError, StoreResult};
use crate::models::{deadline_status, ComplianceDeadline, NewComplianceDeadline};
use crate::schema::compliance_deadlines;
use crate::store::now;
use crate::types::Id;

/// Regulatory deadline input. `assignee_id` is the one nullable identifier
/// field on this entity and is deserialized leniently: absent, null,
/// non-string, or unparseable values (`"NaN"`, `"undefined"`) all become
/// absent before the write, so a type-loose caller can never persist a
/// non-identifier sentinel. The `document_id` reference is deliberately
/// excluded from that pass.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDeadlineInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub kind: String,
    pub due_at: NaiveDateTime,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub assignee_id: Option<Id>,
    #[serde(default)]
    pub document_id: Option<Id>,
}

/// Partial update with the same lenient `assignee_id` handling: a supplied
/// but invalid value clears the column instead of failing or writing junk.
#[derive(Debug, Clone, Default, Deserialize, AsChangeset)]
#[diesel(table_name = compliance_deadlines)]
pub struct DeadlineChanges {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub due_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_nullable_id")]
    pub assignee_id: Option<Option<Id>>,
    #[serde(default)]
    pub document_id: Option<Id>,
}

#[derive(Debug, Clone, Default)]
pub struct DeadlineFilter {
    pub assignee_id: Option<Id>,
    pub status: Option<String>,
    /// Only deadlines due strictly after "now".
    pub upcoming: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Compliance deadlines with assignee references. Status transition
/// legality (`not_started` → `in_progress` → `completed`, `overdue` while
/// the due date has passed) is a caller contract; the store persists any
/// status value. See [`deadline_status`].
#[derive(Clone)]
pub struct DeadlineStore {
    pool: DbPool,
}

impl DeadlineStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> StoreResult<DbConnection> {
        Ok(self.pool.get()?)
    }

    pub fn create(&self, input: NewDeadlineInput) -> StoreResult<ComplianceDeadline> {
        if input.title.trim().is_empty() {
            return Err(StoreError::integrity("deadline title must not be empty"));
        }
        if input.kind.trim().is_empty() {
            return Err(StoreError::integrity("deadline kind must not be empty"));
        }

        let mut conn = self.conn()?;
        let ts = now();
        let new_deadline = NewComplianceDeadline {
            id: Id::generate(),
            title: input.title,
            description: input.description,
            kind: input.kind,
            due_at: input.due_at,
            status: input
                .status
                .unwrap_or_else(|| deadline_status::NOT_STARTED.to_string()),
            assignee_id: input.assignee_id,
            document_id: input.document_id,
            created_at: ts,
            updated_at: ts,
        };
        diesel::insert_into(compliance_deadlines::table)
            .values(&new_deadline)
            .execute(&mut conn)?;

        let deadline = compliance_deadlines::table
            .find(new_deadline.id)
            .first(&mut conn)?;
        Ok(deadline)
    }

    pub fn get(&self, id: Id) -> StoreResult<Option<ComplianceDeadline>> {
        let mut conn = self.conn()?;
        let deadline = compliance_deadlines::table
            .find(id)
            .first(&mut conn)
            .optional()?;
        Ok(deadline)
    }

    pub fn update(&self, id: Id, changes: DeadlineChanges) -> StoreResult<ComplianceDeadline> {
        let mut conn = self.conn()?;
        let ts = now();

        let deadline = conn.immediate_transaction::<ComplianceDeadline, StoreError, _>(|conn| {
            compliance_deadlines::table
                .find(id)
                .first::<ComplianceDeadline>(conn)
                .optional()?
                .ok_or_else(|| StoreError::not_found("deadline", id))?;

            diesel::update(compliance_deadlines::table.find(id))
                .set((changes.clone(), compliance_deadlines::updated_at.eq(ts)))
                .execute(conn)?;

            let deadline = compliance_deadlines::table.find(id).first(conn)?;
            Ok(deadline)
        })?;
        Ok(deadline)
    }

    /// Due date ascending (id ascending on ties).
    pub fn list(&self, filter: &DeadlineFilter) -> StoreResult<Vec<ComplianceDeadline>> {
        let mut conn = self.conn()?;

        let mut query = compliance_deadlines::table.into_boxed();
        if let Some(assignee) = filter.assignee_id {
            query = query.filter(compliance_deadlines::assignee_id.eq(assignee));
        }
        if let Some(status) = &filter.status {
            query = query.filter(compliance_deadlines::status.eq(status.clone()));
        }
        if filter.upcoming {
            let cutoff = now();
            debug!(cutoff = %cutoff, "restricting to upcoming deadlines");
            query = query.filter(compliance_deadlines::due_at.gt(cutoff));
        }

        query = query
            .order(compliance_deadlines::due_at.asc())
            .then_order_by(compliance_deadlines::id.asc());

        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }
        if let Some(offset) = filter.offset {
            query = query.offset(offset);
        }

        let rows = query.load(&mut conn)?;
        Ok(rows)
    }
}

fn coerce_id(value: serde_json::Value) -> Option<Id> {
    match value {
        serde_json::Value::String(text) => text.parse().ok(),
        _ => None,
    }
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<Id>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(coerce_id))
}

fn lenient_nullable_id<'de, D>(deserializer: D) -> Result<Option<Option<Id>>, D::Error>
where
    D: Deserializer<'de>,
{
    // The field was supplied; an invalid or null value clears the column.
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(Some(coerce_id(value)))
}
