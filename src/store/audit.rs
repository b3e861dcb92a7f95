use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Deserialize;

use crate::db::{DbConnection, DbPool};
use crate::error::{StoreError, StoreResult};
use crate::models::{AuditTrailEntry, NewAuditTrailEntry};
use crate::schema::audit_trail;
use crate::store::now;
use crate::types::Id;

#[derive(Debug, Clone, Deserialize)]
pub struct NewAuditEntryInput {
    pub document_id: Id,
    pub account_id: Id,
    pub action: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub recorded_at: Option<NaiveDateTime>,
}

/// Append-only event log keyed by document. Immutability is the entire
/// contract: there is no update or delete.
#[derive(Clone)]
pub struct AuditRecorder {
    pool: DbPool,
}

impl AuditRecorder {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> StoreResult<DbConnection> {
        Ok(self.pool.get()?)
    }

    pub fn append(&self, input: NewAuditEntryInput) -> StoreResult<AuditTrailEntry> {
        if input.action.trim().is_empty() {
            return Err(StoreError::integrity("audit action must not be empty"));
        }

        let mut conn = self.conn()?;
        let new_entry = NewAuditTrailEntry {
            id: Id::generate(),
            document_id: input.document_id,
            account_id: input.account_id,
            action: input.action,
            details: input.details,
            recorded_at: input.recorded_at.unwrap_or_else(now),
        };
        diesel::insert_into(audit_trail::table)
            .values(&new_entry)
            .execute(&mut conn)?;

        let entry = audit_trail::table.find(new_entry.id).first(&mut conn)?;
        Ok(entry)
    }

    /// Newest first (id ascending on identical timestamps).
    pub fn list_by_document(&self, document_id: Id) -> StoreResult<Vec<AuditTrailEntry>> {
        let mut conn = self.conn()?;
        let entries = audit_trail::table
            .filter(audit_trail::document_id.eq(document_id))
            .order(audit_trail::recorded_at.desc())
            .then_order_by(audit_trail::id.asc())
            .load(&mut conn)?;
        Ok(entries)
    }
}
