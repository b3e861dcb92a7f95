use diesel::dsl::count_star;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::db::{DbConnection, DbPool};
use crate::error::{StoreError, StoreResult};
use crate::models::{NewNotification, Notification};
use crate::schema::notifications;
use crate::store::now;
use crate::types::Id;

pub const DEFAULT_PRIORITY: &str = "normal";

#[derive(Debug, Clone, Deserialize)]
pub struct NewNotificationInput {
    pub owner_id: Id,
    pub kind: String,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub priority: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NotificationFilter {
    pub is_read: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Derived at read time by aggregation, never maintained as a running
/// counter, so it is always consistent with the underlying rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NotificationCounts {
    pub total: i64,
    pub unread: i64,
}

/// Per-user notification queue with read-state transitions.
#[derive(Clone)]
pub struct NotificationStore {
    pool: DbPool,
}

impl NotificationStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> StoreResult<DbConnection> {
        Ok(self.pool.get()?)
    }

    pub fn create(&self, input: NewNotificationInput) -> StoreResult<Notification> {
        if input.title.trim().is_empty() || input.message.trim().is_empty() {
            return Err(StoreError::integrity(
                "notification title and message must not be empty",
            ));
        }

        let mut conn = self.conn()?;
        let new_notification = NewNotification {
            id: Id::generate(),
            owner_id: input.owner_id,
            kind: input.kind,
            title: input.title,
            message: input.message,
            priority: input
                .priority
                .unwrap_or_else(|| DEFAULT_PRIORITY.to_string()),
            read: false,
            created_at: now(),
        };
        diesel::insert_into(notifications::table)
            .values(&new_notification)
            .execute(&mut conn)?;

        let notification = notifications::table
            .find(new_notification.id)
            .first(&mut conn)?;
        Ok(notification)
    }

    pub fn get(&self, id: Id) -> StoreResult<Option<Notification>> {
        let mut conn = self.conn()?;
        let notification = notifications::table.find(id).first(&mut conn).optional()?;
        Ok(notification)
    }

    /// Newest first (id ascending on ties).
    pub fn list_for_user(
        &self,
        owner_id: Id,
        filter: &NotificationFilter,
    ) -> StoreResult<Vec<Notification>> {
        let mut conn = self.conn()?;

        let mut query = notifications::table
            .filter(notifications::owner_id.eq(owner_id))
            .into_boxed();
        if let Some(is_read) = filter.is_read {
            query = query.filter(notifications::read.eq(is_read));
        }

        query = query
            .order(notifications::created_at.desc())
            .then_order_by(notifications::id.asc());

        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }
        if let Some(offset) = filter.offset {
            query = query.offset(offset);
        }

        let rows = query.load(&mut conn)?;
        Ok(rows)
    }

    pub fn mark_read(&self, id: Id) -> StoreResult<Notification> {
        let mut conn = self.conn()?;
        let updated = diesel::update(notifications::table.find(id))
            .set(notifications::read.eq(true))
            .execute(&mut conn)?;
        if updated == 0 {
            return Err(StoreError::not_found("notification", id));
        }
        let notification = notifications::table.find(id).first(&mut conn)?;
        Ok(notification)
    }

    /// Returns how many notifications changed state.
    pub fn mark_all_read(&self, owner_id: Id) -> StoreResult<usize> {
        let mut conn = self.conn()?;
        let updated = diesel::update(
            notifications::table
                .filter(notifications::owner_id.eq(owner_id))
                .filter(notifications::read.eq(false)),
        )
        .set(notifications::read.eq(true))
        .execute(&mut conn)?;
        Ok(updated)
    }

    pub fn delete(&self, id: Id) -> StoreResult<()> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(notifications::table.find(id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(StoreError::not_found("notification", id));
        }
        Ok(())
    }

    pub fn counts(&self, owner_id: Id) -> StoreResult<NotificationCounts> {
        let mut conn = self.conn()?;
        let total: i64 = notifications::table
            .filter(notifications::owner_id.eq(owner_id))
            .select(count_star())
            .first(&mut conn)?;
        let unread: i64 = notifications::table
            .filter(notifications::owner_id.eq(owner_id))
            .filter(notifications::read.eq(false))
            .select(count_star())
            .first(&mut conn)?;
        Ok(NotificationCounts { total, unread })
    }
}
