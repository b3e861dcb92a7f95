use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Serialize;

use crate::schema::*;
use crate::types::{Id, TagList};

/// Canonical string values for the text-backed enum columns. The stores
/// write whatever they are given; these constants exist so callers share a
/// single vocabulary.
pub mod account_role {
    pub const ADMIN: &str = "admin";
    pub const COMPLIANCE_OFFICER: &str = "compliance_officer";
    pub const EMPLOYEE: &str = "employee";
}

pub mod document_status {
    pub const DRAFT: &str = "draft";
    pub const PENDING_APPROVAL: &str = "pending_approval";
    pub const ACTIVE: &str = "active";
    pub const EXPIRED: &str = "expired";
    pub const ARCHIVED: &str = "archived";
}

pub mod user_document_status {
    pub const DRAFT: &str = "draft";
    pub const REVIEW: &str = "review";
    pub const APPROVED: &str = "approved";
    pub const ARCHIVED: &str = "archived";
}

pub mod deadline_kind {
    pub const REGULATORY: &str = "regulatory";
    pub const INTERNAL: &str = "internal";
    pub const AUDIT: &str = "audit";
    pub const CERTIFICATION: &str = "certification";
}

/// Forward movement (`not_started` → `in_progress` → `completed`, with
/// `overdue` reachable while the due date has passed) is a caller contract;
/// the store accepts any value.
pub mod deadline_status {
    pub const NOT_STARTED: &str = "not_started";
    pub const IN_PROGRESS: &str = "in_progress";
    pub const COMPLETED: &str = "completed";
    pub const OVERDUE: &str = "overdue";
}

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = accounts)]
pub struct Account {
    pub id: Id,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub role: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = accounts)]
pub struct NewAccount {
    pub id: Id,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub role: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = documents)]
pub struct Document {
    pub id: Id,
    pub title: String,
    pub content: String,
    pub status: String,
    pub version: i32,
    pub category: Option<String>,
    pub created_by: Id,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub expires_at: Option<NaiveDateTime>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = documents)]
pub struct NewDocument {
    pub id: Id,
    pub title: String,
    pub content: String,
    pub status: String,
    pub version: i32,
    pub category: Option<String>,
    pub created_by: Id,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub expires_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations, Serialize)]
#[diesel(table_name = document_versions)]
#[diesel(belongs_to(Document))]
pub struct DocumentVersion {
    pub id: Id,
    pub document_id: Id,
    pub version_number: i32,
    pub content: String,
    pub created_by: Id,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = document_versions)]
pub struct NewDocumentVersion {
    pub id: Id,
    pub document_id: Id,
    pub version_number: i32,
    pub content: String,
    pub created_by: Id,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = user_documents)]
pub struct UserDocument {
    pub id: Id,
    pub owner_id: Id,
    pub title: String,
    pub description: Option<String>,
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub file_location: String,
    pub tags: Option<TagList>,
    pub category: String,
    pub starred: bool,
    pub status: String,
    pub is_folder_placeholder: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = user_documents)]
pub struct NewUserDocument {
    pub id: Id,
    pub owner_id: Id,
    pub title: String,
    pub description: Option<String>,
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub file_location: String,
    pub tags: Option<TagList>,
    pub category: String,
    pub starred: bool,
    pub status: String,
    pub is_folder_placeholder: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = compliance_deadlines)]
pub struct ComplianceDeadline {
    pub id: Id,
    pub title: String,
    pub description: Option<String>,
    pub kind: String,
    pub due_at: NaiveDateTime,
    pub status: String,
    pub assignee_id: Option<Id>,
    pub document_id: Option<Id>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = compliance_deadlines)]
pub struct NewComplianceDeadline {
    pub id: Id,
    pub title: String,
    pub description: Option<String>,
    pub kind: String,
    pub due_at: NaiveDateTime,
    pub status: String,
    pub assignee_id: Option<Id>,
    pub document_id: Option<Id>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = audit_trail)]
pub struct AuditTrailEntry {
    pub id: Id,
    pub document_id: Id,
    pub account_id: Id,
    pub action: String,
    pub details: Option<String>,
    pub recorded_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = audit_trail)]
pub struct NewAuditTrailEntry {
    pub id: Id,
    pub document_id: Id,
    pub account_id: Id,
    pub action: String,
    pub details: Option<String>,
    pub recorded_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = notifications)]
pub struct Notification {
    pub id: Id,
    pub owner_id: Id,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub priority: String,
    pub read: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotification {
    pub id: Id,
    pub owner_id: Id,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub priority: String,
    pub read: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = templates)]
pub struct Template {
    pub id: Id,
    pub name: String,
    pub content: String,
    pub category: Option<String>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = templates)]
pub struct NewTemplate {
    pub id: Id,
    pub name: String,
    pub content: String,
    pub category: Option<String>,
    pub updated_at: NaiveDateTime,
}
