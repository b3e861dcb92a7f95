use diesel::dsl::count_star;
use diesel::prelude::*;
use serde::Deserialize;
use tracing::{info, warn};

use crate::db::{DbConnection, DbPool};
use crate::error::{StoreError, StoreResult};
use crate::models::{user_document_status, NewUserDocument, UserDocument};
use crate::schema::user_documents;
use crate::store::now;
use crate::types::{Id, TagList};

/// Every upload belongs to this folder unless moved; it can be neither
/// renamed nor deleted.
pub const DEFAULT_FOLDER: &str = "General";

const FOLDER_NAME_MIN: usize = 2;
const FOLDER_NAME_MAX: usize = 50;
const INVALID_FOLDER_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
const RESERVED_FOLDER_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

#[derive(Debug, Clone, Deserialize)]
pub struct NewUserDocumentInput {
    pub owner_id: Id,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub file_name: String,
    pub file_type: String,
    #[serde(default)]
    pub file_size: i64,
    pub file_location: String,
    #[serde(default)]
    pub tags: Option<TagList>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub starred: bool,
    #[serde(default)]
    pub status: Option<String>,
}

/// Partial update; `updated_at` is refreshed by the store.
#[derive(Debug, Clone, Default, Deserialize, AsChangeset)]
#[diesel(table_name = user_documents)]
pub struct UserDocumentChanges {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_location: Option<String>,
    #[serde(default)]
    pub tags: Option<TagList>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub starred: Option<bool>,
    #[serde(default)]
    pub status: Option<String>,
}

/// User-uploaded file records, denormalized by a `category` string that
/// doubles as a folder name. A folder is the set of rows sharing a category;
/// an empty folder is a single zero-byte placeholder row. All folder
/// validation and rename/delete logic lives here and nowhere else.
#[derive(Clone)]
pub struct UserDocumentStore {
    pool: DbPool,
}

impl UserDocumentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> StoreResult<DbConnection> {
        Ok(self.pool.get()?)
    }

    /// All real documents for the owner, placeholders excluded, most
    /// recently updated first (id ascending on ties).
    pub fn list(&self, owner_id: Id) -> StoreResult<Vec<UserDocument>> {
        let mut conn = self.conn()?;
        let rows = user_documents::table
            .filter(user_documents::owner_id.eq(owner_id))
            .filter(user_documents::is_folder_placeholder.eq(false))
            .order(user_documents::updated_at.desc())
            .then_order_by(user_documents::id.asc())
            .load(&mut conn)?;
        Ok(rows)
    }

    pub fn get(&self, id: Id) -> StoreResult<Option<UserDocument>> {
        let mut conn = self.conn()?;
        let row = user_documents::table.find(id).first(&mut conn).optional()?;
        Ok(row)
    }

    pub fn create(&self, input: NewUserDocumentInput) -> StoreResult<UserDocument> {
        if input.title.trim().is_empty() {
            return Err(StoreError::integrity("document title must not be empty"));
        }
        if input.file_name.trim().is_empty() {
            return Err(StoreError::integrity("file name must not be empty"));
        }
        reject_internal_location(&input.file_location)?;

        let mut conn = self.conn()?;
        let ts = now();
        let new_document = NewUserDocument {
            id: Id::generate(),
            owner_id: input.owner_id,
            title: input.title,
            description: input.description,
            file_name: input.file_name,
            file_type: input.file_type,
            file_size: input.file_size,
            file_location: input.file_location,
            tags: input.tags,
            category: input
                .category
                .unwrap_or_else(|| DEFAULT_FOLDER.to_string()),
            starred: input.starred,
            status: input
                .status
                .unwrap_or_else(|| user_document_status::DRAFT.to_string()),
            is_folder_placeholder: false,
            created_at: ts,
            updated_at: ts,
        };
        diesel::insert_into(user_documents::table)
            .values(&new_document)
            .execute(&mut conn)?;

        let row = user_documents::table.find(new_document.id).first(&mut conn)?;
        Ok(row)
    }

    /// Transactional partial update with a post-commit verification re-read;
    /// this is the path behind "move to folder" and "rename document".
    pub fn update(&self, id: Id, changes: UserDocumentChanges) -> StoreResult<UserDocument> {
        if let Some(location) = changes.file_location.as_deref() {
            reject_internal_location(location)?;
        }

        let mut conn = self.conn()?;
        let ts = now();

        conn.immediate_transaction::<(), StoreError, _>(|conn| {
            user_documents::table
                .find(id)
                .first::<UserDocument>(conn)
                .optional()?
                .ok_or_else(|| StoreError::not_found("user document", id))?;

            diesel::update(user_documents::table.find(id))
                .set((changes.clone(), user_documents::updated_at.eq(ts)))
                .execute(conn)?;
            Ok(())
        })?;

        let written: UserDocument = user_documents::table
            .find(id)
            .first(&mut conn)
            .optional()?
            .ok_or_else(|| StoreError::not_found("user document", id))?;
        verify_written(id, &changes, &written)?;
        Ok(written)
    }

    pub fn delete(&self, id: Id) -> StoreResult<()> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(user_documents::table.find(id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(StoreError::not_found("user document", id));
        }
        Ok(())
    }

    /// Distinct folder names for the owner, placeholder-only folders
    /// included, sorted ascending.
    pub fn list_folders(&self, owner_id: Id) -> StoreResult<Vec<String>> {
        let mut conn = self.conn()?;
        let names = user_documents::table
            .filter(user_documents::owner_id.eq(owner_id))
            .select(user_documents::category)
            .distinct()
            .order(user_documents::category.asc())
            .load(&mut conn)?;
        Ok(names)
    }

    /// Creates an empty folder as a zero-byte placeholder row.
    pub fn create_folder(&self, owner_id: Id, name: &str) -> StoreResult<()> {
        let name = name.trim();
        validate_folder_name(name)?;

        let mut conn = self.conn()?;
        let existing = self.folder_names(&mut conn, owner_id)?;
        if existing.iter().any(|folder| folder == name) {
            return Err(StoreError::validation(format!(
                "folder '{name}' already exists"
            )));
        }

        let ts = now();
        let id = Id::generate();
        let placeholder = NewUserDocument {
            id,
            owner_id,
            title: name.to_string(),
            description: None,
            file_name: ".folder".to_string(),
            file_type: "application/x-folder".to_string(),
            file_size: 0,
            file_location: format!("placeholders/{id}"),
            tags: None,
            category: name.to_string(),
            starred: false,
            status: user_document_status::DRAFT.to_string(),
            is_folder_placeholder: true,
            created_at: ts,
            updated_at: ts,
        };
        diesel::insert_into(user_documents::table)
            .values(&placeholder)
            .execute(&mut conn)?;

        info!(owner_id = %owner_id, folder = %name, "created folder");
        Ok(())
    }

    /// Re-categorizes every row (placeholder included) holding the old name,
    /// atomically, then verifies no row kept it.
    pub fn rename_folder(&self, owner_id: Id, old_name: &str, new_name: &str) -> StoreResult<()> {
        if old_name == DEFAULT_FOLDER {
            return Err(StoreError::conflict("the default folder cannot be renamed"));
        }
        let new_name = new_name.trim();
        validate_folder_name(new_name)?;

        let mut conn = self.conn()?;
        let existing = self.folder_names(&mut conn, owner_id)?;
        if !existing.iter().any(|folder| folder == old_name) {
            return Err(StoreError::not_found("folder", old_name));
        }
        if existing.iter().any(|folder| folder == new_name) {
            return Err(StoreError::validation(format!(
                "folder '{new_name}' already exists"
            )));
        }

        let ts = now();
        let moved = conn.immediate_transaction::<usize, StoreError, _>(|conn| {
            let moved = diesel::update(
                user_documents::table
                    .filter(user_documents::owner_id.eq(owner_id))
                    .filter(user_documents::category.eq(old_name)),
            )
            .set((
                user_documents::category.eq(new_name),
                user_documents::updated_at.eq(ts),
            ))
            .execute(conn)?;
            Ok(moved)
        })?;

        let remaining: i64 = user_documents::table
            .filter(user_documents::owner_id.eq(owner_id))
            .filter(user_documents::category.eq(old_name))
            .select(count_star())
            .first(&mut conn)?;
        if remaining != 0 {
            warn!(owner_id = %owner_id, folder = %old_name, remaining, "folder rename left rows behind");
            return Err(StoreError::consistency("folder", old_name, "category"));
        }

        info!(owner_id = %owner_id, from = %old_name, to = %new_name, moved, "renamed folder");
        Ok(())
    }

    /// Deletes a folder's rows, but only when nothing real is left inside —
    /// callers must empty the folder first.
    pub fn delete_folder(&self, owner_id: Id, name: &str) -> StoreResult<()> {
        if name == DEFAULT_FOLDER {
            return Err(StoreError::conflict("the default folder cannot be deleted"));
        }

        let mut conn = self.conn()?;
        let deleted = conn.immediate_transaction::<usize, StoreError, _>(|conn| {
            let occupied: i64 = user_documents::table
                .filter(user_documents::owner_id.eq(owner_id))
                .filter(user_documents::category.eq(name))
                .filter(user_documents::is_folder_placeholder.eq(false))
                .select(count_star())
                .first(conn)?;
            if occupied > 0 {
                return Err(StoreError::conflict(format!(
                    "folder '{name}' still contains {occupied} document(s)"
                )));
            }

            let deleted = diesel::delete(
                user_documents::table
                    .filter(user_documents::owner_id.eq(owner_id))
                    .filter(user_documents::category.eq(name)),
            )
            .execute(conn)?;
            Ok(deleted)
        })?;

        if deleted == 0 {
            return Err(StoreError::not_found("folder", name));
        }

        info!(owner_id = %owner_id, folder = %name, "deleted folder");
        Ok(())
    }

    fn folder_names(&self, conn: &mut DbConnection, owner_id: Id) -> StoreResult<Vec<String>> {
        let names = user_documents::table
            .filter(user_documents::owner_id.eq(owner_id))
            .select(user_documents::category)
            .distinct()
            .load(conn)?;
        Ok(names)
    }
}

/// Stored locations point into external object storage; a value shaped like
/// an internal download endpoint must never reach the table.
fn reject_internal_location(location: &str) -> StoreResult<()> {
    let trimmed = location.trim();
    if trimmed.starts_with("/api/") || trimmed.starts_with("api/") {
        return Err(StoreError::validation(
            "file location must be a storage path, not an API route",
        ));
    }
    Ok(())
}

fn validate_folder_name(name: &str) -> StoreResult<()> {
    let length = name.chars().count();
    if !(FOLDER_NAME_MIN..=FOLDER_NAME_MAX).contains(&length) {
        return Err(StoreError::validation(format!(
            "folder name must be {FOLDER_NAME_MIN}-{FOLDER_NAME_MAX} characters"
        )));
    }
    if name.contains(INVALID_FOLDER_CHARS) {
        return Err(StoreError::validation(
            r#"folder name must not contain any of < > : " / \ | ? *"#,
        ));
    }
    if RESERVED_FOLDER_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
    {
        return Err(StoreError::validation(format!(
            "'{name}' is a reserved name"
        )));
    }
    Ok(())
}

fn verify_written(id: Id, requested: &UserDocumentChanges, written: &UserDocument) -> StoreResult<()> {
    if let Some(category) = &requested.category {
        if written.category != *category {
            return Err(StoreError::consistency("user document", id, "category"));
        }
    }
    if let Some(title) = &requested.title {
        if written.title != *title {
            return Err(StoreError::consistency("user document", id, "title"));
        }
    }
    if let Some(status) = &requested.status {
        if written.status != *status {
            return Err(StoreError::consistency("user document", id, "status"));
        }
    }
    if let Some(starred) = requested.starred {
        if written.starred != starred {
            return Err(StoreError::consistency("user document", id, "starred"));
        }
    }
    if let Some(location) = &requested.file_location {
        if written.file_location != *location {
            return Err(StoreError::consistency("user document", id, "file_location"));
        }
    }
    Ok(())
}
