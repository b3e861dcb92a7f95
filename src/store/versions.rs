use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use diesel::sqlite::SqliteConnection;
use tracing::info;

use crate::db::{DbConnection, DbPool};
use crate::error::{StoreError, StoreResult};
use crate::models::{DocumentVersion, NewDocumentVersion};
use crate::schema::document_versions;
use crate::store::now;
use crate::types::Id;

/// Append-only history of document content.
///
/// Rows are written by [`crate::store::DocumentStore`] inside its own
/// transactions whenever content changes; the public [`VersionLedger::append`]
/// surface exists only for import/seed scenarios. There is no update or
/// delete operation, which is what makes the ledger usable as audit-grade
/// history.
#[derive(Clone)]
pub struct VersionLedger {
    pool: DbPool,
}

impl VersionLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> StoreResult<DbConnection> {
        Ok(self.pool.get()?)
    }

    /// Records a version row directly. Intended for imports and seeding;
    /// normal content changes go through the Document Store so the version
    /// counter and the ledger move together.
    pub fn append(
        &self,
        document_id: Id,
        version_number: i32,
        content: &str,
        author_id: Id,
    ) -> StoreResult<DocumentVersion> {
        let mut conn = self.conn()?;
        insert_version(&mut conn, document_id, version_number, content, author_id, now())
    }

    pub fn list_by_document(&self, document_id: Id) -> StoreResult<Vec<DocumentVersion>> {
        let mut conn = self.conn()?;
        let versions = document_versions::table
            .filter(document_versions::document_id.eq(document_id))
            .order(document_versions::version_number.desc())
            .load(&mut conn)?;
        Ok(versions)
    }
}

pub(crate) fn insert_version(
    conn: &mut SqliteConnection,
    document_id: Id,
    version_number: i32,
    content: &str,
    author_id: Id,
    recorded_at: NaiveDateTime,
) -> StoreResult<DocumentVersion> {
    let new_version = NewDocumentVersion {
        id: Id::generate(),
        document_id,
        version_number,
        content: content.to_string(),
        created_by: author_id,
        created_at: recorded_at,
    };

    let inserted = diesel::insert_into(document_versions::table)
        .values(&new_version)
        .execute(conn);

    match inserted {
        Ok(_) => {}
        Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            return Err(StoreError::conflict(format!(
                "version {version_number} already recorded for document {document_id}"
            )));
        }
        Err(err) => return Err(err.into()),
    }

    info!(
        document_id = %document_id,
        version = version_number,
        "recorded document version"
    );

    let version = document_versions::table.find(new_version.id).first(conn)?;
    Ok(version)
}
