#![allow(dead_code)]

use anyhow::Result;
use policycrate::db::{self, DbPool};
use policycrate::store::accounts::NewAccountInput;
use policycrate::store::documents::NewDocumentInput;
use policycrate::store::user_documents::NewUserDocumentInput;
use policycrate::store::CoreStores;
use policycrate::types::Id;
use tempfile::TempDir;

/// One fully-migrated database per test, in a temporary directory that is
/// removed when the harness drops.
pub struct TestCore {
    pub stores: CoreStores,
    pub pool: DbPool,
    _dir: TempDir,
}

impl TestCore {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let database_url = dir.path().join("core.db").to_string_lossy().into_owned();

        let pool = db::init_pool(&database_url)?;
        {
            let mut conn = pool.get()?;
            db::run_migrations(&mut conn)?;
        }

        Ok(Self {
            stores: CoreStores::new(pool.clone()),
            pool,
            _dir: dir,
        })
    }

    pub fn insert_account(&self, username: &str) -> Result<Id> {
        let account = self.stores.accounts.create(NewAccountInput {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "argon2id$stub".to_string(),
            display_name: None,
            role: None,
        })?;
        Ok(account.id)
    }

    pub fn insert_document(&self, creator: Id, title: &str, content: &str) -> Result<Id> {
        let document = self.stores.documents.create(NewDocumentInput {
            title: title.to_string(),
            content: content.to_string(),
            status: None,
            category: None,
            created_by: creator,
            expires_at: None,
        })?;
        Ok(document.id)
    }

    pub fn insert_upload(&self, owner: Id, title: &str, category: Option<&str>) -> Result<Id> {
        let upload = self.stores.user_documents.create(NewUserDocumentInput {
            owner_id: owner,
            title: title.to_string(),
            description: None,
            file_name: format!("{title}.pdf"),
            file_type: "application/pdf".to_string(),
            file_size: 2048,
            file_location: format!("uploads/{owner}/{title}.pdf"),
            tags: None,
            category: category.map(str::to_string),
            starred: false,
            status: None,
        })?;
        Ok(upload.id)
    }
}
