pub mod accounts;
pub mod audit;
pub mod deadlines;
pub mod documents;
pub mod notifications;
pub mod templates;
pub mod user_documents;
pub mod versions;

use chrono::{NaiveDateTime, Utc};

use crate::db::DbPool;

pub use accounts::AccountStore;
pub use audit::AuditRecorder;
pub use deadlines::DeadlineStore;
pub use documents::DocumentStore;
pub use notifications::NotificationStore;
pub use templates::TemplateStore;
pub use user_documents::UserDocumentStore;
pub use versions::VersionLedger;

pub(crate) fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// One instance of every store over a shared connection pool.
#[derive(Clone)]
pub struct CoreStores {
    pub accounts: AccountStore,
    pub documents: DocumentStore,
    pub versions: VersionLedger,
    pub user_documents: UserDocumentStore,
    pub deadlines: DeadlineStore,
    pub audit: AuditRecorder,
    pub notifications: NotificationStore,
    pub templates: TemplateStore,
}

impl CoreStores {
    pub fn new(pool: DbPool) -> Self {
        Self {
            accounts: AccountStore::new(pool.clone()),
            documents: DocumentStore::new(pool.clone()),
            versions: VersionLedger::new(pool.clone()),
            user_documents: UserDocumentStore::new(pool.clone()),
            deadlines: DeadlineStore::new(pool.clone()),
            audit: AuditRecorder::new(pool.clone()),
            notifications: NotificationStore::new(pool.clone()),
            templates: TemplateStore::new(pool),
        }
    }
}
