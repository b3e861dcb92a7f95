use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use serde::Deserialize;
use tracing::info;

use crate::db::{DbConnection, DbPool};
use crate::error::{StoreError, StoreResult};
use crate::models::{account_role, Account, NewAccount};
use crate::schema::accounts;
use crate::store::now;
use crate::types::Id;

#[derive(Debug, Clone, Deserialize)]
pub struct NewAccountInput {
    pub username: String,
    pub email: String,
    /// Hashed upstream by the identity layer; stored opaquely.
    pub password_hash: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, AsChangeset)]
#[diesel(table_name = accounts)]
pub struct AccountChanges {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Accounts keyed by username/email. Provisioned once, mutated by profile
/// and role updates, never hard-deleted.
#[derive(Clone)]
pub struct AccountStore {
    pool: DbPool,
}

impl AccountStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> StoreResult<DbConnection> {
        Ok(self.pool.get()?)
    }

    pub fn create(&self, input: NewAccountInput) -> StoreResult<Account> {
        if input.username.trim().is_empty() {
            return Err(StoreError::integrity("username must not be empty"));
        }
        if input.email.trim().is_empty() {
            return Err(StoreError::integrity("email must not be empty"));
        }
        if input.password_hash.is_empty() {
            return Err(StoreError::integrity("password hash must not be empty"));
        }

        let mut conn = self.conn()?;
        let ts = now();
        let new_account = NewAccount {
            id: Id::generate(),
            display_name: input
                .display_name
                .unwrap_or_else(|| input.username.clone()),
            username: input.username,
            email: input.email,
            password_hash: input.password_hash,
            role: input
                .role
                .unwrap_or_else(|| account_role::EMPLOYEE.to_string()),
            created_at: ts,
            updated_at: ts,
        };

        let inserted = diesel::insert_into(accounts::table)
            .values(&new_account)
            .execute(&mut conn);
        match inserted {
            Ok(_) => {}
            Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                return Err(StoreError::conflict(format!(
                    "an account named '{}' or using that email already exists",
                    new_account.username
                )));
            }
            Err(err) => return Err(err.into()),
        }

        info!(account_id = %new_account.id, username = %new_account.username, "provisioned account");
        let account = accounts::table.find(new_account.id).first(&mut conn)?;
        Ok(account)
    }

    pub fn get(&self, id: Id) -> StoreResult<Option<Account>> {
        let mut conn = self.conn()?;
        let account = accounts::table.find(id).first(&mut conn).optional()?;
        Ok(account)
    }

    pub fn get_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        let mut conn = self.conn()?;
        let account = accounts::table
            .filter(accounts::username.eq(username))
            .first(&mut conn)
            .optional()?;
        Ok(account)
    }

    pub fn get_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let mut conn = self.conn()?;
        let account = accounts::table
            .filter(accounts::email.eq(email))
            .first(&mut conn)
            .optional()?;
        Ok(account)
    }

    pub fn list(&self) -> StoreResult<Vec<Account>> {
        let mut conn = self.conn()?;
        let rows = accounts::table
            .order(accounts::username.asc())
            .load(&mut conn)?;
        Ok(rows)
    }

    pub fn update_profile(&self, id: Id, changes: AccountChanges) -> StoreResult<Account> {
        let mut conn = self.conn()?;
        let updated = diesel::update(accounts::table.find(id))
            .set((changes, accounts::updated_at.eq(now())))
            .execute(&mut conn)?;
        if updated == 0 {
            return Err(StoreError::not_found("account", id));
        }
        let account = accounts::table.find(id).first(&mut conn)?;
        Ok(account)
    }
}
