use diesel::prelude::*;
use serde::Deserialize;

use crate::db::{DbConnection, DbPool};
use crate::error::{StoreError, StoreResult};
use crate::models::{NewTemplate, Template};
use crate::schema::templates;
use crate::store::now;
use crate::types::Id;

#[derive(Debug, Clone, Deserialize)]
pub struct NewTemplateInput {
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, AsChangeset)]
#[diesel(table_name = templates)]
pub struct TemplateChanges {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Named content templates. Plain CRUD; no versioning, no coupling to other
/// entities.
#[derive(Clone)]
pub struct TemplateStore {
    pool: DbPool,
}

impl TemplateStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> StoreResult<DbConnection> {
        Ok(self.pool.get()?)
    }

    pub fn create(&self, input: NewTemplateInput) -> StoreResult<Template> {
        if input.name.trim().is_empty() {
            return Err(StoreError::integrity("template name must not be empty"));
        }

        let mut conn = self.conn()?;
        let new_template = NewTemplate {
            id: Id::generate(),
            name: input.name,
            content: input.content,
            category: input.category,
            updated_at: now(),
        };
        diesel::insert_into(templates::table)
            .values(&new_template)
            .execute(&mut conn)?;

        let template = templates::table.find(new_template.id).first(&mut conn)?;
        Ok(template)
    }

    pub fn get(&self, id: Id) -> StoreResult<Option<Template>> {
        let mut conn = self.conn()?;
        let template = templates::table.find(id).first(&mut conn).optional()?;
        Ok(template)
    }

    pub fn list(&self) -> StoreResult<Vec<Template>> {
        let mut conn = self.conn()?;
        let rows = templates::table
            .order(templates::name.asc())
            .then_order_by(templates::id.asc())
            .load(&mut conn)?;
        Ok(rows)
    }

    pub fn update(&self, id: Id, changes: TemplateChanges) -> StoreResult<Template> {
        let mut conn = self.conn()?;
        let updated = diesel::update(templates::table.find(id))
            .set((changes, templates::updated_at.eq(now())))
            .execute(&mut conn)?;
        if updated == 0 {
            return Err(StoreError::not_found("template", id));
        }
        let template = templates::table.find(id).first(&mut conn)?;
        Ok(template)
    }

    pub fn delete(&self, id: Id) -> StoreResult<()> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(templates::table.find(id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(StoreError::not_found("template", id));
        }
        Ok(())
    }
}
