use anyhow::{Context, Result};
use serde::Serialize;

use super::Store;

/// A category row as seeded by `Store::open` (spec.md §4.2 category listing).
#[derive(Debug, Clone, Serialize)]
pub struct CategoryRow {
    pub name: String,
    pub label: String,
    pub is_dynamic: bool,
}

impl Store {
    pub fn list_categories(&self) -> Result<Vec<CategoryRow>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT name, label, is_dynamic FROM categories ORDER BY is_dynamic, name")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(CategoryRow {
                    name: row.get(0)?,
                    label: row.get(1)?,
                    is_dynamic: row.get::<_, i64>(2)? != 0,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("list_categories")?;
        Ok(rows)
    }
}
