//! Predicate search over recipes.

use rusqlite::params_from_iter;
use tracing::debug;

use recipebook_search::Predicate;

use crate::error::Result;
use crate::sql::SqlFilter;
use crate::types::Recipe;

use super::Database;
use super::recipe_ops::{RECIPE_VIEW, row_to_recipe};

impl Database {
    /// Return every recipe matching the predicate, newest first.
    ///
    /// [`Predicate::Nothing`] returns an empty list without touching the database.
    pub fn search_recipes(&self, predicate: &Predicate) -> Result<Vec<Recipe>> {
        if predicate.is_nothing() {
            debug!("Empty search predicate, returning no recipes");
            return Ok(Vec::new());
        }

        let filter = SqlFilter::from_predicate(predicate);
        let sql = format!(
            "SELECT * FROM ({RECIPE_VIEW}) WHERE {} ORDER BY created_at DESC, id DESC",
            filter.clause
        );

        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let recipes = stmt
            .query_map(params_from_iter(filter.params.iter()), row_to_recipe)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!(%predicate, matches = recipes.len(), "Searched recipes");
        Ok(recipes)
    }
}
