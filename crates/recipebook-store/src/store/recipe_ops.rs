//! Recipe CRUD and rating.

use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{OptionalExtension, params, params_from_iter};
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::types::{NewRecipe, Page, Recipe, RecipeId, RecipeUpdate};

use super::{Database, format_dt, parse_dt};

/// Recipes joined with their average rate.
pub(super) const RECIPE_VIEW: &str = "
    SELECT r.id, r.name, r.prep_time, r.difficulty, r.vegetarian,
           r.created_at, r.updated_at, COALESCE(AVG(t.rate), 0) AS rating
    FROM recipes r
    LEFT OUTER JOIN rates t ON t.recipe_id = r.id
    GROUP BY r.id";

impl Database {
    /// List recipes, newest first.
    pub fn list_recipes(&self, page: Page) -> Result<Vec<Recipe>> {
        let conn = self.conn();

        let recipes = match page.limit_offset() {
            Some((limit, offset)) => {
                let sql = format!(
                    "SELECT * FROM ({RECIPE_VIEW}) ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2"
                );
                let mut stmt = conn.prepare(&sql)?;
                stmt.query_map(params![limit, offset], row_to_recipe)?
                    .collect::<rusqlite::Result<Vec<_>>>()?
            }
            None => {
                let sql = format!("SELECT * FROM ({RECIPE_VIEW}) ORDER BY created_at DESC, id DESC");
                let mut stmt = conn.prepare(&sql)?;
                stmt.query_map([], row_to_recipe)?
                    .collect::<rusqlite::Result<Vec<_>>>()?
            }
        };

        Ok(recipes)
    }

    /// Get a recipe by id.
    pub fn get_recipe(&self, id: RecipeId) -> Result<Option<Recipe>> {
        let sql = format!("SELECT * FROM ({RECIPE_VIEW}) WHERE id = ?1");
        Ok(self
            .conn()
            .query_row(&sql, params![id], row_to_recipe)
            .optional()?)
    }

    /// Insert a recipe and return it.
    pub fn create_recipe(&self, recipe: &NewRecipe) -> Result<Recipe> {
        let now = format_dt(&Utc::now());

        let id = {
            let conn = self.conn();
            conn.execute(
                "INSERT INTO recipes (name, prep_time, difficulty, vegetarian, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                params![
                    recipe.name,
                    recipe.prep_time,
                    recipe.difficulty,
                    recipe.vegetarian,
                    now
                ],
            )?;
            conn.last_insert_rowid()
        };

        info!(recipe_id = id, name = %recipe.name, "Created recipe");
        self.get_recipe(id)?
            .ok_or_else(|| StoreError::NotFound(format!("recipe {id}")))
    }

    /// Apply a partial update and return the updated recipe.
    ///
    /// An empty update is rejected with [`StoreError::InvalidData`].
    pub fn update_recipe(&self, id: RecipeId, update: &RecipeUpdate) -> Result<Recipe> {
        if update.is_empty() {
            return Err(StoreError::InvalidData("no fields to update".to_string()));
        }

        let mut sets = vec!["updated_at = ?1".to_string()];
        let mut values = vec![Value::Text(format_dt(&Utc::now()))];

        let mut set = |column: &str, value: Value| {
            values.push(value);
            sets.push(format!("{column} = ?{}", values.len()));
        };
        if let Some(name) = &update.name {
            set("name", Value::Text(name.clone()));
        }
        if let Some(prep_time) = update.prep_time {
            set("prep_time", Value::Integer(i64::from(prep_time)));
        }
        if let Some(difficulty) = update.difficulty {
            set("difficulty", Value::Integer(i64::from(difficulty)));
        }
        if let Some(vegetarian) = update.vegetarian {
            set("vegetarian", Value::Integer(i64::from(vegetarian)));
        }

        values.push(Value::Integer(id));
        let sql = format!(
            "UPDATE recipes SET {} WHERE id = ?{}",
            sets.join(", "),
            values.len()
        );

        let updated = self.conn().execute(&sql, params_from_iter(values.iter()))?;
        if updated == 0 {
            return Err(StoreError::NotFound(format!("recipe {id}")));
        }

        debug!(recipe_id = id, "Updated recipe");
        self.get_recipe(id)?
            .ok_or_else(|| StoreError::NotFound(format!("recipe {id}")))
    }

    /// Delete a recipe together with its rates.
    pub fn delete_recipe(&self, id: RecipeId) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM rates WHERE recipe_id = ?1", params![id])?;
        let deleted = tx.execute("DELETE FROM recipes WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(StoreError::NotFound(format!("recipe {id}")));
        }
        tx.commit()?;

        info!(recipe_id = id, "Deleted recipe");
        Ok(())
    }

    /// Record a rate (1 to 5) for a recipe.
    pub fn rate_recipe(&self, id: RecipeId, rate: u8) -> Result<()> {
        if !(1..=5).contains(&rate) {
            return Err(StoreError::InvalidData(format!(
                "rate must be between 1 and 5, got {rate}"
            )));
        }

        let now = format_dt(&Utc::now());
        let inserted = self.conn().execute(
            "INSERT INTO rates (recipe_id, rate, created_at)
             SELECT id, ?2, ?3 FROM recipes WHERE id = ?1",
            params![id, rate, now],
        )?;
        if inserted == 0 {
            return Err(StoreError::NotFound(format!("recipe {id}")));
        }

        debug!(recipe_id = id, rate, "Rated recipe");
        Ok(())
    }
}

pub(super) fn row_to_recipe(row: &rusqlite::Row<'_>) -> rusqlite::Result<Recipe> {
    Ok(Recipe {
        id: row.get(0)?,
        name: row.get(1)?,
        prep_time: row.get(2)?,
        difficulty: row.get(3)?,
        vegetarian: row.get(4)?,
        created_at: parse_dt(&row.get::<_, String>(5)?)?,
        updated_at: parse_dt(&row.get::<_, String>(6)?)?,
        rating: row.get(7)?,
    })
}
