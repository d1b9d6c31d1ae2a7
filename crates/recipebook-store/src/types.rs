//! Record types stored in the catalog database.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use recipebook_session::UserId;

/// Recipe identifier.
pub type RecipeId = i64;

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub full_name: String,
    /// PHC-formatted password hash. Never serialized.
    pub password_hash: String,
    pub is_disabled: bool,
    pub created_at: DateTime<Utc>,
}

/// A recipe as returned by listings and searches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    /// Preparation time in minutes.
    pub prep_time: i32,
    /// 1 (easy) to 3 (hard).
    pub difficulty: u8,
    pub vegetarian: bool,
    /// Average of all rates, 0 when unrated.
    pub rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a new recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecipe {
    pub name: String,
    pub prep_time: i32,
    pub difficulty: u8,
    pub vegetarian: bool,
}

impl NewRecipe {
    pub fn new(name: impl Into<String>, prep_time: i32, difficulty: u8, vegetarian: bool) -> Self {
        Self {
            name: name.into(),
            prep_time,
            difficulty,
            vegetarian,
        }
    }
}

/// Partial update of a recipe. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeUpdate {
    pub name: Option<String>,
    pub prep_time: Option<i32>,
    pub difficulty: Option<u8>,
    pub vegetarian: Option<bool>,
}

impl RecipeUpdate {
    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.prep_time.is_none()
            && self.difficulty.is_none()
            && self.vegetarian.is_none()
    }
}

/// Page selection for recipe listings.
///
/// `items == 0` disables paging. Pages are 1-based; page 0 is treated as page 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub items: u32,
    pub page: u32,
}

impl Page {
    /// Every recipe, unpaged.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(items: u32, page: u32) -> Self {
        Self { items, page }
    }

    /// `(limit, offset)` or `None` when unpaged.
    pub fn limit_offset(&self) -> Option<(i64, i64)> {
        if self.items == 0 {
            return None;
        }
        let index = i64::from(self.page.saturating_sub(1));
        let items = i64::from(self.items);
        Some((items, items * index))
    }
}
