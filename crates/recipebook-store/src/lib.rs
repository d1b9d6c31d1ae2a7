//! SQLite persistence for Recipebook.
//!
//! A single [`Database`] holds accounts, sessions, recipes and rates. It is
//! the durable tier of the session store (it implements
//! [`SessionPersistence`](recipebook_session::SessionPersistence)) and the
//! executor for compiled search predicates.
//!
//! ```rust,no_run
//! use recipebook_search::{Filter, FilterCompiler, FilterGroup, SearchQuery};
//! use recipebook_store::Database;
//!
//! let db = Database::open("recipebook.db")?;
//! let query = SearchQuery::new()
//!     .with_group(FilterGroup::new().with_filter(Filter::new("name", "start", "Choco")));
//! let predicate = FilterCompiler::new().compile(&query).expect("valid query");
//! let recipes = db.search_recipes(&predicate)?;
//! # Ok::<(), recipebook_store::StoreError>(())
//! ```

mod error;
mod sql;
mod store;
mod types;

pub use error::{Result, StoreError};
pub use sql::SqlFilter;
pub use store::Database;
pub use types::{NewRecipe, Page, Recipe, RecipeId, RecipeUpdate, User};
