//! API routes.

pub mod accounts;
pub mod health;
pub mod recipes;
pub mod search;

pub use accounts::{
    LoginForm, RegisterForm, UserResponse, login_handler, logout_handler, register_handler,
};
pub use health::{HealthResponse, health_routes};
pub use recipes::{
    RateForm, RecipeForm, create_recipe_handler, delete_recipe_handler, get_recipe_handler,
    list_recipes_handler, rate_recipe_handler, update_recipe_handler,
};
pub use search::search_handler;

use crate::error::{Result, ServerError};

/// Trimmed, non-empty form field.
fn required_field(name: &str, value: Option<&str>) -> Result<String> {
    optional_field(value).ok_or_else(|| ServerError::BadRequest(format!("{name} is required")))
}

/// Trimmed form field; blank counts as absent.
fn optional_field(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
