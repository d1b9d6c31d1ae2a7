//! Recipe endpoints: listing, CRUD and rating.

use axum::{
    Form, Json,
    extract::{Path, Query, State, rejection::FormRejection},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::info;

use recipebook_search::parse_bool_literal;
use recipebook_store::{NewRecipe, Page, Recipe, RecipeId, RecipeUpdate};

use super::{optional_field, required_field};
use crate::auth::AuthSession;
use crate::error::{Result, ServerError};
use crate::state::AppState;

// ── Request types ───────────────────────────────────────────────────

/// Paging parameters. Values that do not parse are treated as 0.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub items: Option<String>,
    pub page: Option<String>,
}

impl ListParams {
    fn page(&self) -> Page {
        let number = |v: &Option<String>| {
            v.as_deref()
                .and_then(|v| v.trim().parse::<u32>().ok())
                .unwrap_or(0)
        };
        Page::new(number(&self.items), number(&self.page))
    }
}

/// Recipe form. Every field is required on create and optional on update.
#[derive(Debug, Default, Deserialize)]
pub struct RecipeForm {
    pub name: Option<String>,
    pub prep_time: Option<String>,
    pub difficulty: Option<String>,
    pub vegeterian: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RateForm {
    pub rating: Option<String>,
}

// ── Validation ──────────────────────────────────────────────────────

fn parse_recipe_id(raw: &str) -> Result<RecipeId> {
    raw.trim()
        .parse()
        .map_err(|_| ServerError::BadRequest(format!("invalid recipe id '{raw}'")))
}

fn parse_prep_time(raw: &str) -> Result<i32> {
    match raw.parse::<i32>() {
        Ok(minutes) if minutes >= 0 => Ok(minutes),
        _ => Err(ServerError::BadRequest(format!(
            "prep_time '{raw}' must be a non-negative number of minutes"
        ))),
    }
}

fn parse_difficulty(raw: &str) -> Result<u8> {
    match raw.parse::<u8>() {
        Ok(level @ 1..=3) => Ok(level),
        _ => Err(ServerError::BadRequest(format!(
            "difficulty '{raw}' must be 1, 2 or 3"
        ))),
    }
}

fn parse_vegetarian(raw: &str) -> Result<bool> {
    parse_bool_literal(raw)
        .ok_or_else(|| ServerError::BadRequest(format!("vegeterian '{raw}' is not a boolean")))
}

fn parse_rating(raw: &str) -> Result<u8> {
    match raw.parse::<u8>() {
        Ok(rating @ 1..=5) => Ok(rating),
        _ => Err(ServerError::BadRequest(format!(
            "rating '{raw}' must be between 1 and 5"
        ))),
    }
}

impl RecipeForm {
    fn into_new_recipe(self) -> Result<NewRecipe> {
        let name = required_field("name", self.name.as_deref())?;
        let prep_time = parse_prep_time(&required_field("prep_time", self.prep_time.as_deref())?)?;
        let difficulty =
            parse_difficulty(&required_field("difficulty", self.difficulty.as_deref())?)?;
        let vegetarian =
            parse_vegetarian(&required_field("vegeterian", self.vegeterian.as_deref())?)?;
        Ok(NewRecipe::new(name, prep_time, difficulty, vegetarian))
    }

    fn into_update(self) -> Result<RecipeUpdate> {
        let update = RecipeUpdate {
            name: optional_field(self.name.as_deref()),
            prep_time: optional_field(self.prep_time.as_deref())
                .map(|v| parse_prep_time(&v))
                .transpose()?,
            difficulty: optional_field(self.difficulty.as_deref())
                .map(|v| parse_difficulty(&v))
                .transpose()?,
            vegetarian: optional_field(self.vegeterian.as_deref())
                .map(|v| parse_vegetarian(&v))
                .transpose()?,
        };
        if update.is_empty() {
            return Err(ServerError::BadRequest(
                "at least one recipe field is required".to_string(),
            ));
        }
        Ok(update)
    }
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /recipes
pub async fn list_recipes_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Recipe>>> {
    Ok(Json(state.db.list_recipes(params.page())?))
}

/// GET /recipes/{id}
pub async fn get_recipe_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Recipe>> {
    let id = parse_recipe_id(&id)?;
    state
        .db
        .get_recipe(id)?
        .map(Json)
        .ok_or_else(|| ServerError::NotFound(format!("recipe {id}")))
}

/// POST /recipes
pub async fn create_recipe_handler(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    form: std::result::Result<Form<RecipeForm>, FormRejection>,
) -> Result<(StatusCode, Json<Recipe>)> {
    let Form(form) = form?;
    let recipe = state.db.create_recipe(&form.into_new_recipe()?)?;
    info!(recipe_id = recipe.id, user_id = session.user_id, "Recipe created");
    Ok((StatusCode::CREATED, Json(recipe)))
}

/// PUT|PATCH /recipes/{id}
pub async fn update_recipe_handler(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Path(id): Path<String>,
    form: std::result::Result<Form<RecipeForm>, FormRejection>,
) -> Result<Json<Recipe>> {
    let id = parse_recipe_id(&id)?;
    let Form(form) = form?;
    let recipe = state.db.update_recipe(id, &form.into_update()?)?;
    info!(recipe_id = id, user_id = session.user_id, "Recipe updated");
    Ok(Json(recipe))
}

/// DELETE /recipes/{id}
pub async fn delete_recipe_handler(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_recipe_id(&id)?;
    state.db.delete_recipe(id)?;
    info!(recipe_id = id, user_id = session.user_id, "Recipe deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT|PATCH /recipes/{id}/rate
///
/// Returns the recipe with its updated average.
pub async fn rate_recipe_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: std::result::Result<Form<RateForm>, FormRejection>,
) -> Result<Json<Recipe>> {
    let id = parse_recipe_id(&id)?;
    let Form(form) = form?;
    let rating = parse_rating(&required_field("rating", form.rating.as_deref())?)?;

    state.db.rate_recipe(id, rating)?;
    info!(recipe_id = id, rating, "Recipe rated");

    state
        .db
        .get_recipe(id)?
        .map(Json)
        .ok_or_else(|| ServerError::NotFound(format!("recipe {id}")))
}
