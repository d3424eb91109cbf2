use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Json,
};
use serde_json::{json, Value};

use crate::auth::scopes;
use crate::error::ApiError;
use crate::middleware::require_scope;
use crate::state::AppState;
use crate::store::models::normalize_recipe;
use crate::store::StoreError;

/// GET /drinks - public listing, short form (no recipes)
pub async fn list_drinks(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let drinks = state.store.list().await?;

    Ok(Json(json!({
        "status": true,
        "drinks": drinks.iter().map(|d| d.short()).collect::<Vec<_>>(),
    })))
}

/// GET /drinks-detail - long form listing, requires `get:drinks-detail`
pub async fn list_drinks_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    require_scope(&state, &headers, scopes::GET_DRINKS_DETAIL).await?;

    let drinks = state.store.list().await?;

    Ok(Json(json!({
        "status": true,
        "drinks": drinks.iter().map(|d| d.long()).collect::<Vec<_>>(),
    })))
}

/// POST /drinks - create a drink, requires `post:drinks`
///
/// Both fields are required: a title that is non-empty after trimming, and a
/// non-empty recipe. A single recipe entry given as a bare object is wrapped
/// into a one-element list before storing.
pub async fn create_drink(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let principal = require_scope(&state, &headers, scopes::POST_DRINKS).await?;

    let Some(Json(data)) = body else {
        return Err(ApiError::bad_request("all fields are required"));
    };

    // Titles are validated trimmed but stored as given.
    let title = data
        .get("title")
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty());
    let recipe = normalize_recipe(data.get("recipe"))
        .map_err(|_| ApiError::bad_request("recipe entries must have name, color and parts"))?;

    let (Some(title), Some(recipe)) = (title, recipe) else {
        return Err(ApiError::bad_request("all fields are required"));
    };

    let drink = state.store.insert(title, &recipe).await.map_err(|err| {
        tracing::warn!("insert failed: {}", err);
        ApiError::unprocessable("failed to add drink")
    })?;

    tracing::info!(subject = %principal.sub, id = drink.id, "drink created");

    Ok(Json(json!({
        "status": true,
        "drinks": [drink.long()],
    })))
}

/// PATCH /drinks/:id - partial update, requires `patch:drinks`
///
/// Each field replaces the stored value only when supplied and non-empty;
/// the other field is left unchanged.
pub async fn update_drink(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let principal = require_scope(&state, &headers, scopes::PATCH_DRINKS).await?;

    let Some(Json(data)) = body else {
        return Err(ApiError::bad_request("request body must be JSON"));
    };

    let mut drink = state
        .store
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found("drink not found"))?;

    if let Some(recipe) = normalize_recipe(data.get("recipe"))
        .map_err(|_| ApiError::bad_request("recipe entries must have name, color and parts"))?
    {
        drink.recipe = recipe;
    }
    if let Some(title) = data
        .get("title")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
    {
        drink.title = title.to_string();
    }

    state.store.update(&drink).await.map_err(|err| match err {
        StoreError::NotFound => ApiError::not_found("drink not found"),
        other => {
            tracing::warn!("update failed: {}", other);
            ApiError::unprocessable("drink could not be updated")
        }
    })?;

    tracing::info!(subject = %principal.sub, id = drink.id, "drink updated");

    Ok(Json(json!({
        "status": true,
        "message": "drink updated successfully",
        "drinks": [drink.long()],
    })))
}

/// DELETE /drinks/:id - requires `delete:drinks`
pub async fn delete_drink(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let principal = require_scope(&state, &headers, scopes::DELETE_DRINKS).await?;

    let drink = state
        .store
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found("drink not found"))?;

    state.store.delete(drink.id).await.map_err(|err| match err {
        StoreError::NotFound => ApiError::not_found("drink not found"),
        other => {
            tracing::warn!("delete failed: {}", other);
            ApiError::unprocessable("drink could not be deleted")
        }
    })?;

    tracing::info!(subject = %principal.sub, id = drink.id, "drink deleted");

    Ok(Json(json!({
        "status": true,
        "delete": id,
    })))
}
