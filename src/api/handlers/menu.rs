//! Menu handlers: public browsing plus admin CRUD.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch};
use axum::{Json, Router};
use chrono::Utc;
use uuid::Uuid;

use crate::api::auth::AdminUser;
use crate::api::dto::{
    AvailabilityRequest, CreateMenuItemRequest, MenuQuery, UpdateMenuItemRequest,
};
use crate::app_state::AppState;
use crate::domain::models::MenuItem;
use crate::error::{ErrorResponse, GatewayError};

/// `GET /menu` — List menu items with filters.
#[utoipa::path(
    get,
    path = "/api/v1/menu",
    tag = "Menu",
    summary = "List menu items",
    description = "Returns menu items matching the filters, most popular first.",
    params(MenuQuery),
    responses(
        (status = 200, description = "Matching menu items", body = serde_json::Value),
    )
)]
pub async fn list_menu(
    State(state): State<AppState>,
    Query(query): Query<MenuQuery>,
) -> Result<impl IntoResponse, GatewayError> {
    let items = state.store.list_menu_items(&query.into()).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "count": items.len(),
        "data": items,
    })))
}

/// `GET /menu/{id}` — Get one menu item.
#[utoipa::path(
    get,
    path = "/api/v1/menu/{id}",
    tag = "Menu",
    summary = "Get a menu item",
    params(("id" = Uuid, Path, description = "Menu item UUID")),
    responses(
        (status = 200, description = "The menu item", body = MenuItem),
        (status = 404, description = "Item not found", body = ErrorResponse),
    )
)]
pub async fn get_menu_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let item = state.store.get_menu_item(id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": item })))
}

/// `POST /menu` — Create a menu item (admin).
#[utoipa::path(
    post,
    path = "/api/v1/menu",
    tag = "Menu",
    summary = "Create a menu item",
    request_body = CreateMenuItemRequest,
    responses(
        (status = 201, description = "Item created", body = MenuItem),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    )
)]
pub async fn create_menu_item(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<CreateMenuItemRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    validate_name_price(&req.name, &req.description, req.price)?;

    let now = Utc::now();
    let item = MenuItem {
        id: Uuid::new_v4(),
        name: req.name.trim().to_string(),
        description: req.description.trim().to_string(),
        price: req.price,
        category: req.category,
        image_url: req.image_url.unwrap_or_default(),
        image_id: req.image_id.unwrap_or_default(),
        dietary: req.dietary.unwrap_or_default(),
        ingredients: req.ingredients.unwrap_or_default(),
        available: req.available.unwrap_or(true),
        popularity: 0,
        created_at: now,
        updated_at: now,
    };
    state.store.create_menu_item(&item).await?;
    tracing::info!(item_id = %item.id, name = %item.name, "menu item created");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "success": true, "data": item })),
    ))
}

/// `PUT /menu/{id}` — Update a menu item (admin). Unset fields keep their
/// current value.
#[utoipa::path(
    put,
    path = "/api/v1/menu/{id}",
    tag = "Menu",
    summary = "Update a menu item",
    params(("id" = Uuid, Path, description = "Menu item UUID")),
    request_body = UpdateMenuItemRequest,
    responses(
        (status = 200, description = "Item updated", body = MenuItem),
        (status = 404, description = "Item not found", body = ErrorResponse),
    )
)]
pub async fn update_menu_item(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateMenuItemRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let mut item = state.store.get_menu_item(id).await?;
    if let Some(name) = req.name {
        item.name = name;
    }
    if let Some(description) = req.description {
        item.description = description;
    }
    if let Some(price) = req.price {
        item.price = price;
    }
    if let Some(category) = req.category {
        item.category = category;
    }
    if let Some(image_url) = req.image_url {
        item.image_url = image_url;
    }
    if let Some(image_id) = req.image_id {
        item.image_id = image_id;
    }
    if let Some(dietary) = req.dietary {
        item.dietary = dietary;
    }
    if let Some(ingredients) = req.ingredients {
        item.ingredients = ingredients;
    }
    if let Some(available) = req.available {
        item.available = available;
    }
    validate_name_price(&item.name, &item.description, item.price)?;

    state.store.update_menu_item(&item).await?;
    tracing::info!(item_id = %item.id, "menu item updated");
    Ok(Json(serde_json::json!({ "success": true, "data": item })))
}

/// `DELETE /menu/{id}` — Delete a menu item (admin).
#[utoipa::path(
    delete,
    path = "/api/v1/menu/{id}",
    tag = "Menu",
    summary = "Delete a menu item",
    params(("id" = Uuid, Path, description = "Menu item UUID")),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 404, description = "Item not found", body = ErrorResponse),
    )
)]
pub async fn delete_menu_item(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    state.store.delete_menu_item(id).await?;
    tracing::info!(item_id = %id, "menu item deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `PATCH /menu/{id}/availability` — Toggle availability (admin).
#[utoipa::path(
    patch,
    path = "/api/v1/menu/{id}/availability",
    tag = "Menu",
    summary = "Set menu item availability",
    params(("id" = Uuid, Path, description = "Menu item UUID")),
    request_body = AvailabilityRequest,
    responses(
        (status = 200, description = "Availability updated", body = MenuItem),
        (status = 404, description = "Item not found", body = ErrorResponse),
    )
)]
pub async fn set_availability(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<AvailabilityRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let mut item = state.store.get_menu_item(id).await?;
    item.available = req.available;
    state.store.update_menu_item(&item).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": item })))
}

fn validate_name_price(name: &str, description: &str, price: f64) -> Result<(), GatewayError> {
    if name.trim().is_empty() {
        return Err(GatewayError::InvalidRequest("name is required".to_string()));
    }
    if description.trim().is_empty() {
        return Err(GatewayError::InvalidRequest(
            "description is required".to_string(),
        ));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(GatewayError::InvalidRequest(
            "price must be non-negative".to_string(),
        ));
    }
    Ok(())
}

/// Menu routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/menu", get(list_menu).post(create_menu_item))
        .route(
            "/menu/{id}",
            get(get_menu_item)
                .put(update_menu_item)
                .delete(delete_menu_item),
        )
        .route("/menu/{id}/availability", patch(set_availability))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn validation_rejects_bad_input() {
        assert!(validate_name_price("", "desc", 1.0).is_err());
        assert!(validate_name_price("name", " ", 1.0).is_err());
        assert!(validate_name_price("name", "desc", -0.5).is_err());
        assert!(validate_name_price("name", "desc", f64::NAN).is_err());
        assert!(validate_name_price("name", "desc", 9.5).is_ok());
    }
}
