//! Menu DTOs for list filtering and admin CRUD.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::domain::models::{Dietary, MenuCategory};
use crate::persistence::MenuFilter;

/// Query parameters for `GET /menu`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MenuQuery {
    /// Restrict to one category.
    pub category: Option<MenuCategory>,
    /// Restrict by availability.
    pub available: Option<bool>,
    /// Only vegan items.
    #[serde(default)]
    pub vegan: bool,
    /// Only vegetarian items.
    #[serde(default)]
    pub vegetarian: bool,
    /// Only gluten-free items.
    #[serde(default)]
    pub gluten_free: bool,
    /// Only spicy items.
    #[serde(default)]
    pub spicy: bool,
    /// Minimum price, inclusive.
    pub min_price: Option<f64>,
    /// Maximum price, inclusive.
    pub max_price: Option<f64>,
    /// Case-insensitive text search.
    pub search: Option<String>,
}

impl From<MenuQuery> for MenuFilter {
    fn from(query: MenuQuery) -> Self {
        Self {
            category: query.category,
            available: query.available,
            vegan: query.vegan,
            vegetarian: query.vegetarian,
            gluten_free: query.gluten_free,
            spicy: query.spicy,
            min_price: query.min_price,
            max_price: query.max_price,
            search: query.search,
        }
    }
}

/// Request body for `POST /menu`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMenuItemRequest {
    /// Display name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Price; must be non-negative.
    pub price: f64,
    /// Menu category.
    pub category: MenuCategory,
    /// Image URL reference in external object storage.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Object-storage id of the image.
    #[serde(default)]
    pub image_id: Option<String>,
    /// Dietary flags.
    #[serde(default)]
    pub dietary: Option<Dietary>,
    /// Ingredient list.
    #[serde(default)]
    pub ingredients: Option<Vec<String>>,
    /// Whether the item starts available (defaults to `true`).
    #[serde(default)]
    pub available: Option<bool>,
}

/// Request body for `PUT /menu/{id}`; unset fields keep their value.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMenuItemRequest {
    /// New display name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New price.
    pub price: Option<f64>,
    /// New category.
    pub category: Option<MenuCategory>,
    /// New image URL.
    pub image_url: Option<String>,
    /// New object-storage image id.
    pub image_id: Option<String>,
    /// New dietary flags.
    pub dietary: Option<Dietary>,
    /// New ingredient list.
    pub ingredients: Option<Vec<String>>,
    /// New availability.
    pub available: Option<bool>,
}

/// Request body for `PATCH /menu/{id}/availability`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AvailabilityRequest {
    /// Whether the item can be ordered.
    pub available: bool,
}
