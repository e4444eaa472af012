//! Category reference data.
//!
//! ```text
//! GET /api/v1/categories?parentId=3&isSkill=true
//! GET /api/v1/categories/{category_id}
//! ```

use actix_web::{get, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{CategoryFilter, CategoryId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::CategoryResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Optional filters for the category list.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct CategoryListQuery {
    /// Only children of this category.
    pub parent_id: Option<i32>,
    /// Only skill (or only non-skill) categories.
    pub is_skill: Option<bool>,
}

impl From<CategoryListQuery> for CategoryFilter {
    fn from(query: CategoryListQuery) -> Self {
        Self {
            parent_id: query.parent_id.map(CategoryId::new),
            is_skill_category: query.is_skill,
        }
    }
}

/// Active categories by display order.
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    params(CategoryListQuery),
    responses(
        (status = 200, description = "Categories", body = [CategoryResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["categories"],
    operation_id = "listCategories",
    security([])
)]
#[get("/categories")]
pub async fn list_categories(
    state: web::Data<HttpState>,
    query: web::Query<CategoryListQuery>,
) -> ApiResult<web::Json<Vec<CategoryResponse>>> {
    let categories = state.categories.list(query.into_inner().into()).await?;
    Ok(web::Json(categories.into_iter().map(Into::into).collect()))
}

/// One category by id.
#[utoipa::path(
    get,
    path = "/api/v1/categories/{category_id}",
    params(("category_id" = i32, Path, description = "Category identifier")),
    responses(
        (status = 200, description = "Category", body = CategoryResponse),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["categories"],
    operation_id = "getCategory",
    security([])
)]
#[get("/categories/{category_id}")]
pub async fn get_category(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<CategoryResponse>> {
    let category = state.categories.get(CategoryId::new(path.into_inner())).await?;
    Ok(web::Json(category.into()))
}
