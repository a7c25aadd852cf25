//! Fitment endpoints

use axum::{extract::{Path, Query, State}, Json};
use serde::{Deserialize, Serialize};
use crate::domain::aggregates::{Category, MainCategory, Platform, Product};
use crate::domain::value_objects::PlatformRef;
use crate::fitment;
use crate::EcommerceError;
use super::{error::ApiError, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformView {
    #[serde(flatten)]
    pub platform: Platform,
    pub display_name: String,
}

impl From<Platform> for PlatformView {
    fn from(platform: Platform) -> Self {
        let display_name = platform.display_name();
        Self { platform, display_name }
    }
}

async fn resolve_platform(s: &AppState, raw: &str) -> Result<Platform, ApiError> {
    let reference = PlatformRef::parse(raw).ok_or_else(|| ApiError::Validation("A platform id or slug is required".to_string()))?;
    let platforms = s.store.platforms().await?;
    fitment::find_platform(&platforms, &reference)
        .cloned()
        .ok_or_else(|| EcommerceError::PlatformNotFound(reference.to_string()).into())
}

pub async fn list_platforms(State(s): State<AppState>) -> Result<Json<Vec<PlatformView>>, ApiError> {
    Ok(Json(s.store.platforms().await?.into_iter().map(PlatformView::from).collect()))
}

#[derive(Debug, Deserialize)]
pub struct VehicleQuery { pub make: String, pub model: String, pub year: i32 }

pub async fn lookup_vehicle(State(s): State<AppState>, Query(q): Query<VehicleQuery>) -> Result<Json<Vec<PlatformView>>, ApiError> {
    if q.make.trim().is_empty() || q.model.trim().is_empty() {
        return Err(ApiError::Validation("make and model are required".to_string()));
    }
    let platforms = s.store.platforms().await?;
    let found = fitment::platforms_for_vehicle(&platforms, &q.make, &q.model, q.year);
    Ok(Json(found.into_iter().cloned().map(PlatformView::from).collect()))
}

pub async fn platform_main_categories(State(s): State<AppState>, Path(platform): Path<String>) -> Result<Json<Vec<MainCategory>>, ApiError> {
    let platform = resolve_platform(&s, &platform).await?;
    let products = s.store.products_for_platform(platform.id).await?;
    let (mains, categories) = (s.store.main_categories().await?, s.store.categories().await?);
    let found = fitment::main_categories_for_platform(&platform, &mains, &categories, &products);
    Ok(Json(found.into_iter().cloned().collect()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryQuery { pub main_category: Option<i64> }

pub async fn platform_categories(
    State(s): State<AppState>,
    Path(platform): Path<String>,
    Query(q): Query<CategoryQuery>,
) -> Result<Json<Vec<Category>>, ApiError> {
    let platform = resolve_platform(&s, &platform).await?;
    let products = s.store.products_for_platform(platform.id).await?;
    let categories = s.store.categories().await?;
    let found = fitment::categories_for_platform(&platform, &categories, &products);
    Ok(Json(found.into_iter()
        .filter(|c| q.main_category.map_or(true, |m| c.main_category_id == m))
        .cloned()
        .collect()))
}

#[derive(Debug, Deserialize)]
pub struct ProductQuery { pub category: Option<i64> }

pub async fn platform_products(
    State(s): State<AppState>,
    Path(platform): Path<String>,
    Query(q): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let platform = resolve_platform(&s, &platform).await?;
    let products = s.store.products_for_platform(platform.id).await?;
    let found = fitment::products_for_platform(&platform, q.category, &products);
    tracing::debug!(platform = %platform.slug, category = ?q.category, count = found.len(), "platform products");
    Ok(Json(found.into_iter().cloned().collect()))
}
