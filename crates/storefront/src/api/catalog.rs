//! Catalog client: products and categories.
//!
//! Catalog reads are cached with `moka` (5-minute TTL). Prices shown from the
//! cache can lag the API by up to the TTL; the cart snapshots whatever price
//! it was given at add time anyway.

use std::sync::Arc;
use std::time::Duration;

use duka_core::{CategoryId, ProductId};
use moka::future::Cache;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::cache::{CacheKey, CacheValue};
use super::types::{Category, Product, ProductQuery};
use super::{ApiClient, ApiError, RawResponse};

const CACHE_CAPACITY: u64 = 1000;
const CACHE_TTL: Duration = Duration::from_secs(300);

/// Client for the catalog endpoints.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    api: ApiClient,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogClient {
    /// Create a new catalog client.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(CatalogClientInner { api, cache }),
        }
    }

    /// List products, optionally filtered by category or featured flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self))]
    pub async fn products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiError> {
        let cache_key = CacheKey::Products(query.clone());
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let featured = query.is_featured.map(|f| f.to_string());
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(category_id) = &query.category_id {
            params.push(("categoryId", category_id.as_str()));
        }
        if let Some(featured) = &featured {
            params.push(("isFeatured", featured.as_str()));
        }

        let url = self.inner.api.endpoint(&["products"], &params)?;
        let response = self.inner.api.get(url).await?;
        let products: Vec<Product> = parse_list(&response)?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the product does not exist, or an
    /// error if the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let cache_key = CacheKey::Product(id.clone());
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let url = self.inner.api.endpoint(&["products", id.as_str()], &[])?;
        let response = self.inner.api.get(url).await?;
        let product: Product = parse_record(&response, || format!("product {id}"))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let url = self.inner.api.endpoint(&["categories"], &[])?;
        let response = self.inner.api.get(url).await?;
        let categories: Vec<Category> = parse_list(&response)?;

        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(categories.clone()),
            )
            .await;

        Ok(categories)
    }

    /// Get a single category with its billboard.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the category does not exist, or an
    /// error if the request fails.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn category(&self, id: &CategoryId) -> Result<Category, ApiError> {
        let cache_key = CacheKey::Category(id.clone());
        if let Some(CacheValue::Category(category)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for category");
            return Ok(*category);
        }

        let url = self.inner.api.endpoint(&["categories", id.as_str()], &[])?;
        let response = self.inner.api.get(url).await?;
        let category: Category = parse_record(&response, || format!("category {id}"))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Category(Box::new(category.clone())))
            .await;

        Ok(category)
    }
}

/// Interpret a list response.
///
/// # Errors
///
/// Returns [`ApiError::Status`] for non-success statuses and
/// [`ApiError::Parse`] for bodies that are not a list of `T`.
pub fn parse_list<T: DeserializeOwned>(response: &RawResponse) -> Result<Vec<T>, ApiError> {
    if !response.status.is_success() {
        return Err(response.status_error());
    }
    serde_json::from_str(&response.body).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %response.body_preview(),
            "Failed to parse catalog list response"
        );
        ApiError::Parse(e)
    })
}

/// Interpret a single-record response, mapping 404 to [`ApiError::NotFound`].
///
/// # Errors
///
/// Returns [`ApiError::NotFound`], [`ApiError::Status`] or [`ApiError::Parse`].
pub fn parse_record<T: DeserializeOwned>(
    response: &RawResponse,
    what: impl FnOnce() -> String,
) -> Result<T, ApiError> {
    if response.status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound(what()));
    }
    if !response.status.is_success() {
        return Err(response.status_error());
    }
    Ok(serde_json::from_str(&response.body)?)
}
