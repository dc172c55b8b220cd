//! Catalog endpoints: products and categories.
//!
//! Catalog reads are cached with `moka` (5-minute TTL). Search queries skip
//! the cache entirely. Cart and account endpoints live elsewhere and are
//! never cached - they are mutable state.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::Method;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::ApiError;
use crate::types::{Category, Page, Product};

use super::Http;

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Product(String),
    Products(String),
    Categories,
    Category(String),
}

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Product(Box<Product>),
    Products(Arc<Page<Product>>),
    Categories(Arc<Vec<Category>>),
    Category(Box<Category>),
}

/// Filters for the product listing endpoint.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    /// Page number (1-based).
    pub page: Option<u32>,
    /// Category slug to filter by.
    pub category: Option<String>,
    /// Free-text search term.
    pub search: Option<String>,
    /// Minimum price filter.
    pub min_price: Option<Decimal>,
    /// Maximum price filter.
    pub max_price: Option<Decimal>,
    /// Ordering key (e.g. `price`, `-created_at`).
    pub ordering: Option<String>,
    /// Only featured products.
    pub featured: Option<bool>,
    /// Page size override.
    pub limit: Option<u32>,
}

impl ProductQuery {
    /// Render as a URL query string (no leading `?`; empty when no filters).
    fn to_query_string(&self) -> String {
        let mut pairs: Vec<String> = Vec::new();

        let mut push = |key: &str, value: &str| {
            pairs.push(format!("{key}={}", urlencoding::encode(value)));
        };

        if let Some(page) = self.page {
            push("page", &page.to_string());
        }
        if let Some(category) = &self.category {
            push("category", category);
        }
        if let Some(search) = &self.search {
            push("search", search);
        }
        if let Some(min_price) = self.min_price {
            push("min_price", &min_price.to_string());
        }
        if let Some(max_price) = self.max_price {
            push("max_price", &max_price.to_string());
        }
        if let Some(ordering) = &self.ordering {
            push("ordering", ordering);
        }
        if let Some(featured) = self.featured {
            push("featured", &featured.to_string());
        }
        if let Some(limit) = self.limit {
            push("limit", &limit.to_string());
        }

        pairs.join("&")
    }
}

/// Some deployments paginate the category listing, some return it bare.
#[derive(Deserialize)]
#[serde(untagged)]
enum MaybePaginated<T> {
    Plain(Vec<T>),
    Paginated(Page<T>),
}

impl<T> MaybePaginated<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Plain(items) => items,
            Self::Paginated(page) => page.results,
        }
    }
}

/// Client for the catalog endpoints.
#[derive(Clone)]
pub struct ProductsApi {
    inner: Arc<ProductsApiInner>,
}

struct ProductsApiInner {
    http: Http,
    cache: Cache<CacheKey, CacheValue>,
}

impl ProductsApi {
    pub(crate) fn new(http: Http) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(ProductsApiInner { http, cache }),
        }
    }

    /// Get a page of products matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list(&self, query: &ProductQuery) -> Result<Arc<Page<Product>>, ApiError> {
        let query_string = query.to_query_string();
        let cache_key = CacheKey::Products(query_string.clone());

        // Check cache (searches bypass it)
        if query.search.is_none()
            && let Some(CacheValue::Products(page)) = self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for products");
            return Ok(page);
        }

        let path = if query_string.is_empty() {
            "products/".to_owned()
        } else {
            format!("products/?{query_string}")
        };

        let page: Page<Product> = self
            .inner
            .http
            .send(self.inner.http.request(Method::GET, &path))
            .await?;
        let page = Arc::new(page);

        if query.search.is_none() {
            self.inner
                .cache
                .insert(cache_key, CacheValue::Products(Arc::clone(&page)))
                .await;
        }

        Ok(page)
    }

    /// Get a product by its slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn get(&self, slug: &str) -> Result<Product, ApiError> {
        let cache_key = CacheKey::Product(slug.to_owned());

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let path = format!("products/{}/", urlencoding::encode(slug));
        let product: Product = self
            .inner
            .http
            .send(self.inner.http.request(Method::GET, &path))
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Arc<Vec<Category>>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let listing: MaybePaginated<Category> = self
            .inner
            .http
            .send(self.inner.http.request(Method::GET, "products/categories/"))
            .await?;
        let categories = Arc::new(listing.into_vec());

        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(Arc::clone(&categories)),
            )
            .await;

        Ok(categories)
    }

    /// Get a category by its slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the category is not found or the API request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn category(&self, slug: &str) -> Result<Category, ApiError> {
        let cache_key = CacheKey::Category(slug.to_owned());

        if let Some(CacheValue::Category(category)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for category");
            return Ok(*category);
        }

        let path = format!("products/categories/{}/", urlencoding::encode(slug));
        let category: Category = self
            .inner
            .http
            .send(self.inner.http.request(Method::GET, &path))
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Category(Box::new(category.clone())))
            .await;

        Ok(category)
    }

    /// Invalidate all cached catalog data.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}
