use super::normalize::{self, MediaUrls};
use super::{SearchBackend, MAX_SUGGESTIONS};
use crate::config::AppConfig;
use crate::error::StorefrontError;
use crate::model::{FacetMetadata, Product, SearchPage};
use async_trait::async_trait;
use serde_json::Value;
use url::Url;

const SEARCH_PATH: &str = "store/product-search";
const SUGGEST_PATH: &str = "store/product-search/suggestions";

/// Facets are always loaded with this request, whatever the active keyword.
const FACET_MIN_RATING: u32 = 1;
const FACET_LIMIT: u32 = 50;

pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    media: MediaUrls,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Result<Self, StorefrontError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("storefront-cli/", env!("CARGO_PKG_VERSION")))
            .connection_verbose(config.debug)
            .build()?;

        Ok(Self {
            http,
            base: config.api_url.clone(),
            media: MediaUrls {
                base: config.media_url.clone(),
                fallback_image: config.fallback_image.clone(),
            },
        })
    }

    /// Build the search URL. A `None` or blank query omits `q`, except that
    /// `Some("")` is sent verbatim as `q=` to match the fixed facet request.
    pub fn search_url(
        &self,
        query: Option<&str>,
        min_rating: u32,
        page: u32,
        limit: u32,
    ) -> Result<Url, StorefrontError> {
        let mut url = self.base.join(SEARCH_PATH)?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(q) = query {
                pairs.append_pair("q", q);
            }
            pairs
                .append_pair("minRating", &min_rating.to_string())
                .append_pair("page", &page.to_string())
                .append_pair("limit", &limit.to_string());
        }
        Ok(url)
    }

    pub fn suggest_url(&self, query: &str) -> Result<Url, StorefrontError> {
        let mut url = self.base.join(SUGGEST_PATH)?;
        url.query_pairs_mut().append_pair("q", query);
        Ok(url)
    }

    async fn get_json(&self, url: Url) -> Result<Value, StorefrontError> {
        tracing::debug!("GET {}", url);
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorefrontError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Infallible product fetch: any failure is logged and yields no products.
    pub async fn fetch_products(
        &self,
        query: &str,
        min_rating: u32,
        page: u32,
        limit: u32,
    ) -> Vec<Product> {
        match self.fetch_page(query, min_rating, page, limit).await {
            Ok(page) => page.products,
            Err(e) => {
                tracing::warn!("Error fetching products: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn fetch_facets(&self) -> Result<FacetMetadata, StorefrontError> {
        let url = self.search_url(Some(""), FACET_MIN_RATING, 1, FACET_LIMIT)?;
        let body = self.get_json(url).await?;
        let facets = normalize::parse_facets(&body)?;
        tracing::info!(
            "Loaded facets: {} brands, {} attributes",
            facets.brands.len(),
            facets.attributes.len()
        );
        Ok(facets)
    }
}

#[async_trait]
impl SearchBackend for ApiClient {
    async fn fetch_page(
        &self,
        query: &str,
        min_rating: u32,
        page: u32,
        limit: u32,
    ) -> Result<SearchPage, StorefrontError> {
        let q = Some(query).filter(|q| !q.trim().is_empty());
        let url = self.search_url(q, min_rating, page, limit)?;
        let body = self.get_json(url).await?;
        let result = normalize::parse_search_page(&body, &self.media);
        tracing::info!("Fetched {} products (page {})", result.products.len(), page);
        Ok(result)
    }

    async fn fetch_suggestions(&self, query: &str) -> Vec<String> {
        if query.is_empty() {
            return Vec::new();
        }
        let url = match self.suggest_url(query) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Bad suggestion URL: {}", e);
                return Vec::new();
            }
        };
        match self.get_json(url).await {
            Ok(body) => normalize::parse_suggestions(&body, MAX_SUGGESTIONS),
            Err(e) => {
                tracing::debug!("Suggestion lookup failed: {}", e);
                Vec::new()
            }
        }
    }
}
