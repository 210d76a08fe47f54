//! Turns the loosely shaped JSON returned by the search API into `Product`
//! records. Every field has a neutral default so a partially filled record
//! never fails the whole page.

use crate::model::{FacetMetadata, Product, SearchMeta, SearchPage};
use serde_json::Value;

/// Where relative media paths live and what to show when a product has no image.
#[derive(Debug, Clone)]
pub struct MediaUrls {
    pub base: String,
    pub fallback_image: String,
}

impl MediaUrls {
    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") || path.starts_with("//") {
            path.to_string()
        } else {
            format!("{}/{}", self.base, path.trim_start_matches('/'))
        }
    }
}

/// Parse `{ data: { products, meta } }`. Anything missing yields an empty page.
pub fn parse_search_page(body: &Value, media: &MediaUrls) -> SearchPage {
    let data = body.get("data");

    let products = data
        .and_then(|d| d.get("products"))
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| parse_product(item, media))
                .collect()
        })
        .unwrap_or_default();

    let meta = data
        .and_then(|d| d.get("meta"))
        .map(parse_meta)
        .unwrap_or_default();

    SearchPage { products, meta }
}

fn parse_meta(meta: &Value) -> SearchMeta {
    SearchMeta {
        total: meta.get("total").and_then(as_count),
        items: meta.get("items").and_then(as_count),
        last_page: meta.get("lastPage").and_then(as_count),
    }
}

/// Parse `{ data: { suggestions: [...] } }`, keeping at most `limit` strings.
pub fn parse_suggestions(body: &Value, limit: usize) -> Vec<String> {
    body.get("data")
        .and_then(|d| d.get("suggestions"))
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|s| s.as_str())
                .take(limit)
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default()
}

pub fn parse_facets(body: &Value) -> Result<FacetMetadata, serde_json::Error> {
    match body.get("data") {
        Some(data) => serde_json::from_value(data.clone()),
        None => Ok(FacetMetadata::default()),
    }
}

pub fn parse_product(item: &Value, media: &MediaUrls) -> Option<Product> {
    if !item.is_object() {
        return None;
    }

    let id = item
        .get("id")
        .or_else(|| item.get("_id"))
        .and_then(|v| {
            v.as_str()
                .map(|s| s.to_string())
                .or_else(|| v.as_u64().map(|n| n.to_string()))
        })
        .unwrap_or_default();

    let title = str_field(item, "title");
    let description = str_field(item, "description");

    let first_variant = item
        .get("variants")
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first());

    let price_start = item
        .get("priceStart")
        .and_then(as_price)
        .filter(|&p| p != 0)
        .or_else(|| first_variant.and_then(|v| v.get("currentPrice")).and_then(as_price))
        .unwrap_or(0);

    let list_price = first_variant
        .and_then(|v| v.get("price"))
        .and_then(as_price)
        .filter(|&p| p > price_start);

    let thumbnail = item
        .get("thumbnail")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            item.get("productImages")
                .and_then(|v| v.as_array())
                .and_then(|arr| arr.first())
                .and_then(|img| img.get("image"))
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
        })
        .map(|path| media.resolve(path))
        .unwrap_or_else(|| media.fallback_image.clone());

    let brand = item
        .get("brand")
        .and_then(|b| {
            b.as_str()
                .or_else(|| b.get("title").and_then(|v| v.as_str()))
                .or_else(|| b.get("name").and_then(|v| v.as_str()))
        })
        .unwrap_or("")
        .to_string();

    let mut categories: Vec<String> = item
        .get("categories")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(titled_str).collect())
        .unwrap_or_default();
    if categories.is_empty() {
        if let Some(title) = item.get("category").and_then(titled_str) {
            categories.push(title);
        }
    }

    let tags = item
        .get("tags")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|t| titled_str(t).or_else(|| t.get("tag").and_then(titled_str)))
                .collect()
        })
        .unwrap_or_default();

    let attributes = item
        .get("productValuesForAttribute")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|a| {
                    a.get("productAttributeValue")
                        .and_then(|pav| pav.get("value"))
                        .and_then(|v| v.as_str())
                        .map(|s| s.to_string())
                })
                .collect()
        })
        .unwrap_or_default();

    Some(Product {
        id,
        title,
        description,
        thumbnail,
        average_rating: item
            .get("averageRating")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0),
        reviews_count: item
            .get("reviewsCount")
            .or_else(|| item.get("reviewCount"))
            .and_then(as_count)
            .map(|n| n.min(u32::MAX as u64) as u32)
            .unwrap_or(0),
        brand,
        price_start,
        list_price,
        categories,
        in_store: item.get("inStore").and_then(|v| v.as_bool()).unwrap_or(false),
        same_day: item.get("sameDay").and_then(|v| v.as_bool()).unwrap_or(false),
        attributes,
        tags,
    })
}

fn str_field(item: &Value, key: &str) -> String {
    item.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

/// A plain string, or an object carrying a `title`.
fn titled_str(v: &Value) -> Option<String> {
    v.as_str()
        .or_else(|| v.get("title").and_then(|t| t.as_str()))
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

fn as_price(v: &Value) -> Option<i64> {
    v.as_i64()
        .or_else(|| v.as_f64().map(|f| f.round() as i64))
        .or_else(|| v.as_str().and_then(|s| s.trim().parse::<f64>().ok()).map(|f| f.round() as i64))
}

fn as_count(v: &Value) -> Option<u64> {
    v.as_u64()
        .or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
}
