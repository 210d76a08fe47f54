use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub title: String,
    /// Raw HTML as delivered by the API.
    pub description: String,
    pub thumbnail: String,
    pub average_rating: f64,
    pub reviews_count: u32,
    pub brand: String,
    /// Smallest currency unit.
    pub price_start: i64,
    pub list_price: Option<i64>,
    pub categories: Vec<String>,
    pub in_store: bool,
    pub same_day: bool,
    pub attributes: Vec<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchMeta {
    pub total: Option<u64>,
    pub items: Option<u64>,
    pub last_page: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub products: Vec<Product>,
    pub meta: SearchMeta,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub product_count: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeValue {
    pub value: String,
    #[serde(default)]
    pub product_count: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Attribute {
    #[serde(default)]
    pub title: String,
    pub code: String,
    #[serde(default)]
    pub values: Vec<AttributeValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetMetadata {
    #[serde(default)]
    pub brands: Vec<Brand>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// Keyed by the rating as the API spells it ("1".."5").
    #[serde(default)]
    pub ratings_counts: BTreeMap<String, u64>,
}
