//! View model for the filter sidebar: what options each facet section lists,
//! given the facet metadata and the panel's local search/expand toggles.
//!
//! Metadata is loaded once per run with a query-independent request, so the
//! options and counts describe the whole catalogue rather than the current
//! result set.

use crate::filter::engine::parse_float_prefix;
use crate::model::{AttributeValue, Brand, FacetMetadata};
use std::collections::{BTreeMap, BTreeSet};

/// Brand and attribute lists show this many entries until expanded.
pub const SHOW_MORE_CAP: usize = 10;
/// The flattened "search results" list is capped a little shorter.
pub const SEARCH_RESULTS_CAP: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingOption {
    pub rating: u32,
    /// Products rated at or above `rating`.
    pub cumulative_count: u64,
}

#[derive(Debug, Default)]
pub struct FacetPanel {
    meta: FacetMetadata,
    brand_search: String,
    show_all_brands: bool,
    attribute_search: BTreeMap<String, String>,
    show_all_attributes: BTreeSet<String>,
    show_all_search_results: bool,
}

impl FacetPanel {
    pub fn new(meta: FacetMetadata) -> Self {
        Self {
            meta,
            ..Default::default()
        }
    }

    pub fn metadata(&self) -> &FacetMetadata {
        &self.meta
    }

    pub fn set_brand_search(&mut self, query: impl Into<String>) {
        self.brand_search = query.into();
    }

    pub fn toggle_show_all_brands(&mut self) {
        self.show_all_brands = !self.show_all_brands;
    }

    fn matching_brands(&self) -> impl Iterator<Item = &Brand> {
        let needle = self.brand_search.to_lowercase();
        self.meta
            .brands
            .iter()
            .filter(move |b| b.name.to_lowercase().contains(&needle))
    }

    pub fn visible_brands(&self) -> Vec<&Brand> {
        let cap = if self.show_all_brands {
            usize::MAX
        } else {
            SHOW_MORE_CAP
        };
        self.matching_brands().take(cap).collect()
    }

    pub fn has_hidden_brands(&self) -> bool {
        !self.show_all_brands && self.matching_brands().count() > SHOW_MORE_CAP
    }

    pub fn set_attribute_search(&mut self, code: &str, query: impl Into<String>) {
        self.attribute_search.insert(code.to_string(), query.into());
    }

    pub fn toggle_show_all_attribute(&mut self, code: &str) {
        if !self.show_all_attributes.remove(code) {
            self.show_all_attributes.insert(code.to_string());
        }
    }

    fn matching_values<'a>(&'a self, code: &str) -> Vec<&'a AttributeValue> {
        let needle = self
            .attribute_search
            .get(code)
            .map(|s| s.to_lowercase())
            .unwrap_or_default();
        self.meta
            .attributes
            .iter()
            .filter(|a| a.code == code)
            .flat_map(|a| a.values.iter())
            .filter(|v| v.value.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn visible_attribute_values(&self, code: &str) -> Vec<&AttributeValue> {
        let mut values = self.matching_values(code);
        if !self.show_all_attributes.contains(code) {
            values.truncate(SHOW_MORE_CAP);
        }
        values
    }

    pub fn has_hidden_attribute_values(&self, code: &str) -> bool {
        !self.show_all_attributes.contains(code) && self.matching_values(code).len() > SHOW_MORE_CAP
    }

    /// Rating options, highest first.
    pub fn ratings(&self) -> Vec<RatingOption> {
        let mut ratings: Vec<u32> = self
            .meta
            .ratings_counts
            .keys()
            .filter_map(|k| rating_key(k))
            .collect();
        ratings.sort_unstable_by(|a, b| b.cmp(a));
        ratings.dedup();
        ratings
            .into_iter()
            .map(|rating| RatingOption {
                rating,
                cumulative_count: self.cumulative_count(rating),
            })
            .collect()
    }

    pub fn cumulative_count(&self, rating: u32) -> u64 {
        self.meta
            .ratings_counts
            .iter()
            .filter_map(|(k, count)| rating_key(k).map(|r| (r, *count)))
            .filter(|(r, _)| *r >= rating)
            .map(|(_, count)| count)
            .sum()
    }

    pub fn toggle_show_all_search_results(&mut self) {
        self.show_all_search_results = !self.show_all_search_results;
    }

    /// Every attribute value across all attributes, most common first.
    pub fn search_results(&self) -> Vec<&AttributeValue> {
        let mut values: Vec<&AttributeValue> = self
            .meta
            .attributes
            .iter()
            .flat_map(|a| a.values.iter())
            .collect();
        values.sort_by(|a, b| b.product_count.cmp(&a.product_count));
        if !self.show_all_search_results {
            values.truncate(SEARCH_RESULTS_CAP);
        }
        values
    }
}

/// Whole-star rating for a `ratingsCounts` key; fractional keys round down.
fn rating_key(key: &str) -> Option<u32> {
    parse_float_prefix(key)
        .filter(|r| r.is_finite() && *r >= 0.0)
        .map(|r| r.floor() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Attribute;

    fn brand(name: &str, count: u64) -> Brand {
        Brand {
            id: name.to_lowercase(),
            name: name.to_string(),
            product_count: count,
        }
    }

    fn value(v: &str, count: u64) -> AttributeValue {
        AttributeValue {
            value: v.to_string(),
            product_count: count,
        }
    }

    fn panel() -> FacetPanel {
        let mut brands: Vec<Brand> = (0..14).map(|i| brand(&format!("Brand {}", i), i)).collect();
        brands.push(brand("Lakme", 40));
        brands.push(brand("LAKME Absolute", 5));

        let mut ratings_counts = BTreeMap::new();
        ratings_counts.insert("5".to_string(), 3);
        ratings_counts.insert("4".to_string(), 10);
        ratings_counts.insert("2".to_string(), 1);

        FacetPanel::new(FacetMetadata {
            brands,
            attributes: vec![
                Attribute {
                    title: "Shade".into(),
                    code: "shade".into(),
                    values: (0..12).map(|i| value(&format!("Shade {}", i), i)).collect(),
                },
                Attribute {
                    title: "Finish".into(),
                    code: "finish".into(),
                    values: vec![value("Matte", 50), value("Glossy", 2)],
                },
            ],
            ratings_counts,
        })
    }

    #[test]
    fn brands_are_capped_until_expanded() {
        let mut panel = panel();
        assert_eq!(panel.visible_brands().len(), SHOW_MORE_CAP);
        assert!(panel.has_hidden_brands());
        panel.toggle_show_all_brands();
        assert_eq!(panel.visible_brands().len(), 16);
        assert!(!panel.has_hidden_brands());
    }

    #[test]
    fn brand_search_is_case_insensitive_substring() {
        let mut panel = panel();
        panel.set_brand_search("lak");
        let names: Vec<&str> = panel.visible_brands().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Lakme", "LAKME Absolute"]);
        assert!(!panel.has_hidden_brands());
    }

    #[test]
    fn attribute_values_cap_and_search() {
        let mut panel = panel();
        assert_eq!(panel.visible_attribute_values("shade").len(), SHOW_MORE_CAP);
        assert!(panel.has_hidden_attribute_values("shade"));
        panel.toggle_show_all_attribute("shade");
        assert_eq!(panel.visible_attribute_values("shade").len(), 12);
        panel.toggle_show_all_attribute("shade");
        assert_eq!(panel.visible_attribute_values("shade").len(), SHOW_MORE_CAP);

        panel.set_attribute_search("shade", "shade 1");
        let values: Vec<&str> = panel
            .visible_attribute_values("shade")
            .iter()
            .map(|v| v.value.as_str())
            .collect();
        assert_eq!(values, vec!["Shade 1", "Shade 10", "Shade 11"]);
        assert!(panel.visible_attribute_values("missing").is_empty());
    }

    #[test]
    fn ratings_are_descending_with_cumulative_counts() {
        let panel = panel();
        assert_eq!(
            panel.ratings(),
            vec![
                RatingOption { rating: 5, cumulative_count: 3 },
                RatingOption { rating: 4, cumulative_count: 13 },
                RatingOption { rating: 2, cumulative_count: 14 },
            ]
        );
        assert_eq!(panel.cumulative_count(3), 13);
    }

    #[test]
    fn fractional_rating_keys_round_down() {
        let mut ratings_counts = BTreeMap::new();
        ratings_counts.insert("4.5".to_string(), 2);
        ratings_counts.insert("4".to_string(), 3);
        ratings_counts.insert("3.9".to_string(), 1);
        ratings_counts.insert("n/a".to_string(), 7);
        let panel = FacetPanel::new(FacetMetadata {
            ratings_counts,
            ..Default::default()
        });

        assert_eq!(
            panel.ratings(),
            vec![
                RatingOption { rating: 4, cumulative_count: 5 },
                RatingOption { rating: 3, cumulative_count: 6 },
            ]
        );
    }

    #[test]
    fn search_results_flatten_and_sort_by_count() {
        let mut panel = panel();
        let top = panel.search_results();
        assert_eq!(top.len(), SEARCH_RESULTS_CAP);
        assert_eq!(top[0].value, "Matte");
        assert_eq!(top[1].value, "Shade 11");
        panel.toggle_show_all_search_results();
        assert_eq!(panel.search_results().len(), 14);
    }

    #[test]
    fn empty_metadata_lists_nothing() {
        let panel = FacetPanel::default();
        assert!(panel.visible_brands().is_empty());
        assert!(panel.ratings().is_empty());
        assert!(panel.search_results().is_empty());
    }
}
