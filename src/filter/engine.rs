//! Client-side faceted filtering over the accumulated product list.
//!
//! Sections combine with AND; the selected options inside one section
//! combine with OR. A section with nothing selected never excludes anything.

use super::state::{FilterState, PriceFilter, SectionKey};
use crate::model::Product;

const BUCKET_LOW: f64 = 2000.0;
const BUCKET_MID: f64 = 4000.0;
const BUCKET_HIGH: f64 = 8000.0;

pub fn apply_filters<'a>(
    products: &'a [Product],
    keyword: &str,
    state: &FilterState,
) -> Vec<&'a Product> {
    let mut result: Vec<&Product> = products.iter().collect();

    if !keyword.trim().is_empty() {
        let needle = keyword.to_lowercase();
        result.retain(|p| p.title.to_lowercase().contains(&needle));
    }

    for (section, selected) in state.option_sections() {
        if selected.is_empty() {
            continue;
        }
        match section {
            SectionKey::Brand => result.retain(|p| selected.contains(&p.brand.as_str())),
            SectionKey::Rating => {
                let thresholds: Vec<f64> =
                    selected.iter().filter_map(|k| parse_rating(k)).collect();
                result.retain(|p| {
                    let rating = p.average_rating.floor();
                    thresholds.iter().any(|r| rating >= *r)
                });
            }
            SectionKey::Delivery => result.retain(|p| {
                selected
                    .iter()
                    .any(|opt| if *opt == "inStore" { p.in_store } else { p.same_day })
            }),
            // Price never lives in the option map.
            SectionKey::Price => {}
            SectionKey::Attribute(_) => result.retain(|p| {
                p.attributes
                    .iter()
                    .any(|attr| selected.contains(&attr.as_str()))
            }),
        }
    }

    if let Some(price) = state.price().filter(|p| p.is_active()) {
        result.retain(|p| price_matches(price, p.price_start));
    }

    result
}

/// Option keys are numeric strings; a blank key counts as 0.
fn parse_rating(key: &str) -> Option<f64> {
    let key = key.trim();
    if key.is_empty() {
        return Some(0.0);
    }
    key.parse::<f64>().ok().filter(|r| !r.is_nan())
}

pub fn price_matches(filter: &PriceFilter, price_start: i64) -> bool {
    let price = price_start as f64;

    (filter.under25 && price < BUCKET_LOW)
        || (filter.from25to50 && (BUCKET_LOW..=BUCKET_MID).contains(&price))
        || (filter.from50to100 && price > BUCKET_MID && price <= BUCKET_HIGH)
        || (filter.above100 && price > BUCKET_HIGH)
        || (filter.custom && {
            let (min, max) = custom_bounds(filter);
            price >= min && price <= max
        })
}

/// Blank, unparseable or zero bounds mean "open" on that side.
pub fn custom_bounds(filter: &PriceFilter) -> (f64, f64) {
    let min = parse_float_prefix(&filter.min)
        .filter(|v| *v != 0.0)
        .unwrap_or(0.0);
    let max = parse_float_prefix(&filter.max)
        .filter(|v| *v != 0.0)
        .unwrap_or(f64::INFINITY);
    (min, max)
}

/// Parse the longest leading decimal number in `s`, ignoring whatever
/// follows it ("12.5kg" → 12.5). Returns `None` when no digits lead.
pub fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(title: &str) -> Product {
        Product {
            id: title.to_lowercase().replace(' ', "-"),
            title: title.to_string(),
            ..Default::default()
        }
    }

    fn priced(price: i64) -> Product {
        Product {
            id: price.to_string(),
            title: format!("Item {}", price),
            price_start: price,
            ..Default::default()
        }
    }

    fn titles(result: &[&Product]) -> Vec<String> {
        result.iter().map(|p| p.title.clone()).collect()
    }

    fn ids(result: &[&Product]) -> Vec<String> {
        result.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        let products = vec![product("Matte Stick"), product("Glossy Balm")];
        let state = FilterState::new();
        assert_eq!(
            titles(&apply_filters(&products, "matte", &state)),
            vec!["Matte Stick"]
        );
        assert_eq!(
            titles(&apply_filters(&products, "MATTE", &state)),
            vec!["Matte Stick"]
        );
    }

    #[test]
    fn blank_keyword_keeps_everything() {
        let products = vec![product("Matte Stick"), product("Glossy Balm")];
        assert_eq!(apply_filters(&products, "   ", &FilterState::new()).len(), 2);
    }

    #[test]
    fn deselected_sections_are_identity() {
        let products = vec![
            Product { brand: "A".into(), average_rating: 2.0, ..product("Matte One") },
            Product { brand: "B".into(), in_store: true, ..product("Matte Two") },
            product("Glossy"),
        ];
        let mut state = FilterState::new();
        for (section, option) in [
            (SectionKey::Brand, "A"),
            (SectionKey::Rating, "4"),
            (SectionKey::Delivery, "sameDay"),
            (SectionKey::Attribute("shade".into()), "Red"),
        ] {
            state.toggle(&section, option);
            state.toggle(&section, option);
        }
        state.set_price(PriceFilter { min: "10".into(), ..Default::default() });

        let keyword_only = apply_filters(&products, "matte", &FilterState::new());
        let with_state = apply_filters(&products, "matte", &state);
        assert_eq!(ids(&keyword_only), ids(&with_state));
    }

    #[test]
    fn brand_is_or_within_section() {
        let products = vec![
            Product { brand: "Lakme".into(), ..product("a") },
            Product { brand: "Nykaa".into(), ..product("b") },
            Product { brand: "Maybelline".into(), ..product("c") },
            product("no brand"),
        ];
        let mut state = FilterState::new();
        state.toggle(&SectionKey::Brand, "Lakme");
        state.toggle(&SectionKey::Brand, "Nykaa");
        assert_eq!(titles(&apply_filters(&products, "", &state)), vec!["a", "b"]);
    }

    #[test]
    fn rating_uses_floor_against_any_threshold() {
        let products: Vec<Product> = [4.9, 4.0, 3.99, 2.5, 0.0]
            .iter()
            .map(|r| Product {
                average_rating: *r,
                ..product(&r.to_string())
            })
            .collect();

        let mut state = FilterState::new();
        state.toggle(&SectionKey::Rating, "4");
        assert_eq!(titles(&apply_filters(&products, "", &state)), vec!["4.9", "4"]);

        // With thresholds 4 and 3 a product passes when floor(rating) >= 3.
        state.toggle(&SectionKey::Rating, "3");
        assert_eq!(
            titles(&apply_filters(&products, "", &state)),
            vec!["4.9", "4", "3.99"]
        );
    }

    #[test]
    fn delivery_checks_matching_flag() {
        let products = vec![
            Product { in_store: true, ..product("store") },
            Product { same_day: true, ..product("fast") },
            product("neither"),
        ];
        let mut state = FilterState::new();
        state.toggle(&SectionKey::Delivery, "inStore");
        assert_eq!(titles(&apply_filters(&products, "", &state)), vec!["store"]);
        state.toggle(&SectionKey::Delivery, "sameDay");
        assert_eq!(
            titles(&apply_filters(&products, "", &state)),
            vec!["store", "fast"]
        );
    }

    #[test]
    fn sections_combine_with_and() {
        let products = vec![
            Product { brand: "Lakme".into(), average_rating: 4.5, ..product("good lakme") },
            Product { brand: "Lakme".into(), average_rating: 2.0, ..product("poor lakme") },
            Product { brand: "Nykaa".into(), average_rating: 4.8, ..product("good nykaa") },
        ];
        let mut state = FilterState::new();
        state.toggle(&SectionKey::Brand, "Lakme");
        state.toggle(&SectionKey::Rating, "4");
        assert_eq!(
            titles(&apply_filters(&products, "", &state)),
            vec!["good lakme"]
        );
    }

    #[test]
    fn attribute_sections_match_any_value() {
        let products = vec![
            Product { attributes: vec!["Red".into(), "Matte".into()], ..product("red") },
            Product { attributes: vec!["Nude".into()], ..product("nude") },
            product("plain"),
        ];
        let mut state = FilterState::new();
        state.toggle(&SectionKey::Attribute("shade".into()), "Red");
        assert_eq!(titles(&apply_filters(&products, "", &state)), vec!["red"]);
    }

    #[test]
    fn price_bucket_boundaries() {
        let products: Vec<Product> = [1999, 2000, 4000, 4001, 8000, 8001]
            .iter()
            .map(|p| priced(*p))
            .collect();

        let run = |filter: PriceFilter| {
            let mut state = FilterState::new();
            state.set_price(filter);
            ids(&apply_filters(&products, "", &state))
        };

        assert_eq!(run(PriceFilter { under25: true, ..Default::default() }), vec!["1999"]);
        assert_eq!(
            run(PriceFilter { from25to50: true, ..Default::default() }),
            vec!["2000", "4000"]
        );
        assert_eq!(
            run(PriceFilter { from50to100: true, ..Default::default() }),
            vec!["4001", "8000"]
        );
        assert_eq!(run(PriceFilter { above100: true, ..Default::default() }), vec!["8001"]);
        assert_eq!(
            run(PriceFilter { under25: true, above100: true, ..Default::default() }),
            vec!["1999", "8001"]
        );
    }

    #[test]
    fn empty_custom_range_is_unbounded() {
        let products: Vec<Product> = [0, 1999, 8001, 1_000_000].iter().map(|p| priced(*p)).collect();
        let mut state = FilterState::new();
        state.set_price(PriceFilter { custom: true, ..Default::default() });
        assert_eq!(apply_filters(&products, "", &state).len(), 4);
    }

    #[test]
    fn custom_range_is_inclusive() {
        let products: Vec<Product> = [999, 1000, 3000, 3001].iter().map(|p| priced(*p)).collect();
        let mut state = FilterState::new();
        state.set_price(PriceFilter {
            custom: true,
            min: "1000".into(),
            max: "3000abc".into(),
            ..Default::default()
        });
        assert_eq!(ids(&apply_filters(&products, "", &state)), vec!["1000", "3000"]);
    }

    #[test]
    fn zero_max_means_unbounded() {
        let filter = PriceFilter { custom: true, max: "0".into(), ..Default::default() };
        assert_eq!(custom_bounds(&filter), (0.0, f64::INFINITY));
    }

    #[test]
    fn float_prefix_parsing() {
        assert_eq!(parse_float_prefix("42"), Some(42.0));
        assert_eq!(parse_float_prefix("  12.5kg"), Some(12.5));
        assert_eq!(parse_float_prefix("-3"), Some(-3.0));
        assert_eq!(parse_float_prefix(".5"), Some(0.5));
        assert_eq!(parse_float_prefix("7."), Some(7.0));
        assert_eq!(parse_float_prefix("1e3x"), Some(1000.0));
        assert_eq!(parse_float_prefix("2e"), Some(2.0));
        assert_eq!(parse_float_prefix(""), None);
        assert_eq!(parse_float_prefix("abc"), None);
        assert_eq!(parse_float_prefix("."), None);
    }
}
