use crate::cli::Section;
use crate::facets::FacetPanel;
use crate::filter::{FilterState, SectionKey};
use crate::html;
use crate::model::Product;
use crate::session::ResultCounts;

pub fn format_search_results(
    keyword: &str,
    products: &[&Product],
    counts: ResultCounts,
    currency: &str,
) -> String {
    let mut out = String::new();

    out.push_str(&format!("## {}", format_headline(counts)));
    if !keyword.trim().is_empty() {
        out.push_str(&format!(" for \"{}\"", keyword));
    }
    out.push_str("\n\n");

    for (i, product) in products.iter().enumerate() {
        out.push_str(&format!("### {}. {}\n", i + 1, product.title));
        if !product.brand.is_empty() {
            out.push_str(&format!("- **Brand:** {}\n", product.brand));
        }
        out.push_str(&format!(
            "- **Price:** {}\n",
            format_price(product.price_start, product.list_price, currency)
        ));
        if product.average_rating > 0.0 {
            out.push_str(&format!(
                "- **Rating:** {:.1}/5 ({} reviews)\n",
                product.average_rating,
                format_number(product.reviews_count as u64)
            ));
        }
        if let Some(delivery) = format_delivery(product) {
            out.push_str(&format!("- **Delivery:** {}\n", delivery));
        }
        out.push_str(&format!("- **ID:** {}\n", product.id));

        if i < products.len() - 1 {
            out.push_str("\n---\n\n");
        }
    }

    out.push_str(&format!(
        "\n_1–{} of {} Results_\n",
        counts.accumulated,
        format_number(counts.total)
    ));
    out
}

/// The server-side total is only quoted when nothing is filtered client-side.
pub fn format_headline(counts: ResultCounts) -> String {
    if counts.shown > 0 || counts.is_narrowed() {
        format!("{} Results", format_number(counts.shown as u64))
    } else {
        format!("{} Total Results", format_number(counts.total))
    }
}

pub fn format_product_detail(product: &Product, section: Option<Section>, currency: &str) -> String {
    let mut out = String::new();

    let sections: &[Section] = match section {
        Some(ref s) => std::slice::from_ref(s),
        None => Section::ALL,
    };

    if section.is_none() {
        out.push_str(&format!("# {}\n\n", product.title));
    }

    for sec in sections {
        match sec {
            Section::Overview => format_overview(product, currency, &mut out),
            Section::Description => format_description(product, &mut out),
            Section::Ingredients => format_description_section(
                product,
                "KEY INGREDIENTS",
                "Ingredients",
                &mut out,
            ),
            Section::Usage => {
                format_description_section(product, "HOW TO USE", "How to Use", &mut out)
            }
            Section::Attributes => format_list("Attributes", &product.attributes, &mut out),
            Section::Tags => format_list("Tags", &product.tags, &mut out),
        }
    }

    out
}

fn format_overview(product: &Product, currency: &str, out: &mut String) {
    out.push_str("## Overview\n");
    if !product.brand.is_empty() {
        out.push_str(&format!("- **Brand:** {}\n", product.brand));
    }
    out.push_str(&format!(
        "- **Price:** {}\n",
        format_price(product.price_start, product.list_price, currency)
    ));
    if product.average_rating > 0.0 {
        out.push_str(&format!(
            "- **Rating:** {:.1}/5 ({} reviews)\n",
            product.average_rating,
            format_number(product.reviews_count as u64)
        ));
    }
    if let Some(delivery) = format_delivery(product) {
        out.push_str(&format!("- **Availability:** {}\n", delivery));
    }
    if !product.categories.is_empty() {
        out.push_str(&format!(
            "- **Categories:** {}\n",
            product.categories.join(", ")
        ));
    }
    out.push_str(&format!("- **Image:** {}\n", product.thumbnail));
    out.push('\n');
}

fn format_description(product: &Product, out: &mut String) {
    let text = html::to_plain_text(&product.description);
    if !text.is_empty() {
        out.push_str("## Description\n");
        out.push_str(&text);
        out.push_str("\n\n");
    }
}

fn format_description_section(product: &Product, heading: &str, title: &str, out: &mut String) {
    out.push_str(&format!("## {}\n", title));
    match html::section_text(&product.description, heading) {
        Some(text) => out.push_str(&text),
        None => out.push_str("No data available for this product."),
    }
    out.push_str("\n\n");
}

fn format_list(title: &str, items: &[String], out: &mut String) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("## {}\n", title));
    for item in items {
        out.push_str(&format!("- {}\n", item));
    }
    out.push('\n');
}

fn format_delivery(product: &Product) -> Option<String> {
    let mut modes = Vec::new();
    if product.in_store {
        modes.push("In Store");
    }
    if product.same_day {
        modes.push("Same-Day Delivery");
    }
    if modes.is_empty() {
        None
    } else {
        Some(modes.join(", "))
    }
}

/// The sidebar as Markdown checklists; `selection` decides which boxes are ticked.
pub fn format_facets(panel: &FacetPanel, selection: &FilterState) -> String {
    let mut out = String::new();

    if !selection.has_active_selection() {
        out.push_str("_No filters selected_\n\n");
    }

    let results = panel.search_results();
    if !results.is_empty() {
        out.push_str("## Search Results\n");
        for value in results {
            out.push_str(&format!("- {} ({})\n", value.value, format_number(value.product_count)));
        }
        out.push('\n');
    }

    out.push_str("## Delivery\n");
    for (key, label) in [("inStore", "In Store"), ("sameDay", "Same-Day Delivery")] {
        let checked = selection.is_selected(&SectionKey::Delivery, key);
        out.push_str(&format!("- {} {}: {}\n", checkbox(checked), key, label));
    }
    out.push('\n');

    let ratings = panel.ratings();
    if !ratings.is_empty() {
        out.push_str("## Rating\n");
        for option in ratings {
            let checked = selection.is_selected(&SectionKey::Rating, &option.rating.to_string());
            out.push_str(&format!(
                "- {} {} & up ({})\n",
                checkbox(checked),
                "★".repeat(option.rating as usize),
                format_number(option.cumulative_count)
            ));
        }
        out.push('\n');
    }

    let price = selection.price().cloned().unwrap_or_default();
    out.push_str("## Price\n");
    for (checked, key, label) in [
        (price.under25, "under25", "Under 2,000"),
        (price.from25to50, "from25to50", "2,000 to 4,000"),
        (price.from50to100, "from50to100", "4,000 to 8,000"),
        (price.above100, "above100", "8,000 & Above"),
    ] {
        out.push_str(&format!("- {} {}: {}\n", checkbox(checked), key, label));
    }
    if price.custom {
        let min = if price.min.is_empty() { "0" } else { price.min.as_str() };
        let max = if price.max.is_empty() { "∞" } else { price.max.as_str() };
        out.push_str(&format!("- [x] custom: {} to {}\n", min, max));
    }
    out.push('\n');

    let brands = panel.visible_brands();
    if !brands.is_empty() {
        out.push_str("## Brand\n");
        for brand in brands {
            let checked = selection.is_selected(&SectionKey::Brand, &brand.name);
            out.push_str(&format!(
                "- {} {} ({})\n",
                checkbox(checked),
                brand.name,
                format_number(brand.product_count)
            ));
        }
        if panel.has_hidden_brands() {
            out.push_str("- _…use --all to show more_\n");
        }
        out.push('\n');
    }

    for attribute in &panel.metadata().attributes {
        let values = panel.visible_attribute_values(&attribute.code);
        if values.is_empty() {
            continue;
        }
        let title = if attribute.title.is_empty() {
            &attribute.code
        } else {
            &attribute.title
        };
        let section = SectionKey::Attribute(attribute.code.clone());
        out.push_str(&format!("## {} (`{}`)\n", title, attribute.code));
        for value in values {
            out.push_str(&format!(
                "- {} {} ({})\n",
                checkbox(selection.is_selected(&section, &value.value)),
                value.value,
                format_number(value.product_count)
            ));
        }
        if panel.has_hidden_attribute_values(&attribute.code) {
            out.push_str("- _…use --all to show more_\n");
        }
        out.push('\n');
    }

    out
}

fn checkbox(checked: bool) -> &'static str {
    if checked {
        "[x]"
    } else {
        "[ ]"
    }
}

pub fn format_suggestions(query: &str, suggestions: &[String]) -> String {
    let mut out = format!("## Suggestions for \"{}\"\n", query);
    if suggestions.is_empty() {
        out.push_str("_No suggestions_\n");
    }
    for s in suggestions {
        out.push_str(&format!("- {}\n", s));
    }
    out
}

fn format_price(price: i64, list_price: Option<i64>, symbol: &str) -> String {
    let current = format!("{}{}", symbol, format_signed(price));
    match list_price {
        Some(orig) if orig > price && orig > 0 => {
            let discount = ((orig - price) as f64 / orig as f64 * 100.0).round() as u32;
            format!(
                "{} ~~{}{}~~ ({}% off)",
                current,
                symbol,
                format_signed(orig),
                discount
            )
        }
        _ => current,
    }
}

fn format_signed(n: i64) -> String {
    if n < 0 {
        format!("-{}", format_number(n.unsigned_abs()))
    } else {
        format_number(n as u64)
    }
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}
