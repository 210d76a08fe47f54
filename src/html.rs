use scraper::{ElementRef, Html, Selector};

const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "footer", "h1", "h2",
    "h3", "h4", "h5", "h6", "header", "hr", "li", "ol", "p", "section", "table", "td", "th",
    "tr", "ul",
];

/// Collapse an HTML fragment to a single line of text.
pub fn to_plain_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    collapse_whitespace(&element_text(fragment.root_element()))
}

/// Text content of `el`. Inline markup is concatenated as-is; block elements
/// are separated by whitespace.
fn element_text(el: ElementRef) -> String {
    let mut out = String::new();
    push_text(el, &mut out);
    out
}

fn push_text(el: ElementRef, out: &mut String) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_el) = ElementRef::wrap(child) {
            let block = BLOCK_ELEMENTS.contains(&child_el.value().name());
            if block {
                out.push(' ');
            }
            push_text(child_el, out);
            if block {
                out.push(' ');
            }
        }
    }
}

/// Text under the `<h3>` whose text equals `heading` (case-insensitive), up to
/// the next `<h3>`. List items are joined with " ● ". Returns `None` when the
/// heading is absent or the section is empty.
pub fn section_text(html: &str, heading: &str) -> Option<String> {
    let fragment = Html::parse_fragment(html);
    let h3 = Selector::parse("h3").ok()?;
    let li = Selector::parse("li").ok()?;

    let title = fragment
        .select(&h3)
        .find(|el| collapse_whitespace(&element_text(*el)).eq_ignore_ascii_case(heading))?;

    let mut items = Vec::new();
    let mut text = String::new();
    for node in title.next_siblings() {
        if let Some(el) = ElementRef::wrap(node) {
            if el.value().name() == "h3" {
                break;
            }
            if el.value().name() == "li" {
                items.push(collapse_whitespace(&element_text(el)));
            }
            items.extend(
                el.select(&li)
                    .map(|item| collapse_whitespace(&element_text(item))),
            );
            text.push(' ');
            text.push_str(&element_text(el));
        } else if let Some(t) = node.value().as_text() {
            text.push(' ');
            text.push_str(t);
        }
    }

    items.retain(|s| !s.is_empty());
    let content = if items.is_empty() {
        collapse_whitespace(&text).replace('•', "●")
    } else {
        items.join(" ● ")
    };

    Some(content).filter(|s| !s.is_empty())
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
