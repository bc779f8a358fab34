use std::collections::{HashMap, HashSet};

/// Render a lesson description (Markdown) to sanitized HTML.
#[must_use]
pub fn markdown_to_html(input: &str) -> String {
    let mut options = pulldown_cmark::Options::empty();
    options.insert(pulldown_cmark::Options::ENABLE_STRIKETHROUGH);
    options.insert(pulldown_cmark::Options::ENABLE_TABLES);

    let parser = pulldown_cmark::Parser::new_ext(input, options);
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, parser);
    sanitize_html(&html)
}

#[must_use]
pub fn sanitize_html(html: &str) -> String {
    let tags: HashSet<&str> = [
        "p", "br", "em", "strong", "del", "code", "pre", "blockquote", "ul", "ol", "li", "a",
        "table", "thead", "tbody", "tr", "th", "td", "h3", "h4",
    ]
    .into_iter()
    .collect();

    let mut attributes: HashMap<&str, HashSet<&str>> = HashMap::new();
    attributes.insert("a", ["href"].into_iter().collect());

    ammonia::Builder::new()
        .tags(tags)
        .tag_attributes(attributes)
        .clean(html)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::markdown_to_html;

    #[test]
    fn markdown_to_html_sanitizes_links() {
        let html = markdown_to_html("[Link](javascript:alert(1))");
        assert!(html.contains("Link"));
        assert!(!html.contains("javascript:"));
    }

    #[test]
    fn emphasis_and_lists_survive() {
        let html = markdown_to_html("A **ten minute** walk\n\n- one\n- two");
        assert!(html.contains("<strong>ten minute</strong>"));
        assert!(html.contains("<li>one</li>"));
    }

    #[test]
    fn raw_scripts_are_dropped() {
        let html = markdown_to_html("hi <script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("hi"));
    }
}
