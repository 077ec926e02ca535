//! Page document extraction
//!
//! Pulls visible text, link targets and inline scripts out of quiz HTML.
//! Text is read the way a browser lays it out: inline markup joins its
//! neighbours directly, block elements start on a new word.

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

use quiz_core::PageContext;

/// Subtrees that never render as text
const HIDDEN: &[&str] = &["head", "script", "style", "noscript", "template"];

/// Elements that break the text flow
const BLOCKS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "li", "main", "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Extracted content of one page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageDocument {
    /// Visible text, whitespace-normalized
    pub text: String,
    /// `href` targets in document order
    pub links: Vec<String>,
    /// Inline script bodies in document order
    pub scripts: Vec<String>,
}

impl PageDocument {
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);

        let mut text = String::new();
        push_visible_text(document.root_element(), &mut text);

        Self {
            text: normalize_whitespace(&text),
            links: find_links(&document),
            scripts: find_scripts(&document),
        }
    }

    /// Context handed to the classifier and extractors
    pub fn into_context(self, url: &str) -> PageContext {
        PageContext::new(url, &self.text)
            .with_links(self.links)
            .with_scripts(self.scripts)
    }
}

fn push_visible_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if HIDDEN.contains(&el.name()) => {}
            Node::Element(el) => {
                let block = BLOCKS.contains(&el.name());
                if block {
                    out.push(' ');
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    push_visible_text(child_el, out);
                }
                if block {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

fn find_links(document: &Html) -> Vec<String> {
    let link_selector = Selector::parse("a[href]").unwrap();
    document
        .select(&link_selector)
        .filter_map(|el| el.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
        .collect()
}

fn find_scripts(document: &Html) -> Vec<String> {
    let script_selector = Selector::parse("script").unwrap();
    document
        .select(&script_selector)
        .map(|el| el.text().collect::<String>())
        .filter(|body| !body.trim().is_empty())
        .collect()
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
