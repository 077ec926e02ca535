//! Page context shared by the classifier and the answer extractors

use url::Url;

use crate::SUBMIT_PATH;

/// Everything known about a fetched quiz page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContext {
    /// URL the page was fetched from
    pub url: String,
    /// Visible text with markup stripped
    pub text: String,
    /// Lowercased copy of `text`
    pub lower: String,
    /// `href` targets in document order
    pub links: Vec<String>,
    /// Inline script bodies in document order
    pub scripts: Vec<String>,
}

impl PageContext {
    pub fn new(url: &str, text: &str) -> Self {
        Self {
            url: url.to_string(),
            text: text.to_string(),
            lower: text.to_lowercase(),
            links: Vec::new(),
            scripts: Vec::new(),
        }
    }

    pub fn with_links(mut self, links: Vec<String>) -> Self {
        self.links = links;
        self
    }

    pub fn with_scripts(mut self, scripts: Vec<String>) -> Self {
        self.scripts = scripts;
        self
    }

    /// Lowercased page URL
    pub fn url_lower(&self) -> String {
        self.url.to_lowercase()
    }
}

/// Scheme and authority of a URL, with an empty path
pub fn base_url(url: &str) -> Result<Url, url::ParseError> {
    let mut base = Url::parse(url)?;
    if base.cannot_be_a_base() {
        return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase);
    }
    base.set_path("/");
    base.set_query(None);
    base.set_fragment(None);
    Ok(base)
}

/// Submission endpoint for a base URL
pub fn submit_url(base: &Url) -> String {
    format!("{}{}", base.as_str().trim_end_matches('/'), SUBMIT_PATH)
}

/// Resolve a link reference (absolute or relative) against a base URL
pub fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    base.join(href).ok().map(String::from)
}
