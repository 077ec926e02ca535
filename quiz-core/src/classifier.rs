//! Page classifier
//!
//! Categories overlap lexically (a thresholded table task also says "sum"),
//! so classification is an ordered rule list evaluated top to bottom: the
//! first rule whose predicate holds decides the category.

use std::sync::LazyLock;
use url::Url;

use crate::heuristics::{
    find_cutoff, find_encoded_payload, mentions_count, mentions_secret, mentions_sum,
};
use crate::table::tabular_delimiter;
use crate::{PageContext, TaskCategory};

/// Predicate over a fetched page
pub type Predicate = fn(&PageContext) -> bool;

/// One entry of a classification policy
#[derive(Clone, Copy)]
pub struct Rule {
    /// Short name used in logs
    pub name: &'static str,
    pub predicate: Predicate,
    pub category: TaskCategory,
}

impl Rule {
    pub const fn new(name: &'static str, predicate: Predicate, category: TaskCategory) -> Self {
        Self {
            name,
            predicate,
            category,
        }
    }

    pub fn matches(&self, page: &PageContext) -> bool {
        (self.predicate)(page)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("category", &self.category)
            .finish()
    }
}

/// Default precedence, most specific signal first
pub const DEFAULT_RULES: &[Rule] = &[
    Rule::new("demo", is_demo_endpoint, TaskCategory::LiteralDefault),
    Rule::new("encoded-redirect", has_encoded_redirect, TaskCategory::EncodedRedirect),
    Rule::new("thresholded-table", has_threshold, TaskCategory::TabularAggregation),
    Rule::new("linked-table", links_tabular_file, TaskCategory::TabularAggregation),
    Rule::new("arithmetic", asks_arithmetic, TaskCategory::ArithmeticAggregation),
    Rule::new("counting", asks_counting, TaskCategory::Counting),
    Rule::new("secret", asks_secret, TaskCategory::SecretExtraction),
];

static DEFAULT_POLICY: LazyLock<ClassifierPolicy> = LazyLock::new(ClassifierPolicy::default);

/// Ordered rule list; pages no rule matches are `LiteralDefault`
#[derive(Debug, Clone)]
pub struct ClassifierPolicy {
    rules: Vec<Rule>,
}

impl Default for ClassifierPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RULES.to_vec())
    }
}

impl ClassifierPolicy {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Move a named rule to the front of the list
    pub fn prioritize(mut self, name: &str) -> Self {
        if let Some(idx) = self.rules.iter().position(|r| r.name == name) {
            let rule = self.rules.remove(idx);
            self.rules.insert(0, rule);
        }
        self
    }

    /// Drop a named rule
    pub fn without(mut self, name: &str) -> Self {
        self.rules.retain(|r| r.name != name);
        self
    }

    /// First matching rule, if any
    pub fn matching_rule(&self, page: &PageContext) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.matches(page))
    }

    pub fn classify(&self, page: &PageContext) -> TaskCategory {
        self.matching_rule(page)
            .map(|rule| rule.category)
            .unwrap_or(TaskCategory::LiteralDefault)
    }
}

/// Classify a page with the default policy
pub fn classify(page: &PageContext) -> TaskCategory {
    DEFAULT_POLICY.classify(page)
}

fn is_demo_endpoint(page: &PageContext) -> bool {
    Url::parse(&page.url)
        .map(|url| url.path() == "/demo" && url.query().is_none() && url.fragment().is_none())
        .unwrap_or(false)
}

fn has_encoded_redirect(page: &PageContext) -> bool {
    page.url_lower().contains("scrape")
        && page.scripts.iter().any(|s| find_encoded_payload(s).is_some())
}

fn has_threshold(page: &PageContext) -> bool {
    page.url_lower().contains("audio") || find_cutoff(&page.text).is_some()
}

fn links_tabular_file(page: &PageContext) -> bool {
    page.links.iter().any(|href| tabular_delimiter(href).is_some())
}

fn asks_arithmetic(page: &PageContext) -> bool {
    mentions_sum(&page.lower)
}

fn asks_counting(page: &PageContext) -> bool {
    mentions_count(&page.lower)
}

fn asks_secret(page: &PageContext) -> bool {
    mentions_secret(&page.lower)
}
