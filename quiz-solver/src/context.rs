//! Inputs shared by all extractors for one page

use url::Url;

use quiz_core::{PageContext, TableParser};
use quiz_net::Fetcher;

/// Page plus the collaborators an extractor may use
#[derive(Clone, Copy)]
pub struct SolveContext<'a> {
    pub page: &'a PageContext,
    /// Scheme and host of the quiz page
    pub base_url: &'a Url,
    pub caller_identity: &'a str,
    pub fetcher: &'a dyn Fetcher,
    pub tables: &'a dyn TableParser,
}
