//! Tabular aggregation extractor
//!
//! Downloads the first linked data file and aggregates it, either above a
//! cutoff stated in the page or by the vocabulary of the question.

use tracing::{debug, warn};

use quiz_core::{
    fallback_answer, find_cutoff, format_number, mentions_sum, resolve_link, tabular_delimiter,
    Table,
};

use crate::{ExtractError, SolveContext};

pub async fn tabular_aggregation(ctx: &SolveContext<'_>) -> String {
    let cutoff = find_cutoff(&ctx.page.text);

    let table = match load_linked_table(ctx).await {
        Ok(table) => Some(table),
        Err(e) => {
            warn!("Linked table unavailable for {}: {}", ctx.page.url, e);
            None
        }
    };

    match (cutoff, table) {
        (Some(cutoff), Some(table)) => {
            debug!("Summing first column at or above {}", cutoff);
            integer_answer(table.sum_first_column_at_least(cutoff))
        }
        (Some(cutoff), None) => format_number(cutoff),
        (None, Some(table)) => aggregate(&table, &ctx.page.lower),
        (None, None) => fallback_answer(&ctx.page.text),
    }
}

/// Download and parse the first tabular link on the page
pub async fn load_linked_table(ctx: &SolveContext<'_>) -> Result<Table, ExtractError> {
    let href = ctx
        .page
        .links
        .iter()
        .find(|href| tabular_delimiter(href).is_some())
        .ok_or(ExtractError::NoTabularLink)?;

    let url = resolve_link(ctx.base_url, href)
        .ok_or_else(|| ExtractError::UnresolvableLink(href.clone()))?;

    debug!("Downloading table {}", url);
    let response = ctx.fetcher.get(&url).await?;
    if !response.is_success() {
        return Err(ExtractError::Status {
            url,
            status: response.status,
        });
    }

    Ok(ctx.tables.parse(&response.body)?)
}

fn aggregate(table: &Table, lower: &str) -> String {
    if mentions_sum(lower) {
        match table.sum_first_numeric_column() {
            Ok(sum) => return integer_answer(sum),
            Err(e) => debug!("Cannot sum table ({}), counting rows instead", e),
        }
    }
    table.row_count().to_string()
}

fn integer_answer(value: f64) -> String {
    format!("{}", value.round() as i64)
}
