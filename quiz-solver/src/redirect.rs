//! Encoded redirect extractor
//!
//! - Decodes the base64 payload of an inline script
//! - Finds the link reference in the decoded text
//! - Fetches that page (with the caller identity filled in)
//! - Reads the secret code from it

use tracing::{debug, warn};

use quiz_core::{
    find_encoded_payload, find_link_reference, find_secret_code, literal_default, resolve_link,
    substitute_identity,
};
use quiz_net::PageDocument;

use crate::{decode_payload, ExtractError, SolveContext};

pub async fn encoded_redirect(ctx: &SolveContext<'_>) -> String {
    match follow_encoded_redirect(ctx).await {
        Ok(code) => code,
        Err(e) => {
            warn!("Encoded redirect on {} failed: {}", ctx.page.url, e);
            literal_default()
        }
    }
}

pub async fn follow_encoded_redirect(ctx: &SolveContext<'_>) -> Result<String, ExtractError> {
    let payload = ctx
        .page
        .scripts
        .iter()
        .find_map(|script| find_encoded_payload(script))
        .ok_or(ExtractError::NoPayload)?;

    let decoded = decode_payload(payload)?;
    let reference = find_link_reference(&decoded).ok_or(ExtractError::NoLinkReference)?;
    let reference = substitute_identity(&reference, ctx.caller_identity);
    let target = resolve_link(ctx.base_url, &reference)
        .ok_or_else(|| ExtractError::UnresolvableLink(reference.clone()))?;

    debug!("Following encoded redirect to {}", target);
    let response = ctx.fetcher.get(&target).await?;
    let text = PageDocument::parse(&response.body).text;

    find_secret_code(&text)
        .or_else(|| find_secret_code(&response.body))
        .ok_or(ExtractError::NoSecretCode(target))
}
