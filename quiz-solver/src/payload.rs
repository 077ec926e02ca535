//! Base64 payloads embedded in quiz page scripts
//!
//! Quiz pages often inject their question with `innerHTML = atob("...")`,
//! so the text a browser would show lives only in the payload.

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use tracing::debug;

use quiz_core::{find_encoded_payload, PageContext};
use quiz_net::PageDocument;

use crate::ExtractError;

/// Decode a base64 payload, tolerating whitespace, missing padding and
/// the URL-safe alphabet
pub fn decode_payload(payload: &str) -> Result<String, ExtractError> {
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let unpadded = compact.trim_end_matches('=');

    let bytes = STANDARD
        .decode(&compact)
        .or_else(|_| STANDARD_NO_PAD.decode(unpadded))
        .or_else(|_| URL_SAFE.decode(&compact))
        .or_else(|_| URL_SAFE_NO_PAD.decode(unpadded))?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Decoded payloads of all scripts that carry one
pub fn decoded_payloads(scripts: &[String]) -> Vec<String> {
    scripts
        .iter()
        .filter_map(|script| find_encoded_payload(script))
        .filter_map(|payload| match decode_payload(payload) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                debug!("Skipping undecodable script payload: {}", e);
                None
            }
        })
        .collect()
}

/// Build the page context, appending the visible text of decoded
/// script payloads to the page text
pub fn rendered_context(document: PageDocument, url: &str) -> PageContext {
    let mut text = document.text.clone();
    for decoded in decoded_payloads(&document.scripts) {
        let rendered = PageDocument::parse(&decoded).text;
        if !rendered.is_empty() && !text.contains(&rendered) {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(&rendered);
        }
    }

    PageDocument { text, ..document }.into_context(url)
}
