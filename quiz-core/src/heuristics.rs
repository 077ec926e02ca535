//! Text heuristics used by the classifier and the answer extractors
//!
//! All functions here are pure: same text in, same answer out.

use regex::Regex;
use std::sync::LazyLock;

// Number literals, in document order
static NUMBER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-?\d+(?:\.\d+)?").unwrap()
});

// "<secret|code> is <token>"
static SECRET_LABEL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:secret|code)\s+is\s*[:=]?\s*["']?([A-Za-z0-9_-]+)"#).unwrap()
});

static TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9]{6,}\b").unwrap()
});

static CUTOFF_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:cut-?off|threshold)\b\D{0,20}?(-?\d+(?:\.\d+)?)").unwrap()
});

static SUM_VOCAB_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:sum|add|total|plus)\b").unwrap()
});

static COUNT_VOCAB_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bhow many\b|\bcount\b").unwrap()
});

static WORD_VOCAB_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bwords?\b").unwrap()
});

static SECRET_VOCAB_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bsecrets?\b|\bcodes?\b").unwrap()
});

// atob("...") calls in inline scripts
static ATOB_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"atob\(\s*["'`]([A-Za-z0-9+/=_\-\s]{8,})["'`]\s*\)"#).unwrap()
});

// const encoded = "..." style assignments
static ASSIGNED_PAYLOAD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)\b(?:const|let|var)\s+\w*(?:encoded|payload|data|b64)\w*\s*=\s*["'`]([A-Za-z0-9+/=_\-]{16,})["'`]"#,
    )
    .unwrap()
});

static HREF_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)href\s*=\s*["']([^"']+)["']"#).unwrap()
});

static ABSOLUTE_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s"'<>]+"#).unwrap()
});

static PATH_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|[\s(:])(/[^\s"'<>)]+)"#).unwrap()
});

static SECRET_CODE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)secret code is\s*(\d+)\s+and not").unwrap()
});

static CODE_IS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)code is\s*(\d+)").unwrap()
});

static LONG_DIGITS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{5,}\b").unwrap()
});

/// Placeholders the remote service uses for the caller identity
const IDENTITY_PLACEHOLDERS: &[&str] = &["$EMAIL", "{{email}}", "{email}", "<email>"];

/// Number literals in document order.
///
/// A minus sign glued to a preceding letter or digit (`q-3`, `2-1`) is a
/// separator, not a sign.
pub fn number_literals(text: &str) -> Vec<&str> {
    NUMBER_REGEX
        .find_iter(text)
        .map(|m| {
            let literal = m.as_str();
            let glued = literal.starts_with('-')
                && text[..m.start()]
                    .chars()
                    .next_back()
                    .is_some_and(char::is_alphanumeric);
            if glued {
                &literal[1..]
            } else {
                literal
            }
        })
        .collect()
}

/// Parsed values of every number literal
pub fn find_numbers(text: &str) -> Vec<f64> {
    number_literals(text)
        .into_iter()
        .filter_map(|n| n.parse::<f64>().ok())
        .collect()
}

/// First number literal, as written
pub fn first_number(text: &str) -> Option<String> {
    number_literals(text).first().map(|n| n.to_string())
}

/// Render a number as an integer when it has no fractional part.
pub fn format_number(value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() < 1e-9 && rounded.abs() < 9.0e15 {
        format!("{}", rounded as i64)
    } else {
        let fixed = format!("{:.6}", value);
        fixed.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Token after "secret is" / "code is"
pub fn find_secret_label(text: &str) -> Option<String> {
    SECRET_LABEL_REGEX
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// First standalone alphanumeric token of six or more characters that
/// contains a digit.
///
/// Requiring a digit is a policy choice: letter-only words such as
/// "Welcome" are never taken for a secret.
pub fn find_alnum_token(text: &str) -> Option<String> {
    TOKEN_REGEX
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|token| token.chars().any(|c| c.is_ascii_digit()))
        .map(str::to_string)
}

/// Numeric cutoff stated in the text ("Cutoff: 10", "threshold of 5")
pub fn find_cutoff(text: &str) -> Option<f64> {
    CUTOFF_REGEX
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

pub fn mentions_sum(lower: &str) -> bool {
    SUM_VOCAB_REGEX.is_match(lower)
}

pub fn mentions_count(lower: &str) -> bool {
    COUNT_VOCAB_REGEX.is_match(lower)
}

pub fn mentions_words(lower: &str) -> bool {
    WORD_VOCAB_REGEX.is_match(lower)
}

pub fn mentions_secret(lower: &str) -> bool {
    SECRET_VOCAB_REGEX.is_match(lower)
}

/// Base64 payload embedded in a script body, if any
pub fn find_encoded_payload(script: &str) -> Option<&str> {
    ATOB_REGEX
        .captures(script)
        .or_else(|| ASSIGNED_PAYLOAD_REGEX.captures(script))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Link reference inside decoded payload text: an `href`, then an
/// absolute URL, then a bare absolute path
pub fn find_link_reference(decoded: &str) -> Option<String> {
    if let Some(caps) = HREF_REGEX.captures(decoded) {
        return caps.get(1).map(|m| m.as_str().to_string());
    }
    if let Some(m) = ABSOLUTE_URL_REGEX.find(decoded) {
        return Some(m.as_str().to_string());
    }
    PATH_REGEX
        .captures(decoded)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Replace caller identity placeholders in a link
pub fn substitute_identity(link: &str, identity: &str) -> String {
    IDENTITY_PLACEHOLDERS
        .iter()
        .fold(link.to_string(), |acc, placeholder| {
            acc.replace(placeholder, identity)
        })
}

/// Secret code on a secondary page:
/// "secret code is N and not ...", then "code is N", then any 5+ digit run
pub fn find_secret_code(text: &str) -> Option<String> {
    SECRET_CODE_REGEX
        .captures(text)
        .or_else(|| CODE_IS_REGEX.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .or_else(|| LONG_DIGITS_REGEX.find(text).map(|m| m.as_str().to_string()))
}
