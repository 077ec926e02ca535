//! Chain data model
//!
//! Field names on the wire follow the remote quiz service and the
//! start endpoint (`email`, `quizzes`, `time_taken`, ...).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Immutable input to one chain run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainRequest {
    /// Caller identity forwarded in every submission
    #[serde(rename = "email")]
    pub caller_identity: String,
    /// Shared secret forwarded in every submission
    #[serde(rename = "secret")]
    pub shared_secret: String,
    /// First quiz page of the chain
    #[serde(rename = "url")]
    pub start_url: String,
}

impl ChainRequest {
    pub fn new(caller_identity: &str, shared_secret: &str, start_url: &str) -> Self {
        Self {
            caller_identity: caller_identity.to_string(),
            shared_secret: shared_secret.to_string(),
            start_url: start_url.to_string(),
        }
    }
}

/// Task categories a quiz page can pose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    /// Find a secret or code stated in the page
    SecretExtraction,
    /// Add up the numbers in the page
    ArithmeticAggregation,
    /// Count words or numbers in the page
    Counting,
    /// Aggregate a linked table, optionally above a cutoff
    TabularAggregation,
    /// Decode a script payload, follow it and read the code there
    EncodedRedirect,
    /// Submit the sentinel answer
    LiteralDefault,
}

impl TaskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SecretExtraction => "secret_extraction",
            Self::ArithmeticAggregation => "arithmetic_aggregation",
            Self::Counting => "counting",
            Self::TabularAggregation => "tabular_aggregation",
            Self::EncodedRedirect => "encoded_redirect",
            Self::LiteralDefault => "literal_default",
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body posted to the submit endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub email: String,
    pub secret: String,
    pub url: String,
    pub answer: String,
}

/// Result of one fetch/classify/extract/submit cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HopResult {
    Solved {
        quiz_url: String,
        submit_url: String,
        category: TaskCategory,
        answer: String,
        server_response: Value,
    },
    Failed {
        quiz_url: String,
        error: String,
    },
}

impl HopResult {
    pub fn failed(quiz_url: &str, error: impl fmt::Display) -> Self {
        Self::Failed {
            quiz_url: quiz_url.to_string(),
            error: error.to_string(),
        }
    }

    pub fn quiz_url(&self) -> &str {
        match self {
            Self::Solved { quiz_url, .. } | Self::Failed { quiz_url, .. } => quiz_url,
        }
    }

    pub fn answer(&self) -> Option<&str> {
        match self {
            Self::Solved { answer, .. } => Some(answer),
            Self::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error, .. } => Some(error),
            Self::Solved { .. } => None,
        }
    }

    pub fn server_response(&self) -> Option<&Value> {
        match self {
            Self::Solved {
                server_response, ..
            } => Some(server_response),
            Self::Failed { .. } => None,
        }
    }

    /// Where the chain goes after this hop. Failed hops never continue.
    pub fn next_hop(&self) -> NextHop {
        self.server_response()
            .map(NextHop::from_response)
            .unwrap_or_default()
    }
}

/// Continuation instructions carried by a server response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NextHop {
    pub next_url: Option<String>,
    pub delay_secs: f64,
}

impl NextHop {
    /// Read the optional `url` and `delay` fields of a submit response.
    pub fn from_response(response: &Value) -> Self {
        let next_url = response
            .get("url")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string);

        let delay_secs = match response.get("delay") {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
            _ => 0.0,
        };

        Self {
            next_url,
            delay_secs: if delay_secs.is_finite() && delay_secs > 0.0 {
                delay_secs
            } else {
                0.0
            },
        }
    }
}

/// Terminal status of a chain run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainStatus {
    /// The loop ran to a terminal state (no next URL or budget spent)
    Completed,
    /// The run itself failed outside any hop
    Aborted,
}

/// Full history of one chain run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainOutcome {
    pub status: ChainStatus,
    #[serde(rename = "total_quizzes")]
    pub total_hops: usize,
    #[serde(rename = "time_taken")]
    pub elapsed_secs: f64,
    #[serde(rename = "quizzes")]
    pub hops: Vec<HopResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ChainOutcome {
    pub fn completed(hops: Vec<HopResult>, elapsed_secs: f64) -> Self {
        Self {
            status: ChainStatus::Completed,
            total_hops: hops.len(),
            elapsed_secs: round_secs(elapsed_secs),
            hops,
            message: None,
        }
    }

    /// Outcome of a run that failed outside any hop, keeping the hops
    /// recorded before the failure
    pub fn aborted(hops: Vec<HopResult>, message: impl fmt::Display, elapsed_secs: f64) -> Self {
        Self {
            status: ChainStatus::Aborted,
            total_hops: hops.len(),
            elapsed_secs: round_secs(elapsed_secs),
            hops,
            message: Some(message.to_string()),
        }
    }

    /// Number of hops that ended with an error
    pub fn failed_hops(&self) -> usize {
        self.hops.iter().filter(|h| h.error().is_some()).count()
    }
}

fn round_secs(secs: f64) -> f64 {
    (secs * 100.0).round() / 100.0
}
