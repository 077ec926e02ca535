//! Quiz Chain Core - domain model and answer heuristics
//!
//! This crate provides the pure, I/O-free parts of the solver:
//! - Chain data model (requests, hop results, outcomes)
//! - Page context shared by the classifier and extractors
//! - Ordered classification rules with first-match-wins semantics
//! - Text heuristics for secrets, numbers, cutoffs and encoded payloads
//! - Delimited table parsing for linked data files

pub mod model;
pub mod page;
pub mod classifier;
pub mod heuristics;
pub mod answers;
pub mod table;

pub use model::*;
pub use page::*;
pub use classifier::*;
pub use heuristics::*;
pub use answers::*;
pub use table::*;

/// Answer submitted when no heuristic produces a confident result
pub const SENTINEL_ANSWER: &str = "test";

/// Default wall-clock budget for one chain, in seconds
pub const DEFAULT_BUDGET_SECS: u64 = 170;

/// Upper bound on a server-requested pause between hops, in seconds
pub const MAX_DELAY_SECS: u64 = 10;

/// Default per-request timeout, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Path answers are posted to, relative to the quiz page origin
pub const SUBMIT_PATH: &str = "/submit";
