//! Quiz Chain Network Layer
//!
//! Provides the I/O collaborators of the solver:
//! - HTTP fetcher with per-request timeout and redirect following
//! - Page document parsing (visible text, links, inline scripts)

pub mod fetcher;
pub mod document;

pub use fetcher::*;
pub use document::*;
