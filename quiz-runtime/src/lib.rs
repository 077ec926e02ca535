//! Quiz Chain Runtime
//!
//! Drives the navigator hop after hop under a wall-clock budget and
//! server-requested pacing, and exposes the single entry point used by
//! hosting surfaces: [`solve_quiz_chain`].

pub mod chain;

pub use chain::*;
