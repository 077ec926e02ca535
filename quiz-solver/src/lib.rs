//! Quiz Chain Solver
//!
//! Everything needed to solve one quiz page:
//! - **Extractors**: per-category answer derivation, including the ones that
//!   download linked tables or follow encoded redirects
//! - **Navigator**: fetch, classify, extract, submit, and read the reply
//!
//! Network access always goes through an explicit [`quiz_net::Fetcher`].

pub mod error;
pub mod context;
pub mod payload;
pub mod tabular;
pub mod redirect;
pub mod dispatch;
pub mod navigator;

#[cfg(test)]
pub(crate) mod testing;

pub use error::*;
pub use context::*;
pub use payload::*;
pub use tabular::*;
pub use redirect::*;
pub use dispatch::*;
pub use navigator::*;
