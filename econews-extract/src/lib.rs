//! Article body extraction for the Econews Terminal
//!
//! Pulling readable text out of arbitrary news pages is unreliable, so this
//! crate runs a fixed chain of strategies from cheap structural parsing down
//! to assisted extraction, and falls back to a deterministic terminal-styled
//! placeholder when everything fails. The chain itself never returns an error.

pub mod assist;
pub mod chain;
pub mod density;
pub mod dom;
pub mod error;
pub mod format;
pub mod readability;

pub use assist::AssistClient;
pub use chain::{ContentExtractor, ExtractConfig};
pub use error::ExtractError;
