//! # Corpus - Preparing Trees and Mining Patterns
//!
//! Utilities around a TSG that work on whole corpora rather than a single
//! tree:
//!
//! - [`CorpusFilter`]: cuts trees at rare one-level productions so that a
//!   sampler only sees well-supported structure
//! - [`PatternExtractor`]: turns frequent, large grammar rules into patterns
//!   and records, for every place a pattern occurs, the node payloads that
//!   precede it in pre-order

mod error;
mod filter;
mod patterns;

pub use error::CorpusError;
pub use filter::{CorpusFilter, FilterConfig, Production};
pub use patterns::{PatternConfig, PatternExtractor, Sample, NO_PATTERN};
