//! # Web Search
//!
//! Best-effort web search for the prepmate retrieval cascade. A search
//! engine query yields result URLs; each page is fetched with its own
//! timeout, reduced to paragraph text, and truncated. A URL that fails or
//! times out contributes nothing and never fails the batch; there is no
//! retry. This is the slow, unreliable fallback source and it is written
//! to favor latency and availability over completeness.

pub mod error;
pub mod extract;
pub mod provider;

pub use error::{Result, SearchError};
pub use extract::extract_paragraph_text;
pub use provider::{DuckDuckGoProvider, SearchProvider};
