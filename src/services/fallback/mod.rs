//! Fallback coordination.
//!
//! Resolves logical calls against a priority-ordered chain of data
//! sources: the primary daemon first, then explorer-style REST fallbacks.
//! Sources with open breakers are skipped, the first success wins, and
//! every answer is projected into one canonical shape regardless of which
//! source produced it.

mod coordinator;
mod error;
pub mod normalize;
mod source;

pub use coordinator::{FallbackCoordinator, SourceHealth};
pub use error::{AllSourcesExhaustedError, SourceAttempt, SourceError};
pub use source::{DaemonSource, RestSource, SourceClient};
