//! Service orchestration.

mod discovery;

pub use discovery::{DiscoveryService, RebuildSummary, TypeCount};
