//! Core data model definitions shared across airlink crates.
#![allow(missing_docs)]

pub mod descriptor;
pub mod error;
pub mod filter;
pub mod record;

// Intentionally curated re-exports for downstream consumers.
pub use descriptor::{Credential, NetworkDescriptor, SecurityKind};
pub use error::{ModelError, Result as ModelResult};
pub use filter::{FilterChain, SsidFilter};
pub use record::{ConfigId, SavedNetwork, ScanRecord};
