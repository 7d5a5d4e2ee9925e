//! Strategy descriptors, the ordered catalog, and the adapter contract.
//!
//! The orchestrator depends only on these types; concrete retrieval mechanisms
//! live behind the `StrategyAdapter` trait in the `adapters` module.

mod adapter;
mod catalog;
mod descriptor;

pub use adapter::{AdapterOutput, AdapterSet, AttemptContext, MetadataProbe, StrategyAdapter};
pub use catalog::{build_catalog, CatalogInputs};
pub use descriptor::{StrategyDescriptor, StrategyKind, StrategyParams};
