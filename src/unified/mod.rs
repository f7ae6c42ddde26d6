//! The unified TLD dataset: bootstrap RDAP servers, root zone classification
//! and manual overrides merged into one document grouped by server set.

pub mod builder;
pub mod models;

#[cfg(test)]
mod tests;

pub use builder::{build_from_records, build_unified_dataset, DATASET_DESCRIPTION};
pub use models::{ServiceGroup, TldType, UnifiedDataset, UnifiedTldEntry};
