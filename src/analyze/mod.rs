//! Count summaries and cross-source comparisons over parsed registry data.
//!
//! Country-code classification always comes from a [`CcTldLookup`] built from
//! the root zone database; the TLD list and bootstrap file never classify
//! their own labels.

pub mod compare;
pub mod counts;
pub mod lookup;


pub use compare::{compare_bootstrap_vs_registry, compare_sources, compare_tld_list_vs_registry, ComparisonResult};
pub use counts::{analyze_bootstrap, analyze_registry, analyze_tld_list, CategoryTally, IdnBreakdown, RegistryAnalysis, TldCounts};
pub use lookup::{build_cctld_lookup, CcTldLookup};
