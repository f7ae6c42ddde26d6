//! Reconciles the IANA root zone feeds: the TLD list, the RDAP bootstrap file
//! and the root zone database, plus curated RDAP servers for country-code
//! TLDs, into one dataset of delegated TLDs grouped by RDAP service.

pub mod analyze;
pub mod api;
pub mod cli;
pub mod config;
pub mod fetcher;
pub mod idn;
pub mod parsers;
pub mod pipeline;
pub mod storage;
pub mod supplemental;
pub mod unified;
pub mod utils;
