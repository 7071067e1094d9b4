//! Consolidation of road network graphs into deduplicated, strongly
//! connected snapshots, plus nearest-link stop placement

pub mod config;
pub mod error;
pub mod network;
pub mod cluster;
pub mod graph;
pub mod consolidate;
pub mod stops;
pub mod storage;

pub use config::Config;
pub use consolidate::{consolidate_network, Consolidation, ConsolidationReport};
pub use error::{ConsolidateError, Result};
pub use network::{ConsolidatedGraph, Network};
