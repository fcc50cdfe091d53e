//! Shared types, error model, and configuration for docshift.
//!
//! This crate is the foundation depended on by all other docshift crates.
//! It provides:
//! - [`DocshiftError`], the unified error type
//! - Domain types ([`StructureNode`], [`CopyPlanEntry`], [`NavNode`])
//! - Configuration ([`SiteConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    CONFIG_FILE_NAMES, FileMapping, MappingOrder, SidebarMode, SiteConfig, find_config,
    init_config, load_config, load_config_from,
};
pub use error::{DocshiftError, Result};
pub use types::{
    CopyPlan, CopyPlanEntry, INTRODUCTION_TITLE, NavNode, SectionSpec, StructureNode,
    StructureValue, leaf_ids,
};
