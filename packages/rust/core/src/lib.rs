//! Core pipeline orchestration and domain logic for docshift.
//!
//! This crate turns a structure description into a copy plan and a
//! navigation tree, puts the content in place under a site's docs tree,
//! rewrites relative links, and drives the external site toolchain
//! (`build_site`).

pub mod copy;
pub mod paths;
pub mod pipeline;
pub mod resolver;
pub mod sidebar;
pub mod structure;
pub mod toolchain;

pub use pipeline::{BuildConfig, BuildResult, ProgressReporter, SilentProgress, build_site};
pub use resolver::{LinkWarning, ResolveReport};
pub use structure::{ParsedStructure, parse_structure};
pub use toolchain::{CommandToolchain, NoToolchain, SiteToolchain};
