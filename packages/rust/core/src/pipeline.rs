//! End-to-end `build` pipeline: structure → scaffold → organize → resolve → site.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument};

use docshift_shared::{
    DocshiftError, FileMapping, MappingOrder, NavNode, Result, SidebarMode, SiteConfig,
};

use crate::copy;
use crate::paths;
use crate::resolver::{self, LinkWarning};
use crate::sidebar::{self, INTRO_ID};
use crate::structure;
use crate::toolchain::SiteToolchain;

/// Docs directory name inside the site.
pub const DOCS_DIR: &str = "docs";
/// Static assets directory name inside the site.
pub const STATIC_DIR: &str = "static";
/// Sidebar module written into the site.
pub const SIDEBAR_MODULE: &str = "sidebars.js";

/// Scratch directory in the output while the build output replaces the site.
const BUILD_STAGING_DIR: &str = ".docshift-build";
const DOCS_ONLY_FRONTMATTER: &str = "---\nslug: /\n---\n";
const PLACEHOLDER_INTRO: &str = "# Introduction\n\
This page was generated because the structure has no `Introduction` entry. \
Add one to the `structure` option to replace it.\n";

/// Inputs for [`build_site`].
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Directory holding the authored content.
    pub input_dir: PathBuf,
    /// Directory the site is scaffolded into.
    pub output_dir: PathBuf,
    /// Project configuration.
    pub site: SiteConfig,
}

/// Result of a build.
#[derive(Debug)]
pub struct BuildResult {
    /// The finished site: the output directory once the build output was
    /// relocated into it, `<output>/<course_name>` otherwise.
    pub site_dir: PathBuf,
    /// `<output>/<course_name>/docs`. Gone after relocation.
    pub docs_dir: PathBuf,
    /// Navigation tree as rendered into the sidebar.
    pub navigation: Vec<NavNode>,
    /// Whether the structure supplied its own introduction.
    pub has_introduction: bool,
    /// Files written by the copy plan, extra files and static assets.
    pub files_copied: usize,
    /// Links rewritten in moved documents.
    pub links_rewritten: usize,
    /// Non-fatal link problems.
    pub warnings: Vec<LinkWarning>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each copy plan entry is in place.
    fn entry_copied(&self, destination: &Path, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &BuildResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn entry_copied(&self, _destination: &Path, _current: usize, _total: usize) {}
    fn done(&self, _result: &BuildResult) {}
}

/// Run the full `build` pipeline.
///
/// 1. Parse the structure
/// 2. Scaffold the site and reset its docs directory
/// 3. Copy the plan and rewrite links
/// 4. Copy extra files and static assets
/// 5. Write a placeholder introduction if needed, then the sidebar
/// 6. Build, then move the build output into the output directory unless
///    `debug` is set
#[instrument(skip_all, fields(input = %config.input_dir.display(), output = %config.output_dir.display()))]
pub fn build_site(
    config: &BuildConfig,
    toolchain: &dyn SiteToolchain,
    progress: &dyn ProgressReporter,
) -> Result<BuildResult> {
    let start = Instant::now();
    let site = &config.site;
    site.validate()?;

    let input_dir = absolute(&config.input_dir)?;
    let output_dir = absolute(&config.output_dir)?;
    let site_dir = paths::join(&output_dir, &site.course_name);
    let docs_dir = site_dir.join(DOCS_DIR);

    info!(site_dir = %site_dir.display(), sidebar = ?site.sidebar, "starting build pipeline");

    // --- Phase 1: Structure ---
    progress.phase("Parsing structure");
    let parsed = match &site.structure {
        Some(raw) => Some(structure::parse_structure(raw, &input_dir, &docs_dir)?),
        None => None,
    };

    // --- Phase 2: Scaffold ---
    progress.phase("Scaffolding site");
    create_dir(&output_dir)?;
    toolchain.scaffold(&output_dir)?;
    reset_dir(&docs_dir)?;

    // --- Phase 3: Organize ---
    let mut files_copied = 0;
    let mut links_rewritten = 0;
    let mut warnings = Vec::new();

    if let Some(parsed) = &parsed {
        progress.phase("Copying content");
        files_copied += copy::copy_plan(&parsed.copy_plan, progress)?;

        progress.phase("Resolving links");
        let report = resolver::resolve_links(&parsed.copy_plan, &parsed.navigation, &docs_dir)?;
        links_rewritten = report.links_rewritten;
        warnings = report.warnings;
    }

    // --- Phase 4: Extra files and assets ---
    progress.phase("Copying extra files");
    files_copied += copy_mappings(
        &site.extra_files,
        MappingOrder::SourceFirst,
        &input_dir,
        &site_dir,
    )?;
    files_copied += copy_mappings(
        &site.static_assets,
        MappingOrder::DestinationFirst,
        &input_dir,
        &site_dir.join(STATIC_DIR),
    )?;

    // --- Phase 5: Introduction and sidebar ---
    let has_introduction = parsed.as_ref().is_some_and(|p| p.has_introduction);
    let mut navigation = parsed.map(|p| p.navigation).unwrap_or_default();

    if site.sidebar == SidebarMode::Js {
        let before = navigation.len();
        navigation = sidebar::with_intro_leaf(navigation, has_introduction);
        if navigation.len() > before {
            write_placeholder_intro(&docs_dir, site.docs_only)?;
        }
    }

    progress.phase("Writing sidebar");
    write_sidebar(site, &input_dir, &site_dir, &navigation)?;

    // --- Phase 6: Build ---
    progress.phase("Building site");
    toolchain.build(&site_dir)?;

    let site_dir = match toolchain.build_output(&site_dir) {
        Some(build_dir) if !site.debug => {
            progress.phase("Relocating build output");
            relocate_build(&build_dir, &site_dir, &output_dir)?;
            output_dir
        }
        _ => site_dir,
    };

    let result = BuildResult {
        site_dir,
        docs_dir,
        navigation,
        has_introduction,
        files_copied,
        links_rewritten,
        warnings,
        elapsed: start.elapsed(),
    };

    info!(
        files = result.files_copied,
        links = result.links_rewritten,
        warnings = result.warnings.len(),
        elapsed_ms = result.elapsed.as_millis() as u64,
        "build pipeline complete"
    );

    progress.done(&result);
    Ok(result)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn absolute(path: &Path) -> Result<PathBuf> {
    let path = std::path::absolute(path).map_err(|e| DocshiftError::io(path, e))?;
    Ok(paths::normalize(&path))
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| DocshiftError::io(path, e))
}

/// Remove and recreate a directory.
fn reset_dir(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path).map_err(|e| DocshiftError::io(path, e))?;
    } else {
        debug!(path = %path.display(), "docs directory already absent");
    }
    create_dir(path)
}

fn copy_mappings(
    mappings: &[FileMapping],
    order: MappingOrder,
    input_dir: &Path,
    target_root: &Path,
) -> Result<usize> {
    let mut written = 0;
    for mapping in mappings {
        let (src, dst) = mapping.resolve(order)?;
        let source = paths::join(input_dir, &src);
        let target = paths::join(target_root, &dst);
        debug!(source = %source.display(), target = %target.display(), "copying extra path");
        written += copy::copy_path(&source, &target)?;
    }
    Ok(written)
}

/// Write `docs/intro.md` unless some copied file already occupies it.
fn write_placeholder_intro(docs_dir: &Path, docs_only: bool) -> Result<()> {
    let path = docs_dir.join(format!("{INTRO_ID}.md"));
    if path.exists() {
        debug!(path = %path.display(), "introduction already present");
        return Ok(());
    }

    let mut content = String::new();
    if docs_only {
        content.push_str(DOCS_ONLY_FRONTMATTER);
    }
    content.push_str(PLACEHOLDER_INTRO);

    fs::write(&path, content).map_err(|e| DocshiftError::io(&path, e))?;
    info!(path = %path.display(), "wrote placeholder introduction");
    Ok(())
}

/// Replace the scaffolded site with its build output, merged into `output_dir`.
fn relocate_build(build_dir: &Path, site_dir: &Path, output_dir: &Path) -> Result<()> {
    if !build_dir.is_dir() {
        return Err(DocshiftError::Toolchain(format!(
            "build output {} is missing",
            build_dir.display()
        )));
    }

    let staging = output_dir.join(BUILD_STAGING_DIR);
    if staging.exists() {
        fs::remove_dir_all(&staging).map_err(|e| DocshiftError::io(&staging, e))?;
    }
    fs::rename(build_dir, &staging).map_err(|e| DocshiftError::io(build_dir, e))?;
    fs::remove_dir_all(site_dir).map_err(|e| DocshiftError::io(site_dir, e))?;

    let files = copy::copy_path(&staging, output_dir)?;
    fs::remove_dir_all(&staging).map_err(|e| DocshiftError::io(&staging, e))?;

    info!(output = %output_dir.display(), files, "relocated build output");
    Ok(())
}

fn write_sidebar(
    site: &SiteConfig,
    input_dir: &Path,
    site_dir: &Path,
    navigation: &[NavNode],
) -> Result<()> {
    let target = site_dir.join(SIDEBAR_MODULE);
    let content = match site.sidebar {
        SidebarMode::Auto => sidebar::render_auto_sidebar(&site.sidebar_name),
        SidebarMode::Js => sidebar::render_nav_sidebar(&site.sidebar_name, navigation),
        SidebarMode::Custom => {
            copy::copy_path(&site.sidebar_file(input_dir), &target)?;
            return Ok(());
        }
    };
    fs::write(&target, content).map_err(|e| DocshiftError::io(&target, e))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
