//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use docshift_core::pipeline::{BuildConfig, BuildResult, DOCS_DIR, ProgressReporter};
use docshift_core::toolchain::{CommandToolchain, NoToolchain, SiteToolchain};
use docshift_core::{paths, sidebar, structure};
use docshift_shared::{NavNode, SidebarMode, SiteConfig, init_config, load_config, load_config_from};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// docshift: move authored content into a static-site docs tree.
#[derive(Parser)]
#[command(
    name = "docshift",
    version,
    about = "Reorganize course content into a static-site docs tree and fix its relative links.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Output format for `plan`.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum PlanFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Scaffold, organize and build the site.
    Build {
        /// Directory holding the authored content.
        #[arg(short, long, default_value = ".")]
        input: PathBuf,

        /// Directory the site is scaffolded into.
        #[arg(short, long)]
        output: PathBuf,

        /// Config file (defaults to docshift.toml/.yaml in the input directory).
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Skip the scaffold and build commands.
        #[arg(long)]
        no_toolchain: bool,

        /// Fail if any link could not be resolved.
        #[arg(long)]
        strict: bool,
    },

    /// Print the copy plan and navigation tree without touching files.
    Plan {
        /// Directory holding the authored content.
        #[arg(short, long, default_value = ".")]
        input: PathBuf,

        /// Config file (defaults to docshift.toml/.yaml in the input directory).
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Docs root the destinations are computed against.
        #[arg(long, default_value = "docs")]
        docs_root: PathBuf,

        /// Output format.
        #[arg(long, default_value = "text")]
        format: PlanFormat,
    },

    /// Print the sidebar module that `build` would write.
    Sidebar {
        /// Directory holding the authored content.
        #[arg(short, long, default_value = ".")]
        input: PathBuf,

        /// Config file (defaults to docshift.toml/.yaml in the input directory).
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init {
        /// Directory to write docshift.toml into.
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Show resolved configuration.
    Show {
        /// Directory holding the authored content.
        #[arg(short, long, default_value = ".")]
        input: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docshift=info",
        1 => "docshift=debug",
        _ => "docshift=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Build {
            input,
            output,
            config,
            no_toolchain,
            strict,
        } => cmd_build(&input, &output, config.as_deref(), no_toolchain, strict),
        Command::Plan {
            input,
            config,
            docs_root,
            format,
        } => cmd_plan(&input, config.as_deref(), &docs_root, format),
        Command::Sidebar { input, config } => cmd_sidebar(&input, config.as_deref()),
        Command::Config { action } => match action {
            ConfigAction::Init { dir } => cmd_config_init(&dir),
            ConfigAction::Show { input } => cmd_config_show(&input),
        },
    }
}

/// Load the explicit config file, or probe the input directory.
fn resolve_config(input: &Path, config: Option<&Path>) -> Result<SiteConfig> {
    let site = match config {
        Some(path) => load_config_from(path)?,
        None => load_config(input)?,
    };
    site.validate()?;
    Ok(site)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    let abs = std::path::absolute(path)
        .map_err(|e| eyre!("cannot resolve '{}': {e}", path.display()))?;
    Ok(paths::normalize(&abs))
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_build(
    input: &Path,
    output: &Path,
    config: Option<&Path>,
    no_toolchain: bool,
    strict: bool,
) -> Result<()> {
    let site = resolve_config(input, config)?;

    let toolchain: Box<dyn SiteToolchain> = if no_toolchain {
        Box::new(NoToolchain)
    } else {
        Box::new(CommandToolchain::from_config(&site))
    };

    let build_config = BuildConfig {
        input_dir: input.to_path_buf(),
        output_dir: output.to_path_buf(),
        site,
    };

    info!(
        input = %input.display(),
        output = %output.display(),
        no_toolchain,
        "building site"
    );

    let reporter = CliProgress::new();
    let result = match docshift_core::build_site(&build_config, toolchain.as_ref(), &reporter) {
        Ok(result) => result,
        Err(e) => {
            reporter.abort();
            return Err(e.into());
        }
    };

    println!();
    println!("  Site built successfully!");
    println!("  Site:     {}", result.site_dir.display());
    println!("  Files:    {}", result.files_copied);
    println!("  Links:    {}", result.links_rewritten);
    println!("  Warnings: {}", result.warnings.len());
    println!(
        "  Time:     {:.1}s",
        result.elapsed.as_secs_f64()
    );
    for warning in &result.warnings {
        println!("  ! {warning}");
    }
    println!();

    if strict && !result.warnings.is_empty() {
        return Err(eyre!(
            "{} link warning(s) with --strict",
            result.warnings.len()
        ));
    }

    Ok(())
}

fn cmd_plan(
    input: &Path,
    config: Option<&Path>,
    docs_root: &Path,
    format: PlanFormat,
) -> Result<()> {
    let site = resolve_config(input, config)?;
    let raw = site
        .structure
        .as_ref()
        .ok_or_else(|| eyre!("no structure configured for '{}'", input.display()))?;

    let parsed = structure::parse_structure(raw, &absolute(input)?, &absolute(docs_root)?)?;

    match format {
        PlanFormat::Json => {
            let out = serde_json::json!({
                "copy_plan": parsed.copy_plan,
                "navigation": parsed.navigation,
                "has_introduction": parsed.has_introduction,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        PlanFormat::Text => {
            println!("Copy plan ({} entries):", parsed.copy_plan.len());
            for entry in &parsed.copy_plan {
                println!("  {entry}");
            }
            println!();
            println!("Navigation:");
            print_nav(&parsed.navigation, 1);
        }
    }

    Ok(())
}

fn print_nav(nodes: &[NavNode], depth: usize) {
    let indent = "  ".repeat(depth);
    for node in nodes {
        match &node.children {
            Some(children) => {
                println!("{indent}{}/", node.title);
                print_nav(children, depth + 1);
            }
            None => println!("{indent}{} -> {}", node.title, node.id),
        }
    }
}

fn cmd_sidebar(input: &Path, config: Option<&Path>) -> Result<()> {
    let site = resolve_config(input, config)?;
    print!("{}", render_sidebar(&site, input)?);
    Ok(())
}

/// The sidebar module `build` would write for this config.
fn render_sidebar(site: &SiteConfig, input: &Path) -> Result<String> {
    let rendered = match site.sidebar {
        SidebarMode::Auto => sidebar::render_auto_sidebar(&site.sidebar_name),
        SidebarMode::Js => {
            let raw = site
                .structure
                .as_ref()
                .ok_or_else(|| eyre!("no structure configured"))?;
            let input_dir = absolute(input)?;
            let parsed = structure::parse_structure(raw, &input_dir, &input_dir.join(DOCS_DIR))?;
            let navigation = sidebar::with_intro_leaf(parsed.navigation, parsed.has_introduction);
            sidebar::render_nav_sidebar(&site.sidebar_name, &navigation)
        }
        SidebarMode::Custom => {
            let path = site.sidebar_file(input);
            std::fs::read_to_string(&path)
                .map_err(|e| eyre!("cannot read sidebar '{}': {e}", path.display()))?
        }
    };

    Ok(rendered)
}

fn cmd_config_init(dir: &Path) -> Result<()> {
    let path = init_config(dir)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(input: &Path) -> Result<()> {
    let config = load_config(input)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    /// Clear the spinner when the pipeline stops early.
    fn abort(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn entry_copied(&self, destination: &Path, current: usize, total: usize) {
        self.spinner.set_message(format!(
            "Copying [{current}/{total}] {}",
            destination.display()
        ));
    }

    fn done(&self, _result: &BuildResult) {
        self.spinner.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docshift_core::pipeline::{SIDEBAR_MODULE, SilentProgress};
    use serde_json::json;

    #[test]
    fn sidebar_command_matches_built_sidebar() {
        let root = std::env::temp_dir().join(format!("docshift-cli-sidebar-{}", uuid::Uuid::now_v7()));
        let input = root.join("input");
        std::fs::create_dir_all(input.join("lessons")).unwrap();
        std::fs::write(input.join("lessons/l1.md"), "# L1\n").unwrap();
        let site = SiteConfig {
            sidebar: SidebarMode::Js,
            structure: Some(json!([{"Lessons": {"path": "lessons", "subsections": [{"L1": "l1.md"}]}}])),
            ..SiteConfig::default()
        };

        let rendered = render_sidebar(&site, &input).unwrap();
        let build_config = BuildConfig {
            input_dir: input.clone(),
            output_dir: root.join("output"),
            site,
        };
        let result = docshift_core::build_site(&build_config, &NoToolchain, &SilentProgress).unwrap();

        assert!(rendered.contains("\"intro\""));
        assert_eq!(
            std::fs::read_to_string(result.site_dir.join(SIDEBAR_MODULE)).unwrap(),
            rendered
        );

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn aborted_progress_finishes_spinner() {
        let progress = CliProgress::new();
        progress.phase("Copying content");
        progress.abort();
        assert!(progress.spinner.is_finished());
    }
}
