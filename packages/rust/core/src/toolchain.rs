//! Boundary to the external site generator.
//!
//! The pipeline only needs two things from the generator: a scaffolded site
//! directory before files are organized, and a build once they are.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tracing::{error, info, instrument};

use docshift_shared::{DocshiftError, Result, SiteConfig};

/// Generator version pinned by the default scaffold command.
pub const DEFAULT_GENERATOR: &str = "create-docusaurus@2.1.0";

/// Directory the generator writes its build output to, inside the site.
pub const BUILD_OUTPUT_DIR: &str = "build";

/// Scaffold and build a site.
pub trait SiteToolchain {
    /// Create `<output_dir>/<course_name>` with the generator's skeleton.
    fn scaffold(&self, output_dir: &Path) -> Result<()>;
    /// Build the organized site in place.
    fn build(&self, site_dir: &Path) -> Result<()>;

    /// Where `build` leaves the finished site, if it produces one.
    fn build_output(&self, site_dir: &Path) -> Option<PathBuf> {
        Some(site_dir.join(BUILD_OUTPUT_DIR))
    }
}

/// Toolchain that does nothing; the caller manages the site skeleton.
pub struct NoToolchain;

impl SiteToolchain for NoToolchain {
    fn scaffold(&self, _output_dir: &Path) -> Result<()> {
        Ok(())
    }

    fn build(&self, _site_dir: &Path) -> Result<()> {
        Ok(())
    }

    fn build_output(&self, _site_dir: &Path) -> Option<PathBuf> {
        None
    }
}

/// Toolchain that shells out to configured commands.
#[derive(Debug, Clone)]
pub struct CommandToolchain {
    pub init_command: Vec<String>,
    pub build_command: Vec<String>,
}

impl CommandToolchain {
    /// Commands from the config, falling back to the generator defaults.
    pub fn from_config(config: &SiteConfig) -> Self {
        let init_command = config.init_command.clone().unwrap_or_else(|| {
            vec![
                "npx".into(),
                "-y".into(),
                DEFAULT_GENERATOR.into(),
                config.course_name.clone(),
                "classic".into(),
            ]
        });
        let build_command = config
            .build_command
            .clone()
            .unwrap_or_else(|| vec!["npm".into(), "run".into(), "build".into()]);

        Self {
            init_command,
            build_command,
        }
    }
}

impl SiteToolchain for CommandToolchain {
    fn scaffold(&self, output_dir: &Path) -> Result<()> {
        run_command("init", &self.init_command, output_dir)
    }

    fn build(&self, site_dir: &Path) -> Result<()> {
        run_command("build", &self.build_command, site_dir)
    }
}

#[instrument(skip(command), fields(cwd = %cwd.display()))]
fn run_command(step: &str, command: &[String], cwd: &Path) -> Result<()> {
    let Some((program, args)) = command.split_first() else {
        return Err(DocshiftError::Toolchain(format!("{step} command is empty")));
    };

    info!(command = ?command, "running {step} command");
    let Output {
        status,
        stdout,
        stderr,
    } = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .output()
        .map_err(|e| {
            DocshiftError::Toolchain(format!(
                "failed to spawn {step} command: {e}. Is `{program}` installed?"
            ))
        })?;

    if !status.success() {
        error!(
            stdout = %String::from_utf8_lossy(&stdout),
            stderr = %String::from_utf8_lossy(&stderr),
            "{step} command failed"
        );
        return Err(DocshiftError::Toolchain(format!(
            "{step} command {command:?} failed with {status}"
        )));
    }

    Ok(())
}
