//! Project configuration for docshift.
//!
//! Config lives next to the authored content as `docshift.toml`
//! (or `docshift.yaml` / `docshift.yml`). CLI flags override the file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DocshiftError, Result};

/// Config file names probed in the input directory, in order.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["docshift.toml", "docshift.yaml", "docshift.yml"];

/// Default sidebar file name inside the input directory for `sidebar = "custom"`.
const DEFAULT_SIDEBAR_FILE: &str = "sidebar.js";

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

/// Top-level project config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Name of the generated site directory under the output directory.
    #[serde(default = "default_course_name")]
    pub course_name: String,

    /// Serve docs at the site root instead of under `/docs`.
    #[serde(default = "default_true")]
    pub docs_only: bool,

    /// How `sidebars.js` is produced.
    #[serde(default)]
    pub sidebar: SidebarMode,

    /// Name of the sidebar exported from `sidebars.js`.
    #[serde(default = "default_sidebar_name")]
    pub sidebar_name: String,

    /// User sidebar file for `sidebar = "custom"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sidebar_location: Option<PathBuf>,

    /// Raw structure description. Converted by the structure parser.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<serde_json::Value>,

    /// Files copied into the site directory. Mappings are `{src: dst}`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_files: Vec<FileMapping>,

    /// Files copied into `<site>/static`. Mappings are `{dst: src}`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub static_assets: Vec<FileMapping>,

    /// Scaffold command, run in the output directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_command: Option<Vec<String>>,

    /// Build command, run in the site directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_command: Option<Vec<String>>,

    /// Keep the scaffolded site directory instead of replacing the output
    /// directory contents with the generator's build output.
    #[serde(default)]
    pub debug: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            course_name: default_course_name(),
            docs_only: true,
            sidebar: SidebarMode::default(),
            sidebar_name: default_sidebar_name(),
            sidebar_location: None,
            structure: None,
            extra_files: Vec::new(),
            static_assets: Vec::new(),
            init_command: None,
            build_command: None,
            debug: false,
        }
    }
}

fn default_course_name() -> String {
    "Course".into()
}
fn default_sidebar_name() -> String {
    "sidebar".into()
}
fn default_true() -> bool {
    true
}

/// Sidebar generation mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SidebarMode {
    /// Let the generator build the sidebar from the docs tree.
    #[default]
    Auto,
    /// Copy a user-provided sidebar file.
    Custom,
    /// Render the sidebar from the navigation tree.
    Js,
}

/// An `extra_files` / `static_assets` item: a bare path, or a one-entry mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileMapping {
    Path(String),
    Mapped(BTreeMap<String, String>),
}

/// Which side of a [`FileMapping::Mapped`] entry is the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingOrder {
    /// `{src: dst}`
    SourceFirst,
    /// `{dst: src}`
    DestinationFirst,
}

impl FileMapping {
    /// Resolve into `(source, destination)`. A bare path keeps its last
    /// segment as destination. Absolute destinations are rejected.
    pub fn resolve(&self, order: MappingOrder) -> Result<(String, String)> {
        let (src, dst) = match self {
            FileMapping::Path(src) => {
                let trimmed = src.trim_end_matches('/');
                let name = trimmed.rsplit('/').next().unwrap_or(trimmed);
                (src.clone(), name.to_string())
            }
            FileMapping::Mapped(map) => {
                let mut entries = map.iter();
                let (Some((key, value)), None) = (entries.next(), entries.next()) else {
                    return Err(DocshiftError::config(format!(
                        "file mapping must have exactly one entry, found {map:?}"
                    )));
                };
                match order {
                    MappingOrder::SourceFirst => (key.clone(), value.clone()),
                    MappingOrder::DestinationFirst => (value.clone(), key.clone()),
                }
            }
        };

        if Path::new(&dst).is_absolute() {
            return Err(DocshiftError::config(format!(
                "destination path {dst} cannot be absolute"
            )));
        }

        Ok((src, dst))
    }
}

impl SiteConfig {
    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        if self.sidebar == SidebarMode::Js && self.structure.is_none() {
            return Err(DocshiftError::config(
                "structure option is required when using the js sidebar",
            ));
        }
        if self.course_name.trim().is_empty() || self.course_name.contains('/') {
            return Err(DocshiftError::config(format!(
                "course_name {:?} must be a single non-empty path segment",
                self.course_name
            )));
        }
        Ok(())
    }

    /// Location of the custom sidebar, defaulting to `<input>/sidebar.js`.
    pub fn sidebar_file(&self, input_dir: &Path) -> PathBuf {
        match &self.sidebar_location {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => input_dir.join(p),
            None => input_dir.join(DEFAULT_SIDEBAR_FILE),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Find the first config file present in `dir`.
pub fn find_config(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Load the config from `dir`. Returns defaults if no config file exists.
pub fn load_config(dir: &Path) -> Result<SiteConfig> {
    match find_config(dir) {
        Some(path) => load_config_from(&path),
        None => {
            tracing::debug!(dir = %dir.display(), "config file not found, using defaults");
            Ok(SiteConfig::default())
        }
    }
}

/// Load the config from a specific file. YAML for `.yaml`/`.yml`, TOML otherwise.
pub fn load_config_from(path: &Path) -> Result<SiteConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocshiftError::io(path, e))?;

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    );

    let config: SiteConfig = if is_yaml {
        serde_yaml::from_str(&content).map_err(|e| {
            DocshiftError::config(format!("failed to parse {}: {e}", path.display()))
        })?
    } else {
        toml::from_str(&content).map_err(|e| {
            DocshiftError::config(format!("failed to parse {}: {e}", path.display()))
        })?
    };

    tracing::debug!(path = %path.display(), sidebar = ?config.sidebar, "loaded config");
    Ok(config)
}

/// Write a default `docshift.toml` into `dir`. Returns the path to the file.
pub fn init_config(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| DocshiftError::io(dir, e))?;

    let path = dir.join(CONFIG_FILE_NAMES[0]);
    if path.exists() {
        return Err(DocshiftError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    let content = toml::to_string_pretty(&SiteConfig::default())
        .map_err(|e| DocshiftError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DocshiftError::io(&path, e))?;
    tracing::info!(path = %path.display(), "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ds-config-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn default_config_serializes() {
        let toml_str = toml::to_string_pretty(&SiteConfig::default()).expect("serialize");
        assert!(toml_str.contains("course_name = \"Course\""));
        assert!(toml_str.contains("sidebar = \"auto\""));
    }

    #[test]
    fn toml_structure_parses() {
        let toml_str = r#"
sidebar = "js"
course_name = "Operating Systems"

[[structure]]
Introduction = "README.md"

[[structure]]
[structure.Lectures]
path = "lectures"
extra = ["media/"]
subsections = [{ "Lecture 1" = "l1.md" }]
"#;
        let config: SiteConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.sidebar, SidebarMode::Js);
        let structure = config.structure.as_ref().expect("structure present");
        assert_eq!(structure[0]["Introduction"], "README.md");
        assert_eq!(structure[1]["Lectures"]["path"], "lectures");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn yaml_config_loads() {
        let dir = temp_dir();
        std::fs::write(
            dir.join("docshift.yaml"),
            "sidebar: js\nstructure:\n  - Intro: intro.md\n  - Labs:\n      - Lab 1: labs/l1.md\nstatic_assets:\n  - img/logo.png\n  - {media: assets/media}\n",
        )
        .unwrap();

        let config = load_config(&dir).expect("load");
        assert_eq!(config.sidebar, SidebarMode::Js);
        assert_eq!(config.static_assets.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_config_uses_defaults() {
        let dir = temp_dir();
        let config = load_config(&dir).expect("defaults");
        assert_eq!(config.sidebar_name, "sidebar");
        assert!(config.docs_only);
        assert!(!config.debug);
    }

    #[test]
    fn debug_flag_parses() {
        let config: SiteConfig = toml::from_str("debug = true\n").expect("parse");
        assert!(config.debug);
    }

    #[test]
    fn js_sidebar_requires_structure() {
        let config = SiteConfig {
            sidebar: SidebarMode::Js,
            ..SiteConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("structure option is required"));
    }

    #[test]
    fn file_mapping_orders() {
        let bare = FileMapping::Path("assets/img/".into());
        assert_eq!(
            bare.resolve(MappingOrder::SourceFirst).unwrap(),
            ("assets/img/".to_string(), "img".to_string())
        );

        let mapped = FileMapping::Mapped(BTreeMap::from([("logo".into(), "img/logo.svg".into())]));
        assert_eq!(
            mapped.resolve(MappingOrder::DestinationFirst).unwrap(),
            ("img/logo.svg".to_string(), "logo".to_string())
        );
    }

    #[test]
    fn file_mapping_rejects_absolute_destination() {
        let mapped = FileMapping::Mapped(BTreeMap::from([("notes.txt".into(), "/etc/x".into())]));
        let err = mapped.resolve(MappingOrder::SourceFirst).unwrap_err();
        assert!(err.to_string().contains("cannot be absolute"));
    }

    #[test]
    fn init_config_refuses_overwrite() {
        let dir = temp_dir();
        let path = init_config(&dir).expect("init");
        assert!(path.exists());
        assert!(init_config(&dir).is_err());

        let loaded = load_config_from(&path).expect("reload");
        assert_eq!(loaded.course_name, "Course");
    }
}
