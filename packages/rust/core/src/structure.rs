//! Structure description parser.
//!
//! Walks the typed structure once per artifact to derive the copy plan and
//! the navigation tree. Both walks follow the same keys, so every leaf in
//! the tree has exactly one plan entry that puts its document in place.

use std::path::Path;

use percent_encoding::percent_decode_str;
use tracing::{debug, instrument};

use docshift_shared::{
    CopyPlan, CopyPlanEntry, INTRODUCTION_TITLE, NavNode, Result, SectionSpec, StructureNode,
    StructureValue,
};

use crate::paths;

/// Document id used when neither the value nor the key yields a stem.
const FALLBACK_ID: &str = "README";

/// Everything derived from one structure description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStructure {
    /// Deduplicated (source, destination) copies.
    pub copy_plan: CopyPlan,
    /// Titled tree whose leaves are destination document ids.
    pub navigation: Vec<NavNode>,
    /// Whether a top-level `Introduction` entry was supplied.
    pub has_introduction: bool,
}

/// Parse a raw structure description.
///
/// `content_root` is the base for source paths, `docs_root` the base for
/// destinations. Fails on the first malformed entry.
#[instrument(skip_all, fields(content_root = %content_root.display(), docs_root = %docs_root.display()))]
pub fn parse_structure(
    raw: &serde_json::Value,
    content_root: &Path,
    docs_root: &Path,
) -> Result<ParsedStructure> {
    let nodes = StructureNode::parse_list(raw)?;
    Ok(build_structure(&nodes, content_root, docs_root))
}

/// Derive the copy plan and navigation from already-typed nodes.
pub fn build_structure(
    nodes: &[StructureNode],
    content_root: &Path,
    docs_root: &Path,
) -> ParsedStructure {
    let mut copy_plan = CopyPlan::new();
    plan_copies(nodes, content_root, docs_root, &mut copy_plan);

    let navigation: Vec<NavNode> = nodes.iter().map(|node| nav_node(node, "")).collect();
    let has_introduction = nodes.iter().any(|node| node.key == INTRODUCTION_TITLE);

    debug!(
        copies = copy_plan.len(),
        top_level = navigation.len(),
        has_introduction,
        "structure parsed"
    );

    ParsedStructure {
        copy_plan,
        navigation,
        has_introduction,
    }
}

// ---------------------------------------------------------------------------
// Copy plan
// ---------------------------------------------------------------------------

fn plan_copies(nodes: &[StructureNode], src_base: &Path, dst_base: &Path, plan: &mut CopyPlan) {
    for node in nodes {
        match &node.value {
            StructureValue::Leaf(source) => {
                // A file lands in the directory implied by the key's own
                // segments, not in a directory named after the key.
                plan.insert(CopyPlanEntry::new(
                    paths::join(src_base, source),
                    paths::join(dst_base, paths::key_dir(&node.key)),
                ));
            }
            StructureValue::Section(section) => {
                let dst = paths::join(dst_base, &node.key);
                let src = paths::join(src_base, section.path.as_deref().unwrap_or(""));

                for extra in &section.extra {
                    let extra = extra.trim_end_matches('/');
                    plan.insert(CopyPlanEntry::new(
                        paths::join(&src, extra),
                        paths::join(&dst, paths::stem(extra)),
                    ));
                }

                plan_copies(&section.subsections, &src, &dst, plan);
            }
            StructureValue::List(items) => {
                let dst = paths::join(dst_base, &node.key);
                plan_copies(items, src_base, &dst, plan);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

fn nav_node(node: &StructureNode, prefix: &str) -> NavNode {
    let key = node.key.as_str();
    let title = percent_decode_str(key.trim_matches('/'))
        .decode_utf8_lossy()
        .into_owned();

    let source = match &node.value {
        StructureValue::List(children)
        | StructureValue::Section(SectionSpec {
            subsections: children,
            ..
        }) => {
            let child_prefix = format!("{prefix}{key}/");
            return NavNode {
                title,
                id: format!("{prefix}{key}"),
                children: Some(children.iter().map(|c| nav_node(c, &child_prefix)).collect()),
            };
        }
        StructureValue::Leaf(source) => source,
    };

    let mut prefix = prefix.to_string();
    let dir = paths::key_dir(key);
    if !dir.is_empty() {
        prefix.push_str(dir);
        prefix.push('/');
    }

    let name = [paths::stem(source), paths::stem(key)]
        .into_iter()
        .find(|s| !s.is_empty())
        .unwrap_or(FALLBACK_ID);

    NavNode {
        title,
        id: format!("{prefix}{name}"),
        children: None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
