//! Core domain types: structure descriptions, copy plans, navigation trees.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DocshiftError, Result};

/// Reserved top-level title that marks a user-supplied introduction page.
pub const INTRODUCTION_TITLE: &str = "Introduction";

// ---------------------------------------------------------------------------
// StructureNode
// ---------------------------------------------------------------------------

/// One titled entry of the structure description.
///
/// The key doubles as a path segment in the destination layout, so it may
/// contain `/` (e.g. `"Labs/Setup"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureNode {
    pub key: String,
    pub value: StructureValue,
}

/// The three shapes a structure entry can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructureValue {
    /// A single source path, copied in as one document.
    Leaf(String),
    /// An ordered sub-list of entries sharing the parent's source base.
    List(Vec<StructureNode>),
    /// A section with its own source base and verbatim extras.
    Section(SectionSpec),
}

/// Body of a [`StructureValue::Section`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionSpec {
    /// Source directory, relative to the enclosing source base.
    pub path: Option<String>,
    /// Additional files or directories copied verbatim below the section.
    pub extra: Vec<String>,
    /// Nested entries.
    pub subsections: Vec<StructureNode>,
}

impl StructureNode {
    /// Convert a raw structure description (a list of single-key mappings)
    /// into typed nodes. Fails on the first malformed entry.
    pub fn parse_list(raw: &Value) -> Result<Vec<StructureNode>> {
        let Value::Array(items) = raw else {
            return Err(DocshiftError::structure(format!(
                "expected a list of entries, found {raw}"
            )));
        };

        items.iter().map(StructureNode::parse_entry).collect()
    }

    fn parse_entry(raw: &Value) -> Result<StructureNode> {
        let Value::Object(map) = raw else {
            return Err(DocshiftError::structure(format!(
                "expected a single-key mapping, found {raw}"
            )));
        };

        let mut entries = map.iter();
        let (Some((key, value)), None) = (entries.next(), entries.next()) else {
            return Err(DocshiftError::structure(format!(
                "each entry must have exactly one key, found {raw}"
            )));
        };

        Ok(StructureNode {
            key: key.clone(),
            value: StructureValue::parse(key, value)?,
        })
    }
}

impl StructureValue {
    fn parse(key: &str, raw: &Value) -> Result<StructureValue> {
        match raw {
            Value::String(path) => Ok(StructureValue::Leaf(path.clone())),
            Value::Array(_) => Ok(StructureValue::List(StructureNode::parse_list(raw)?)),
            Value::Object(fields) => {
                let path = match fields.get("path") {
                    None | Some(Value::Null) => None,
                    Some(Value::String(p)) => Some(p.clone()),
                    Some(other) => return Err(invalid(key, "path", other)),
                };

                let extra = match fields.get("extra") {
                    None | Some(Value::Null) => Vec::new(),
                    Some(Value::Array(items)) => items
                        .iter()
                        .map(|item| match item {
                            Value::String(s) => Ok(s.clone()),
                            other => Err(invalid(key, "extra", other)),
                        })
                        .collect::<Result<Vec<_>>>()?,
                    Some(other) => return Err(invalid(key, "extra", other)),
                };

                let subsections = match fields.get("subsections") {
                    None | Some(Value::Null) => Vec::new(),
                    Some(list) => StructureNode::parse_list(list).map_err(|e| {
                        DocshiftError::structure(format!("in subsections of {key}: {e}"))
                    })?,
                };

                Ok(StructureValue::Section(SectionSpec {
                    path,
                    extra,
                    subsections,
                }))
            }
            other => Err(DocshiftError::structure(format!(
                "Key: {key}, Value: {other}"
            ))),
        }
    }
}

fn invalid(key: &str, field: &str, value: &Value) -> DocshiftError {
    DocshiftError::structure(format!("Key: {key}, field `{field}` has invalid value {value}"))
}

// ---------------------------------------------------------------------------
// CopyPlan
// ---------------------------------------------------------------------------

/// One planned copy.
///
/// For a file source, `destination` is the directory the file lands in
/// (the basename is kept). For a directory source, it is the directory the
/// contents are merged into.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CopyPlanEntry {
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl CopyPlanEntry {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

impl fmt::Display for CopyPlanEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}",
            self.source.display(),
            self.destination.display()
        )
    }
}

/// Deduplicated set of copies. Iteration order is deterministic but carries
/// no structural meaning.
pub type CopyPlan = BTreeSet<CopyPlanEntry>;

// ---------------------------------------------------------------------------
// NavNode
// ---------------------------------------------------------------------------

/// A titled entry of the navigation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavNode {
    /// Display title (percent-decoded key).
    pub title: String,
    /// Document id relative to the docs root, without extension. For
    /// branches this is only a path prefix.
    pub id: String,
    /// `Some` for branches (possibly empty), `None` for document leaves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NavNode>>,
}

impl NavNode {
    /// Whether this node points at a concrete document.
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Collect the ids of all leaves below (and including) this node,
    /// depth-first, in tree order.
    pub fn collect_leaf_ids<'a>(&'a self, out: &mut Vec<&'a str>) {
        if self.is_leaf() {
            out.push(&self.id);
            return;
        }
        for child in self.children.iter().flatten() {
            child.collect_leaf_ids(out);
        }
    }
}

/// Depth-first leaf ids of a whole navigation forest.
pub fn leaf_ids(navigation: &[NavNode]) -> Vec<&str> {
    let mut ids = Vec::new();
    for node in navigation {
        node.collect_leaf_ids(&mut ids);
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_all_three_shapes() {
        let raw = json!([
            {"Intro": "intro.md"},
            {"Labs": [{"Lab 1": "lab1.md"}]},
            {"Lessons": {"path": "lessons", "extra": ["media/"], "subsections": [{"L1": "l1.md"}]}}
        ]);

        let nodes = StructureNode::parse_list(&raw).expect("valid structure");
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].value, StructureValue::Leaf("intro.md".into()));
        assert!(matches!(&nodes[1].value, StructureValue::List(items) if items.len() == 1));

        let StructureValue::Section(section) = &nodes[2].value else {
            panic!("expected a section");
        };
        assert_eq!(section.path.as_deref(), Some("lessons"));
        assert_eq!(section.extra, vec!["media/".to_string()]);
        assert_eq!(section.subsections[0].key, "L1");
    }

    #[test]
    fn section_without_subsections_is_empty() {
        let raw = json!([{"Assets": {"path": "assets", "extra": ["img"]}}]);
        let nodes = StructureNode::parse_list(&raw).unwrap();
        let StructureValue::Section(section) = &nodes[0].value else {
            panic!("expected a section");
        };
        assert!(section.subsections.is_empty());
    }

    #[test]
    fn rejects_scalar_value_naming_the_key() {
        let raw = json!([{"Broken": 42}]);
        let err = StructureNode::parse_list(&raw).unwrap_err();
        assert!(err.to_string().contains("Key: Broken"));
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn rejects_multi_key_entries() {
        let raw = json!([{"A": "a.md", "B": "b.md"}]);
        assert!(StructureNode::parse_list(&raw).is_err());
    }

    #[test]
    fn rejects_non_list_root() {
        let raw = json!({"Intro": "intro.md"});
        assert!(StructureNode::parse_list(&raw).is_err());
    }

    #[test]
    fn rejects_bad_nested_entry() {
        let raw = json!([{"Labs": [{"Lab 1": true}]}]);
        let err = StructureNode::parse_list(&raw).unwrap_err();
        assert!(err.to_string().contains("Lab 1"));
    }

    #[test]
    fn leaf_ids_are_depth_first() {
        let nav = vec![
            NavNode {
                title: "Intro".into(),
                id: "intro".into(),
                children: None,
            },
            NavNode {
                title: "Labs".into(),
                id: "Labs".into(),
                children: Some(vec![
                    NavNode {
                        title: "A".into(),
                        id: "Labs/a".into(),
                        children: None,
                    },
                    NavNode {
                        title: "Empty".into(),
                        id: "Labs/Empty".into(),
                        children: Some(vec![]),
                    },
                ]),
            },
        ];

        assert_eq!(leaf_ids(&nav), vec!["intro", "Labs/a"]);
    }
}
