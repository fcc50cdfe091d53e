//! Relative link resolution for moved documents.
//!
//! Every relative link in a copied document was written against the
//! document's original location. The resolver maps the referenced source
//! path through the copy plan to its destination and rewrites the link
//! relative to where the document now lives.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use docshift_markdown::{
    ALTERNATE_EXTENSION, PRIMARY_EXTENSION, Replacement, apply_replacements,
    find_relative_links, format_link_target, split_fragment,
};
use docshift_shared::{CopyPlan, DocshiftError, NavNode, Result, leaf_ids};

use crate::paths;

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

/// Source/destination lookup tables derived from a copy plan.
#[derive(Debug, Default)]
pub struct LinkMapping {
    src_to_dst: BTreeMap<PathBuf, PathBuf>,
    dst_to_src: BTreeMap<PathBuf, PathBuf>,
    /// Source keys, most specific first.
    candidates: Vec<PathBuf>,
}

impl LinkMapping {
    /// Build the mapping. Must run after the plan was executed: a file
    /// source copied into a directory maps to the file inside it.
    pub fn from_plan(plan: &CopyPlan) -> Self {
        let mut mapping = Self::default();

        for entry in plan {
            let src = paths::normalize(&entry.source);
            let mut dst = paths::normalize(&entry.destination);

            if src.is_file() && dst.is_dir() {
                if let Some(name) = src.file_name() {
                    dst.push(name);
                }
            }

            mapping.src_to_dst.insert(src.clone(), dst.clone());
            // later entries win on destination collisions
            mapping.dst_to_src.insert(dst, src);
        }

        let mut candidates: Vec<PathBuf> = mapping.src_to_dst.keys().cloned().collect();
        candidates.sort_by(|a, b| {
            b.components()
                .count()
                .cmp(&a.components().count())
                .then_with(|| a.cmp(b))
        });
        mapping.candidates = candidates;
        mapping
    }

    /// Directory a destination document was authored in.
    pub fn source_dir_of(&self, document: &Path) -> Option<PathBuf> {
        if let Some(src) = self.dst_to_src.get(document) {
            return src.parent().map(Path::to_path_buf);
        }

        let containing = document.parent()?;
        for ancestor in containing.ancestors() {
            if let Some(src) = self.dst_to_src.get(ancestor) {
                let rest = containing.strip_prefix(ancestor).ok()?;
                return Some(src.join(rest));
            }
        }
        None
    }

    /// Destination of a source path, through the longest copied prefix.
    pub fn map_reference(&self, reference: &Path) -> Option<PathBuf> {
        let source = self
            .candidates
            .iter()
            .find(|candidate| reference.starts_with(candidate))?;
        let rest = reference.strip_prefix(source).ok()?;
        let dst = self.src_to_dst.get(source)?;

        if rest.as_os_str().is_empty() {
            Some(dst.clone())
        } else {
            Some(dst.join(rest))
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// A non-fatal problem found while resolving links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinkWarning {
    /// The link points at something that was never copied.
    UnresolvedLink {
        document: PathBuf,
        link: String,
        reference: PathBuf,
    },
    /// Neither `<id>.md` nor `<id>.mdx` exists.
    AmbiguousFile { id: String },
    /// The document has no entry in the copy plan.
    UnmappedDocument { document: PathBuf },
    /// The document is not valid UTF-8.
    NonUtf8Document { document: PathBuf },
}

impl fmt::Display for LinkWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkWarning::UnresolvedLink {
                document,
                link,
                reference,
            } => write!(
                f,
                "couldn't find {} in source files, skipping link {link} in {}",
                reference.display(),
                document.display()
            ),
            LinkWarning::AmbiguousFile { id } => write!(
                f,
                "no {PRIMARY_EXTENSION} or {ALTERNATE_EXTENSION} file for document {id}"
            ),
            LinkWarning::UnmappedDocument { document } => write!(
                f,
                "document {} has no copy source, links left as-is",
                document.display()
            ),
            LinkWarning::NonUtf8Document { document } => write!(
                f,
                "document {} is not valid UTF-8, links left as-is",
                document.display()
            ),
        }
    }
}

/// Outcome of a resolver run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ResolveReport {
    pub documents_scanned: usize,
    pub links_rewritten: usize,
    pub warnings: Vec<LinkWarning>,
}

impl ResolveReport {
    fn warn(&mut self, warning: LinkWarning) {
        warn!(%warning, "link resolution");
        self.warnings.push(warning);
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Rewrite relative links in every navigation document under `docs_root`.
///
/// Only I/O failures are fatal; everything else becomes a warning.
#[instrument(skip_all, fields(docs_root = %docs_root.display()))]
pub fn resolve_links(
    plan: &CopyPlan,
    navigation: &[NavNode],
    docs_root: &Path,
) -> Result<ResolveReport> {
    let mapping = LinkMapping::from_plan(plan);
    let docs_root = paths::normalize(docs_root);
    let mut report = ResolveReport::default();
    let mut seen = BTreeSet::new();

    for id in leaf_ids(navigation) {
        if !seen.insert(id) {
            continue;
        }

        let Some(document) = locate_document(&docs_root, id) else {
            report.warn(LinkWarning::AmbiguousFile { id: id.to_string() });
            continue;
        };
        let Some(source_dir) = mapping.source_dir_of(&document) else {
            report.warn(LinkWarning::UnmappedDocument { document });
            continue;
        };

        let content = match fs::read_to_string(&document) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                report.warn(LinkWarning::NonUtf8Document { document });
                continue;
            }
            Err(e) => return Err(DocshiftError::io(&document, e)),
        };

        let rewritten = rewrite_document(&mapping, &document, &content, &source_dir, &mut report)?;
        report.links_rewritten += rewritten;
        report.documents_scanned += 1;
    }

    info!(
        documents = report.documents_scanned,
        links = report.links_rewritten,
        warnings = report.warnings.len(),
        "links resolved"
    );
    Ok(report)
}

fn locate_document(docs_root: &Path, id: &str) -> Option<PathBuf> {
    [PRIMARY_EXTENSION, ALTERNATE_EXTENSION]
        .into_iter()
        .map(|ext| paths::join(docs_root, format!("{id}.{ext}")))
        .find(|candidate| candidate.is_file())
}

fn rewrite_document(
    mapping: &LinkMapping,
    document: &Path,
    content: &str,
    source_dir: &Path,
    report: &mut ResolveReport,
) -> Result<usize> {
    let document_dir = document.parent().unwrap_or(document);

    let mut replacements = Vec::new();
    for link in find_relative_links(content) {
        let (path, suffix) = split_fragment(&link.target);
        let reference = paths::join(source_dir, path);

        let Some(destination) = mapping.map_reference(&reference) else {
            report.warn(LinkWarning::UnresolvedLink {
                document: document.to_path_buf(),
                link: link.target.clone(),
                reference,
            });
            continue;
        };

        let relative = paths::to_link(&paths::relative_to(&destination, document_dir));
        let text = format_link_target(&relative, suffix);
        if text != link.target {
            debug!(from = %link.target, to = %text, "rewriting link");
            replacements.push(Replacement {
                span: link.span,
                text,
            });
        }
    }

    if replacements.is_empty() {
        return Ok(0);
    }

    let rewritten = apply_replacements(content, &replacements);
    fs::write(document, rewritten).map_err(|e| DocshiftError::io(document, e))?;
    Ok(replacements.len())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
