//! Relative link scanning for moved Markdown documents.
//!
//! Finds the two link shapes docshift rewrites (inline Markdown links and
//! iframe `src` attributes that start with `./` or `../`), formats rewritten
//! targets for the renderer, and splices replacements back into the text.

mod target;

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

pub use target::{
    ALTERNATE_EXTENSION, PRIMARY_EXTENSION, format_link_target, split_fragment,
    strip_doc_extension,
};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Which syntax a link was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// `[text](./path)` (image links included).
    Markdown,
    /// `<iframe ... src="./path" ...>`
    Iframe,
}

/// A relative link found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativeLink {
    pub kind: LinkKind,
    /// The raw link target, exactly as written.
    pub target: String,
    /// Byte range of `target` within the scanned text.
    pub span: Range<usize>,
}

/// A pending edit: replace `span` with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub span: Range<usize>,
    pub text: String,
}

// ---------------------------------------------------------------------------
// Scanning
// ---------------------------------------------------------------------------

static MD_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[.*?\]\((\.\.?/.*?)\)").expect("valid regex")
});

static IFRAME_SRC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<iframe.*?src="(\.\.?/.*?)".*?>"#).expect("valid regex")
});

/// Find every relative link in `content`, ordered by position.
///
/// Overlapping matches keep the earliest one.
pub fn find_relative_links(content: &str) -> Vec<RelativeLink> {
    let mut links: Vec<RelativeLink> = Vec::new();

    for (kind, re) in [
        (LinkKind::Markdown, &*MD_LINK_RE),
        (LinkKind::Iframe, &*IFRAME_SRC_RE),
    ] {
        for caps in re.captures_iter(content) {
            if let Some(m) = caps.get(1) {
                links.push(RelativeLink {
                    kind,
                    target: m.as_str().to_string(),
                    span: m.range(),
                });
            }
        }
    }

    links.sort_by_key(|link| link.span.start);
    links.dedup_by(|later, earlier| later.span.start < earlier.span.end);
    links
}

/// Splice `replacements` into `content`. Spans must not overlap.
pub fn apply_replacements(content: &str, replacements: &[Replacement]) -> String {
    let mut ordered: Vec<&Replacement> = replacements.iter().collect();
    ordered.sort_by_key(|r| r.span.start);

    let mut out = String::with_capacity(content.len());
    let mut cursor = 0;
    for r in ordered {
        out.push_str(&content[cursor..r.span.start]);
        out.push_str(&r.text);
        cursor = r.span.end;
    }
    out.push_str(&content[cursor..]);
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(content: &str) -> Vec<String> {
        find_relative_links(content)
            .into_iter()
            .map(|l| l.target)
            .collect()
    }

    #[test]
    fn finds_markdown_links_with_relative_prefix() {
        let md = "See [setup](./setup.md) and [up](../shared/a.md).";
        assert_eq!(targets(md), vec!["./setup.md", "../shared/a.md"]);
    }

    #[test]
    fn finds_image_links() {
        let md = "![diagram](../img/fig1.png)";
        assert_eq!(targets(md), vec!["../img/fig1.png"]);
    }

    #[test]
    fn ignores_absolute_and_bare_links() {
        let md = "[a](https://example.com) [b](/docs/x) [c](page.md) [d](#anchor)";
        assert!(find_relative_links(md).is_empty());
    }

    #[test]
    fn finds_iframe_sources() {
        let html = r#"<iframe width="600" src="../media/demo.html" frameborder="0"></iframe>"#;
        let links = find_relative_links(html);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].kind, LinkKind::Iframe);
        assert_eq!(links[0].target, "../media/demo.html");
    }

    #[test]
    fn spans_point_at_targets() {
        let md = "x [t](./a.md) y";
        let link = &find_relative_links(md)[0];
        assert_eq!(&md[link.span.clone()], "./a.md");
    }

    #[test]
    fn links_are_ordered_by_position() {
        let md = "<iframe src=\"./first.html\"></iframe>\n[second](./second.md)";
        assert_eq!(targets(md), vec!["./first.html", "./second.md"]);
    }

    #[test]
    fn apply_replacements_uses_spans() {
        // "./a.md" is a substring of "../a.md"; only the matched span changes.
        let md = "[one](../a.md) [two](./a.md)";
        let links = find_relative_links(md);
        let replacements = vec![Replacement {
            span: links[1].span.clone(),
            text: "b.md".into(),
        }];
        assert_eq!(
            apply_replacements(md, &replacements),
            "[one](../a.md) [two](b.md)"
        );
    }

    #[test]
    fn apply_replacements_without_edits_is_identity() {
        let md = "nothing to do";
        assert_eq!(apply_replacements(md, &[]), md);
    }
}
