//! Link target helpers: fragments, document extensions, renderer syntax.

/// Extension tried first when locating a document by id.
pub const PRIMARY_EXTENSION: &str = "md";

/// Extension tried when the primary one is absent.
pub const ALTERNATE_EXTENSION: &str = "mdx";

/// Split a link target into its path and a trailing `#fragment` / `?query`.
pub fn split_fragment(target: &str) -> (&str, &str) {
    match target.find(['#', '?']) {
        Some(idx) => target.split_at(idx),
        None => (target, ""),
    }
}

/// Strip a trailing `.md` / `.mdx` from a link path.
pub fn strip_doc_extension(path: &str) -> &str {
    path.strip_suffix(".mdx")
        .or_else(|| path.strip_suffix(".md"))
        .unwrap_or(path)
}

/// Format a rewritten link target.
///
/// The renderer only accepts targets with spaces in angle brackets, and
/// resolves those without the document extension.
pub fn format_link_target(path: &str, suffix: &str) -> String {
    if path.contains(' ') || suffix.contains(' ') {
        format!("<{}{suffix}>", strip_doc_extension(path))
    } else {
        format!("{path}{suffix}")
    }
}
