//! Lexical path helpers.
//!
//! Everything here is textual: nothing touches the filesystem, so symlinks
//! are never resolved and `..` is folded purely by components.

use std::path::{Component, Path, PathBuf};

/// Join `fragment` onto `base` and normalize the result.
///
/// An absolute `fragment` replaces `base`. An empty fragment yields `base`.
pub fn join(base: &Path, fragment: impl AsRef<Path>) -> PathBuf {
    normalize(&base.join(fragment))
}

/// Fold `.` and `..` components without consulting the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` at the root stays at the root
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }

    out
}

/// File name without its last extension, Python `splitext` style.
///
/// A path ending in a separator has no stem. Leading dots are part of the
/// name (`.bashrc` has no extension).
pub fn stem(path: &str) -> &str {
    if path.ends_with('/') {
        return "";
    }

    let name = path.rsplit('/').next().unwrap_or(path);
    let leading = name.len() - name.trim_start_matches('.').len();
    match name[leading..].rfind('.') {
        Some(idx) => &name[..leading + idx],
        None => name,
    }
}

/// Directory part of a structure key: `"Labs/Setup"` gives `"Labs"`,
/// `"Intro"` gives `""`.
pub fn key_dir(key: &str) -> &str {
    match key.rsplit_once('/') {
        Some((dir, _)) => dir,
        None => "",
    }
}

/// Path of `path` relative to the directory `base`. Both should be
/// normalized absolute paths. Identical paths give `"."`.
pub fn relative_to(path: &Path, base: &Path) -> PathBuf {
    let target: Vec<Component<'_>> = path.components().collect();
    let from: Vec<Component<'_>> = base.components().collect();

    let common = target
        .iter()
        .zip(from.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for _ in common..from.len() {
        out.push("..");
    }
    for component in &target[common..] {
        out.push(component);
    }

    if out.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        out
    }
}

/// Render a relative path as a `/`-separated link.
pub fn to_link(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_normalizes_parent_segments() {
        assert_eq!(
            join(Path::new("/src/lessons"), "../shared/img/fig1.png"),
            PathBuf::from("/src/shared/img/fig1.png")
        );
        assert_eq!(join(Path::new("/src"), "./intro.md"), PathBuf::from("/src/intro.md"));
    }

    #[test]
    fn join_absolute_fragment_wins() {
        assert_eq!(join(Path::new("/src"), "/other/a.md"), PathBuf::from("/other/a.md"));
    }

    #[test]
    fn join_empty_fragment_is_base() {
        assert_eq!(join(Path::new("/dst/docs"), ""), PathBuf::from("/dst/docs"));
    }

    #[test]
    fn normalize_stops_at_root() {
        assert_eq!(normalize(Path::new("/a/../../b")), PathBuf::from("/b"));
        assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
    }

    #[test]
    fn stem_behaves_like_splitext() {
        assert_eq!(stem("lessons/l1.md"), "l1");
        assert_eq!(stem("archive.tar.gz"), "archive.tar");
        assert_eq!(stem("shared"), "shared");
        assert_eq!(stem(".bashrc"), ".bashrc");
        assert_eq!(stem("lab/"), "");
        assert_eq!(stem(""), "");
    }

    #[test]
    fn key_dir_takes_parent_segments() {
        assert_eq!(key_dir("Labs/Setup"), "Labs");
        assert_eq!(key_dir("A/B/C"), "A/B");
        assert_eq!(key_dir("Intro"), "");
    }

    #[test]
    fn relative_to_walks_up_and_down() {
        assert_eq!(
            relative_to(
                Path::new("/dst/docs/Shared/img/fig1.png"),
                Path::new("/dst/docs/Lessons")
            ),
            PathBuf::from("../Shared/img/fig1.png")
        );
        assert_eq!(
            relative_to(Path::new("/dst/docs/a.md"), Path::new("/dst/docs")),
            PathBuf::from("a.md")
        );
        assert_eq!(
            relative_to(Path::new("/dst/docs"), Path::new("/dst/docs")),
            PathBuf::from(".")
        );
    }

    #[test]
    fn to_link_uses_forward_slashes() {
        assert_eq!(to_link(Path::new("../Lab 1/setup.md")), "../Lab 1/setup.md");
    }
}
