//! Path safety helpers for writer paths.

use crate::error::DeckError;
use std::path::{Path, PathBuf};

const MAX_FILE_NAME_LEN: usize = 100;

/// Reduce `name` to a safe bare filename.
///
/// Strips any directory components, replaces characters outside the word
/// class (letters, digits, `-`, `_`, `.`) with `_`, trims leading dots and
/// dashes, and clamps the result to 100 characters. Empty results become
/// `"unnamed"`.
pub fn sanitize_file_name(name: &str) -> String {
    let bare = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    let replaced: String = bare
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = replaced.trim_start_matches(['.', '-']);
    if trimmed.is_empty() {
        return "unnamed".to_string();
    }
    trimmed.chars().take(MAX_FILE_NAME_LEN).collect()
}

/// Join sanitized components under `base`, refusing results that escape it.
///
/// `base` must exist. Each component is sanitized before joining; if the
/// joined path already exists it is additionally resolved (following
/// symlinks) and checked for containment.
pub fn safe_join(base: &Path, parts: &[&str]) -> Result<PathBuf, DeckError> {
    let base = dunce::canonicalize(base)?;
    let mut joined = base.clone();
    for part in parts {
        joined.push(sanitize_file_name(part));
    }

    let resolved = if joined.exists() {
        dunce::canonicalize(&joined)?
    } else {
        joined.clone()
    };
    if !resolved.starts_with(&base) {
        return Err(DeckError::PathEscape(resolved));
    }
    Ok(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_path_components() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("/abs/path/agent.md"), "agent.md");
    }

    #[test]
    fn replaces_unsafe_characters() {
        assert_eq!(sanitize_file_name("my agent!.md"), "my_agent_.md");
        assert_eq!(sanitize_file_name("a;b|c"), "a_b_c");
    }

    #[test]
    fn trims_leading_dots_and_dashes() {
        assert_eq!(sanitize_file_name(".hidden"), "hidden");
        assert_eq!(sanitize_file_name("--flag"), "flag");
    }

    #[test]
    fn empty_becomes_unnamed() {
        assert_eq!(sanitize_file_name(""), "unnamed");
        assert_eq!(sanitize_file_name("..."), "unnamed");
    }

    #[test]
    fn clamps_length() {
        let long = "a".repeat(300);
        assert_eq!(sanitize_file_name(&long).len(), MAX_FILE_NAME_LEN);
    }

    #[test]
    fn safe_join_neutralizes_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let joined = safe_join(dir.path(), &["..", "escape.md"]).unwrap();
        assert!(joined.starts_with(dir.path().canonicalize().unwrap()));
        assert!(joined.ends_with("escape.md"));
    }

    #[cfg(unix)]
    #[test]
    fn safe_join_rejects_symlink_escape() {
        let outside = tempfile::tempdir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();

        let err = safe_join(dir.path(), &["link"]).unwrap_err();
        assert!(matches!(err, DeckError::PathEscape(_)));
    }
}
