//! File-system resource helpers.
use anyhow::{Context as _, Result};
use std::path::Path;

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Names of the entries directly inside `dir`, sorted.
///
/// Unreadable directories yield an empty list; the result is only used for
/// diagnostics.
#[must_use]
pub fn list_dir_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(std::result::Result::ok)
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

/// Remove a directory tree, clearing read-only flags if the first attempt
/// fails.
///
/// Git marks object files read-only, which makes a plain
/// [`std::fs::remove_dir_all`] fail on Windows.
///
/// # Errors
///
/// Returns an error if the tree still cannot be removed.
pub fn remove_dir_force(dir: &Path) -> Result<()> {
    if std::fs::remove_dir_all(dir).is_ok() || !dir.exists() {
        return Ok(());
    }
    clear_readonly(dir);
    std::fs::remove_dir_all(dir).with_context(|| format!("removing {}", dir.display()))
}

fn clear_readonly(path: &Path) {
    if let Ok(meta) = std::fs::symlink_metadata(path) {
        let mut perms = meta.permissions();
        if perms.readonly() {
            #[allow(clippy::permissions_set_readonly_false)]
            perms.set_readonly(false);
            std::fs::set_permissions(path, perms).ok();
        }
        if meta.is_dir()
            && let Ok(entries) = std::fs::read_dir(path)
        {
            for entry in entries.flatten() {
                clear_readonly(&entry.path());
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn ensure_parent_dir_creates_ancestors() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("a").join("b").join(".bashrc");
        ensure_parent_dir(&file).unwrap();
        assert!(tmp.path().join("a").join("b").is_dir());
    }

    #[test]
    fn list_dir_names_is_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("b.py"), "").unwrap();
        std::fs::write(tmp.path().join("a.txt"), "").unwrap();
        std::fs::create_dir(tmp.path().join("c")).unwrap();
        assert_eq!(list_dir_names(tmp.path()), vec!["a.txt", "b.py", "c"]);
    }

    #[test]
    fn list_dir_names_missing_dir_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(list_dir_names(&tmp.path().join("absent")).is_empty());
    }

    #[test]
    fn remove_dir_force_handles_readonly_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("repo");
        std::fs::create_dir_all(dir.join(".git").join("objects")).unwrap();
        let obj = dir.join(".git").join("objects").join("pack");
        std::fs::write(&obj, "data").unwrap();
        let mut perms = std::fs::metadata(&obj).unwrap().permissions();
        perms.set_readonly(true);
        std::fs::set_permissions(&obj, perms).unwrap();

        remove_dir_force(&dir).unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn remove_dir_force_missing_dir_is_ok() {
        let tmp = tempfile::tempdir().unwrap();
        remove_dir_force(&tmp.path().join("absent")).unwrap();
    }
}
