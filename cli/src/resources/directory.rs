//! Working-directory resource.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::{Applicable, Resource, ResourceChange, ResourceState};

/// A directory that must exist.
#[derive(Debug, Clone)]
pub struct DirectoryResource {
    /// Directory path.
    pub path: PathBuf,
}

impl DirectoryResource {
    /// Create a directory resource for `path`.
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl Applicable for DirectoryResource {
    fn description(&self) -> String {
        self.path.display().to_string()
    }

    fn apply(&self) -> Result<ResourceChange> {
        std::fs::create_dir_all(&self.path)
            .with_context(|| format!("creating directory {}", self.path.display()))?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for DirectoryResource {
    fn current_state(&self) -> Result<ResourceState> {
        if self.path.is_dir() {
            Ok(ResourceState::Correct)
        } else if self.path.exists() {
            Ok(ResourceState::Invalid {
                reason: "path exists but is not a directory".to_string(),
            })
        } else {
            Ok(ResourceState::Missing)
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_is_created_with_parents() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("home").join("AIProjects");
        let resource = DirectoryResource::new(&dir);
        assert_eq!(resource.current_state().unwrap(), ResourceState::Missing);
        assert_eq!(resource.ensure().unwrap(), ResourceChange::Applied);
        assert!(dir.is_dir());
        assert_eq!(resource.ensure().unwrap(), ResourceChange::AlreadyCorrect);
    }

    #[test]
    fn file_in_place_is_invalid() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("AIProjects");
        std::fs::write(&path, "").unwrap();
        let resource = DirectoryResource::new(&path);
        assert!(matches!(
            resource.current_state().unwrap(),
            ResourceState::Invalid { .. }
        ));
        assert!(resource.ensure().is_err());
    }
}
