//! Entry-point discovery in the checkout root.
//!
//! Candidates are the top-level source files, sorted by name.  A file named
//! in the priority list wins (earlier names first); otherwise the first file
//! whose content contains a framework import signature is chosen.
use std::path::{Path, PathBuf};

use super::fs::list_dir_names;
use crate::error::ProvisionError;

/// Why a file was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionReason {
    /// Its name is in the priority list.
    ConventionalName,
    /// Its content imports the dashboard framework.
    FrameworkImport,
}

/// Outcome of discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPointSelection {
    /// Directory that was searched.
    pub root: PathBuf,
    /// Every candidate file name, sorted.
    pub candidates: Vec<String>,
    /// Chosen file name and why, if any file qualified.
    pub selected: Option<(String, SelectionReason)>,
}

impl EntryPointSelection {
    /// Full path of the selected file.
    #[must_use]
    pub fn selected_path(&self) -> Option<PathBuf> {
        self.selected
            .as_ref()
            .map(|(name, _)| self.root.join(name))
    }
}

/// Rules for picking an entry point.
#[derive(Debug, Clone)]
pub struct EntryPointRules<'a> {
    /// Source file extension without the dot.
    pub extension: &'a str,
    /// Conventional names in priority order, compared case-sensitively.
    pub priority_names: &'a [String],
    /// Substrings marking a framework import.
    pub import_signatures: &'a [String],
}

impl EntryPointRules<'_> {
    /// Discover the entry point in `root`.
    ///
    /// The listing is non-recursive.  Files that cannot be read are skipped
    /// during the content match.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::ResourceMissing`] when `root` holds no
    /// source file at all.
    pub fn discover(&self, root: &Path) -> Result<EntryPointSelection, ProvisionError> {
        let suffix = format!(".{}", self.extension);
        let candidates: Vec<String> = list_dir_names(root)
            .into_iter()
            .filter(|name| name.ends_with(&suffix) && root.join(name).is_file())
            .collect();

        if candidates.is_empty() {
            return Err(ProvisionError::ResourceMissing {
                resource: format!("*{suffix} files"),
                location: root.to_path_buf(),
                listing: list_dir_names(root),
            });
        }

        let by_name = self
            .priority_names
            .iter()
            .find(|wanted| candidates.iter().any(|c| c == *wanted))
            .map(|name| (name.clone(), SelectionReason::ConventionalName));

        let selected = by_name.or_else(|| {
            candidates
                .iter()
                .find(|name| self.imports_framework(&root.join(name)))
                .map(|name| (name.clone(), SelectionReason::FrameworkImport))
        });

        Ok(EntryPointSelection {
            root: root.to_path_buf(),
            candidates,
            selected,
        })
    }

    fn imports_framework(&self, path: &Path) -> bool {
        std::fs::read(path).is_ok_and(|bytes| {
            let content = String::from_utf8_lossy(&bytes);
            self.import_signatures
                .iter()
                .any(|sig| content.contains(sig.as_str()))
        })
    }
}
