use std::path::{Path, PathBuf};

use anyhow::Result;

/// Walk `root` recursively, returning every regular file whose
/// extension is exactly `.feature` (case-sensitive), in
/// directory-walk order. Walk errors abort the enumeration.
pub fn find_feature_files(root: &Path) -> Result<Vec<PathBuf>> {
    let walker = ignore::WalkBuilder::new(root)
        .hidden(false)
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .sort_by_file_path(Ord::cmp)
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("feature") {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}
