//! Candidate file discovery.

use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

/// Lists every regular file under a directory, recursively.
///
/// No name or extension filtering happens here: whether a candidate is a
/// record of the target format is decided by content, downstream. Paths are
/// returned sorted so the traversal order is deterministic across runs. An
/// empty directory yields an empty list.
pub fn list_files(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    collect_files(root, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;

        if file_type.is_dir() {
            collect_files(&path, files)?;
        } else if file_type.is_file() {
            files.push(path);
        }
        // Symlinks and other non-regular entries are excluded.
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.dcm"), b"data").unwrap();
        std::fs::write(dir.path().join("a.txt"), b"text").unwrap();
        let nested = dir.path().join("series1");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(nested.join("c"), b"more").unwrap();
        dir
    }

    #[test]
    fn test_list_files_recursive_and_sorted() {
        let dir = create_test_tree();
        let files = list_files(dir.path()).unwrap();

        assert_eq!(files.len(), 3);
        let names: Vec<String> = files
            .iter()
            .map(|p| {
                p.strip_prefix(dir.path())
                    .unwrap()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        assert_eq!(names, vec!["a.txt", "b.dcm", "series1/c"]);
    }

    #[test]
    fn test_list_files_empty_directory() {
        let dir = TempDir::new().unwrap();
        let files = list_files(dir.path()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_list_files_excludes_directories() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("only_dirs")).unwrap();
        let files = list_files(dir.path()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            list_files(&missing),
            Err(IngestError::DirectoryNotFound { .. })
        ));
    }

    #[test]
    fn test_listing_is_stable_across_runs() {
        let dir = create_test_tree();
        let first = list_files(dir.path()).unwrap();
        let second = list_files(dir.path()).unwrap();
        assert_eq!(first, second);
    }
}
