//! Directory scanning by file suffix

use std::path::{Path, PathBuf};

use crate::error::{PipeDbError, Result};

/// List the entries of `dir` whose file name ends with `suffix`
///
/// Matching is case-insensitive, directories are skipped, and the scan is
/// not recursive. Results are sorted by file name.
pub fn read_dir_with_suffix(dir: impl AsRef<Path>, suffix: &str) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let read_error = |source| PipeDbError::DirectoryRead {
        dir: dir.to_path_buf(),
        source,
    };

    let suffix = suffix.to_lowercase();
    let mut results = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        if entry.file_type().map_err(read_error)?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        if name.to_string_lossy().to_lowercase().ends_with(&suffix) {
            results.push(entry.path());
        }
    }

    results.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_suffix_match_is_case_insensitive_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.MP3", "a.mp3", "c.wav", "notes.txt"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }

        let found = read_dir_with_suffix(dir.path(), ".Mp3").unwrap();
        let names: Vec<String> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.mp3", "b.MP3"]);
        assert!(found.iter().all(|p| p.starts_with(dir.path())));
    }

    #[test]
    fn test_directories_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("chapter.mp3")).unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("deep.mp3"), b"").unwrap();
        fs::write(dir.path().join("top.mp3"), b"").unwrap();

        let found = read_dir_with_suffix(dir.path(), "mp3").unwrap();
        assert_eq!(found, vec![dir.path().join("top.mp3")]);
    }

    #[test]
    fn test_empty_match() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"").unwrap();
        assert!(read_dir_with_suffix(dir.path(), ".usx").unwrap().is_empty());
    }

    #[test]
    fn test_missing_directory_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");

        match read_dir_with_suffix(&missing, ".mp3") {
            Err(PipeDbError::DirectoryRead { dir: d, .. }) => assert_eq!(d, missing),
            other => panic!("expected directory read error, got {:?}", other),
        }
    }
}
