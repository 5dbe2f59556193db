//! Resolve command-line inputs to the pages to lint

use crate::config::{ConfigError, FilesConfig};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};

fn glob_set(patterns: &[String]) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| ConfigError::Invalid(format!("Invalid pattern '{}': {}", pattern, e)))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| ConfigError::Invalid(e.to_string()))
}

/// Expand files, directories and glob patterns into a sorted list of pages
///
/// Files named explicitly are always kept. Directories are searched for
/// `files.include` patterns; `files.exclude` applies to both directories
/// and glob matches.
pub fn collect_files(inputs: &[String], files: &FilesConfig) -> Result<Vec<PathBuf>, ConfigError> {
    let exclude = glob_set(&files.exclude)?;
    let mut found = Vec::new();

    for input in inputs {
        let path = Path::new(input);
        if path.is_file() {
            found.push(path.to_path_buf());
        } else if path.is_dir() {
            for include in &files.include {
                let pattern = path.join(include);
                expand(&pattern.to_string_lossy(), &exclude, &mut found)?;
            }
        } else {
            expand(input, &exclude, &mut found)?;
        }
    }

    found.sort();
    found.dedup();
    Ok(found)
}

fn expand(pattern: &str, exclude: &GlobSet, found: &mut Vec<PathBuf>) -> Result<(), ConfigError> {
    let paths = glob::glob(pattern)
        .map_err(|e| ConfigError::Invalid(format!("Invalid pattern '{}': {}", pattern, e)))?;

    for entry in paths {
        match entry {
            Ok(path) if path.is_file() => {
                if exclude.is_match(&path) {
                    log::debug!("Excluded {}", path.display());
                } else {
                    found.push(path);
                }
            }
            Ok(_) => {}
            Err(e) => log::warn!("Skipping unreadable path: {}", e),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, "<p/>").unwrap();
        path
    }

    #[test]
    fn test_directory_uses_include_and_exclude() {
        let dir = TempDir::new().unwrap();
        let index = touch(dir.path(), "index.jsp");
        let nested = touch(dir.path(), "web/part.jspf");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "node_modules/lib/page.html");

        let files = collect_files(
            &[dir.path().to_string_lossy().into_owned()],
            &FilesConfig::default(),
        )
        .unwrap();

        let mut expected = vec![index, nested];
        expected.sort();
        assert_eq!(files, expected);
    }

    #[test]
    fn test_explicit_file_is_always_kept() {
        let dir = TempDir::new().unwrap();
        let txt = touch(dir.path(), "page.txt");

        let files = collect_files(
            &[txt.to_string_lossy().into_owned()],
            &FilesConfig::default(),
        )
        .unwrap();
        assert_eq!(files, vec![txt]);
    }

    #[test]
    fn test_glob_pattern_and_dedup() {
        let dir = TempDir::new().unwrap();
        let a = touch(dir.path(), "a.html");
        touch(dir.path(), "b.jsp");

        let pattern = dir.path().join("*.html").to_string_lossy().into_owned();
        let files = collect_files(
            &[pattern.clone(), pattern, a.to_string_lossy().into_owned()],
            &FilesConfig::default(),
        )
        .unwrap();
        assert_eq!(files, vec![a]);
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        let result = collect_files(&["[".to_string()], &FilesConfig::default());
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
