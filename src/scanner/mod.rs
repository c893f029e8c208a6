//! File scanner for discovering primary simulation data files.
//!
//! This module walks a base folder and yields every file whose name
//! matches the configured primary prefix and suffix. Within each
//! directory, files come before subdirectories and both are sorted by
//! name, so a folder's own runs are listed before those nested below it.

use anyhow::{Context, Result};
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Configuration for file scanning.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Required file name prefix (e.g. `H5`)
    pub primary_prefix: String,
    /// Required file name suffix (e.g. `_data_test.dat`)
    pub primary_suffix: String,
    /// Follow symbolic links while walking
    pub follow_links: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::from(&crate::config::ScannerConfig::default())
    }
}

impl From<&crate::config::ScannerConfig> for ScanConfig {
    fn from(config: &crate::config::ScannerConfig) -> Self {
        Self {
            primary_prefix: config.primary_prefix.clone(),
            primary_suffix: config.primary_suffix.clone(),
            follow_links: config.follow_links,
        }
    }
}

/// File scanner for discovering primary data files.
pub struct RunScanner {
    config: ScanConfig,
    base: PathBuf,
}

impl RunScanner {
    /// Create a new scanner rooted at `base`.
    pub fn new(base: PathBuf, config: ScanConfig) -> Self {
        Self { config, base }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Lazily iterate over matching primary files.
    ///
    /// Fails up front if the base folder cannot be read. Unreadable
    /// entries further down the tree are logged and skipped.
    pub fn scan(&self) -> Result<impl Iterator<Item = PathBuf> + '_> {
        fs::read_dir(&self.base)
            .with_context(|| format!("Cannot read base folder {}", self.base.display()))?;

        let walker = WalkDir::new(&self.base)
            .follow_links(self.config.follow_links)
            .sort_by(files_first);

        Ok(walker
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| is_file(entry) && self.matches(entry))
            .map(|entry| {
                debug!("Found primary file: {}", entry.path().display());
                entry.into_path()
            }))
    }

    /// Check if a directory entry is a primary data file by name.
    fn matches(&self, entry: &DirEntry) -> bool {
        entry
            .file_name()
            .to_str()
            .is_some_and(|name| self.matches_name(name))
    }

    /// Check if a file name matches the primary file pattern.
    pub fn matches_name(&self, name: &str) -> bool {
        name.starts_with(&self.config.primary_prefix)
            && name.ends_with(&self.config.primary_suffix)
    }
}

fn files_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

// Symlinks to regular files count even when links are not followed.
fn is_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "0 1.0 2.0\n").unwrap();
    }

    #[test]
    fn test_matches_name() {
        let scanner = RunScanner::new(PathBuf::from("."), ScanConfig::default());
        assert!(scanner.matches_name("H51_run_data_test.dat"));
        assert!(scanner.matches_name("H5_data_test.dat"));
        assert!(!scanner.matches_name("H61_run_data_test.dat"));
        assert!(!scanner.matches_name("H51_run_estado_cells_test.dat"));
        assert!(!scanner.matches_name("H51_run_data_test.dat.bak"));
    }

    #[test]
    fn test_scan_recursive_sorted() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("b_H52_G6/H52_a_data_test.dat"));
        touch(&root.join("a_H51_G6/H51_b_data_test.dat"));
        touch(&root.join("a_H51_G6/H51_a_data_test.dat"));
        touch(&root.join("a_H51_G6/nested/H53_data_test.dat"));
        touch(&root.join("a_H51_G6/H51_a_estado_cells_test.dat"));
        touch(&root.join("a_H51_G6/notes.txt"));
        touch(&root.join("H7_other/H71_data_test.dat"));

        let scanner = RunScanner::new(root.to_path_buf(), ScanConfig::default());
        let found: Vec<PathBuf> = scanner
            .scan()
            .unwrap()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            found,
            vec![
                PathBuf::from("a_H51_G6/H51_a_data_test.dat"),
                PathBuf::from("a_H51_G6/H51_b_data_test.dat"),
                PathBuf::from("a_H51_G6/nested/H53_data_test.dat"),
                PathBuf::from("b_H52_G6/H52_a_data_test.dat"),
            ]
        );
    }

    #[test]
    fn test_scan_lists_files_before_subdirectories() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("H51_G6_10_capilares/0_rerun/H51_data_test.dat"));
        touch(&root.join("H51_G6_10_capilares/H51_data_test.dat"));
        touch(&root.join("H50_data_test.dat"));

        let scanner = RunScanner::new(root.to_path_buf(), ScanConfig::default());
        let found: Vec<PathBuf> = scanner
            .scan()
            .unwrap()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            found,
            vec![
                PathBuf::from("H50_data_test.dat"),
                PathBuf::from("H51_G6_10_capilares/H51_data_test.dat"),
                PathBuf::from("H51_G6_10_capilares/0_rerun/H51_data_test.dat"),
            ]
        );
    }

    #[test]
    fn test_scan_ignores_matching_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("H51_data_test.dat")).unwrap();

        let scanner = RunScanner::new(dir.path().to_path_buf(), ScanConfig::default());
        assert_eq!(scanner.scan().unwrap().count(), 0);
    }

    #[test]
    fn test_scan_empty_folder() {
        let dir = TempDir::new().unwrap();
        let scanner = RunScanner::new(dir.path().to_path_buf(), ScanConfig::default());
        assert_eq!(scanner.scan().unwrap().count(), 0);
    }

    #[test]
    fn test_scan_missing_base_folder_fails() {
        let dir = TempDir::new().unwrap();
        let scanner = RunScanner::new(dir.path().join("missing"), ScanConfig::default());
        assert!(scanner.scan().is_err());
    }
}
