use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// File system seen by the capability surface.
///
/// Paths are the strings scripts pass around; implementations decide how they
/// map onto storage. An absent path must fail with `io::ErrorKind::NotFound`.
pub trait FileAccess {
    fn read_to_string(&self, path: &str) -> io::Result<String>;

    /// Names of the direct entries of `path`, in enumeration order.
    fn read_dir(&self, path: &str) -> io::Result<Vec<String>>;

    /// Whether `path` itself is a directory. Symlinks are not followed.
    fn is_dir(&self, path: &str) -> io::Result<bool>;
}

/// Local disk access with relative paths resolved against a working directory.
#[derive(Debug, Clone)]
pub struct LocalFileAccess {
    working_dir: PathBuf,
}

impl LocalFileAccess {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.working_dir.join(path)
    }
}

impl FileAccess for LocalFileAccess {
    fn read_to_string(&self, path: &str) -> io::Result<String> {
        fs::read_to_string(self.resolve(path))
    }

    fn read_dir(&self, path: &str) -> io::Result<Vec<String>> {
        let directory = self.resolve(path);
        if !fs::metadata(&directory)?.is_dir() {
            return Err(io::Error::other(format!("{} is not a directory", path)));
        }

        let mut names = Vec::new();
        for entry in WalkDir::new(directory)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.map_err(io::Error::from)?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    fn is_dir(&self, path: &str) -> io::Result<bool> {
        Ok(fs::symlink_metadata(self.resolve(path))?.is_dir())
    }
}

#[cfg(test)]
mod file_access_tests {
    use super::*;
    use crate::test_support::{temp_dir, write_file};

    #[test]
    fn read_dir_lists_direct_entries_sorted_by_name() {
        let root = temp_dir("file-access-sorted");
        write_file(&root.join("libs/b.rhai"), "");
        write_file(&root.join("libs/a.rhai"), "");
        write_file(&root.join("libs/nested/c.rhai"), "");

        let files = LocalFileAccess::new(&root);
        assert_eq!(
            files.read_dir("libs").expect("dir should list"),
            vec!["a.rhai", "b.rhai", "nested"]
        );
        assert!(files.is_dir("libs/nested").expect("stat nested"));
        assert!(!files.is_dir("libs/a.rhai").expect("stat file"));
    }

    #[test]
    fn missing_paths_report_not_found() {
        let root = temp_dir("file-access-missing");
        std::fs::create_dir_all(&root).expect("root");
        let files = LocalFileAccess::new(&root);

        let error = files.is_dir("absent").expect_err("absent path");
        assert_eq!(error.kind(), io::ErrorKind::NotFound);
        let error = files.read_to_string("absent.json").expect_err("absent file");
        assert_eq!(error.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn read_dir_rejects_regular_files() {
        let root = temp_dir("file-access-not-dir");
        write_file(&root.join("libs/a.rhai"), "");
        let files = LocalFileAccess::new(&root);

        let error = files.read_dir("libs/a.rhai").expect_err("file is not a directory");
        assert!(error.to_string().contains("is not a directory"));
    }

    #[test]
    fn relative_paths_resolve_against_working_dir() {
        let root = temp_dir("file-access-relative");
        write_file(&root.join("data/settings.json"), "{}");
        let files = LocalFileAccess::new(root.join("maps/random"));
        std::fs::create_dir_all(files.working_dir()).expect("working dir");

        assert_eq!(
            files
                .read_to_string("../../data/settings.json")
                .expect("escalated path should read"),
            "{}"
        );
    }
}
