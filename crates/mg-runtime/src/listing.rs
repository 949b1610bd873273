use std::io;

use log::debug;
use mg_core::MapgenError;

use crate::file_access::FileAccess;
use crate::library::LoadRequest;
use crate::pattern::GlobPattern;

/// Lists files under `path` whose names match `glob`.
///
/// With `recurse` set, the matches of each subdirectory are spliced in at the
/// position of that subdirectory; without it subdirectories are skipped.
pub fn list_files(
    files: &dyn FileAccess,
    path: &str,
    glob: &str,
    recurse: bool,
) -> Result<Vec<String>, MapgenError> {
    let pattern = GlobPattern::new(glob).map_err(|error| {
        MapgenError::host(
            "GLOB_PATTERN_INVALID",
            format!("Invalid glob \"{}\": {}", glob, error),
        )
    })?;
    let mut out = Vec::new();
    list_into(files, path, &pattern, recurse, &mut out)?;
    Ok(out)
}

fn list_into(
    files: &dyn FileAccess,
    path: &str,
    pattern: &GlobPattern,
    recurse: bool,
    out: &mut Vec<String>,
) -> Result<(), MapgenError> {
    let mut request = LoadRequest::new(path);
    let directory = loop {
        let clean = strip_trailing_separator(&request.path);
        debug!("List Directory Files: {} recurse={}", clean, recurse);
        match files.is_dir(clean) {
            Ok(true) => break clean.to_string(),
            Ok(false) => return Err(MapgenError::file_read(clean, "not a directory")),
            Err(error) if error.kind() == io::ErrorKind::NotFound => match request.escalate() {
                Some(next) => request = next,
                None => {
                    return Err(MapgenError::DirectoryNotFound {
                        path: request.original.to_string(),
                    })
                }
            },
            Err(error) => return Err(MapgenError::file_read(clean, error)),
        }
    };

    let entries = files
        .read_dir(&directory)
        .map_err(|error| MapgenError::file_read(directory.as_str(), error))?;
    for name in entries {
        let entry = format!("{}/{}", directory, name);
        let is_dir = files
            .is_dir(&entry)
            .map_err(|error| MapgenError::file_read(entry.as_str(), error))?;
        if is_dir {
            if recurse {
                list_into(files, &entry, pattern, recurse, out)?;
            }
            continue;
        }
        if pattern.matches(&name) {
            out.push(entry);
        }
    }
    Ok(())
}

fn strip_trailing_separator(path: &str) -> &str {
    path.strip_suffix('/').unwrap_or(path)
}

#[cfg(test)]
mod listing_tests {
    use super::*;
    use crate::file_access::LocalFileAccess;
    use crate::test_support::{temp_dir, write_file};

    fn fixture(name: &str) -> std::path::PathBuf {
        let root = temp_dir(name);
        write_file(&root.join("maps/a.js"), "");
        write_file(&root.join("maps/b.json"), "");
        write_file(&root.join("maps/c/d.js"), "");
        write_file(&root.join("maps/c/e/f.js"), "");
        write_file(&root.join("maps/z.js"), "");
        root
    }

    #[test]
    fn non_recursive_lists_direct_matches_only() {
        let root = fixture("listing-flat");
        let files = LocalFileAccess::new(&root);

        let listed = list_files(&files, "maps", "*.js", false).expect("list");
        assert_eq!(listed, vec!["maps/a.js", "maps/z.js"]);
    }

    #[test]
    fn recursive_inlines_subdirectories_at_their_position() {
        let root = fixture("listing-recursive");
        let files = LocalFileAccess::new(&root);

        let listed = list_files(&files, "maps/", "*.js", true).expect("list");
        assert_eq!(
            listed,
            vec!["maps/a.js", "maps/c/d.js", "maps/c/e/f.js", "maps/z.js"]
        );
    }

    #[test]
    fn directories_matching_the_glob_are_skipped_without_recurse() {
        let root = fixture("listing-dir-match");
        write_file(&root.join("maps/old.js/g.js"), "");
        let files = LocalFileAccess::new(&root);

        let listed = list_files(&files, "maps", "*.js", false).expect("list");
        assert_eq!(listed, vec!["maps/a.js", "maps/z.js"]);

        let listed = list_files(&files, "maps", "*.js", true).expect("list");
        assert_eq!(
            listed,
            vec![
                "maps/a.js",
                "maps/c/d.js",
                "maps/c/e/f.js",
                "maps/old.js/g.js",
                "maps/z.js"
            ]
        );
    }

    #[test]
    fn listing_a_regular_file_fails() {
        let root = fixture("listing-file");
        let files = LocalFileAccess::new(&root);

        let error = list_files(&files, "maps/a.js", "*.js", false).expect_err("not a directory");
        assert_eq!(
            error,
            MapgenError::FileRead {
                path: "maps/a.js".to_string(),
                message: "not a directory".to_string()
            }
        );
    }

    #[test]
    fn missing_directory_escalates_once() {
        let root = fixture("listing-escalated");
        let working = root.join("x/y");
        std::fs::create_dir_all(&working).expect("working dir");
        let files = LocalFileAccess::new(&working);

        let listed = list_files(&files, "maps/", "*.json", false).expect("list");
        assert_eq!(listed, vec!["../../maps/b.json"]);

        let error = list_files(&files, "absent/", "*", false).expect_err("missing dir");
        assert_eq!(
            error,
            MapgenError::DirectoryNotFound {
                path: "absent/".to_string()
            }
        );
    }
}
