use std::io;

use log::debug;
use mg_core::MapgenError;

use crate::file_access::FileAccess;

/// Prefix applied once when a path is missing: scripts are written for a
/// working directory two levels below the one they may actually run from.
pub const SCOPE_ESCALATION_PREFIX: &str = "../../";

/// One logical library load: the requested path and whether it already went
/// through the scope escalation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LoadRequest<'a> {
    pub(crate) original: &'a str,
    pub(crate) path: String,
    pub(crate) escalated: bool,
}

impl<'a> LoadRequest<'a> {
    pub(crate) fn new(path: &'a str) -> Self {
        Self {
            original: path,
            path: path.to_string(),
            escalated: false,
        }
    }

    /// The retry request, or `None` once the single escalation has been spent.
    pub(crate) fn escalate(&self) -> Option<Self> {
        if self.escalated {
            return None;
        }
        Some(Self {
            original: self.original,
            path: format!("{}{}", SCOPE_ESCALATION_PREFIX, self.path),
            escalated: true,
        })
    }
}

/// Expands a library path into the source units to load, in load order.
///
/// A directory yields its direct non-directory entries; a file yields itself.
pub fn resolve_library_units(
    files: &dyn FileAccess,
    path: &str,
) -> Result<Vec<String>, MapgenError> {
    let mut request = LoadRequest::new(path);
    loop {
        debug!("Load Library: {}", request.path);
        match files.is_dir(&request.path) {
            Ok(true) => return directory_units(files, &request.path),
            Ok(false) => return Ok(vec![request.path]),
            Err(error) if error.kind() == io::ErrorKind::NotFound => match request.escalate() {
                Some(next) => request = next,
                None => {
                    return Err(MapgenError::LibraryNotFound {
                        path: request.original.to_string(),
                    })
                }
            },
            Err(error) => return Err(MapgenError::file_read(request.path, error)),
        }
    }
}

fn directory_units(files: &dyn FileAccess, directory: &str) -> Result<Vec<String>, MapgenError> {
    let entries = files
        .read_dir(directory)
        .map_err(|error| MapgenError::file_read(directory, error))?;

    let mut units = Vec::with_capacity(entries.len());
    for name in entries {
        let unit = format!("{}/{}", directory, name);
        let is_dir = files
            .is_dir(&unit)
            .map_err(|error| MapgenError::file_read(unit.as_str(), error))?;
        if !is_dir {
            units.push(unit);
        }
    }
    Ok(units)
}
