use std::path::{Path, PathBuf};

use mg_core::MapgenError;

use crate::map_cli_cwd;

pub(crate) fn resolve_working_dir(cwd: Option<&Path>) -> Result<PathBuf, MapgenError> {
    let current = std::env::current_dir().map_err(map_cli_cwd)?;
    let absolute = match cwd {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => current.join(path),
        None => return Ok(current),
    };

    if !absolute.exists() {
        return Err(MapgenError::host(
            "CLI_CWD_NOT_FOUND",
            format!("cwd does not exist: {}", absolute.display()),
        ));
    }

    if !absolute.is_dir() {
        return Err(MapgenError::host(
            "CLI_CWD_NOT_DIR",
            format!("cwd is not a directory: {}", absolute.display()),
        ));
    }

    Ok(absolute)
}
