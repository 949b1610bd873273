use std::fs;
use std::path::Path;

use mg_core::{MapgenError, MgValue};

use crate::{map_cli_export_encode, map_cli_export_write};

/// Writes every exported value, in export order, as one JSON array.
pub(crate) fn save_exports(path: &Path, exports: &[MgValue]) -> Result<(), MapgenError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(map_cli_export_write)?;

    let payload = serde_json::to_string_pretty(exports).map_err(map_cli_export_encode)?;
    fs::write(path, payload).map_err(map_cli_export_write)
}
