mod capabilities;
mod file_access;
mod helpers;
mod library;
mod listing;
mod pattern;
mod sandbox;
mod settings;
mod template;
#[cfg(test)]
mod test_support;

pub use capabilities::{
    render, CapabilitySurface, Reporting, Reports, ENGINE_MODULE, TERRAIN_TILE_SIZE,
};
pub use file_access::{FileAccess, LocalFileAccess};
pub use library::{resolve_library_units, SCOPE_ESCALATION_PREFIX};
pub use listing::list_files;
pub use pattern::{glob_match, GlobPattern};
pub use sandbox::{Sandbox, SandboxOptions};
pub use settings::{default_map_settings, MAP_SETTINGS_BINDING};
pub use template::{
    deep_merge, TemplateEngine, DEFAULT_TEMPLATE_ROOT, ENTITY_ROOT, MAX_TEMPLATE_DEPTH,
    PARENT_ATTRIBUTE, TEMPLATE_EXTENSION,
};
