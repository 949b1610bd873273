use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use mg_core::{MapgenError, MgValue};
use mg_parser::parse_json_document;
use mg_runtime::{
    default_map_settings, Reporting, Reports, Sandbox, SandboxOptions, DEFAULT_TEMPLATE_ROOT,
};

pub const DEFAULT_LIBRARY: &str = "../../globalscripts";

#[derive(Debug, Clone)]
pub struct RunMapScriptOptions {
    pub script: String,
    pub library: Option<String>,
    pub working_dir: PathBuf,
    pub template_root: Option<String>,
    pub map_settings: Option<MgValue>,
    pub reporting: Reporting,
}

impl RunMapScriptOptions {
    pub fn new(script: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
            library: None,
            working_dir: working_dir.into(),
            template_root: None,
            map_settings: None,
            reporting: Reporting::default(),
        }
    }
}

pub fn create_sandbox(options: &RunMapScriptOptions) -> Sandbox {
    Sandbox::new(SandboxOptions {
        working_dir: options.working_dir.clone(),
        template_root: options
            .template_root
            .clone()
            .unwrap_or_else(|| DEFAULT_TEMPLATE_ROOT.to_string()),
        map_settings: options
            .map_settings
            .clone()
            .unwrap_or_else(default_map_settings),
        reporting: options.reporting,
    })
}

/// Loads the shared library and then the map script into one sandbox and
/// returns what the scripts reported.
pub fn run_map_script(options: RunMapScriptOptions) -> Result<Reports, MapgenError> {
    let mut sandbox = create_sandbox(&options);
    let library = options.library.as_deref().unwrap_or(DEFAULT_LIBRARY);

    sandbox.load_library(library)?;
    sandbox.load_library(&options.script)?;

    let reports = sandbox.reports();
    info!(
        "Map script {} finished with {} export(s).",
        options.script,
        reports.exports.len()
    );
    Ok(reports)
}

/// Reads a settings document; its top-level keys replace the defaults.
pub fn load_map_settings(path: &Path) -> Result<MgValue, MapgenError> {
    let display = path.display().to_string();
    let source =
        fs::read_to_string(path).map_err(|error| MapgenError::file_read(display.as_str(), error))?;
    let overrides = parse_json_document(&source, &display)?;
    let MgValue::Map(overrides) = overrides else {
        return Err(MapgenError::document_parse(
            display,
            "map settings must be a JSON object",
        ));
    };

    let mut settings = default_map_settings();
    if let Some(fields) = settings.as_map_mut() {
        fields.extend(overrides);
    }
    Ok(settings)
}
