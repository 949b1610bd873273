use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info};
use mg_core::{MapgenError, MgValue};
use mg_parser::parse_json_document;
use rhai::{Array, Dynamic, EvalAltResult, Module, INT};

use crate::file_access::FileAccess;
use crate::helpers::rhai_bridge::{dynamic_to_mgvalue, mgvalue_to_dynamic, runtime_error};
use crate::library::resolve_library_units;
use crate::listing::list_files;
use crate::template::TemplateEngine;

/// Name under which the capability surface is visible to scripts.
pub const ENGINE_MODULE: &str = "Engine";
pub const TERRAIN_TILE_SIZE: INT = 4;

/// Which host reports end up in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reporting {
    pub script_log: bool,
    pub progress: bool,
    pub export: bool,
}

impl Default for Reporting {
    fn default() -> Self {
        Self {
            script_log: true,
            progress: true,
            export: true,
        }
    }
}

/// What scripts reported back to the host during a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reports {
    pub progress: Option<MgValue>,
    pub exports: Vec<MgValue>,
}

/// The fixed set of host operations scripts may call.
pub struct CapabilitySurface {
    files: Rc<dyn FileAccess>,
    templates: TemplateEngine,
    reporting: Reporting,
    pending_libraries: RefCell<Vec<Vec<String>>>,
    reports: RefCell<Reports>,
}

impl CapabilitySurface {
    pub fn new(
        files: Rc<dyn FileAccess>,
        template_root: impl Into<String>,
        reporting: Reporting,
    ) -> Self {
        let templates = TemplateEngine::new(Rc::clone(&files), template_root);
        Self {
            files,
            templates,
            reporting,
            pending_libraries: RefCell::new(Vec::new()),
            reports: RefCell::new(Reports::default()),
        }
    }

    pub fn files(&self) -> &dyn FileAccess {
        self.files.as_ref()
    }

    pub fn templates(&self) -> &TemplateEngine {
        &self.templates
    }

    pub fn reporting(&self) -> Reporting {
        self.reporting
    }

    /// Resolves a library for a running script. Its units are loaded by the
    /// sandbox once the calling statement completes.
    pub fn request_library(&self, path: &str) -> Result<(), MapgenError> {
        let units = resolve_library_units(self.files(), path)?;
        self.pending_libraries.borrow_mut().push(units);
        Ok(())
    }

    pub(crate) fn take_pending_libraries(&self) -> Vec<Vec<String>> {
        std::mem::take(&mut *self.pending_libraries.borrow_mut())
    }

    pub fn list_files(
        &self,
        path: &str,
        glob: &str,
        recurse: bool,
    ) -> Result<Vec<String>, MapgenError> {
        list_files(self.files(), path, glob, recurse)
    }

    pub fn read_json_file(&self, path: &str) -> Result<MgValue, MapgenError> {
        debug!("Read JSON File: {}", path);
        let source = self
            .files
            .read_to_string(path)
            .map_err(|error| MapgenError::file_read(path, error))?;
        parse_json_document(&source, path)
    }

    pub fn get_template(&self, path: &str) -> Result<MgValue, MapgenError> {
        self.templates.get_template(path)
    }

    pub fn terrain_tile_size(&self) -> INT {
        TERRAIN_TILE_SIZE
    }

    pub fn set_progress(&self, progress: MgValue) {
        if self.reporting.progress {
            info!("Engine Progress: {}", render(&progress));
        }
        self.reports.borrow_mut().progress = Some(progress);
    }

    pub fn export_map(&self, data: MgValue) {
        if self.reporting.export {
            info!("ExportMap Data: {}", render(&data));
        }
        self.reports.borrow_mut().exports.push(data);
    }

    pub fn reports(&self) -> Reports {
        self.reports.borrow().clone()
    }
}

/// Log form of a reported value: plain numbers and strings, JSON otherwise.
pub fn render(value: &MgValue) -> String {
    match value {
        MgValue::Number(number) => number.to_string(),
        MgValue::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| format!("{:?}", other)),
    }
}

/// Builds the `Engine` module exposing `surface` to scripts.
pub(crate) fn engine_module(surface: &Rc<CapabilitySurface>) -> Module {
    let mut module = Module::new();

    let host = Rc::clone(surface);
    module.set_native_fn("LoadLibrary", move |path: &str| {
        host.request_library(path).map_err(runtime_error)
    });

    let host = Rc::clone(surface);
    module.set_native_fn(
        "ListDirectoryFiles",
        move |path: &str, glob: &str, recurse: bool| -> Result<Array, Box<EvalAltResult>> {
            let listed = host
                .list_files(path, glob, recurse)
                .map_err(runtime_error)?;
            Ok(listed.into_iter().map(Dynamic::from).collect::<Array>())
        },
    );

    let host = Rc::clone(surface);
    module.set_native_fn(
        "ReadJSONFile",
        move |path: &str| -> Result<Dynamic, Box<EvalAltResult>> {
            let value = host.read_json_file(path).map_err(runtime_error)?;
            Ok(mgvalue_to_dynamic(&value))
        },
    );

    let host = Rc::clone(surface);
    module.set_native_fn(
        "GetTemplate",
        move |path: &str| -> Result<Dynamic, Box<EvalAltResult>> {
            let value = host.get_template(path).map_err(runtime_error)?;
            Ok(mgvalue_to_dynamic(&value))
        },
    );

    let host = Rc::clone(surface);
    module.set_native_fn(
        "GetTerrainTileSize",
        move || -> Result<INT, Box<EvalAltResult>> { Ok(host.terrain_tile_size()) },
    );

    let host = Rc::clone(surface);
    module.set_native_fn(
        "SetProgress",
        move |progress: Dynamic| -> Result<(), Box<EvalAltResult>> {
            let value = dynamic_to_mgvalue(progress).map_err(runtime_error)?;
            host.set_progress(value);
            Ok(())
        },
    );

    let host = Rc::clone(surface);
    module.set_native_fn(
        "ExportMap",
        move |data: Dynamic| -> Result<(), Box<EvalAltResult>> {
            let value = dynamic_to_mgvalue(data).map_err(runtime_error)?;
            host.export_map(value);
            Ok(())
        },
    );

    module
}
