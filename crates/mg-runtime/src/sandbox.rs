use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use log::{debug, info};
use mg_core::{MapgenError, MgValue};
use rhai::module_resolvers::DummyModuleResolver;
use rhai::{Dynamic, Engine, OptimizationLevel, Scope, AST};

use crate::capabilities::{engine_module, CapabilitySurface, Reporting, Reports, ENGINE_MODULE};
use crate::file_access::{FileAccess, LocalFileAccess};
use crate::helpers::rhai_bridge::{dynamic_to_mgvalue, mgvalue_to_dynamic};
use crate::library::resolve_library_units;
use crate::settings::{default_map_settings, MAP_SETTINGS_BINDING};
use crate::template::DEFAULT_TEMPLATE_ROOT;

#[derive(Debug, Clone)]
pub struct SandboxOptions {
    pub working_dir: PathBuf,
    pub template_root: String,
    pub map_settings: MgValue,
    pub reporting: Reporting,
}

impl SandboxOptions {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            template_root: DEFAULT_TEMPLATE_ROOT.to_string(),
            map_settings: default_map_settings(),
            reporting: Reporting::default(),
        }
    }
}

/// An execution context: one Rhai engine, the bindings scripts have declared
/// so far, and the capability surface they were given.
///
/// Units run one top-level statement at a time. Libraries requested with
/// `Engine::LoadLibrary` are loaded between statements, so whatever they
/// declare is usable by the rest of the requesting unit.
///
/// Script functions cannot see the top-level scope, so a copy of its bindings
/// is republished after every top-level statement and served to function
/// bodies through the variable resolver.
pub struct Sandbox {
    engine: Engine,
    scope: Scope<'static>,
    globals: Rc<RefCell<HashMap<String, Dynamic>>>,
    functions: AST,
    surface: Rc<CapabilitySurface>,
}

impl Sandbox {
    pub fn new(options: SandboxOptions) -> Self {
        let files: Rc<dyn FileAccess> = Rc::new(LocalFileAccess::new(options.working_dir));
        let surface = Rc::new(CapabilitySurface::new(
            files,
            options.template_root,
            options.reporting,
        ));
        Self::create_context(surface, &options.map_settings)
    }

    pub fn create_context(surface: Rc<CapabilitySurface>, map_settings: &MgValue) -> Self {
        let mut engine = Engine::new();
        // Top-level declarations must survive; each one becomes a scope binding.
        engine.set_optimization_level(OptimizationLevel::None);
        engine.set_module_resolver(DummyModuleResolver::new());
        engine.register_static_module(ENGINE_MODULE, engine_module(&surface).into());
        let globals = Rc::new(RefCell::new(HashMap::new()));
        register_utilities(&mut engine, surface.reporting());
        register_globals(
            &mut engine,
            mgvalue_to_dynamic(map_settings),
            Rc::clone(&globals),
        );

        Self {
            engine,
            scope: Scope::new(),
            globals,
            functions: AST::empty(),
            surface,
        }
    }

    pub fn surface(&self) -> &CapabilitySurface {
        &self.surface
    }

    pub fn reports(&self) -> Reports {
        self.surface.reports()
    }

    /// Current value of a top-level binding declared by a loaded unit.
    pub fn binding(&self, name: &str) -> Option<MgValue> {
        self.scope
            .get_value::<Dynamic>(name)
            .and_then(|value| dynamic_to_mgvalue(value).ok())
    }

    /// Compiles and runs one unit of source in this context.
    ///
    /// Functions the unit defines are committed once it compiles; top-level
    /// bindings are committed statement by statement until a fault stops it.
    pub fn load_into(&mut self, source_text: &str, source_name: &str) -> Result<(), MapgenError> {
        debug!("Load Script: {}", source_name);
        let mut unit = self
            .engine
            .compile(source_text)
            .map_err(|error| MapgenError::script(source_name, error.to_string()))?;
        unit.set_source(source_name);
        self.functions = self.functions.merge(&unit.clone_functions_only());

        let mut unit_start = self.scope.len();
        for statement in unit.statements().to_vec() {
            let mut step = AST::new([statement], self.functions.shared_lib().clone());
            step.set_source(source_name);
            let outcome = self.engine.run_ast_with_scope(&mut self.scope, &step);
            self.publish_globals();
            if let Err(error) = outcome {
                self.surface.take_pending_libraries();
                return Err(MapgenError::script(source_name, error.to_string()));
            }
            let library_start = self.scope.len();
            self.load_pending_libraries()?;
            unit_start += self.hoist_library_bindings(unit_start, library_start);
        }
        Ok(())
    }

    /// Copies the top-level bindings where function bodies can resolve them.
    /// Later declarations shadow earlier ones with the same name.
    fn publish_globals(&self) {
        let mut globals = self.globals.borrow_mut();
        globals.clear();
        for (name, _constant, value) in self.scope.iter_raw() {
            globals.insert(name.to_string(), value.clone());
        }
    }

    /// Loads a script file, or every file directly inside a directory.
    pub fn load_library(&mut self, path: &str) -> Result<(), MapgenError> {
        let units = resolve_library_units(self.surface.files(), path)?;
        for unit in units {
            self.load_unit(&unit)?;
        }
        Ok(())
    }

    fn load_pending_libraries(&mut self) -> Result<(), MapgenError> {
        for units in self.surface.take_pending_libraries() {
            for unit in units {
                self.load_unit(&unit)?;
            }
        }
        Ok(())
    }

    /// Moves bindings declared by nested library loads in front of the running
    /// unit's own bindings. Compiled units address their own variables by stack
    /// offset, so those offsets must not change while the unit runs.
    fn hoist_library_bindings(&mut self, unit_start: usize, library_start: usize) -> usize {
        let added = self.scope.len() - library_start;
        if added == 0 {
            return 0;
        }

        let mut entries: Vec<(String, bool, Dynamic)> = self
            .scope
            .iter_raw()
            .map(|(name, constant, value)| (name.to_string(), constant, value.clone()))
            .collect();
        let mut library = entries.split_off(library_start);
        let unit = entries.split_off(unit_start);
        entries.append(&mut library);
        entries.extend(unit);

        self.scope.clear();
        for (name, constant, value) in entries {
            if constant {
                self.scope.push_constant_dynamic(name, value);
            } else {
                self.scope.push_dynamic(name, value);
            }
        }
        added
    }

    fn load_unit(&mut self, unit: &str) -> Result<(), MapgenError> {
        let source = self
            .surface
            .files()
            .read_to_string(unit)
            .map_err(|error| MapgenError::file_read(unit, error))?;
        self.load_into(&source, unit)
    }
}

fn register_utilities(engine: &mut Engine, reporting: Reporting) {
    engine.on_print(move |text| {
        if reporting.script_log {
            info!("Print: {}", text);
        }
    });
    engine.on_debug(|text, source, position| {
        debug!("Debug: {} ({} {})", text, source.unwrap_or("<script>"), position);
    });
    engine.register_fn("log", move |first: Dynamic| {
        script_log(reporting, &[first]);
    });
    engine.register_fn("log", move |first: Dynamic, second: Dynamic| {
        script_log(reporting, &[first, second]);
    });
    engine.register_fn(
        "log",
        move |first: Dynamic, second: Dynamic, third: Dynamic| {
            script_log(reporting, &[first, second, third]);
        },
    );
    engine.register_fn(
        "markForTranslationWithContext",
        |_context: Dynamic, id: Dynamic| id,
    );
    // Script values are copied on assignment, so there is nothing to freeze.
    engine.register_fn("deepfreeze", |value: Dynamic| value);
}

fn script_log(reporting: Reporting, parts: &[Dynamic]) {
    if reporting.script_log {
        let line = parts
            .iter()
            .map(Dynamic::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        info!("Log: {}", line);
    }
}

/// Resolves `g_MapSettings` everywhere, and context bindings inside function
/// bodies. Names the running frame declares itself are left to Rhai.
fn register_globals(
    engine: &mut Engine,
    map_settings: Dynamic,
    globals: Rc<RefCell<HashMap<String, Dynamic>>>,
) {
    engine.on_var(move |name, _index, context| {
        if name == MAP_SETTINGS_BINDING {
            return Ok(Some(map_settings.clone()));
        }
        if context.scope().contains(name) {
            return Ok(None);
        }
        Ok(globals.borrow().get(name).cloned())
    });
}
