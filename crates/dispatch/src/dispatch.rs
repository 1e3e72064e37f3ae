//! The dispatcher: resolve a command name, load its one owning module,
//! build the registry over loaded modules, invoke.
//!
//! A full sweep of the module set happens only inside an index rebuild,
//! and a rebuild is attempted at most once per lookup: a genuinely
//! unknown command fails terminally rather than looping.

use std::{collections::BTreeMap, path::Path};

use tracing::{debug, info, warn};

use mortar_common::{Error, Result};

use crate::{
    handlers::{Handler, HandlerTable},
    index::{CommandIndex, IndexEntry, IndexStore},
    module::{ModuleManifest, ModuleSet, Registrar},
    name::{ModulePath, QualifiedName},
    registry::CommandRegistry,
};

/// Command assumed when the invocation names none.
pub const DEFAULT_COMMAND: &str = "help";

/// Per-process dispatch session over an explicit module set.
pub struct Dispatcher {
    modules: ModuleSet,
    loaded: BTreeMap<ModulePath, ModuleManifest>,
    exports: HandlerTable,
    store: IndexStore,
    fingerprint: String,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("modules", &self.modules)
            .field("loaded", &self.loaded.keys().collect::<Vec<_>>())
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

impl Dispatcher {
    /// Build a dispatcher rooted at an existing cache directory.
    ///
    /// The cache root is a hard requirement: without somewhere writable to
    /// keep the command index, every invocation would pay a full sweep.
    pub fn new(modules: ModuleSet, cache_root: &Path) -> Result<Self> {
        if !cache_root.is_dir() {
            return Err(Error::CacheDirMissing {
                path: cache_root.to_path_buf(),
            });
        }
        let fingerprint = modules.fingerprint();
        Ok(Self {
            modules,
            loaded: BTreeMap::new(),
            exports: HandlerTable::default(),
            store: IndexStore::in_dir(cache_root),
            fingerprint,
        })
    }

    /// Load a module, running its registration exactly once per process.
    ///
    /// Returns whether a load actually happened; repeated loads are no-ops.
    pub fn load(&mut self, path: &ModulePath) -> Result<bool> {
        if self.loaded.contains_key(path) {
            return Ok(false);
        }
        let module = self
            .modules
            .get(path)
            .ok_or_else(|| Error::UnknownModule {
                path: path.to_string(),
            })?;
        let mut manifest = ModuleManifest::default();
        let mut registrar = Registrar::new(path, &mut manifest, &mut self.exports);
        module.register(&mut registrar)?;
        debug!(module = %path, commands = manifest.commands.len(), "loaded module");
        self.loaded.insert(path.clone(), manifest);
        Ok(true)
    }

    fn load_all(&mut self) -> Result<()> {
        let paths: Vec<ModulePath> = self.modules.paths().cloned().collect();
        for path in &paths {
            self.load(path)?;
        }
        Ok(())
    }

    /// Build the registry from whatever modules are loaded right now.
    pub fn build_registry(&self) -> Result<CommandRegistry> {
        CommandRegistry::from_manifests(self.loaded.iter())
    }

    /// Load every module, rebuild the full index, and persist it.
    pub fn rebuild_index(&mut self) -> Result<CommandIndex> {
        info!(modules = self.modules.len(), "rebuilding command index");
        self.load_all()?;
        let registry = self.build_registry()?;
        let mut index = CommandIndex {
            fingerprint: self.fingerprint.clone(),
            ..CommandIndex::default()
        };
        for (name, command) in registry.iter() {
            index.commands.insert(
                name.to_string(),
                IndexEntry {
                    module: command.module.to_string(),
                    description: command.spec.description.clone(),
                },
            );
        }
        self.store.save(&index)?;
        Ok(index)
    }

    /// Resolve the module owning `name`, rebuilding the index at most once.
    pub fn resolve_module_for_command(&mut self, name: &str) -> Result<ModulePath> {
        let index = self.store.load();
        if index.fingerprint == self.fingerprint {
            if let Some(path) = self.lookup(&index, name) {
                debug!(command = name, module = %path, "index hit");
                return Ok(path);
            }
        } else if !index.commands.is_empty() {
            debug!("command index was written by a different module set, ignoring");
        }
        let rebuilt = self.rebuild_index()?;
        self.lookup(&rebuilt, name)
            .ok_or_else(|| Error::UnknownCommand {
                name: name.to_string(),
            })
    }

    /// An index entry only counts if its module is still in the set.
    fn lookup(&self, index: &CommandIndex, name: &str) -> Option<ModulePath> {
        let entry = index.commands.get(name)?;
        let path = ModulePath::parse(&entry.module).ok()?;
        self.modules.contains(&path).then_some(path)
    }

    /// Resolve, load, and invoke the command named by `argv`.
    ///
    /// `argv` keeps the conventional shape: program name, command name,
    /// then the command's own arguments, which are passed through
    /// untouched. Handler errors propagate untranslated.
    pub fn dispatch(&mut self, argv: &[String]) -> anyhow::Result<()> {
        let command = argv
            .get(1)
            .map(String::as_str)
            .unwrap_or(DEFAULT_COMMAND)
            .to_string();
        let module = self.resolve_module_for_command(&command)?;
        self.load(&module)?;
        let registry = self.build_registry()?;
        let resolved = registry.get(&command).ok_or_else(|| {
            // Possible when a stale index names a module that no longer
            // declares the command; the caller sees an ordinary miss.
            warn!(command = %command, module = %module, "resolved module does not declare the command");
            Error::UnknownCommand {
                name: command.clone(),
            }
        })?;
        let args = argv.get(2..).unwrap_or_default();
        debug!(command = %command, module = %module, "dispatching");
        resolved.handler.invoke(args)
    }

    /// Return a plain callable for a fully-qualified exported function,
    /// loading its owning module first if needed.
    ///
    /// Idempotent: repeated calls for one name register the module once and
    /// hand out clones of the same handler.
    pub fn callable(&mut self, name: &str) -> Result<Handler> {
        let qualified = QualifiedName::parse(name)?;
        let module = qualified.module_path()?;
        self.load(&module)?;
        self.exports
            .get(&qualified.to_string())
            .ok_or_else(|| Error::UnknownExport {
                module: module.to_string(),
                name: qualified.short_name().to_string(),
            })
    }

    /// Path of the persisted index this session reads and writes.
    pub fn index_path(&self) -> &Path {
        self.store.path()
    }
}
