//! The explicit module tree and its registration surface.
//!
//! A binary assembles every module it compiles in into a `ModuleSet` at
//! startup. Nothing registers ambiently: when the dispatcher first loads a
//! module it hands it a `Registrar`, and whatever the module declares there
//! is all the dispatcher will ever know about it.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use mortar_common::{Error, Result};

use crate::{
    handlers::{Handler, HandlerTable},
    name::ModulePath,
    registry::{CommandSpec, RegisteredCommand, validate_command_name},
};

/// A unit of compiled-in functionality contributing commands and exports.
pub trait Module: Send + Sync {
    /// Stable `::`-separated namespace, e.g. `repo::catalog`.
    fn namespace(&self) -> &str;

    /// Declare commands and exported functions.
    ///
    /// Called at most once per process, on first load of the module.
    fn register(&self, reg: &mut Registrar<'_>) -> Result<()>;
}

/// Everything one module declared while registering.
#[derive(Debug, Default)]
pub(crate) struct ModuleManifest {
    pub commands: Vec<RegisteredCommand>,
}

/// Registration surface handed to a module while it loads.
pub struct Registrar<'a> {
    module: &'a ModulePath,
    manifest: &'a mut ModuleManifest,
    exports: &'a mut HandlerTable,
}

impl<'a> Registrar<'a> {
    pub(crate) fn new(
        module: &'a ModulePath,
        manifest: &'a mut ModuleManifest,
        exports: &'a mut HandlerTable,
    ) -> Self {
        Self {
            module,
            manifest,
            exports,
        }
    }

    /// Register a command with its one-line description.
    pub fn command(&mut self, name: &str, description: &str, handler: Handler) -> Result<()> {
        if !validate_command_name(name) {
            return Err(Error::InvalidCommandName { name: name.into() });
        }
        if self.manifest.commands.iter().any(|c| c.spec.name == name) {
            return Err(Error::DuplicateCommand {
                name: name.into(),
                first: self.module.to_string(),
                second: self.module.to_string(),
            });
        }
        self.manifest.commands.push(RegisteredCommand {
            spec: CommandSpec {
                name: name.to_string(),
                description: description.to_string(),
            },
            handler,
            module: self.module.clone(),
        });
        Ok(())
    }

    /// Export a callable under this module's namespace for cross-module use.
    pub fn export(&mut self, short_name: &str, handler: Handler) -> Result<()> {
        if short_name.contains(crate::name::SEPARATOR) {
            return Err(Error::InvalidName {
                input: short_name.into(),
            });
        }
        // Name parsing rejects malformed short names and case-folds the
        // stored key so lookups spelled differently still hit.
        let qualified =
            crate::name::QualifiedName::parse(&self.module.qualify(short_name))?;
        self.exports.insert(qualified.to_string(), handler)
    }
}

/// The explicit module tree: every module the process can load, keyed by
/// module path.
pub struct ModuleSet {
    modules: BTreeMap<ModulePath, Box<dyn Module>>,
}

impl std::fmt::Debug for ModuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleSet")
            .field("modules", &self.modules.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ModuleSet {
    pub fn builder() -> ModuleSetBuilder {
        ModuleSetBuilder {
            modules: Vec::new(),
        }
    }

    pub fn contains(&self, path: &ModulePath) -> bool {
        self.modules.contains_key(path)
    }

    pub(crate) fn get(&self, path: &ModulePath) -> Option<&dyn Module> {
        self.modules.get(path).map(Box::as_ref)
    }

    /// Module paths in deterministic (sorted) order.
    pub fn paths(&self) -> impl Iterator<Item = &ModulePath> {
        self.modules.keys()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Fingerprint of the set: a digest over the crate version and the
    /// sorted module paths. A persisted index carrying a different
    /// fingerprint is stale in its entirety, so adding, removing, or
    /// renaming a module invalidates old index files without any explicit
    /// versioning step.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(env!("CARGO_PKG_VERSION").as_bytes());
        for path in self.modules.keys() {
            hasher.update([0u8]);
            hasher.update(path.as_str().as_bytes());
        }
        hasher
            .finalize()
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect()
    }
}

pub struct ModuleSetBuilder {
    modules: Vec<Box<dyn Module>>,
}

impl ModuleSetBuilder {
    pub fn module(mut self, module: Box<dyn Module>) -> Self {
        self.modules.push(module);
        self
    }

    /// Validate namespaces and freeze the set. Malformed namespaces and two
    /// modules claiming the same path are startup errors.
    pub fn build(self) -> Result<ModuleSet> {
        let mut modules: BTreeMap<ModulePath, Box<dyn Module>> = BTreeMap::new();
        for module in self.modules {
            let path = ModulePath::from_namespace(module.namespace())?;
            if modules.contains_key(&path) {
                return Err(Error::DuplicateNamespace {
                    namespace: module.namespace().to_string(),
                });
            }
            modules.insert(path, module);
        }
        Ok(ModuleSet { modules })
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    struct Stub {
        namespace: &'static str,
    }

    impl Module for Stub {
        fn namespace(&self) -> &str {
            self.namespace
        }

        fn register(&self, reg: &mut Registrar<'_>) -> Result<()> {
            reg.command("stub", "a stub command", Handler::new(|_| Ok(())))
        }
    }

    #[test]
    fn builder_rejects_duplicate_namespaces() {
        let err = ModuleSet::builder()
            .module(Box::new(Stub { namespace: "demo" }))
            .module(Box::new(Stub { namespace: "Demo" }))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateNamespace { .. }));
    }

    #[test]
    fn builder_rejects_malformed_namespaces() {
        let err = ModuleSet::builder()
            .module(Box::new(Stub { namespace: "bad space" }))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidName { .. }));
    }

    #[test]
    fn paths_are_sorted_and_case_folded() {
        let set = ModuleSet::builder()
            .module(Box::new(Stub {
                namespace: "Tools::Disk",
            }))
            .module(Box::new(Stub { namespace: "demo" }))
            .build()
            .unwrap();
        let paths: Vec<&str> = set.paths().map(ModulePath::as_str).collect();
        assert_eq!(paths, ["demo", "tools/disk"]);
    }

    #[test]
    fn fingerprint_tracks_set_membership() {
        let one = ModuleSet::builder()
            .module(Box::new(Stub { namespace: "demo" }))
            .build()
            .unwrap();
        let same = ModuleSet::builder()
            .module(Box::new(Stub { namespace: "demo" }))
            .build()
            .unwrap();
        let more = ModuleSet::builder()
            .module(Box::new(Stub { namespace: "demo" }))
            .module(Box::new(Stub { namespace: "extra" }))
            .build()
            .unwrap();

        assert_eq!(one.fingerprint(), same.fingerprint());
        assert_ne!(one.fingerprint(), more.fingerprint());
    }

    #[test]
    fn registrar_validates_command_names() {
        let path = ModulePath::from_namespace("demo").unwrap();
        let mut manifest = ModuleManifest::default();
        let mut exports = HandlerTable::default();
        let mut reg = Registrar::new(&path, &mut manifest, &mut exports);

        let err = reg
            .command("Not Valid", "", Handler::new(|_| Ok(())))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCommandName { .. }));

        reg.command("valid", "", Handler::new(|_| Ok(()))).unwrap();
        let err = reg.command("valid", "", Handler::new(|_| Ok(()))).unwrap_err();
        assert!(matches!(err, Error::DuplicateCommand { .. }));
    }

    #[test]
    fn registrar_qualifies_exports_under_the_namespace() {
        let path = ModulePath::from_namespace("lib::strings").unwrap();
        let mut manifest = ModuleManifest::default();
        let mut exports = HandlerTable::default();
        let mut reg = Registrar::new(&path, &mut manifest, &mut exports);

        reg.export("Titlecase", Handler::new(|_| Ok(()))).unwrap();
        let err = reg.export("bad name", Handler::new(|_| Ok(()))).unwrap_err();
        assert!(matches!(err, Error::InvalidName { .. }));
        drop(reg);

        // Stored under the case-folded fully-qualified name.
        assert!(exports.get("lib::strings::titlecase").is_some());
    }
}
