//! Module-tree command dispatch with a persisted command index.
//!
//! A binary assembles the modules it compiles in into a [`ModuleSet`]; each
//! module registers commands and exported callables through a [`Registrar`]
//! the first time it loads. The [`Dispatcher`] resolves an invocation to
//! the one owning module via the on-disk index (rebuilding it at most once
//! on a miss), loads that module, and invokes the handler with the
//! remaining arguments.

pub mod dispatch;
pub mod handlers;
pub mod index;
pub mod module;
pub mod name;
pub mod registry;

pub use {
    dispatch::{DEFAULT_COMMAND, Dispatcher},
    handlers::{Handler, HandlerTable},
    index::{CommandIndex, IndexEntry, IndexStore},
    module::{Module, ModuleSet, ModuleSetBuilder, Registrar},
    name::{ModulePath, QualifiedName},
    registry::{CommandRegistry, CommandSpec, RegisteredCommand},
};
