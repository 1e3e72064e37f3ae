//! Handler references and the table of exported callables.
//!
//! Exports give one module's functions to another under a plain name: a
//! module registers them at load time and `Dispatcher::callable` hands out
//! clones keyed by fully-qualified name. Entries are direct function
//! references; nothing is generated or persisted.

use std::{collections::BTreeMap, fmt, sync::Arc};

use mortar_common::{Error, Result};

type HandlerFn = dyn Fn(&[String]) -> anyhow::Result<()> + Send + Sync;

/// A cloneable, directly-invocable handler reference.
///
/// Handlers receive the argument tokens left after the command name and own
/// their parsing, output, and failure reporting.
#[derive(Clone)]
pub struct Handler(Arc<HandlerFn>);

impl Handler {
    pub fn new(f: impl Fn(&[String]) -> anyhow::Result<()> + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn invoke(&self, args: &[String]) -> anyhow::Result<()> {
        (self.0)(args)
    }

    /// Whether two handles refer to the same underlying function.
    pub fn same_as(&self, other: &Handler) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler(..)")
    }
}

/// Exported callables keyed by fully-qualified lowercase name.
#[derive(Debug, Default)]
pub struct HandlerTable {
    entries: BTreeMap<String, Handler>,
}

impl HandlerTable {
    /// Insert an export. Re-registering an existing name is an error; loads
    /// are idempotent one level up, so a duplicate here is a real conflict.
    pub fn insert(&mut self, name: String, handler: Handler) -> Result<()> {
        if self.entries.contains_key(&name) {
            return Err(Error::DuplicateExport { name });
        }
        self.entries.insert(name, handler);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Handler> {
        self.entries.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
