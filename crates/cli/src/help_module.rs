//! Built-in `help` command.
//!
//! Help is an ordinary module, not a dispatcher special case: dispatching
//! `help` walks the normal index path, so a cold cache has been rebuilt by
//! the time the handler runs and the persisted index it prints from is
//! complete.

use std::path::{Path, PathBuf};

use mortar_dispatch::{Handler, IndexStore, Module, Registrar, index::INDEX_FILENAME};

pub struct HelpModule {
    index_path: PathBuf,
}

impl HelpModule {
    pub fn new(cache_root: &Path) -> Self {
        Self {
            index_path: cache_root.join(INDEX_FILENAME),
        }
    }
}

impl Module for HelpModule {
    fn namespace(&self) -> &str {
        "builtin::help"
    }

    fn register(&self, reg: &mut Registrar<'_>) -> mortar_common::Result<()> {
        let index_path = self.index_path.clone();
        reg.command(
            "help",
            "list available commands",
            Handler::new(move |_args| {
                let index = IndexStore::new(index_path.clone()).load();
                if index.commands.is_empty() {
                    println!("no commands registered");
                    return Ok(());
                }
                let width = index.commands.keys().map(String::len).max().unwrap_or(0);
                println!("commands:");
                for (name, entry) in &index.commands {
                    if entry.description.is_empty() {
                        println!("  {name}");
                    } else {
                        println!("  {name:<width$}  {}", entry.description);
                    }
                }
                Ok(())
            }),
        )
    }
}
