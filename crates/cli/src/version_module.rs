//! Built-in `version` command.

use mortar_dispatch::{Handler, Module, Registrar};

pub struct VersionModule;

impl Module for VersionModule {
    fn namespace(&self) -> &str {
        "builtin::version"
    }

    fn register(&self, reg: &mut Registrar<'_>) -> mortar_common::Result<()> {
        reg.command(
            "version",
            "print the mortar version",
            Handler::new(|_args| {
                println!("mortar {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }),
        )
    }
}
