//! The in-memory command registry, rebuilt on every dispatch.
//!
//! The registry is scoped to whatever modules have been loaded so far,
//! normally just the one owning the invoked command, which keeps each
//! build deliberately cheap. The full-set build happens only inside an
//! index rebuild.

use std::collections::BTreeMap;

use tracing::debug;

use mortar_common::{Error, Result};

use crate::{handlers::Handler, module::ModuleManifest, name::ModulePath};

/// Structured metadata attached to a command at registration time.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub name: String,
    pub description: String,
}

/// A registered command: its spec, handler, and owning module.
#[derive(Debug, Clone)]
pub struct RegisteredCommand {
    pub spec: CommandSpec,
    pub handler: Handler,
    pub module: ModulePath,
}

/// Validate a command name: lowercase ASCII alphanumerics and hyphens,
/// 1-64 chars, no leading/trailing/double hyphen.
pub fn validate_command_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !name.starts_with('-')
        && !name.ends_with('-')
        && !name.contains("--")
}

/// Name → command mapping built from loaded modules.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, RegisteredCommand>,
}

impl CommandRegistry {
    /// Build from per-module manifests, in module-path order.
    ///
    /// A module with no commands is skipped (libraries are expected to
    /// register exports only); a command name claimed by two modules aborts
    /// the build.
    pub(crate) fn from_manifests<'a>(
        manifests: impl Iterator<Item = (&'a ModulePath, &'a ModuleManifest)>,
    ) -> Result<Self> {
        let mut commands: BTreeMap<String, RegisteredCommand> = BTreeMap::new();
        for (path, manifest) in manifests {
            if manifest.commands.is_empty() {
                debug!(module = %path, "module registers no commands, skipping");
                continue;
            }
            for command in &manifest.commands {
                if let Some(existing) = commands.get(&command.spec.name) {
                    return Err(Error::DuplicateCommand {
                        name: command.spec.name.clone(),
                        first: existing.module.to_string(),
                        second: path.to_string(),
                    });
                }
                commands.insert(command.spec.name.clone(), command.clone());
            }
        }
        Ok(Self { commands })
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredCommand> {
        self.commands.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RegisteredCommand)> {
        self.commands.iter().map(|(name, cmd)| (name.as_str(), cmd))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
