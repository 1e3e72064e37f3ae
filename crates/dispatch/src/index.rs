//! The persisted command index: name → owning module path.
//!
//! One JSON file under the cache root, rewritten in full on every rebuild.
//! The index is advisory: a missing, torn, or stale file only means the
//! next lookup takes the rebuild path, so reads never fail. Writes go
//! through a temp file and an atomic rename so a concurrent reader sees
//! either the old or the new complete index.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use {
    serde::{Deserialize, Serialize},
    tracing::warn,
};

use mortar_common::{Context, Result};

/// Index file name under the cache root.
pub const INDEX_FILENAME: &str = "commands.json";

const FORMAT_VERSION: u32 = 1;

/// One command's entry: the module path that owns it, plus the description
/// kept for `help` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub module: String,
    #[serde(default)]
    pub description: String,
}

/// The full persisted index. `commands` is an ordered map, so serializing
/// an unchanged set twice yields byte-identical files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandIndex {
    pub version: u32,
    #[serde(default)]
    pub fingerprint: String,
    #[serde(default)]
    pub commands: BTreeMap<String, IndexEntry>,
}

impl Default for CommandIndex {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            fingerprint: String::new(),
            commands: BTreeMap::new(),
        }
    }
}

/// Persistent index storage with atomic writes.
pub struct IndexStore {
    path: PathBuf,
}

impl IndexStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store for the conventional location under a cache root.
    pub fn in_dir(cache_root: &Path) -> Self {
        Self::new(cache_root.join(INDEX_FILENAME))
    }

    /// Load the index, treating a missing or unreadable file as empty.
    ///
    /// Unparseable content is downgraded to a warning: it usually means a
    /// concurrent writer or a format change, and both resolve through the
    /// rebuild path.
    pub fn load(&self) -> CommandIndex {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return CommandIndex::default();
            },
            Err(e) => {
                warn!(path = %self.path.display(), %e, "failed to read command index");
                return CommandIndex::default();
            },
        };
        match serde_json::from_str(&data) {
            Ok(index) => index,
            Err(e) => {
                warn!(path = %self.path.display(), %e, "corrupt command index, ignoring");
                CommandIndex::default()
            },
        }
    }

    /// Save the index atomically via temp file + rename.
    pub fn save(&self, index: &CommandIndex) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(index).context("serialize command index")?;
        std::fs::write(&tmp, data)
            .with_context(|| format!("write {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("rename {} into place", tmp.display()))?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
