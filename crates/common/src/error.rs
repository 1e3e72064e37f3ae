use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The command name is not registered, even after a full index rebuild.
    #[error("no such command `{name}`")]
    UnknownCommand { name: String },

    /// Two modules declared the same command name.
    #[error("command `{name}` declared by both `{first}` and `{second}`")]
    DuplicateCommand {
        name: String,
        first: String,
        second: String,
    },

    /// A fully-qualified export lookup found the module but not the function.
    #[error("module `{module}` has no export named `{name}`")]
    UnknownExport { module: String, name: String },

    /// A module path that no module in the set claims.
    #[error("no module at `{path}`")]
    UnknownModule { path: String },

    /// A name that is empty, has empty segments, or uses characters outside
    /// the lowercase-alphanumeric/`-`/`_` segment alphabet.
    #[error("malformed name `{input}`")]
    InvalidName { input: String },

    #[error("invalid command name `{name}`")]
    InvalidCommandName { name: String },

    #[error("duplicate module namespace `{namespace}`")]
    DuplicateNamespace { namespace: String },

    #[error("export `{name}` already registered")]
    DuplicateExport { name: String },

    /// The cache root must exist before the dispatcher will run.
    #[error("cache directory `{}` does not exist", path.display())]
    CacheDirMissing { path: PathBuf },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

// ── Context helpers ─────────────────────────────────────────────────────────

/// Message-wrapping helpers for `Result` and `Option` at I/O seams, where
/// the underlying error says what failed but not which file or store.
pub trait Context<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T, E: std::fmt::Display> Context<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx = context.into();
        self.map_err(|source| Error::Message(format!("{ctx}: {source}")))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|source| Error::Message(format!("{}: {source}", f().into())))
    }
}

impl<T> Context<T> for Option<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| Error::Message(context.into()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::Message(f().into()))
    }
}
