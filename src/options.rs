//! Centralized store options (path, compression level, optional password).
//!
//! Options are immutable per Store instance: changing the password or the
//! path means constructing a new Store. Fluent `with_*` setters cover the
//! builder use case without a separate builder type.

use std::fmt;
use std::path::{Path, PathBuf};

use zeroize::Zeroize;

/// Options for one store file.
#[derive(Clone)]
pub struct StoreOptions {
    /// Destination path of the store file.
    pub path: PathBuf,

    /// zstd compression level (0 = library default; higher trades write
    /// latency for smaller files).
    pub compression: i32,

    /// Optional password; when set, the payload is encrypted at rest.
    pub password: Option<String>,
}

impl StoreOptions {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            compression: 0,
            password: None,
        }
    }

    pub fn with_compression(mut self, level: i32) -> Self {
        self.compression = level;
        self
    }

    pub fn with_password<S: Into<String>>(mut self, password: Option<S>) -> Self {
        self.password = password.map(Into::into);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

// Стираем пароль из памяти при уничтожении опций.
impl Drop for StoreOptions {
    fn drop(&mut self) {
        if let Some(p) = self.password.as_mut() {
            p.zeroize();
        }
    }
}

// Manual Debug/Display: the password must never leak into logs.
impl fmt::Debug for StoreOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreOptions")
            .field("path", &self.path)
            .field("compression", &self.compression)
            .field(
                "password",
                &self.password.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl fmt::Display for StoreOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StoreOptions {{ path: {}, compression: {}, password: {} }}",
            self.path.display(),
            self.compression,
            if self.password.is_some() { "set" } else { "none" },
        )
    }
}
