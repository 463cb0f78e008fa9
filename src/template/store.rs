//! Storage capability for templates and translation resources.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Reads text content by path. Implementations must not cache.
#[async_trait]
pub trait TextStore: Send + Sync {
    async fn read_text(&self, path: &Path) -> io::Result<String>;
}

/// Reads from the local filesystem on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

#[async_trait]
impl TextStore for FsStore {
    async fn read_text(&self, path: &Path) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }
}

/// In-memory store keyed by path, for tests and embedded views.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    files: HashMap<PathBuf, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }
}

#[async_trait]
impl TextStore for MemoryStore {
    async fn read_text(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", path.display()),
            )
        })
    }
}
