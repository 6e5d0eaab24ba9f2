use crate::error::{BacklinkError, Result};
use crate::identity::MARKDOWN_EXTENSION;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Where documents come from.
pub trait DocumentSource {
    /// Names of all markdown documents, in a stable order.
    fn list(&self) -> Result<Vec<String>>;

    fn read(&self, name: &str) -> Result<String>;
}

/// Where finished documents go.
pub trait DocumentSink {
    fn write(&mut self, name: &str, contents: &str) -> Result<()>;
}

fn is_markdown(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext == &MARKDOWN_EXTENSION[1..])
}

/// Reads `*.md` files from a single directory (not recursive).
#[derive(Clone, Debug)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl DocumentSource for DirectorySource {
    fn list(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| BacklinkError::io(&self.root, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| BacklinkError::io(&self.root, e))?;
            let Ok(name) = entry.file_name().into_string() else {
                tracing::warn!("Skipping non UTF-8 filename in {}", self.root.display());
                continue;
            };
            if is_markdown(&name) {
                names.push(name);
            }
        }
        names.sort();
        tracing::info!("Found {} markdown files in {}", names.len(), self.root.display());
        Ok(names)
    }

    fn read(&self, name: &str) -> Result<String> {
        let path = self.root.join(name);
        std::fs::read_to_string(&path).map_err(|e| BacklinkError::io(path, e))
    }
}

/// Writes documents under a destination directory, creating it as needed.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

/// Only plain relative names stay under the root; `..`, absolute paths and
/// drive prefixes are refused.
fn stays_under_root(name: &str) -> bool {
    let mut components = Path::new(name).components().peekable();
    components.peek().is_some() && components.all(|c| matches!(c, Component::Normal(_)))
}

impl DocumentSink for DirectorySink {
    fn write(&mut self, name: &str, contents: &str) -> Result<()> {
        if !stays_under_root(name) {
            return Err(BacklinkError::io(
                self.root.join(name),
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "document name leaves the destination directory",
                ),
            ));
        }
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| BacklinkError::io(parent, e))?;
        }
        std::fs::write(&path, contents).map_err(|e| BacklinkError::io(path, e))
    }
}

/// In-memory documents, keyed by filename. Serves as both source and sink.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    files: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files<I, N, C>(files: I) -> Self
    where
        I: IntoIterator<Item = (N, C)>,
        N: Into<String>,
        C: Into<String>,
    {
        Self {
            files: files
                .into_iter()
                .map(|(name, contents)| (name.into(), contents.into()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.files.get(name).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl DocumentSource for MemoryStore {
    fn list(&self) -> Result<Vec<String>> {
        Ok(self.names().filter(|n| is_markdown(n)).map(str::to_string).collect())
    }

    fn read(&self, name: &str) -> Result<String> {
        self.files.get(name).cloned().ok_or_else(|| {
            BacklinkError::io(
                name,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such document"),
            )
        })
    }
}

impl DocumentSink for MemoryStore {
    fn write(&mut self, name: &str, contents: &str) -> Result<()> {
        self.files.insert(name.to_string(), contents.to_string());
        Ok(())
    }
}
