use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Layout file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path} is not valid {encoding} text")]
    Decode { path: PathBuf, encoding: Encoding },
}

/// Text encoding used when reading layout files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    Latin1,
}

impl Encoding {
    fn decode(self, bytes: Vec<u8>, path: &Path) -> Result<String, LoadError> {
        match self {
            Encoding::Utf8 => String::from_utf8(bytes).map_err(|_| LoadError::Decode {
                path: path.to_path_buf(),
                encoding: self,
            }),
            // Every byte is a valid Latin-1 code point.
            Encoding::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Utf8 => write!(f, "UTF-8"),
            Encoding::Latin1 => write!(f, "ISO-8859-1"),
        }
    }
}

/// Loads layout document text for the resolver.
pub trait LayoutLoader {
    fn load(&self, path: &Path, encoding: Encoding) -> Result<String, LoadError>;
}

/// Reads layout files from the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl LayoutLoader for FsLoader {
    fn load(&self, path: &Path, encoding: Encoding) -> Result<String, LoadError> {
        if !path.exists() {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }
        let bytes = fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        encoding.decode(bytes, path)
    }
}

/// A map-backed loader for hosts that keep layouts in memory, and for tests.
///
/// Paths are compared after dropping `.` components, so `./layout.html`
/// finds an entry registered as `layout.html`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLoader {
    files: HashMap<PathBuf, String>,
}

impl InMemoryLoader {
    pub fn new() -> Self {
        InMemoryLoader::default()
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        self.files
            .insert(normalize(path.as_ref()), content.into());
    }
}

impl LayoutLoader for InMemoryLoader {
    fn load(&self, path: &Path, _encoding: Encoding) -> Result<String, LoadError> {
        self.files
            .get(&normalize(path))
            .cloned()
            .ok_or_else(|| LoadError::NotFound(path.to_path_buf()))
    }
}

fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
