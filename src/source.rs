//! Byte sources for map, tileset and image documents.

use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Where document and image bytes come from.
///
/// Implementations must return promptly; the loader performs no retries.
pub trait ByteSource {
    /// Bytes of the document at `path`.
    fn fetch(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Reads from the file system, optionally below a root directory.
#[derive(Debug, Clone, Default)]
pub struct FsSource {
    root: Option<PathBuf>,
}

impl FsSource {
    /// Reads paths as given.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads paths below `root`.
    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }
}

impl ByteSource for FsSource {
    fn fetch(&self, path: &Path) -> io::Result<Vec<u8>> {
        match &self.root {
            Some(root) => std::fs::read(root.join(path)),
            None => std::fs::read(path),
        }
    }
}

/// In-memory documents keyed by normalized path.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MemorySource {
    /// Empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a document.
    pub fn insert(&mut self, path: impl AsRef<Path>, bytes: impl Into<Vec<u8>>) -> &mut Self {
        self.files.insert(normalize(path.as_ref()), bytes.into());
        self
    }

    /// Builder form of [`MemorySource::insert`].
    pub fn with(mut self, path: impl AsRef<Path>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(path, bytes);
        self
    }
}

impl ByteSource for MemorySource {
    fn fetch(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files.get(&normalize(path)).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )
        })
    }
}

/// Resolve `relative` against the directory of the referring `document`.
///
/// `.` and `..` are folded lexically, so `maps/level.tmx` + `../tiles/a.tsx`
/// gives `tiles/a.tsx`. An absolute `relative` replaces the base entirely.
pub fn join_relative(document: &Path, relative: &str) -> PathBuf {
    let base = document.parent().unwrap_or_else(|| Path::new(""));
    normalize(&base.join(relative))
}

/// Lexically fold `.` and `..` components.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_relative_to_referring_document() {
        assert_eq!(
            join_relative(Path::new("assets/maps/level.tmx"), "../tiles/terrain.tsx"),
            PathBuf::from("assets/tiles/terrain.tsx")
        );
        assert_eq!(
            join_relative(Path::new("level.tmx"), "terrain.tsx"),
            PathBuf::from("terrain.tsx")
        );
        assert_eq!(
            join_relative(Path::new("a/b.tsx"), "./img/../img/t.png"),
            PathBuf::from("a/img/t.png")
        );
        assert_eq!(
            join_relative(Path::new("level.tmx"), "../up.tsx"),
            PathBuf::from("../up.tsx")
        );
    }

    #[test]
    fn memory_source_matches_normalized_paths() {
        let src = MemorySource::new().with("tiles/a.tsx", "<tileset/>");
        assert_eq!(
            src.fetch(Path::new("maps/../tiles/./a.tsx")).expect("found"),
            b"<tileset/>".to_vec()
        );
        let err = src.fetch(Path::new("tiles/b.tsx")).expect_err("missing");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
