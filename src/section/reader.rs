//! Loading named JSON resources from disk

use crate::error::SectionError;
use crate::section::document::JsonSection;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Where and how [`SectionReader`] looks for JSON files
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Directories searched for resources, in order
    pub search_roots: Vec<PathBuf>,

    /// Whether to descend into subdirectories of each root
    pub recursive: bool,

    /// Parse documents with simd-json, falling back to serde_json on failure
    pub simd: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            search_roots: vec![PathBuf::from(".")],
            recursive: true,
            simd: true,
        }
    }
}

/// Resolves resource names to files and parses them
pub struct SectionReader {
    config: ReaderConfig,
}

impl SectionReader {
    pub fn new(config: ReaderConfig) -> Self {
        SectionReader { config }
    }

    /// Load the single file named `name` found under the search roots
    pub fn read(&self, name: &str) -> Result<JsonDocument, SectionError> {
        let path = self.resolve(name)?;
        self.read_path(path)
    }

    /// Load a file by explicit path, bypassing name resolution
    pub fn read_path(&self, path: impl Into<PathBuf>) -> Result<JsonDocument, SectionError> {
        let path = path.into();
        let bytes = fs::read(&path).map_err(|source| SectionError::Io {
            path: path.clone(),
            source,
        })?;
        let root = self.parse(&path, bytes)?;
        Ok(JsonDocument { path, root })
    }

    /// Find the one file whose name is exactly `name`
    pub fn resolve(&self, name: &str) -> Result<PathBuf, SectionError> {
        let mut found = Vec::new();
        for root in &self.config.search_roots {
            self.collect_matches(root, name, &mut found)?;
        }
        found.sort();
        found.dedup();

        debug!(name, matches = found.len(), "resolved resource");

        match found.len() {
            0 => Err(SectionError::ResourceNotFound {
                name: name.to_string(),
                roots: self.config.search_roots.clone(),
            }),
            1 => Ok(found.remove(0)),
            _ => Err(SectionError::MultipleResourceFound {
                name: name.to_string(),
                files: found
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }

    fn collect_matches(&self, dir: &Path, name: &str, found: &mut Vec<PathBuf>) -> Result<(), SectionError> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(dir = %dir.display(), error = %err, "skipping unreadable search root");
                return Ok(());
            }
        };

        for entry in entries {
            let entry = entry.map_err(|source| SectionError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if path.is_dir() {
                if self.config.recursive {
                    self.collect_matches(&path, name, found)?;
                }
            } else if path.file_name().is_some_and(|file| file == name) {
                found.push(path);
            }
        }
        Ok(())
    }

    fn parse(&self, path: &Path, mut bytes: Vec<u8>) -> Result<Value, SectionError> {
        if self.config.simd {
            // simd-json parses in place, so keep the original for the fallback
            let original = bytes.clone();
            match simd_json::serde::from_slice::<Value>(&mut bytes) {
                Ok(value) => return Ok(value),
                Err(err) => {
                    debug!(path = %path.display(), error = %err, "simd parse failed, retrying with serde_json");
                    bytes = original;
                }
            }
        }
        serde_json::from_slice(&bytes).map_err(|source| SectionError::InvalidJson {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Default for SectionReader {
    fn default() -> Self {
        SectionReader::new(ReaderConfig::default())
    }
}

/// A parsed JSON file
#[derive(Debug, Clone)]
pub struct JsonDocument {
    path: PathBuf,
    root: Value,
}

impl JsonDocument {
    pub fn from_value(root: Value) -> Self {
        JsonDocument {
            path: PathBuf::new(),
            root,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn root(&self) -> JsonSection<'_> {
        JsonSection::new(&self.root)
    }

    /// Navigate to a section of the document
    pub fn section(&self, path: &str) -> Result<JsonSection<'_>, SectionError> {
        self.root().section(path)
    }
}
