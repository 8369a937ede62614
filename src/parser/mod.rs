mod common;
mod script;

use crate::fs::FileSystem;
use crate::model::{Reference, ReferenceMode};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use common::{LineIndex, MaskedSource};
pub use script::ScriptExtractor;

/// Failure to extract references from one file. Recorded, never fatal.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("No extractor for file: {0}")]
    Unsupported(PathBuf),
}

/// Finds dependency-reference statements in source text by pattern.
pub trait ReferenceExtractor: Send + Sync {
    fn handles(&self, extension: &str) -> bool;

    fn extract(&self, source: &str) -> Vec<Reference>;

    /// Rewrite one reference statement so it imports types only.
    /// `None` when the statement has no type-only form or already is one.
    fn demote_to_type_only(&self, statement: &str) -> Option<String>;

    /// Text of a new reference statement binding `binding` from `target`.
    fn render_reference(&self, target: &str, mode: ReferenceMode, binding: &str) -> String;
}

pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn ReferenceExtractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self {
            extractors: vec![Box::new(ScriptExtractor::default())],
        }
    }

    /// Registry whose script extractor accepts exactly `extensions`.
    pub fn with_extensions(extensions: &[String]) -> Self {
        if extensions.is_empty() {
            return Self::new();
        }
        Self {
            extractors: vec![Box::new(ScriptExtractor::new(extensions.to_vec()))],
        }
    }

    pub fn find_extractor(&self, path: &Path) -> Option<&dyn ReferenceExtractor> {
        let ext = path.extension()?.to_str()?;
        self.extractors
            .iter()
            .find(|e| e.handles(ext))
            .map(|e| e.as_ref())
    }

    pub fn extract_text(&self, path: &Path, source: &str) -> Result<Vec<Reference>, ExtractionError> {
        let extractor = self
            .find_extractor(path)
            .ok_or_else(|| ExtractionError::Unsupported(path.to_path_buf()))?;
        Ok(extractor.extract(source))
    }

    pub fn extract_file(
        &self,
        path: &Path,
        fs: &dyn FileSystem,
    ) -> Result<Vec<Reference>, ExtractionError> {
        let source = fs.read_to_string(path).map_err(|source| ExtractionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.extract_text(path, &source)
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFs;

    #[test]
    fn test_registry_respects_extensions() {
        let registry = ExtractorRegistry::with_extensions(&["ts".to_string()]);
        assert!(registry.find_extractor(Path::new("/p/a.ts")).is_some());
        assert!(registry.find_extractor(Path::new("/p/a.js")).is_none());
        assert!(registry.find_extractor(Path::new("/p/Makefile")).is_none());
    }

    #[test]
    fn test_extract_file_reports_io_errors() {
        let fs = MockFs::with_files([(Path::new("/p/a.ts"), "import b from './b';")]);
        let registry = ExtractorRegistry::new();

        let refs = registry.extract_file(Path::new("/p/a.ts"), &fs).unwrap();
        assert_eq!(refs.len(), 1);

        let err = registry.extract_file(Path::new("/p/missing.ts"), &fs).unwrap_err();
        assert!(matches!(err, ExtractionError::Io { .. }));
    }
}
