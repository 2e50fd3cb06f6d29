//! Loaded dependency records for plugins and parsers.
//!
//! A [`LoadedDependency`] carries either a definition or a capture of the
//! loading error, never both. Load failures are captured here rather than
//! raised so that a broken dependency only becomes fatal if it actually
//! wins during extraction.
//!
//! The diagnostic projections (`Debug` and `Serialize`) deliberately omit
//! the definition: serializing a loaded module would drag arbitrary
//! third-party data into logs.

use std::path::PathBuf;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::error::ConfigError;
use crate::plugins::{ParserDefinition, PluginDefinition};

/// A plugin or parser referenced by a config, in loaded (or failed) form.
#[derive(Clone)]
pub struct LoadedDependency<T> {
    /// The loaded definition. Present exactly when `error` is absent.
    pub definition: Option<Arc<T>>,
    /// The captured load failure. Present exactly when `definition` is
    /// absent.
    pub error: Option<Arc<ConfigError>>,
    /// The resolved source path; absent on failure and for pool-provided
    /// definitions.
    pub file_path: Option<PathBuf>,
    /// The logical id the config used to reference this dependency.
    pub id: String,
    /// Human label of the importing config.
    pub importer_name: String,
    /// Absolute path of the importing config file, when it came from disk.
    pub importer_path: Option<PathBuf>,
}

/// A loaded plugin.
pub type LoadedPlugin = LoadedDependency<PluginDefinition>;

/// A loaded parser.
pub type LoadedParser = LoadedDependency<ParserDefinition>;

impl<T> LoadedDependency<T> {
    /// A successfully loaded dependency.
    #[must_use]
    pub fn succeeded(
        id: impl Into<String>,
        definition: Arc<T>,
        file_path: Option<PathBuf>,
        importer_name: impl Into<String>,
        importer_path: Option<PathBuf>,
    ) -> Self {
        Self {
            definition: Some(definition),
            error: None,
            file_path,
            id: id.into(),
            importer_name: importer_name.into(),
            importer_path,
        }
    }

    /// A dependency whose load failed, with the failure captured.
    #[must_use]
    pub fn failed(
        id: impl Into<String>,
        error: ConfigError,
        importer_name: impl Into<String>,
        importer_path: Option<PathBuf>,
    ) -> Self {
        Self {
            definition: None,
            error: Some(Arc::new(error)),
            file_path: None,
            id: id.into(),
            importer_name: importer_name.into(),
            importer_path,
        }
    }
}

impl<T> std::fmt::Debug for LoadedDependency<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("LoadedDependency");
        s.field("id", &self.id)
            .field("importer_name", &self.importer_name)
            .field("importer_path", &self.importer_path);
        if let Some(file_path) = &self.file_path {
            s.field("file_path", file_path);
        }
        if let Some(error) = &self.error {
            s.field("error", &error.to_string());
        } else {
            s.field("definition", &"<loaded>");
        }
        s.finish()
    }
}

impl<T> Serialize for LoadedDependency<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut fields = 3;
        if self.file_path.is_some() {
            fields += 1;
        }
        if self.error.is_some() {
            fields += 1;
        }

        let mut s = serializer.serialize_struct("LoadedDependency", fields)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("importerName", &self.importer_name)?;
        s.serialize_field("importerPath", &self.importer_path)?;
        if let Some(file_path) = &self.file_path {
            s.serialize_field("filePath", file_path)?;
        }
        if let Some(error) = &self.error {
            s.serialize_field("error", &error.to_string())?;
        }
        s.end()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
