//! Error types for configuration loading and extraction.
//!
//! One enum covers every failure the resolver can surface. Two disposition
//! rules shape the variants:
//!
//! - *Load eagerly, fail lazily.* Plugin and parser load failures are
//!   captured into dependency records and only become fatal if the broken
//!   dependency wins a merge. Those variants must therefore be cloneable so
//!   a captured error can be re-raised later.
//! - Directory probing swallows file-not-found and module-not-found, so
//!   both kinds are distinguishable via [`ConfigError::is_file_not_found`]
//!   and [`ConfigError::is_module_not_found`].
//!
//! Some variants carry a stable message template name consumed by host
//! diagnostics (`extend-config-missing`, `failed-to-read-json`,
//! `plugin-missing`, `whitespace-found`).

use std::path::PathBuf;

/// Errors produced while loading, normalizing, or extracting configuration.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// A configuration file does not exist on disk.
    #[error("No config file found: {path}")]
    FileNotFound {
        /// The probed path.
        path: PathBuf,
    },

    /// A configuration file exists but could not be read or parsed.
    #[error("Cannot read config file: {path}\nError: {message}")]
    ReadFailed {
        /// The offending file.
        path: PathBuf,
        /// The underlying read or parse failure.
        message: String,
    },

    /// A JSON configuration file could not be parsed.
    ///
    /// Same surface message as [`ConfigError::ReadFailed`], but carries the
    /// `failed-to-read-json` template for host diagnostics.
    #[error("Cannot read config file: {path}\nError: {message}")]
    ReadJsonFailed {
        /// The offending file.
        path: PathBuf,
        /// The underlying parse failure.
        message: String,
    },

    /// A module request could not be resolved.
    #[error("Cannot find module '{request}'")]
    ModuleNotFound {
        /// The unresolved request.
        request: String,
        /// The importer the resolution was relative to, when known.
        relative_to: Option<PathBuf>,
    },

    /// A resolved module exists but is not of the expected kind.
    #[error("Module at {path} is not a {expected} module")]
    InvalidModuleKind {
        /// The resolved module path.
        path: PathBuf,
        /// The expected kind (`"plugin"`, `"parser"`, `"rule"`, `"config"`).
        expected: &'static str,
    },

    /// An `extends` reference names a configuration that does not exist.
    #[error("Failed to load config \"{config_name}\" to extend from.")]
    ExtendConfigMissing {
        /// The configuration name as written in `extends`.
        config_name: String,
        /// The config that referenced it.
        importer_name: String,
    },

    /// An `extends: "plugin:..."` entry used a filesystem path as the
    /// plugin name.
    #[error("'extends' cannot use a file path for plugins")]
    PluginPathNotAllowed {
        /// The offending plugin name.
        name: String,
    },

    /// A plugin could not be resolved from the project root.
    #[error("Failed to load plugin '{plugin_name}' declared in '{importer_name}': Cannot find module '{plugin_name}'")]
    PluginMissing {
        /// The normalized plugin package name.
        plugin_name: String,
        /// The directory plugins are resolved relative to.
        project_root: PathBuf,
        /// The config that declared the plugin.
        importer_name: String,
    },

    /// A plugin specifier contains whitespace.
    #[error("Whitespace found in plugin name '{plugin_name}'")]
    WhitespaceInPluginName {
        /// The offending specifier.
        plugin_name: String,
        /// The config that declared the plugin.
        importer_name: String,
    },

    /// An `overrides` glob pattern is absolute or climbs out of its base.
    #[error("Invalid override pattern (expected relative path not containing '..'): {pattern}")]
    InvalidOverridePattern {
        /// The offending pattern.
        pattern: String,
    },

    /// `extract_config` was called with a non-absolute path.
    #[error("'filePath' should be an absolute path, but got {value}.")]
    InvalidFilePath {
        /// The offending argument, verbatim.
        value: String,
    },

    /// A plugin rule declared by reference chains through too many
    /// indirections.
    #[error("Rule reference '{request}' is nested too deeply ({depth} levels)")]
    RuleResolutionTooDeep {
        /// The request that exceeded the bound.
        request: String,
        /// The depth reached.
        depth: usize,
    },

    /// Schema validation rejected a configuration.
    #[error("{source_name}:\n\t{message}")]
    Validation {
        /// The name of the offending configuration source.
        source_name: String,
        /// The validator's message.
        message: String,
    },

    /// A failure raised while resolving an `extends` chain, annotated with
    /// the importing config.
    #[error("{source}\nReferenced from: {importer}")]
    Referenced {
        /// The underlying failure.
        source: Box<ConfigError>,
        /// The importing config file path or name.
        importer: String,
    },
}

impl ConfigError {
    /// The stable message template name for host diagnostics, if any.
    ///
    /// Referenced-from wrappers expose the template of the wrapped error.
    #[must_use]
    pub fn message_template(&self) -> Option<&'static str> {
        match self {
            Self::ExtendConfigMissing { .. } => Some("extend-config-missing"),
            Self::ReadJsonFailed { .. } => Some("failed-to-read-json"),
            Self::PluginMissing { .. } => Some("plugin-missing"),
            Self::WhitespaceInPluginName { .. } => Some("whitespace-found"),
            Self::Referenced { source, .. } => source.message_template(),
            _ => None,
        }
    }

    /// Whether this error is a missing-configuration-file condition.
    #[must_use]
    pub fn is_file_not_found(&self) -> bool {
        matches!(self, Self::FileNotFound { .. })
    }

    /// Whether this error is a module-not-found condition.
    #[must_use]
    pub fn is_module_not_found(&self) -> bool {
        match self {
            Self::ModuleNotFound { .. } => true,
            Self::Referenced { source, .. } => source.is_module_not_found(),
            _ => false,
        }
    }

    /// Annotate this error with the config that referenced the failing
    /// resource.
    #[must_use]
    pub fn referenced_from(self, importer: impl Into<String>) -> Self {
        Self::Referenced {
            source: Box::new(self),
            importer: importer.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_failed_message_embeds_path() {
        let err = ConfigError::ReadFailed {
            path: PathBuf::from("/work/.eslintrc.json"),
            message: "unexpected token".to_owned(),
        };
        let text = err.to_string();
        assert!(text.starts_with("Cannot read config file: /work/.eslintrc.json"));
        assert!(text.contains("Error: unexpected token"));
    }

    #[test]
    fn test_message_templates() {
        let err = ConfigError::ExtendConfigMissing {
            config_name: "missing".to_owned(),
            importer_name: ".eslintrc.json".to_owned(),
        };
        assert_eq!(err.message_template(), Some("extend-config-missing"));

        let err = ConfigError::PluginMissing {
            plugin_name: "eslint-plugin-x".to_owned(),
            project_root: PathBuf::from("/work"),
            importer_name: ".eslintrc.json".to_owned(),
        };
        assert_eq!(err.message_template(), Some("plugin-missing"));

        let err = ConfigError::WhitespaceInPluginName {
            plugin_name: "bad name".to_owned(),
            importer_name: ".eslintrc.json".to_owned(),
        };
        assert_eq!(err.message_template(), Some("whitespace-found"));

        let err = ConfigError::FileNotFound {
            path: PathBuf::from("/x"),
        };
        assert_eq!(err.message_template(), None);
    }

    #[test]
    fn test_referenced_trail() {
        let inner = ConfigError::ExtendConfigMissing {
            config_name: "gone".to_owned(),
            importer_name: "base".to_owned(),
        };
        let wrapped = inner.referenced_from("/work/.eslintrc.json");
        let text = wrapped.to_string();
        assert!(text.contains("Failed to load config \"gone\" to extend from."));
        assert!(text.ends_with("Referenced from: /work/.eslintrc.json"));
        assert_eq!(wrapped.message_template(), Some("extend-config-missing"));
    }

    #[test]
    fn test_module_not_found_through_wrapper() {
        let inner = ConfigError::ModuleNotFound {
            request: "eslint-config-x".to_owned(),
            relative_to: None,
        };
        assert!(inner.is_module_not_found());
        let wrapped = inner.referenced_from("importer");
        assert!(wrapped.is_module_not_found());
    }

    #[test]
    fn test_invalid_file_path_embeds_value() {
        let err = ConfigError::InvalidFilePath {
            value: "relative/path.js".to_owned(),
        };
        assert!(err.to_string().contains("but got relative/path.js."));
    }
}
