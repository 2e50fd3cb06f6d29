//! Cascading resolution: per-directory config discovery with caching.
//!
//! For a source file, the cascade starts in the file's directory and walks
//! up toward the project root, loading each directory's configuration
//! composed with its parent's. A configuration declaring `root: true` cuts
//! the walk's contribution above it. The resulting array is finalized by
//! appending the command-line configuration (a `--config` file, then
//! CLI-supplied data) at highest precedence.
//!
//! Both the per-directory arrays and the finalized arrays are cached for
//! the lifetime of the cascading factory. Freshness is not tracked: a new
//! run builds a new cascading factory.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config_array::ConfigArray;
use crate::element::ConfigBody;
use crate::error::ConfigError;
use crate::factory::{ConfigArrayFactory, ConfigArrayFactoryOptions, LoadOptions};

/// Construction options for [`CascadingConfigArrayFactory`].
#[derive(Default)]
pub struct CascadingConfigArrayFactoryOptions {
    /// Options forwarded to the inner [`ConfigArrayFactory`].
    pub factory: ConfigArrayFactoryOptions,
    /// The lowest-precedence configuration, below every discovered file.
    pub base_config: Option<ConfigBody>,
    /// Command-line-supplied configuration, above every discovered file.
    pub cli_config: Option<ConfigBody>,
    /// A specific config file (`--config`), loaded above the cascade and
    /// below `cli_config`.
    pub specific_config_path: Option<PathBuf>,
    /// When false, directory discovery is skipped entirely and only the
    /// base and command-line configurations apply.
    pub use_config_files: bool,
}

impl CascadingConfigArrayFactoryOptions {
    /// Options with directory discovery enabled and nothing else set.
    #[must_use]
    pub fn with_discovery() -> Self {
        Self {
            use_config_files: true,
            ..Default::default()
        }
    }
}

/// Resolves the config array for source files by cascading over their
/// directory hierarchy.
pub struct CascadingConfigArrayFactory {
    factory: ConfigArrayFactory,
    base_config: Option<ConfigBody>,
    cli_config: Option<ConfigBody>,
    specific_config_path: Option<PathBuf>,
    use_config_files: bool,
    /// Directory → raw cascade array (before CLI finalization).
    cascade_cache: RefCell<HashMap<PathBuf, Arc<ConfigArray>>>,
    /// Directory → finalized array.
    finalize_cache: RefCell<HashMap<PathBuf, Arc<ConfigArray>>>,
}

impl CascadingConfigArrayFactory {
    /// Build a cascading factory.
    #[must_use]
    pub fn new(options: CascadingConfigArrayFactoryOptions) -> Self {
        Self {
            factory: ConfigArrayFactory::new(options.factory),
            base_config: options.base_config,
            cli_config: options.cli_config,
            specific_config_path: options.specific_config_path,
            use_config_files: options.use_config_files,
            cascade_cache: RefCell::new(HashMap::new()),
            finalize_cache: RefCell::new(HashMap::new()),
        }
    }

    /// The inner factory.
    #[must_use]
    pub fn factory(&self) -> &ConfigArrayFactory {
        &self.factory
    }

    /// The finalized config array governing `file_path` (absolute).
    ///
    /// # Errors
    ///
    /// Fails on a non-absolute path and on any load, normalization, or
    /// validation failure along the cascade.
    pub fn config_array_for_file(
        &self,
        file_path: &Path,
    ) -> Result<Arc<ConfigArray>, ConfigError> {
        if !file_path.is_absolute() {
            return Err(ConfigError::InvalidFilePath {
                value: file_path.display().to_string(),
            });
        }
        let directory = file_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.factory.cwd().to_path_buf());
        self.finalized_config_array(&directory)
    }

    fn finalized_config_array(&self, directory: &Path) -> Result<Arc<ConfigArray>, ConfigError> {
        if let Some(cached) = self.finalize_cache.borrow().get(directory) {
            return Ok(Arc::clone(cached));
        }

        let cascade = self.cascaded_config_array(directory)?;
        let finalized = self.append_cli_config(&cascade)?;

        let finalized = Arc::new(finalized);
        self.finalize_cache
            .borrow_mut()
            .insert(directory.to_path_buf(), Arc::clone(&finalized));
        Ok(finalized)
    }

    /// The cascade for one directory: its own configuration composed with
    /// the parent directory's cascade. The walk never ascends beyond the
    /// project root.
    fn cascaded_config_array(&self, directory: &Path) -> Result<Arc<ConfigArray>, ConfigError> {
        if !self.use_config_files {
            return self.base_config_array();
        }

        if let Some(cached) = self.cascade_cache.borrow().get(directory) {
            return Ok(Arc::clone(cached));
        }

        log::debug!("Loading config in ancestors of {}", directory.display());

        let cwd = self.factory.cwd().to_path_buf();
        let at_boundary = directory == cwd || !directory.starts_with(&cwd);
        let parent = match (at_boundary, directory.parent()) {
            (false, Some(parent_dir)) => self.cascaded_config_array(parent_dir)?,
            _ => self.base_config_array()?,
        };

        let array = self.factory.load_on_directory(
            directory,
            LoadOptions {
                parent: Some(&parent),
                ..Default::default()
            },
        )?;

        let array = Arc::new(array);
        self.cascade_cache
            .borrow_mut()
            .insert(directory.to_path_buf(), Arc::clone(&array));
        Ok(array)
    }

    fn base_config_array(&self) -> Result<Arc<ConfigArray>, ConfigError> {
        let array = self.factory.create(
            self.base_config.as_ref(),
            LoadOptions {
                name: Some("BaseConfig".to_owned()),
                ..Default::default()
            },
        )?;
        Ok(Arc::new(array))
    }

    /// Append the command-line configuration at highest precedence: the
    /// `--config` file first, then the CLI-supplied data.
    fn append_cli_config(&self, cascade: &ConfigArray) -> Result<ConfigArray, ConfigError> {
        let with_specific = match &self.specific_config_path {
            Some(path) => Some(self.factory.load_file(
                &path.to_string_lossy(),
                LoadOptions {
                    name: Some("--config".to_owned()),
                    parent: Some(cascade),
                    ..Default::default()
                },
            )?),
            None => None,
        };

        let below_cli = with_specific.as_ref().unwrap_or(cascade);
        self.factory.create(
            self.cli_config.as_ref(),
            LoadOptions {
                name: Some("CLIOptions".to_owned()),
                parent: Some(below_cli),
                ..Default::default()
            },
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use serde_json::json;
    use tempfile::tempdir;

    fn body(value: serde_json::Value) -> ConfigBody {
        ConfigBody::from_value(value).unwrap()
    }

    fn cascading_at(cwd: &Path) -> CascadingConfigArrayFactory {
        CascadingConfigArrayFactory::new(CascadingConfigArrayFactoryOptions {
            factory: ConfigArrayFactoryOptions {
                cwd: Some(cwd.to_path_buf()),
                ..Default::default()
            },
            use_config_files: true,
            ..Default::default()
        })
    }

    #[test]
    fn test_requires_absolute_file_path() {
        let dir = tempdir().unwrap();
        let cascading = cascading_at(dir.path());
        let err = cascading
            .config_array_for_file(Path::new("relative.js"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFilePath { .. }));
    }

    #[test]
    fn test_walks_up_to_project_root() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(".eslintrc.json"),
            r#"{ "rules": { "a": "off", "b": "warn" } }"#,
        )
        .unwrap();
        let nested = dir.path().join("src").join("deep");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            dir.path().join("src").join(".eslintrc.json"),
            r#"{ "rules": { "a": "error" } }"#,
        )
        .unwrap();

        let cascading = cascading_at(dir.path());
        let array = cascading
            .config_array_for_file(&nested.join("file.js"))
            .unwrap();

        let config = array.extract_config(&nested.join("file.js")).unwrap();
        // Inner config wins for "a"; outer "b" still applies.
        assert_eq!(config.rules["a"].as_slice(), &[json!("error")]);
        assert_eq!(config.rules["b"].as_slice(), &[json!("warn")]);
    }

    #[test]
    fn test_root_true_cuts_outer_configs() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(".eslintrc.json"),
            r#"{ "rules": { "outer": "error" } }"#,
        )
        .unwrap();
        let inner = dir.path().join("app");
        fs::create_dir_all(&inner).unwrap();
        fs::write(
            inner.join(".eslintrc.json"),
            r#"{ "root": true, "rules": { "inner": "error" } }"#,
        )
        .unwrap();

        let cascading = cascading_at(dir.path());
        let array = cascading
            .config_array_for_file(&inner.join("file.js"))
            .unwrap();

        let config = array.extract_config(&inner.join("file.js")).unwrap();
        assert!(config.rules.contains_key("inner"));
        assert!(!config.rules.contains_key("outer"));
    }

    #[test]
    fn test_per_directory_arrays_are_cached() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".eslintrc.json"), r#"{ "rules": {} }"#).unwrap();

        let cascading = cascading_at(dir.path());
        let first = cascading
            .config_array_for_file(&dir.path().join("a.js"))
            .unwrap();
        let second = cascading
            .config_array_for_file(&dir.path().join("b.js"))
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_cli_config_has_highest_precedence() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(".eslintrc.json"),
            r#"{ "rules": { "a": "off" } }"#,
        )
        .unwrap();

        let cascading = CascadingConfigArrayFactory::new(CascadingConfigArrayFactoryOptions {
            factory: ConfigArrayFactoryOptions {
                cwd: Some(dir.path().to_path_buf()),
                ..Default::default()
            },
            cli_config: Some(body(json!({ "rules": { "a": "error" } }))),
            use_config_files: true,
            ..Default::default()
        });

        let array = cascading
            .config_array_for_file(&dir.path().join("a.js"))
            .unwrap();
        let config = array.extract_config(&dir.path().join("a.js")).unwrap();
        assert_eq!(config.rules["a"].as_slice(), &[json!("error")]);
    }

    #[test]
    fn test_specific_config_sits_between_cascade_and_cli() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(".eslintrc.json"),
            r#"{ "rules": { "a": "off", "b": "off", "c": "off" } }"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("special.json"),
            r#"{ "rules": { "b": "warn", "c": "warn" } }"#,
        )
        .unwrap();

        let cascading = CascadingConfigArrayFactory::new(CascadingConfigArrayFactoryOptions {
            factory: ConfigArrayFactoryOptions {
                cwd: Some(dir.path().to_path_buf()),
                ..Default::default()
            },
            cli_config: Some(body(json!({ "rules": { "c": "error" } }))),
            specific_config_path: Some(dir.path().join("special.json")),
            use_config_files: true,
            ..Default::default()
        });

        let array = cascading
            .config_array_for_file(&dir.path().join("a.js"))
            .unwrap();
        let config = array.extract_config(&dir.path().join("a.js")).unwrap();
        assert_eq!(config.rules["a"].as_slice(), &[json!("off")]);
        assert_eq!(config.rules["b"].as_slice(), &[json!("warn")]);
        assert_eq!(config.rules["c"].as_slice(), &[json!("error")]);
    }

    #[test]
    fn test_discovery_disabled_uses_only_base_and_cli() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(".eslintrc.json"),
            r#"{ "rules": { "discovered": "error" } }"#,
        )
        .unwrap();

        let cascading = CascadingConfigArrayFactory::new(CascadingConfigArrayFactoryOptions {
            factory: ConfigArrayFactoryOptions {
                cwd: Some(dir.path().to_path_buf()),
                ..Default::default()
            },
            base_config: Some(body(json!({ "rules": { "base": "warn" } }))),
            use_config_files: false,
            ..Default::default()
        });

        let array = cascading
            .config_array_for_file(&dir.path().join("a.js"))
            .unwrap();
        let config = array.extract_config(&dir.path().join("a.js")).unwrap();
        assert!(config.rules.contains_key("base"));
        assert!(!config.rules.contains_key("discovered"));
    }
}
