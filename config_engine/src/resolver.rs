//! The module resolution seam.
//!
//! The resolver decides how `extends` references, parser and plugin
//! specifiers, and `.js` config files map onto loadable definitions. Real
//! node_modules-style resolution is host-supplied; this crate ships two
//! implementations:
//!
//! - [`StaticModuleResolver`], an in-memory registry for embedders and
//!   tests: definitions are registered under request names and synthetic
//!   paths, and relative requests resolve lexically against the importer.
//! - [`NullResolver`], the default when a factory is built without a
//!   resolver: every request fails with module-not-found.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use crate::error::ConfigError;
use crate::plugins::{ParserDefinition, PluginDefinition, RuleDefinition};

/// Resolves and loads externally referenced modules.
///
/// `resolve` failures with the module-not-found kind
/// ([`ConfigError::is_module_not_found`]) get special treatment from the
/// factory: directory probes skip them and plugin loads capture them with
/// the `plugin-missing` template.
pub trait ModuleResolver {
    /// Resolve a module request relative to the importing file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ModuleNotFound`] when the request cannot be
    /// resolved.
    fn resolve(&self, request: &str, relative_to: &Path) -> Result<PathBuf, ConfigError>;

    /// Load a plugin definition from a resolved path.
    ///
    /// # Errors
    ///
    /// Returns an error when the module is missing or not a plugin.
    fn load_plugin(&self, path: &Path) -> Result<Arc<PluginDefinition>, ConfigError>;

    /// Load a parser definition from a resolved path.
    ///
    /// # Errors
    ///
    /// Returns an error when the module is missing or not a parser.
    fn load_parser(&self, path: &Path) -> Result<Arc<ParserDefinition>, ConfigError>;

    /// Load a rule module by request. Used when a plugin declares a rule by
    /// reference.
    ///
    /// # Errors
    ///
    /// Returns an error when the request cannot be resolved to a rule.
    fn load_rule(&self, request: &str) -> Result<RuleDefinition, ConfigError>;

    /// Evaluate a config module file (a `.js` config) and return its
    /// configuration value.
    ///
    /// Implementations must evaluate freshly on every call so that on-disk
    /// edits are picked up across repeated runs.
    ///
    /// # Errors
    ///
    /// Returns an error when the module is missing or fails to evaluate.
    fn load_config_module(&self, path: &Path) -> Result<Value, ConfigError>;
}

// ---------------------------------------------------------------------------
// Null resolver
// ---------------------------------------------------------------------------

/// A resolver that knows no modules. Every request fails with the
/// module-not-found kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullResolver;

impl ModuleResolver for NullResolver {
    fn resolve(&self, request: &str, relative_to: &Path) -> Result<PathBuf, ConfigError> {
        Err(ConfigError::ModuleNotFound {
            request: request.to_owned(),
            relative_to: Some(relative_to.to_path_buf()),
        })
    }

    fn load_plugin(&self, path: &Path) -> Result<Arc<PluginDefinition>, ConfigError> {
        Err(not_found(path))
    }

    fn load_parser(&self, path: &Path) -> Result<Arc<ParserDefinition>, ConfigError> {
        Err(not_found(path))
    }

    fn load_rule(&self, request: &str) -> Result<RuleDefinition, ConfigError> {
        Err(ConfigError::ModuleNotFound {
            request: request.to_owned(),
            relative_to: None,
        })
    }

    fn load_config_module(&self, path: &Path) -> Result<Value, ConfigError> {
        Err(not_found(path))
    }
}

fn not_found(path: &Path) -> ConfigError {
    ConfigError::ModuleNotFound {
        request: path.to_string_lossy().into_owned(),
        relative_to: None,
    }
}

// ---------------------------------------------------------------------------
// Static in-memory resolver
// ---------------------------------------------------------------------------

/// A module definition held by a [`StaticModuleResolver`].
#[derive(Debug, Clone)]
pub enum ModuleDefinition {
    /// A config module (`.js` config file body).
    Config(Value),
    /// A plugin module.
    Plugin(Arc<PluginDefinition>),
    /// A parser module.
    Parser(Arc<ParserDefinition>),
    /// A rule module.
    Rule(RuleDefinition),
}

/// An in-memory module registry.
///
/// Bare requests resolve through the request table; explicitly relative
/// requests (`./x`, `../x`) resolve lexically against the importer's
/// directory; absolute requests resolve to themselves. Either way, the
/// resulting path must be registered.
#[derive(Debug, Clone, Default)]
pub struct StaticModuleResolver {
    modules: HashMap<PathBuf, ModuleDefinition>,
    requests: HashMap<String, PathBuf>,
}

impl StaticModuleResolver {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module at an absolute path.
    pub fn add_module(&mut self, path: impl Into<PathBuf>, definition: ModuleDefinition) {
        self.modules.insert(path.into(), definition);
    }

    /// Register a bare request name pointing at a registered path.
    pub fn add_request(&mut self, request: impl Into<String>, path: impl Into<PathBuf>) {
        self.requests.insert(request.into(), path.into());
    }

    /// Register a module under a bare request name, at a synthetic
    /// node_modules-style path, and return that path.
    pub fn register(&mut self, request: &str, definition: ModuleDefinition) -> PathBuf {
        let path = PathBuf::from(format!("/node_modules/{request}/index.js"));
        self.add_module(path.clone(), definition);
        self.add_request(request, path.clone());
        path
    }

    fn wrong_kind(path: &Path, expected: &'static str) -> ConfigError {
        ConfigError::InvalidModuleKind {
            path: path.to_path_buf(),
            expected,
        }
    }
}

impl ModuleResolver for StaticModuleResolver {
    fn resolve(&self, request: &str, relative_to: &Path) -> Result<PathBuf, ConfigError> {
        let candidate = if request.starts_with("./") || request.starts_with("../") {
            let importer_dir = relative_to.parent().unwrap_or(relative_to);
            normalize_path(&importer_dir.join(request))
        } else if Path::new(request).is_absolute() {
            normalize_path(Path::new(request))
        } else {
            match self.requests.get(request) {
                Some(path) => path.clone(),
                None => {
                    return Err(ConfigError::ModuleNotFound {
                        request: request.to_owned(),
                        relative_to: Some(relative_to.to_path_buf()),
                    })
                }
            }
        };

        if self.modules.contains_key(&candidate) {
            Ok(candidate)
        } else {
            Err(ConfigError::ModuleNotFound {
                request: request.to_owned(),
                relative_to: Some(relative_to.to_path_buf()),
            })
        }
    }

    fn load_plugin(&self, path: &Path) -> Result<Arc<PluginDefinition>, ConfigError> {
        match self.modules.get(path) {
            Some(ModuleDefinition::Plugin(plugin)) => Ok(plugin.clone()),
            Some(_) => Err(Self::wrong_kind(path, "plugin")),
            None => Err(not_found(path)),
        }
    }

    fn load_parser(&self, path: &Path) -> Result<Arc<ParserDefinition>, ConfigError> {
        match self.modules.get(path) {
            Some(ModuleDefinition::Parser(parser)) => Ok(parser.clone()),
            Some(_) => Err(Self::wrong_kind(path, "parser")),
            None => Err(not_found(path)),
        }
    }

    fn load_rule(&self, request: &str) -> Result<RuleDefinition, ConfigError> {
        let path = match self.requests.get(request) {
            Some(path) => path.clone(),
            None => normalize_path(Path::new(request)),
        };
        match self.modules.get(&path) {
            Some(ModuleDefinition::Rule(rule)) => Ok(rule.clone()),
            Some(_) => Err(Self::wrong_kind(&path, "rule")),
            None => Err(not_found(&path)),
        }
    }

    fn load_config_module(&self, path: &Path) -> Result<Value, ConfigError> {
        match self.modules.get(path) {
            // Cloning gives the caller a fresh value each time, matching the
            // cache-bypass contract for `.js` configs.
            Some(ModuleDefinition::Config(value)) => Ok(value.clone()),
            Some(_) => Err(Self::wrong_kind(path, "config")),
            None => Err(not_found(path)),
        }
    }
}

/// Lexically normalize a path: resolve `.` and `..` components without
/// touching the filesystem.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_resolver_knows_nothing() {
        let resolver = NullResolver;
        let err = resolver
            .resolve("eslint-config-x", Path::new("/work/.eslintrc.js"))
            .unwrap_err();
        assert!(err.is_module_not_found());
    }

    #[test]
    fn test_bare_request_resolution() {
        let mut resolver = StaticModuleResolver::new();
        let path = resolver.register(
            "eslint-config-base",
            ModuleDefinition::Config(json!({ "rules": { "semi": "error" } })),
        );

        let resolved = resolver
            .resolve("eslint-config-base", Path::new("/work/__placeholder__.js"))
            .unwrap();
        assert_eq!(resolved, path);

        let value = resolver.load_config_module(&resolved).unwrap();
        assert_eq!(value["rules"]["semi"], json!("error"));
    }

    #[test]
    fn test_relative_request_resolution() {
        let mut resolver = StaticModuleResolver::new();
        resolver.add_module(
            "/work/configs/base.js",
            ModuleDefinition::Config(json!({})),
        );

        let resolved = resolver
            .resolve("./base.js", Path::new("/work/configs/importer.js"))
            .unwrap();
        assert_eq!(resolved, PathBuf::from("/work/configs/base.js"));

        let resolved = resolver
            .resolve("../configs/base.js", Path::new("/work/sub/importer.js"))
            .unwrap();
        assert_eq!(resolved, PathBuf::from("/work/configs/base.js"));
    }

    #[test]
    fn test_unknown_request_is_module_not_found() {
        let resolver = StaticModuleResolver::new();
        let err = resolver
            .resolve("eslint-plugin-ghost", Path::new("/work/x.js"))
            .unwrap_err();
        assert!(err.is_module_not_found());
    }

    #[test]
    fn test_kind_mismatch() {
        let mut resolver = StaticModuleResolver::new();
        let path = resolver.register("thing", ModuleDefinition::Config(json!({})));
        let err = resolver.load_plugin(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidModuleKind { expected: "plugin", .. }));
    }

    #[test]
    fn test_config_module_returns_fresh_value() {
        let mut resolver = StaticModuleResolver::new();
        let path = resolver.register("cfg", ModuleDefinition::Config(json!({ "root": true })));
        let mut first = resolver.load_config_module(&path).unwrap();
        first["root"] = json!(false);
        let second = resolver.load_config_module(&path).unwrap();
        assert_eq!(second["root"], json!(true));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/a/b/../c/./d")),
            PathBuf::from("/a/c/d")
        );
    }
}
