//! The config array factory: loads configuration sources, resolves
//! `extends` chains, loads parsers and plugins, flattens `overrides`, and
//! assembles [`ConfigArray`] values.
//!
//! Normalization turns one raw body into a linear stream of elements:
//!
//! 1. `extends` targets are inlined first (lowest precedence), recursively;
//! 2. plugins contributing file-extension processors emit synthetic
//!    elements (`files: ["*<ext>"]`, `processor: "<pluginId>/<ext>"`);
//! 3. the body's own config fields become one element;
//! 4. each `overrides` entry recurses with the name suffix
//!    `#overrides[i]`;
//! 5. finally the body's `files`/`excludedFiles` criteria are AND-composed
//!    onto every produced element and rebound to the outermost importer's
//!    directory, and `root` is cleared on any element carrying criteria.
//!
//! Parser and plugin load failures are captured into dependency records
//! rather than raised (load eagerly, fail lazily); `extends` failures are
//! annotated with a `Referenced from:` trail.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::builtin;
use crate::config_array::ConfigArray;
use crate::dependency::{LoadedDependency, LoadedParser, LoadedPlugin};
use crate::element::{ConfigArrayElement, ConfigBody};
use crate::error::ConfigError;
use crate::loaders;
use crate::naming;
use crate::overrides::{relative_path_string, OverrideTester};
use crate::plugins::{ParserDefinition, PluginDefinition};
use crate::resolver::{normalize_path, ModuleResolver, NullResolver};
use crate::validate::{ConfigValidator, RuleSeverityValidator};

/// Candidate config file names probed by
/// [`ConfigArrayFactory::load_on_directory`], in strict order.
const CONFIG_FILE_NAMES: &[&str] = &[
    ".eslintrc.js",
    ".eslintrc.yaml",
    ".eslintrc.yml",
    ".eslintrc.json",
    ".eslintrc",
    "package.json",
];

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Construction options for [`ConfigArrayFactory`].
#[derive(Default)]
pub struct ConfigArrayFactoryOptions {
    /// The project root. Defaults to the process working directory.
    pub cwd: Option<PathBuf>,
    /// Parsers available without module resolution, keyed by specifier.
    pub additional_parser_pool: HashMap<String, Arc<ParserDefinition>>,
    /// Plugins available without module resolution, keyed by full package
    /// name or shorthand id.
    pub additional_plugin_pool: HashMap<String, Arc<PluginDefinition>>,
    /// The module resolution seam. Defaults to a resolver that knows no
    /// modules.
    pub resolver: Option<Arc<dyn ModuleResolver>>,
    /// The schema validation seam. Defaults to the severity validator.
    pub validator: Option<Arc<dyn ConfigValidator>>,
}

/// Per-call options for the factory entry points.
#[derive(Default)]
pub struct LoadOptions<'a> {
    /// Source path attributed to an in-memory body (`create` only).
    pub file_path: Option<PathBuf>,
    /// Override for the diagnostic source name. Defaults to the config
    /// file's path relative to `cwd`.
    pub name: Option<String>,
    /// A lower-precedence array to prepend, unless the new configuration
    /// declares `root: true`.
    pub parent: Option<&'a ConfigArray>,
}

/// State threaded through one normalization: the config file being
/// processed, the outermost importer's directory that criteria bind to,
/// and the diagnostic name.
#[derive(Clone)]
struct ConfigContext {
    file_path: Option<PathBuf>,
    match_base_path: PathBuf,
    name: String,
}

impl ConfigContext {
    /// The label used in `Referenced from:` trails.
    fn importer_label(&self) -> String {
        match &self.file_path {
            Some(path) => path.display().to_string(),
            None => self.name.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Loads and normalizes configuration into [`ConfigArray`] values.
pub struct ConfigArrayFactory {
    cwd: PathBuf,
    additional_parser_pool: HashMap<String, Arc<ParserDefinition>>,
    additional_plugin_pool: HashMap<String, Arc<PluginDefinition>>,
    resolver: Arc<dyn ModuleResolver>,
    validator: Arc<dyn ConfigValidator>,
}

impl ConfigArrayFactory {
    /// Build a factory from options; see [`ConfigArrayFactoryOptions`] for
    /// the defaults.
    #[must_use]
    pub fn new(options: ConfigArrayFactoryOptions) -> Self {
        let cwd = options.cwd.unwrap_or_else(|| {
            std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"))
        });
        Self {
            cwd,
            additional_parser_pool: options.additional_parser_pool,
            additional_plugin_pool: options.additional_plugin_pool,
            resolver: options.resolver.unwrap_or_else(|| Arc::new(NullResolver)),
            validator: options
                .validator
                .unwrap_or_else(|| Arc::new(RuleSeverityValidator)),
        }
    }

    /// The project root this factory resolves against.
    #[must_use]
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Normalize an in-memory config body into a config array.
    ///
    /// The parent array is prepended unless the body declares
    /// `root: true`. `None` data yields the parent's elements unchanged
    /// (or an empty array).
    ///
    /// # Errors
    ///
    /// Fails on schema validation, invalid override patterns, and
    /// `extends` resolution failures.
    pub fn create(
        &self,
        data: Option<&ConfigBody>,
        options: LoadOptions<'_>,
    ) -> Result<ConfigArray, ConfigError> {
        let mut elements = Vec::new();
        if let Some(body) = data {
            let ctx = self.create_context(options.file_path, options.name);
            self.validate_and_normalize(body, &ctx, &mut elements)?;
        }
        Ok(self.compose(options.parent, elements))
    }

    /// Load a config file by path or shareable-config package name,
    /// resolved against `cwd`.
    ///
    /// # Errors
    ///
    /// Fails when the file is missing or unreadable, and on the same
    /// conditions as [`ConfigArrayFactory::create`].
    pub fn load_file(
        &self,
        reference: &str,
        options: LoadOptions<'_>,
    ) -> Result<ConfigArray, ConfigError> {
        let path = self.resolve_config_file_reference(reference);
        let body = loaders::load_config_file(&path, self.resolver.as_ref())?
            .ok_or_else(|| ConfigError::FileNotFound { path: path.clone() })?;

        let ctx = self.create_context(Some(path), options.name);
        let mut elements = Vec::new();
        self.validate_and_normalize(&body, &ctx, &mut elements)?;
        Ok(self.compose(options.parent, elements))
    }

    /// Probe a directory for a config file and load the first hit.
    ///
    /// Candidates are tried in the fixed order `.eslintrc.js`,
    /// `.eslintrc.yaml`, `.eslintrc.yml`, `.eslintrc.json`, `.eslintrc`,
    /// `package.json`; missing files and unresolvable modules mean "try
    /// next". A directory without any config yields the parent's elements
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Propagates every failure other than file-not-found and
    /// module-not-found.
    pub fn load_on_directory(
        &self,
        directory: &Path,
        options: LoadOptions<'_>,
    ) -> Result<ConfigArray, ConfigError> {
        let directory = if directory.is_absolute() {
            directory.to_path_buf()
        } else {
            self.cwd.join(directory)
        };

        for file_name in CONFIG_FILE_NAMES {
            let path = directory.join(file_name);
            let body = match loaders::load_config_file(&path, self.resolver.as_ref()) {
                Ok(Some(body)) => body,
                Ok(None) => continue,
                Err(error) if error.is_file_not_found() || error.is_module_not_found() => continue,
                Err(error) => return Err(error),
            };

            log::debug!("Config file found: {}", path.display());
            let ctx = self.create_context(Some(path), options.name.clone());
            let mut elements = Vec::new();
            self.validate_and_normalize(&body, &ctx, &mut elements)?;
            return Ok(self.compose(options.parent, elements));
        }

        log::debug!("Config file not found in {}", directory.display());
        Ok(self.compose(options.parent, Vec::new()))
    }

    // -----------------------------------------------------------------------
    // Composition and context
    // -----------------------------------------------------------------------

    /// Prepend the parent's elements unless the new elements declare
    /// `root: true`. The root flag is read off the new elements before any
    /// prepend.
    fn compose(
        &self,
        parent: Option<&ConfigArray>,
        elements: Vec<ConfigArrayElement>,
    ) -> ConfigArray {
        let declares_root = elements
            .iter()
            .rev()
            .find_map(|element| element.root)
            .unwrap_or(false);

        let combined = match parent {
            Some(parent) if !declares_root => {
                let mut combined = parent.elements().to_vec();
                combined.extend(elements);
                combined
            }
            _ => elements,
        };

        ConfigArray::with_services(
            combined,
            Arc::clone(&self.resolver),
            Arc::clone(&self.validator),
        )
    }

    fn create_context(&self, file_path: Option<PathBuf>, name: Option<String>) -> ConfigContext {
        let match_base_path = file_path
            .as_ref()
            .and_then(|path| path.parent())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.cwd.clone());
        let name = name.unwrap_or_else(|| {
            file_path
                .as_ref()
                .map(|path| relative_path_string(&self.cwd, path))
                .unwrap_or_default()
        });
        ConfigContext {
            file_path,
            match_base_path,
            name,
        }
    }

    /// Resolve a `load_file` reference, tolerating both a file path and a
    /// shareable-config package name.
    fn resolve_config_file_reference(&self, reference: &str) -> PathBuf {
        let as_path = normalize_path(&self.cwd.join(reference));
        if naming::is_file_path(reference) || as_path.exists() {
            return as_path;
        }

        let request = naming::normalize_package_name(reference, "eslint-config");
        let importer = self.cwd.join("__placeholder__.js");
        match self.resolver.resolve(&request, &importer) {
            Ok(path) => path,
            Err(_) => as_path,
        }
    }

    // -----------------------------------------------------------------------
    // Normalization pipeline
    // -----------------------------------------------------------------------

    /// Validate a body exactly once, then normalize it. Every body (entry
    /// point, extended file, or plugin preset) passes through here.
    fn validate_and_normalize(
        &self,
        body: &ConfigBody,
        ctx: &ConfigContext,
        out: &mut Vec<ConfigArrayElement>,
    ) -> Result<(), ConfigError> {
        self.validator.validate_config_schema(body, &ctx.name)?;
        self.normalize_body(body, ctx, out)
    }

    /// Normalize one body: emit its elements, then apply the body's own
    /// `files`/`excludedFiles` criteria to everything it produced.
    fn normalize_body(
        &self,
        body: &ConfigBody,
        ctx: &ConfigContext,
        out: &mut Vec<ConfigArrayElement>,
    ) -> Result<(), ConfigError> {
        let files = one_or_many_to_vec(body.files.as_ref());
        let excluded_files = one_or_many_to_vec(body.excluded_files.as_ref());
        let entry_criteria =
            OverrideTester::create(&files, &excluded_files, &ctx.match_base_path)?;

        let start = out.len();
        self.normalize_body_fields(body, ctx, out)?;

        for element in &mut out[start..] {
            let combined = OverrideTester::and(entry_criteria.clone(), element.criteria.take());
            // Criteria evaluate relative to the outermost importer's
            // directory, and gated elements never cut the cascade.
            element.criteria = combined.map(|criteria| criteria.rebase(&ctx.match_base_path));
            if element.criteria.is_some() {
                element.root = None;
            }
        }
        Ok(())
    }

    fn normalize_body_fields(
        &self,
        body: &ConfigBody,
        ctx: &ConfigContext,
        out: &mut Vec<ConfigArrayElement>,
    ) -> Result<(), ConfigError> {
        // 1. Flatten `extends`, outermost first.
        if let Some(extends) = &body.extends {
            for extend_name in extends.as_slice().iter().filter(|name| !name.is_empty()) {
                self.load_extends(extend_name, ctx, out)?;
            }
        }

        // 2. Load the parser and plugins, capturing failures.
        let parser = body
            .parser
            .as_ref()
            .map(|specifier| self.load_parser(specifier, ctx));
        let loaded_plugins = body
            .plugins
            .as_ref()
            .map(|specifiers| self.load_plugins(specifiers, ctx));

        // 3. Synthetic elements for file-extension processors.
        if let Some(loaded) = &loaded_plugins {
            self.emit_file_extension_processors(loaded, ctx, out)?;
        }

        // 4. The body's own config fields.
        let plugins = loaded_plugins.map(|loaded| {
            loaded
                .into_iter()
                .map(|plugin| (plugin.id.clone(), plugin))
                .collect::<BTreeMap<_, _>>()
        });
        out.push(ConfigArrayElement {
            name: ctx.name.clone(),
            file_path: ctx.file_path.clone(),
            criteria: None,
            env: body.env.clone(),
            globals: body.globals.clone(),
            parser,
            parser_options: body.parser_options.clone(),
            plugins,
            processor: body.processor.clone(),
            root: body.root_flag(),
            rules: body.rules.clone(),
            settings: body.settings.clone(),
        });

        // 5. Flatten `overrides`. Overrides cannot declare `root`.
        if let Some(overrides) = &body.overrides {
            for (index, entry) in overrides.iter().enumerate() {
                let mut entry = entry.clone();
                entry.root = None;
                let override_ctx = ConfigContext {
                    file_path: ctx.file_path.clone(),
                    match_base_path: ctx.match_base_path.clone(),
                    name: format!("{}#overrides[{index}]", ctx.name),
                };
                self.normalize_body(&entry, &override_ctx, out)?;
            }
        }

        Ok(())
    }

    /// Emit one synthetic gated element per file-extension processor
    /// (processor ids beginning with `.`).
    fn emit_file_extension_processors(
        &self,
        plugins: &[LoadedPlugin],
        ctx: &ConfigContext,
        out: &mut Vec<ConfigArrayElement>,
    ) -> Result<(), ConfigError> {
        for plugin in plugins {
            let Some(definition) = &plugin.definition else {
                continue;
            };
            for processor_id in definition.processors.keys() {
                if !processor_id.starts_with('.') {
                    continue;
                }
                let synthetic = ConfigBody {
                    files: Some(vec![format!("*{processor_id}")].into()),
                    processor: Some(format!("{}/{processor_id}", plugin.id)),
                    ..Default::default()
                };
                self.normalize_body(&synthetic, ctx, out)?;
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Extends resolution
    // -----------------------------------------------------------------------

    fn load_extends(
        &self,
        extend_name: &str,
        ctx: &ConfigContext,
        out: &mut Vec<ConfigArrayElement>,
    ) -> Result<(), ConfigError> {
        log::debug!("Resolving extends: {extend_name}");
        let result = if let Some(builtin_name) = extend_name.strip_prefix("eslint:") {
            self.load_extended_builtin_config(extend_name, builtin_name, ctx, out)
        } else if extend_name.starts_with("plugin:") {
            self.load_extended_plugin_config(extend_name, ctx, out)
        } else {
            self.load_extended_shareable_config(extend_name, ctx, out)
        };
        result.map_err(|error| error.referenced_from(ctx.importer_label()))
    }

    /// `eslint:recommended` and `eslint:all` load fixed built-in bodies;
    /// any other `eslint:` form is a missing config.
    fn load_extended_builtin_config(
        &self,
        extend_name: &str,
        builtin_name: &str,
        ctx: &ConfigContext,
        out: &mut Vec<ConfigArrayElement>,
    ) -> Result<(), ConfigError> {
        let body = match builtin_name {
            "recommended" => builtin::recommended(),
            "all" => builtin::all(),
            _ => {
                return Err(ConfigError::ExtendConfigMissing {
                    config_name: extend_name.to_owned(),
                    importer_name: ctx.name.clone(),
                })
            }
        };
        let child_ctx = ConfigContext {
            file_path: None,
            match_base_path: ctx.match_base_path.clone(),
            name: format!("{} » {extend_name}", ctx.name),
        };
        self.validate_and_normalize(&body, &child_ctx, out)
    }

    /// `plugin:<pluginName>/<configName>` looks the preset up in the
    /// plugin's `configs` map. Plugin names may not be filesystem paths.
    fn load_extended_plugin_config(
        &self,
        extend_name: &str,
        ctx: &ConfigContext,
        out: &mut Vec<ConfigArrayElement>,
    ) -> Result<(), ConfigError> {
        let reference = &extend_name["plugin:".len()..];
        let Some(slash) = reference.rfind('/') else {
            return Err(ConfigError::ExtendConfigMissing {
                config_name: extend_name.to_owned(),
                importer_name: ctx.name.clone(),
            });
        };
        let (plugin_name, config_name) = (&reference[..slash], &reference[slash + 1..]);

        if naming::is_file_path(plugin_name) {
            return Err(ConfigError::PluginPathNotAllowed {
                name: plugin_name.to_owned(),
            });
        }

        let plugin = self.load_plugin(plugin_name, ctx);
        if let Some(error) = &plugin.error {
            return Err((**error).clone());
        }

        let body = plugin
            .definition
            .as_ref()
            .and_then(|definition| definition.configs.get(config_name))
            .ok_or_else(|| ConfigError::ExtendConfigMissing {
                config_name: extend_name.to_owned(),
                importer_name: ctx.name.clone(),
            })?
            .clone();

        let child_ctx = ConfigContext {
            file_path: plugin.file_path.clone(),
            match_base_path: ctx.match_base_path.clone(),
            name: format!("{} » {extend_name}", ctx.name),
        };
        self.validate_and_normalize(&body, &child_ctx, out)
    }

    /// Everything else is a shareable config: an absolute path is used
    /// as-is, a dotted relative resolves against the importer, and a bare
    /// name goes through the shareable prefix and the module resolver.
    fn load_extended_shareable_config(
        &self,
        extend_name: &str,
        ctx: &ConfigContext,
        out: &mut Vec<ConfigArrayElement>,
    ) -> Result<(), ConfigError> {
        let importer = ctx
            .file_path
            .clone()
            .unwrap_or_else(|| self.cwd.join("__placeholder__.js"));

        let (request, file_path) = if naming::is_file_path(extend_name) {
            let path = Path::new(extend_name);
            let resolved = if path.is_absolute() {
                path.to_path_buf()
            } else {
                let importer_dir = importer.parent().unwrap_or(&self.cwd);
                normalize_path(&importer_dir.join(path))
            };
            (extend_name.to_owned(), resolved)
        } else {
            let request = naming::normalize_package_name(extend_name, "eslint-config");
            let resolved = self.resolver.resolve(&request, &importer).map_err(|error| {
                if error.is_module_not_found() {
                    ConfigError::ExtendConfigMissing {
                        config_name: extend_name.to_owned(),
                        importer_name: ctx.name.clone(),
                    }
                } else {
                    error
                }
            })?;
            (request, resolved)
        };

        let body = loaders::load_config_file(&file_path, self.resolver.as_ref())?
            .ok_or_else(|| ConfigError::FileNotFound {
                path: file_path.clone(),
            })?;
        let child_ctx = ConfigContext {
            file_path: Some(file_path),
            match_base_path: ctx.match_base_path.clone(),
            name: format!("{} » {request}", ctx.name),
        };
        self.validate_and_normalize(&body, &child_ctx, out)
    }

    // -----------------------------------------------------------------------
    // Parser and plugin loading
    // -----------------------------------------------------------------------

    /// Load a parser, consulting the additional pool first. Parsers
    /// resolve relative to the importing config file. Failures are
    /// captured, carrying the raw error.
    fn load_parser(&self, specifier: &str, ctx: &ConfigContext) -> LoadedParser {
        if let Some(parser) = self.additional_parser_pool.get(specifier) {
            return LoadedDependency::succeeded(
                specifier,
                Arc::clone(parser),
                None,
                ctx.name.clone(),
                ctx.file_path.clone(),
            );
        }

        let importer = ctx
            .file_path
            .clone()
            .unwrap_or_else(|| self.cwd.join("__placeholder__.js"));
        let loaded = self
            .resolver
            .resolve(specifier, &importer)
            .and_then(|path| {
                self.resolver
                    .load_parser(&path)
                    .map(|definition| (path, definition))
            });

        match loaded {
            Ok((path, definition)) => {
                log::debug!("Loaded parser {specifier} from {}", path.display());
                LoadedDependency::succeeded(
                    specifier,
                    definition,
                    Some(path),
                    ctx.name.clone(),
                    ctx.file_path.clone(),
                )
            }
            Err(error) => {
                log::debug!("Failed to load parser {specifier}: {error}");
                LoadedDependency::failed(specifier, error, ctx.name.clone(), ctx.file_path.clone())
            }
        }
    }

    fn load_plugins(&self, specifiers: &[String], ctx: &ConfigContext) -> Vec<LoadedPlugin> {
        specifiers
            .iter()
            .map(|specifier| self.load_plugin(specifier, ctx))
            .collect()
    }

    /// Load a plugin, consulting the additional pool first. Plugins always
    /// resolve relative to the project root. Failures are captured;
    /// module-not-found carries the `plugin-missing` template and
    /// whitespace in the specifier is rejected up front.
    fn load_plugin(&self, specifier: &str, ctx: &ConfigContext) -> LoadedPlugin {
        if specifier.chars().any(char::is_whitespace) {
            return LoadedDependency::failed(
                specifier,
                ConfigError::WhitespaceInPluginName {
                    plugin_name: specifier.to_owned(),
                    importer_name: ctx.name.clone(),
                },
                ctx.name.clone(),
                ctx.file_path.clone(),
            );
        }

        let request = naming::normalize_package_name(specifier, "eslint-plugin");
        let id = naming::get_shorthand_name(&request, "eslint-plugin");

        if let Some(plugin) = self
            .additional_plugin_pool
            .get(&request)
            .or_else(|| self.additional_plugin_pool.get(&id))
        {
            return LoadedDependency::succeeded(
                id,
                Arc::clone(plugin),
                None,
                ctx.name.clone(),
                ctx.file_path.clone(),
            );
        }

        let relative_to = self.cwd.join("__placeholder__.js");
        let loaded = self
            .resolver
            .resolve(&request, &relative_to)
            .and_then(|path| {
                self.resolver
                    .load_plugin(&path)
                    .map(|definition| (path, definition))
            });

        match loaded {
            Ok((path, definition)) => {
                log::debug!("Loaded plugin {request} from {}", path.display());
                LoadedDependency::succeeded(
                    id,
                    definition,
                    Some(path),
                    ctx.name.clone(),
                    ctx.file_path.clone(),
                )
            }
            Err(error) => {
                let error = if error.is_module_not_found() {
                    ConfigError::PluginMissing {
                        plugin_name: request,
                        project_root: self.cwd.clone(),
                        importer_name: ctx.name.clone(),
                    }
                } else {
                    error
                };
                log::debug!("Failed to load plugin {specifier}: {error}");
                LoadedDependency::failed(id, error, ctx.name.clone(), ctx.file_path.clone())
            }
        }
    }
}

fn one_or_many_to_vec(field: Option<&crate::types::OneOrMany<String>>) -> Vec<String> {
    field
        .map(|value| value.as_slice().to_vec())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
