//! The ordered list of config elements and its extraction machinery.
//!
//! Index 0 is the outermost, lowest-precedence element; the last index is
//! the innermost, highest-precedence one. A [`ConfigArray`] owns two lazily
//! materialized per-instance slots:
//!
//! - the extraction cache, keyed by the comma-joined matched-index string:
//!   two requests selecting the same indices share one `Arc`;
//! - the plugin-member maps (environments, processors, rules contributed by
//!   all elements' plugins), built at most once and immutable afterward.
//!
//! The array is single-threaded by contract; interior caches use `RefCell`
//! and `OnceCell`. Hosts that share an array across threads must serialize
//! the first extraction externally.

use std::cell::{OnceCell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use crate::element::ConfigArrayElement;
use crate::error::ConfigError;
use crate::extracted::ExtractedConfig;
use crate::merge;
use crate::plugins::{ProcessorDefinition, RuleDefinition, RuleModule};
use crate::resolver::{ModuleResolver, NullResolver};
use crate::validate::{ConfigValidator, RuleSeverityValidator};

/// Rule definitions may chain through this many reference indirections
/// before resolution gives up.
const MAX_RULE_REFERENCE_DEPTH: usize = 10;

/// Name-prefixed indices of the members contributed by all plugins in a
/// config array. Built once per array, then immutable.
#[derive(Debug, Clone, Default)]
pub struct PluginMemberMaps {
    /// `"pluginId/envName"` → environment definition.
    pub environments: BTreeMap<String, Value>,
    /// `"pluginId/processorName"` → processor definition.
    pub processors: BTreeMap<String, Arc<ProcessorDefinition>>,
    /// `"pluginId/ruleName"` → normalized rule module.
    pub rules: BTreeMap<String, Arc<RuleModule>>,
}

/// An ordered sequence of config elements with per-file extraction.
pub struct ConfigArray {
    elements: Vec<ConfigArrayElement>,
    resolver: Arc<dyn ModuleResolver>,
    validator: Arc<dyn ConfigValidator>,
    extract_cache: RefCell<HashMap<String, Arc<ExtractedConfig>>>,
    member_maps: OnceCell<Arc<PluginMemberMaps>>,
}

impl ConfigArray {
    /// An array over the given elements with default services: a resolver
    /// that knows no modules and the severity validator.
    #[must_use]
    pub fn new(elements: Vec<ConfigArrayElement>) -> Self {
        Self::with_services(
            elements,
            Arc::new(NullResolver),
            Arc::new(RuleSeverityValidator),
        )
    }

    /// An array over the given elements with explicit resolver/validator
    /// services (used by the factory so extraction shares its seams).
    #[must_use]
    pub fn with_services(
        elements: Vec<ConfigArrayElement>,
        resolver: Arc<dyn ModuleResolver>,
        validator: Arc<dyn ConfigValidator>,
    ) -> Self {
        Self {
            elements,
            resolver,
            validator,
            extract_cache: RefCell::new(HashMap::new()),
            member_maps: OnceCell::new(),
        }
    }

    /// The elements, outermost first.
    #[must_use]
    pub fn elements(&self) -> &[ConfigArrayElement] {
        &self.elements
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the array holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The effective `root` flag: the boolean of the highest-precedence
    /// element that declared one, or `false`.
    #[must_use]
    pub fn root(&self) -> bool {
        self.elements
            .iter()
            .rev()
            .find_map(|element| element.root)
            .unwrap_or(false)
    }

    /// Indices of elements that apply to `file_path`, highest precedence
    /// first. This order is the merge order consumed by extraction.
    #[must_use]
    pub fn matched_indices(&self, file_path: &Path) -> Vec<usize> {
        self.elements
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, element)| {
                element
                    .criteria
                    .as_ref()
                    .map_or(true, |criteria| criteria.test(file_path))
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// Extract the merged configuration for an absolute file path.
    ///
    /// Results are cached by the matched-index set: two calls that select
    /// the same indices return the same `Arc`.
    ///
    /// # Errors
    ///
    /// Fails on a non-absolute path, on a winning broken parser/plugin, on
    /// rule-reference resolution failures, and on validation failures.
    pub fn extract_config(&self, file_path: &Path) -> Result<Arc<ExtractedConfig>, ConfigError> {
        if !file_path.is_absolute() {
            return Err(ConfigError::InvalidFilePath {
                value: file_path.display().to_string(),
            });
        }

        let indices = self.matched_indices(file_path);
        let cache_key = indices
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join(",");

        if let Some(cached) = self.extract_cache.borrow().get(&cache_key) {
            return Ok(Arc::clone(cached));
        }

        log::debug!(
            "Extracting config for {} (matched indices: [{cache_key}])",
            file_path.display()
        );

        let members = self.plugin_member_maps()?;
        let config = merge::fold_elements(indices.iter().map(|&index| &self.elements[index]))?;

        // Validation needs the full plugin maps, so it runs after the fold.
        for &index in &indices {
            self.validator
                .validate_config_array_element(&self.elements[index], &members)?;
        }

        let config = Arc::new(config);
        self.extract_cache
            .borrow_mut()
            .insert(cache_key, Arc::clone(&config));
        Ok(config)
    }

    /// The plugin-member maps (`pluginEnvironments` / `pluginProcessors` /
    /// `pluginRules`), materialized on first demand and immutable after.
    ///
    /// # Errors
    ///
    /// Fails when a rule declared by reference cannot be resolved, or
    /// chains too deeply.
    pub fn plugin_member_maps(&self) -> Result<Arc<PluginMemberMaps>, ConfigError> {
        if let Some(maps) = self.member_maps.get() {
            return Ok(Arc::clone(maps));
        }
        let maps = Arc::new(self.build_member_maps()?);
        // A concurrent fill is impossible (single-threaded contract); a
        // lost race would only mean rebuilding identical maps.
        let _ = self.member_maps.set(Arc::clone(&maps));
        Ok(maps)
    }

    fn build_member_maps(&self) -> Result<PluginMemberMaps, ConfigError> {
        let mut maps = PluginMemberMaps::default();
        let mut seen: HashSet<&str> = HashSet::new();

        for element in &self.elements {
            let Some(plugins) = &element.plugins else {
                continue;
            };
            for (plugin_id, plugin) in plugins {
                // First occurrence of a plugin id wins.
                if !seen.insert(plugin_id) {
                    continue;
                }
                let Some(definition) = &plugin.definition else {
                    continue;
                };

                for (name, environment) in &definition.environments {
                    maps.environments
                        .insert(qualified_member_id(plugin_id, name), environment.clone());
                }
                for (name, processor) in &definition.processors {
                    maps.processors
                        .insert(qualified_member_id(plugin_id, name), Arc::clone(processor));
                }
                for (name, rule) in &definition.rules {
                    let normalized = normalize_rule(rule, self.resolver.as_ref(), 0)?;
                    maps.rules
                        .insert(qualified_member_id(plugin_id, name), normalized);
                }
            }
        }

        Ok(maps)
    }
}

impl std::fmt::Debug for ConfigArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigArray")
            .field("elements", &self.elements)
            .finish_non_exhaustive()
    }
}

impl std::ops::Deref for ConfigArray {
    type Target = [ConfigArrayElement];

    fn deref(&self) -> &Self::Target {
        &self.elements
    }
}

/// `"pluginId/shortName"`, or just `"shortName"` for the empty plugin id.
fn qualified_member_id(plugin_id: &str, short_name: &str) -> String {
    if plugin_id.is_empty() {
        short_name.to_owned()
    } else {
        format!("{plugin_id}/{short_name}")
    }
}

/// Normalize a rule definition: references resolve through the loader and
/// renormalize, bounded in depth; in-place modules are used as-is.
fn normalize_rule(
    rule: &RuleDefinition,
    resolver: &dyn ModuleResolver,
    depth: usize,
) -> Result<Arc<RuleModule>, ConfigError> {
    match rule {
        RuleDefinition::Module(module) => Ok(Arc::clone(module)),
        RuleDefinition::Reference(request) => {
            if depth >= MAX_RULE_REFERENCE_DEPTH {
                return Err(ConfigError::RuleResolutionTooDeep {
                    request: request.clone(),
                    depth,
                });
            }
            let loaded = resolver.load_rule(request)?;
            normalize_rule(&loaded, resolver, depth + 1)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use serde_json::json;

    use crate::dependency::{LoadedDependency, LoadedParser, LoadedPlugin};
    use crate::overrides::OverrideTester;
    use crate::plugins::{ParserDefinition, PluginDefinition};
    use crate::resolver::{ModuleDefinition, StaticModuleResolver};

    fn this_file() -> PathBuf {
        PathBuf::from("/work/src/config_array_test.js")
    }

    fn element(name: &str) -> ConfigArrayElement {
        ConfigArrayElement {
            name: name.to_owned(),
            ..Default::default()
        }
    }

    fn object(value: serde_json::Value) -> crate::types::ConfigObject {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected an object literal"),
        }
    }

    fn broken_parser() -> LoadedParser {
        LoadedDependency::failed(
            "bad-parser",
            ConfigError::ModuleNotFound {
                request: "bad-parser".to_owned(),
                relative_to: None,
            },
            "test",
            None,
        )
    }

    fn good_parser() -> LoadedParser {
        LoadedDependency::succeeded(
            "good-parser",
            Arc::new(ParserDefinition::default()),
            None,
            "test",
            None,
        )
    }

    #[test]
    fn test_root_scans_from_highest_index() {
        let mut a = element("a");
        a.root = Some(true);
        let mut b = element("b");
        b.root = Some(false);
        let array = ConfigArray::new(vec![a, b]);
        assert!(!array.root());
    }

    #[test]
    fn test_root_defaults_to_false() {
        let array = ConfigArray::new(vec![element("a")]);
        assert!(!array.root());
    }

    #[test]
    fn test_root_skips_elements_without_flag() {
        let mut a = element("a");
        a.root = Some(true);
        let b = element("b");
        let array = ConfigArray::new(vec![a, b]);
        assert!(array.root());
    }

    #[test]
    fn test_matched_indices_order_is_high_to_low() {
        let array = ConfigArray::new(vec![element("a"), element("b"), element("c")]);
        assert_eq!(array.matched_indices(&this_file()), vec![2, 1, 0]);
    }

    #[test]
    fn test_matched_indices_respects_criteria() {
        let mut ts_only = element("ts");
        ts_only.criteria =
            OverrideTester::create(&["*.ts".to_owned()], &[], Path::new("/work")).unwrap();
        let array = ConfigArray::new(vec![element("all"), ts_only]);

        assert_eq!(array.matched_indices(Path::new("/work/a.ts")), vec![1, 0]);
        assert_eq!(array.matched_indices(Path::new("/work/a.js")), vec![0]);
    }

    #[test]
    fn test_extract_config_requires_absolute_path() {
        let array = ConfigArray::new(vec![element("a")]);
        let err = array.extract_config(Path::new("relative/file.js")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFilePath { .. }));
        assert!(err.to_string().contains("relative/file.js"));
    }

    #[test]
    fn test_extract_config_is_cached_by_index_set() {
        let mut rules = element("rules");
        rules.rules = Some(object(json!({ "semi": "error" })));
        let array = ConfigArray::new(vec![rules]);

        let first = array.extract_config(&this_file()).unwrap();
        let second = array.extract_config(&this_file()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        // A different path with the same matched indices hits the same entry.
        let third = array
            .extract_config(Path::new("/work/other/file.js"))
            .unwrap();
        assert!(Arc::ptr_eq(&first, &third));
    }

    /// An errored parser inside a non-matching element contributes nothing.
    #[test]
    fn test_errored_parser_bypassed_by_non_match() {
        let mut ts_only = element("ts");
        ts_only.criteria =
            OverrideTester::create(&["*.ts".to_owned()], &[], Path::new("/work")).unwrap();
        ts_only.parser = Some(broken_parser());
        let array = ConfigArray::new(vec![element("base"), ts_only]);

        let config = array.extract_config(&this_file()).unwrap();
        assert!(config.parser.is_none());
    }

    /// An errored parser shadowed by a higher-precedence parser is
    /// tolerated.
    #[test]
    fn test_errored_parser_overridden() {
        let mut low = element("low");
        low.parser = Some(broken_parser());
        let mut high = element("high");
        high.parser = Some(good_parser());
        let array = ConfigArray::new(vec![low, high]);

        let config = array.extract_config(&this_file()).unwrap();
        let parser = config.parser.as_ref().unwrap();
        assert_eq!(parser.id, "good-parser");
        assert!(parser.error.is_none());
    }

    /// An errored parser that wins fails the extraction.
    #[test]
    fn test_errored_parser_wins() {
        let mut only = element("only");
        only.parser = Some(broken_parser());
        let array = ConfigArray::new(vec![only]);

        let err = array.extract_config(&this_file()).unwrap_err();
        assert!(err.is_module_not_found());
    }

    #[test]
    fn test_errored_plugin_wins() {
        let mut only = element("only");
        let mut plugins = BTreeMap::new();
        plugins.insert(
            "ghost".to_owned(),
            LoadedPlugin::failed(
                "ghost",
                ConfigError::PluginMissing {
                    plugin_name: "eslint-plugin-ghost".to_owned(),
                    project_root: PathBuf::from("/work"),
                    importer_name: "only".to_owned(),
                },
                "only",
                None,
            ),
        );
        only.plugins = Some(plugins);
        let array = ConfigArray::new(vec![only]);

        let err = array.extract_config(&this_file()).unwrap_err();
        assert_eq!(err.message_template(), Some("plugin-missing"));
    }

    #[test]
    fn test_plugin_member_maps_first_occurrence_wins() {
        let make_plugin = |env_value: bool| {
            let mut definition = PluginDefinition::default();
            definition
                .environments
                .insert("custom".to_owned(), json!({ "globals": { "x": env_value } }));
            let mut plugins = BTreeMap::new();
            plugins.insert(
                "p".to_owned(),
                LoadedPlugin::succeeded("p", Arc::new(definition), None, "test", None),
            );
            plugins
        };

        let mut first = element("first");
        first.plugins = Some(make_plugin(true));
        let mut second = element("second");
        second.plugins = Some(make_plugin(false));
        let array = ConfigArray::new(vec![first, second]);

        let maps = array.plugin_member_maps().unwrap();
        assert_eq!(
            maps.environments.get("p/custom"),
            Some(&json!({ "globals": { "x": true } }))
        );
    }

    #[test]
    fn test_plugin_member_maps_materialize_once() {
        let mut only = element("only");
        let mut definition = PluginDefinition::default();
        definition
            .processors
            .insert(".md".to_owned(), Arc::new(ProcessorDefinition::default()));
        let mut plugins = BTreeMap::new();
        plugins.insert(
            "markdown".to_owned(),
            LoadedPlugin::succeeded("markdown", Arc::new(definition), None, "test", None),
        );
        only.plugins = Some(plugins);
        let array = ConfigArray::new(vec![only]);

        let first = array.plugin_member_maps().unwrap();
        let second = array.plugin_member_maps().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.processors.contains_key("markdown/.md"));
    }

    #[test]
    fn test_rule_reference_normalization() {
        let mut resolver = StaticModuleResolver::new();
        resolver.register(
            "indirect-rule",
            ModuleDefinition::Rule(RuleDefinition::Module(Arc::new(RuleModule {
                meta: Some(json!({ "docs": "indirect" })),
                schema: None,
            }))),
        );

        let mut definition = PluginDefinition::default();
        definition.rules.insert(
            "direct".to_owned(),
            RuleDefinition::Module(RuleModule::bare()),
        );
        definition.rules.insert(
            "via-reference".to_owned(),
            RuleDefinition::Reference("indirect-rule".to_owned()),
        );

        let mut only = element("only");
        let mut plugins = BTreeMap::new();
        plugins.insert(
            "p".to_owned(),
            LoadedPlugin::succeeded("p", Arc::new(definition), None, "test", None),
        );
        only.plugins = Some(plugins);

        let array = ConfigArray::with_services(
            vec![only],
            Arc::new(resolver),
            Arc::new(RuleSeverityValidator),
        );
        let maps = array.plugin_member_maps().unwrap();
        assert!(maps.rules.contains_key("p/direct"));
        assert_eq!(
            maps.rules["p/via-reference"].meta,
            Some(json!({ "docs": "indirect" }))
        );
    }

    #[test]
    fn test_rule_reference_depth_bound() {
        let mut resolver = StaticModuleResolver::new();
        resolver.register(
            "loop",
            ModuleDefinition::Rule(RuleDefinition::Reference("loop".to_owned())),
        );

        let mut definition = PluginDefinition::default();
        definition
            .rules
            .insert("r".to_owned(), RuleDefinition::Reference("loop".to_owned()));

        let mut only = element("only");
        let mut plugins = BTreeMap::new();
        plugins.insert(
            "p".to_owned(),
            LoadedPlugin::succeeded("p", Arc::new(definition), None, "test", None),
        );
        only.plugins = Some(plugins);

        let array = ConfigArray::with_services(
            vec![only],
            Arc::new(resolver),
            Arc::new(RuleSeverityValidator),
        );
        let err = array.plugin_member_maps().unwrap_err();
        assert!(matches!(err, ConfigError::RuleResolutionTooDeep { .. }));
    }

    #[test]
    fn test_validation_failure_names_source() {
        let mut bad = element(".eslintrc.json » bad");
        bad.rules = Some(object(json!({ "semi": "severe" })));
        let array = ConfigArray::new(vec![bad]);

        let err = array.extract_config(&this_file()).unwrap_err();
        match err {
            ConfigError::Validation { source_name, .. } => {
                assert_eq!(source_name, ".eslintrc.json » bad");
            }
            other => panic!("expected a validation error, got {other:?}"),
        }
    }
}
