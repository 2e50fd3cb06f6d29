//! Definition records for plugins, parsers, processors, and rules.
//!
//! These are the opaque payloads carried by loaded dependencies. The
//! resolver never executes them; it only indexes their members (configs,
//! environments, processors, rules) during normalization and extraction.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::element::ConfigBody;

/// A loaded plugin module: named preset configs plus contributed
/// environments, processors, and rules.
#[derive(Debug, Clone, Default)]
pub struct PluginDefinition {
    /// Named preset configurations, referenced as `plugin:<id>/<name>`.
    pub configs: BTreeMap<String, ConfigBody>,
    /// Environment definitions contributed by the plugin.
    pub environments: BTreeMap<String, Value>,
    /// Processor definitions, keyed by processor id. Ids beginning with a
    /// `.` are file-extension processors and produce synthetic config
    /// elements during normalization.
    pub processors: BTreeMap<String, Arc<ProcessorDefinition>>,
    /// Rule definitions, keyed by the rule's short name.
    pub rules: BTreeMap<String, RuleDefinition>,
}

/// A loaded parser module. The resolver treats parsers as opaque; only
/// identity and optional metadata are visible.
#[derive(Debug, Clone, Default)]
pub struct ParserDefinition {
    /// Optional parser metadata (name, version).
    pub meta: Option<Value>,
}

/// A processor definition contributed by a plugin.
#[derive(Debug, Clone, Default)]
pub struct ProcessorDefinition {
    /// Whether the processor supports autofixing through its mapping.
    pub supports_autofix: bool,
}

/// A rule as declared by a plugin.
///
/// A rule may be declared in place or by reference to another module; a
/// reference is resolved through the module resolver when the owning
/// array's rule map is first materialized, with bounded depth.
#[derive(Debug, Clone)]
pub enum RuleDefinition {
    /// Indirection: resolve this module request through the rule loader.
    Reference(String),
    /// A rule module declared in place.
    Module(Arc<RuleModule>),
}

/// The resolved form of a rule definition.
#[derive(Debug, Clone, Default)]
pub struct RuleModule {
    /// Rule metadata (docs, fixability), surfaced to hosts verbatim.
    pub meta: Option<Value>,
    /// JSON schema for the rule's options, consulted by validators.
    pub schema: Option<Value>,
}

impl RuleModule {
    /// A schema-less rule module, the normalized form of a bare rule
    /// implementation.
    #[must_use]
    pub fn bare() -> Arc<Self> {
        Arc::new(Self::default())
    }
}
