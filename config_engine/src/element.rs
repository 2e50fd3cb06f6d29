//! Raw configuration bodies and normalized config array elements.
//!
//! A [`ConfigBody`] is what a configuration file deserializes into, before
//! any loading or flattening. The factory normalizes bodies into
//! [`ConfigArrayElement`] values: `extends` chains are inlined, `parser`
//! and `plugins` specifiers are replaced with loaded dependencies, and
//! `overrides` become separate elements gated by match criteria.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dependency::{LoadedParser, LoadedPlugin};
use crate::overrides::OverrideTester;
use crate::types::{ConfigObject, OneOrMany};

// ---------------------------------------------------------------------------
// Raw configuration body
// ---------------------------------------------------------------------------

/// A raw configuration body as loaded from a config source.
///
/// Every field is optional; an absent field is distinct from an empty
/// record. `root` deserializes any JSON value; only booleans take effect
/// downstream, other shapes are ignored during normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigBody {
    /// Include globs; required on `overrides` entries, absent elsewhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<OneOrMany<String>>,

    /// Exclude globs for `overrides` entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excluded_files: Option<OneOrMany<String>>,

    /// Configurations to inherit from, outermost first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<OneOrMany<String>>,

    /// Environment toggles (`name` → bool).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<ConfigObject>,

    /// Global variable access declarations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub globals: Option<ConfigObject>,

    /// Nested override bodies, gated by `files`/`excludedFiles`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overrides: Option<Vec<ConfigBody>>,

    /// Parser specifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parser: Option<String>,

    /// Options handed to the parser verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parser_options: Option<ConfigObject>,

    /// Plugin specifiers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugins: Option<Vec<String>>,

    /// Qualified processor id (`pluginId/processorName`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processor: Option<String>,

    /// Cascade cutoff flag. Only a boolean takes effect.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<Value>,

    /// Rule settings (`ruleId` → severity or `[severity, ...options]`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<ConfigObject>,

    /// Shared settings handed to rules verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<ConfigObject>,
}

impl ConfigBody {
    /// Deserialize a body from a JSON value.
    ///
    /// `null` becomes the empty body (an empty YAML config file loads as
    /// `null`).
    ///
    /// # Errors
    ///
    /// Returns the serde error message when the value is not a valid body.
    pub fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Null => Ok(Self::default()),
            other => serde_json::from_value(other).map_err(|e| e.to_string()),
        }
    }

    /// The `root` field as a boolean, ignoring non-boolean shapes.
    #[must_use]
    pub fn root_flag(&self) -> Option<bool> {
        self.root.as_ref().and_then(Value::as_bool)
    }
}

// ---------------------------------------------------------------------------
// Normalized element
// ---------------------------------------------------------------------------

/// One normalized configuration fragment.
///
/// Elements are created by the factory and never mutated afterward. An
/// element produced from an `overrides` entry (or any element carrying
/// criteria) never has `root` set, and its criteria's base path is bound
/// to the outermost importer's directory.
#[derive(Debug, Clone, Default)]
pub struct ConfigArrayElement {
    /// Human-readable source name (diagnostic).
    pub name: String,
    /// The config file this element came from (diagnostic).
    pub file_path: Option<PathBuf>,
    /// File-match criteria; `None` means the element applies to all files.
    pub criteria: Option<OverrideTester>,
    /// Environment toggles.
    pub env: Option<ConfigObject>,
    /// Global variable access declarations.
    pub globals: Option<ConfigObject>,
    /// The loaded parser.
    pub parser: Option<LoadedParser>,
    /// Parser options.
    pub parser_options: Option<ConfigObject>,
    /// Loaded plugins, keyed by plugin id. Every entry satisfies
    /// `plugins[k].id == k`.
    pub plugins: Option<BTreeMap<String, LoadedPlugin>>,
    /// Qualified processor id.
    pub processor: Option<String>,
    /// Cascade cutoff flag.
    pub root: Option<bool>,
    /// Rule settings in raw form.
    pub rules: Option<ConfigObject>,
    /// Shared settings.
    pub settings: Option<ConfigObject>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
