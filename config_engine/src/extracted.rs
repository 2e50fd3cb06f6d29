//! The merged result of extracting configuration for one file.
//!
//! Serialization form (JSON, camelCase keys):
//!
//! ```json
//! {
//!   "env": { "browser": true },
//!   "globals": { "myGlobal": "readonly" },
//!   "parser": { "id": "...", "importerName": "...", "importerPath": "..." },
//!   "parserOptions": { "ecmaVersion": 2020 },
//!   "plugins": { "react": { "id": "react", "importerName": "...", "importerPath": "..." } },
//!   "processor": "markdown/.md",
//!   "rules": { "semi": ["error", "always"] },
//!   "settings": {}
//! }
//! ```
//!
//! `parser` and `plugins` serialize through the dependency projection,
//! which never traverses loaded definitions. Every rule setting is in the
//! canonical array form.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::dependency::{LoadedParser, LoadedPlugin};
use crate::types::{ConfigObject, RuleEntry};

/// The merged configuration for one file.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedConfig {
    /// Enabled environments.
    pub env: ConfigObject,

    /// Global variable access declarations.
    pub globals: ConfigObject,

    /// The winning parser, if any element supplied one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parser: Option<LoadedParser>,

    /// Merged parser options.
    pub parser_options: ConfigObject,

    /// All plugins adopted during the merge, keyed by plugin id.
    pub plugins: BTreeMap<String, LoadedPlugin>,

    /// The winning processor id, if any element supplied one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processor: Option<String>,

    /// Rule settings, canonicalized to array form.
    pub rules: BTreeMap<String, RuleEntry>,

    /// Merged shared settings.
    pub settings: ConfigObject,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
