//! Core value types shared across the resolver.
//!
//! - [`Severity`] is the lint severity scalar (`0|1|2` or
//!   `"off"|"warn"|"error"`).
//! - [`RuleEntry`] is the canonical array form of a rule setting,
//!   `[severity, ...options]`. Extraction stores every rule setting in this
//!   form while preserving the original severity value unchanged.
//! - [`OneOrMany`] deserializes config fields that accept either a single
//!   value or a list (`extends`, `files`, `excludedFiles`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON object body, as used for `env`, `globals`, `parserOptions`,
/// `settings`, and raw `rules` maps.
pub type ConfigObject = serde_json::Map<String, Value>;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Lint severity scalar.
///
/// Configs may spell a severity as a number (`0`, `1`, `2`) or a string
/// (`"off"`, `"warn"`, `"error"`). Both spellings map onto this enum; the
/// original spelling is kept verbatim inside [`RuleEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Rule disabled.
    Off,
    /// Report without failing the run.
    Warn,
    /// Report and fail the run.
    Error,
}

impl Severity {
    /// Parse a severity scalar (`0|1|2` or `"off"|"warn"|"error"`).
    ///
    /// Returns `None` for any other value.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => match n.as_u64() {
                Some(0) => Some(Self::Off),
                Some(1) => Some(Self::Warn),
                Some(2) => Some(Self::Error),
                _ => None,
            },
            Value::String(s) => match s.as_str() {
                "off" => Some(Self::Off),
                "warn" => Some(Self::Warn),
                "error" => Some(Self::Error),
                _ => None,
            },
            _ => None,
        }
    }

    /// Parse the severity of a rule setting, which is either a severity
    /// scalar or an array whose first element is one.
    #[must_use]
    pub fn from_setting(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => items.first().and_then(Self::from_value),
            other => Self::from_value(other),
        }
    }

    /// The numeric code of this severity.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::Warn => 1,
            Self::Error => 2,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

// ---------------------------------------------------------------------------
// Rule settings
// ---------------------------------------------------------------------------

/// A rule setting in canonical array form: `[severity, ...options]`.
///
/// The severity slot keeps whatever value the config used (`"off"`, `0`,
/// `"error"`, ...); canonicalization only wraps bare scalars into a
/// singleton array and never rewrites the stored values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleEntry(Vec<Value>);

impl RuleEntry {
    /// Canonicalize a raw rule setting: arrays are cloned, bare scalars are
    /// wrapped into a singleton array.
    #[must_use]
    pub fn canonical(value: &Value) -> Self {
        match value {
            Value::Array(items) => Self(items.clone()),
            other => Self(vec![other.clone()]),
        }
    }

    /// The severity of this setting, if the first slot holds a valid one.
    #[must_use]
    pub fn severity(&self) -> Option<Severity> {
        self.0.first().and_then(Severity::from_value)
    }

    /// The raw severity slot.
    #[must_use]
    pub fn severity_value(&self) -> Option<&Value> {
        self.0.first()
    }

    /// The option values following the severity slot.
    #[must_use]
    pub fn options(&self) -> &[Value] {
        self.0.get(1..).unwrap_or(&[])
    }

    /// Whether this entry holds only a severity and no options.
    #[must_use]
    pub fn is_severity_only(&self) -> bool {
        self.0.len() == 1
    }

    /// Append option values to this entry.
    pub(crate) fn extend_options(&mut self, options: &[Value]) {
        self.0.extend(options.iter().cloned());
    }

    /// The full `[severity, ...options]` slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// One-or-many config fields
// ---------------------------------------------------------------------------

/// A config field that accepts either one value or a list of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// A single value.
    One(T),
    /// A list of values.
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// View the field as a slice regardless of spelling.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        match self {
            Self::One(value) => std::slice::from_ref(value),
            Self::Many(values) => values,
        }
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(values: Vec<T>) -> Self {
        Self::Many(values)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
