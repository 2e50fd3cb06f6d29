//! The schema validation seam.
//!
//! Full config-body schema validation is an external collaborator; the
//! resolver only defines where it plugs in:
//!
//! - [`ConfigValidator::validate_config_schema`] runs once per body,
//!   before normalization (for entry-point bodies and plugin presets
//!   alike);
//! - [`ConfigValidator::validate_config_array_element`] runs after the
//!   extraction fold, when the plugin-derived rule and environment lookups
//!   are available.
//!
//! [`RuleSeverityValidator`] is the default implementation: it checks that
//! every rule setting starts with a valid severity scalar and reports the
//! offending source by name.

use crate::config_array::PluginMemberMaps;
use crate::element::{ConfigArrayElement, ConfigBody};
use crate::error::ConfigError;
use crate::types::{ConfigObject, Severity};

/// Validates configuration bodies and normalized elements.
pub trait ConfigValidator {
    /// Validate a raw body before normalization.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming `source_name` on
    /// rejection.
    fn validate_config_schema(
        &self,
        body: &ConfigBody,
        source_name: &str,
    ) -> Result<(), ConfigError>;

    /// Validate a normalized element against the plugin-derived lookups.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the element on rejection.
    fn validate_config_array_element(
        &self,
        element: &ConfigArrayElement,
        members: &PluginMemberMaps,
    ) -> Result<(), ConfigError>;
}

/// A validator that accepts everything. Useful when the host performs its
/// own schema validation upstream.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopValidator;

impl ConfigValidator for NoopValidator {
    fn validate_config_schema(&self, _body: &ConfigBody, _source: &str) -> Result<(), ConfigError> {
        Ok(())
    }

    fn validate_config_array_element(
        &self,
        _element: &ConfigArrayElement,
        _members: &PluginMemberMaps,
    ) -> Result<(), ConfigError> {
        Ok(())
    }
}

/// The default validator: every rule setting must start with a valid
/// severity (`0|1|2` or `"off"|"warn"|"error"`).
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleSeverityValidator;

impl RuleSeverityValidator {
    fn check_rules(rules: Option<&ConfigObject>, source_name: &str) -> Result<(), ConfigError> {
        let Some(rules) = rules else {
            return Ok(());
        };
        for (rule_id, setting) in rules {
            if Severity::from_setting(setting).is_none() {
                return Err(ConfigError::Validation {
                    source_name: source_name.to_owned(),
                    message: format!(
                        "Configuration for rule \"{rule_id}\" is invalid: severity should be \
                         one of 0, 1, 2, \"off\", \"warn\", or \"error\" (you passed {setting})"
                    ),
                });
            }
        }
        Ok(())
    }

    fn check_override_files(body: &ConfigBody, source_name: &str) -> Result<(), ConfigError> {
        let Some(overrides) = &body.overrides else {
            return Ok(());
        };
        for (index, entry) in overrides.iter().enumerate() {
            if entry.files.is_none() {
                return Err(ConfigError::Validation {
                    source_name: source_name.to_owned(),
                    message: format!("overrides[{index}] should have a \"files\" pattern"),
                });
            }
            Self::check_rules(entry.rules.as_ref(), source_name)?;
            Self::check_override_files(entry, source_name)?;
        }
        Ok(())
    }
}

impl ConfigValidator for RuleSeverityValidator {
    fn validate_config_schema(
        &self,
        body: &ConfigBody,
        source_name: &str,
    ) -> Result<(), ConfigError> {
        Self::check_rules(body.rules.as_ref(), source_name)?;
        Self::check_override_files(body, source_name)
    }

    fn validate_config_array_element(
        &self,
        element: &ConfigArrayElement,
        _members: &PluginMemberMaps,
    ) -> Result<(), ConfigError> {
        Self::check_rules(element.rules.as_ref(), &element.name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn body(value: Value) -> ConfigBody {
        ConfigBody::from_value(value).unwrap()
    }

    #[test]
    fn test_accepts_valid_severities() {
        let validator = RuleSeverityValidator;
        let body = body(json!({
            "rules": {
                "a": 0,
                "b": "warn",
                "c": ["error", { "max": 2 }],
                "d": [2]
            }
        }));
        assert!(validator.validate_config_schema(&body, "src").is_ok());
    }

    #[test]
    fn test_rejects_invalid_severity() {
        let validator = RuleSeverityValidator;
        let body = body(json!({ "rules": { "a": "severe" } }));
        let err = validator.validate_config_schema(&body, ".eslintrc.json").unwrap_err();
        let text = err.to_string();
        assert!(text.starts_with(".eslintrc.json:"));
        assert!(text.contains("\"a\""));
    }

    #[test]
    fn test_rejects_override_without_files() {
        let validator = RuleSeverityValidator;
        let body = body(json!({ "overrides": [{ "rules": { "a": "off" } }] }));
        let err = validator.validate_config_schema(&body, "cfg").unwrap_err();
        assert!(err.to_string().contains("overrides[0]"));
    }

    #[test]
    fn test_checks_nested_override_rules() {
        let validator = RuleSeverityValidator;
        let body = body(json!({
            "overrides": [{ "files": "*.ts", "rules": { "a": [] } }]
        }));
        assert!(validator.validate_config_schema(&body, "cfg").is_err());
    }

    #[test]
    fn test_noop_accepts_anything() {
        let validator = NoopValidator;
        let body = body(json!({ "rules": { "a": "severe" } }));
        assert!(validator.validate_config_schema(&body, "cfg").is_ok());
    }
}
