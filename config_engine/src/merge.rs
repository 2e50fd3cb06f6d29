//! The merge algebra used when extracting configuration.
//!
//! [`fold_elements`] consumes elements in matched order, highest
//! precedence first, and folds them into one [`ExtractedConfig`]:
//!
//! - scalars, parsers, processors, and plugins are first-wins;
//! - records merge with assign-without-overwrite, recursing into nested
//!   objects, with `null` treated as a concrete value;
//! - rule settings canonicalize to array form, and a lower-precedence
//!   element may contribute default *options* to a rule whose *severity*
//!   was already fixed by a higher-precedence element;
//! - a parser or plugin that carries a captured load error is fatal only
//!   when it wins; an errored dependency shadowed by a higher-precedence
//!   one is tolerated silently.
//!
//! Sources are never mutated; every adopted value is cloned out of its
//! element.

use serde_json::Value;

use crate::element::ConfigArrayElement;
use crate::error::ConfigError;
use crate::extracted::ExtractedConfig;
use crate::types::{ConfigObject, RuleEntry};

/// Fold matched elements (highest precedence first) into one extracted
/// config.
///
/// # Errors
///
/// Propagates a captured parser or plugin load error when the broken
/// dependency wins, exactly as the merge reaches it.
pub(crate) fn fold_elements<'a, I>(elements: I) -> Result<ExtractedConfig, ConfigError>
where
    I: IntoIterator<Item = &'a ConfigArrayElement>,
{
    let mut config = ExtractedConfig::default();

    for element in elements {
        // Parser: first-wins. A broken parser is only fatal if it wins.
        if config.parser.is_none() {
            if let Some(parser) = &element.parser {
                if let Some(error) = &parser.error {
                    return Err((**error).clone());
                }
                config.parser = Some(parser.clone());
            }
        }

        // Processor: first-wins.
        if config.processor.is_none() {
            if let Some(processor) = &element.processor {
                config.processor = Some(processor.clone());
            }
        }

        // Records: assign-without-overwrite.
        if let Some(env) = &element.env {
            merge_without_overwrite(&mut config.env, env);
        }
        if let Some(globals) = &element.globals {
            merge_without_overwrite(&mut config.globals, globals);
        }
        if let Some(parser_options) = &element.parser_options {
            merge_without_overwrite(&mut config.parser_options, parser_options);
        }
        if let Some(settings) = &element.settings {
            merge_without_overwrite(&mut config.settings, settings);
        }

        // Plugins: first-wins per id, with deferred error propagation.
        if let Some(plugins) = &element.plugins {
            for (plugin_id, plugin) in plugins {
                if config.plugins.contains_key(plugin_id) {
                    continue;
                }
                if let Some(error) = &plugin.error {
                    return Err((**error).clone());
                }
                config.plugins.insert(plugin_id.clone(), plugin.clone());
            }
        }

        // Rules: canonicalize, then let lower precedence backfill options.
        if let Some(rules) = &element.rules {
            merge_rule_settings(&mut config.rules, rules);
        }
    }

    Ok(config)
}

/// Merge rule settings from a lower-precedence source into the target map.
pub(crate) fn merge_rule_settings(
    target: &mut std::collections::BTreeMap<String, RuleEntry>,
    source: &ConfigObject,
) {
    for (rule_id, src_def) in source {
        if let Some(entry) = target.get_mut(rule_id) {
            // The winning element fixed the severity without options; a
            // lower-precedence array setting contributes its options.
            if entry.is_severity_only() {
                if let Value::Array(items) = src_def {
                    if items.len() >= 2 {
                        entry.extend_options(&items[1..]);
                    }
                }
            }
            continue;
        }
        target.insert(rule_id.clone(), RuleEntry::canonical(src_def));
    }
}

/// Assign `source` entries into `target` without overwriting.
///
/// - A present non-object target value is never rewritten; `null` counts
///   as present.
/// - Object-into-object recurses; an absent target key for an object (or
///   array) source gets a fresh empty value of the same shape first.
/// - Scalars fill only absent keys.
pub(crate) fn merge_without_overwrite(target: &mut ConfigObject, source: &ConfigObject) {
    for (key, source_value) in source {
        if let Some(existing) = target.get_mut(key) {
            // A present value is never rewritten; object-into-object
            // recurses.
            if is_non_null_object(existing) {
                merge_value(existing, source_value);
            }
            continue;
        }
        if is_non_null_object(source_value) {
            let mut fresh = empty_of_same_shape(source_value);
            merge_value(&mut fresh, source_value);
            target.insert(key.clone(), fresh);
        } else {
            target.insert(key.clone(), source_value.clone());
        }
    }
}

/// Recursive step over arbitrary JSON values. Only object/array targets
/// absorb anything; scalar targets keep their value.
fn merge_value(target: &mut Value, source: &Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => {
            merge_without_overwrite(target, source);
        }
        (Value::Array(target), Value::Array(source)) => {
            for (index, source_value) in source.iter().enumerate() {
                if index < target.len() {
                    if is_non_null_object(&target[index]) {
                        merge_value(&mut target[index], source_value);
                    }
                    // A present scalar slot (including null) is kept.
                } else if is_non_null_object(source_value) {
                    let mut fresh = empty_of_same_shape(source_value);
                    merge_value(&mut fresh, source_value);
                    target.push(fresh);
                } else {
                    target.push(source_value.clone());
                }
            }
        }
        _ => {}
    }
}

fn is_non_null_object(value: &Value) -> bool {
    value.is_object() || value.is_array()
}

fn empty_of_same_shape(value: &Value) -> Value {
    if value.is_array() {
        Value::Array(Vec::new())
    } else {
        Value::Object(ConfigObject::new())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
