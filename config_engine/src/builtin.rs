//! Built-in configurations referenced as `eslint:recommended` and
//! `eslint:all`.
//!
//! These are the only accepted `eslint:` extends targets; both are plain
//! in-crate bodies over the core rule namespace.

use serde_json::Value;

use crate::element::ConfigBody;
use crate::types::ConfigObject;

/// Core rules enabled by `eslint:recommended`.
const RECOMMENDED_RULES: &[&str] = &[
    "constructor-super",
    "for-direction",
    "getter-return",
    "no-async-promise-executor",
    "no-case-declarations",
    "no-class-assign",
    "no-compare-neg-zero",
    "no-cond-assign",
    "no-const-assign",
    "no-constant-condition",
    "no-control-regex",
    "no-debugger",
    "no-delete-var",
    "no-dupe-args",
    "no-dupe-class-members",
    "no-dupe-else-if",
    "no-dupe-keys",
    "no-duplicate-case",
    "no-empty",
    "no-empty-character-class",
    "no-empty-pattern",
    "no-ex-assign",
    "no-extra-boolean-cast",
    "no-extra-semi",
    "no-fallthrough",
    "no-func-assign",
    "no-global-assign",
    "no-import-assign",
    "no-inner-declarations",
    "no-invalid-regexp",
    "no-irregular-whitespace",
    "no-misleading-character-class",
    "no-mixed-spaces-and-tabs",
    "no-new-symbol",
    "no-obj-calls",
    "no-octal",
    "no-prototype-builtins",
    "no-redeclare",
    "no-regex-spaces",
    "no-self-assign",
    "no-setter-return",
    "no-shadow-restricted-names",
    "no-sparse-arrays",
    "no-this-before-super",
    "no-undef",
    "no-unexpected-multiline",
    "no-unreachable",
    "no-unsafe-finally",
    "no-unsafe-negation",
    "no-unused-labels",
    "no-unused-vars",
    "no-useless-catch",
    "no-useless-escape",
    "no-with",
    "require-yield",
    "use-isnan",
    "valid-typeof",
];

/// Additional core rules that `eslint:all` enables on top of the
/// recommended set.
const ADDITIONAL_ALL_RULES: &[&str] = &[
    "accessor-pairs",
    "array-callback-return",
    "block-scoped-var",
    "camelcase",
    "complexity",
    "consistent-return",
    "curly",
    "default-case",
    "default-case-last",
    "default-param-last",
    "dot-notation",
    "eqeqeq",
    "grouped-accessor-pairs",
    "guard-for-in",
    "max-classes-per-file",
    "max-depth",
    "max-lines",
    "max-nested-callbacks",
    "max-params",
    "new-cap",
    "no-alert",
    "no-array-constructor",
    "no-bitwise",
    "no-caller",
    "no-console",
    "no-div-regex",
    "no-else-return",
    "no-empty-function",
    "no-eq-null",
    "no-eval",
    "no-extend-native",
    "no-extra-bind",
    "no-extra-label",
    "no-implicit-coercion",
    "no-implicit-globals",
    "no-implied-eval",
    "no-invalid-this",
    "no-iterator",
    "no-label-var",
    "no-labels",
    "no-lone-blocks",
    "no-lonely-if",
    "no-loop-func",
    "no-magic-numbers",
    "no-multi-assign",
    "no-multi-str",
    "no-negated-condition",
    "no-nested-ternary",
    "no-new",
    "no-new-func",
    "no-new-object",
    "no-new-wrappers",
    "no-octal-escape",
    "no-param-reassign",
    "no-plusplus",
    "no-proto",
    "no-restricted-globals",
    "no-return-assign",
    "no-script-url",
    "no-self-compare",
    "no-sequences",
    "no-shadow",
    "no-template-curly-in-string",
    "no-ternary",
    "no-throw-literal",
    "no-undef-init",
    "no-undefined",
    "no-underscore-dangle",
    "no-unmodified-loop-condition",
    "no-unneeded-ternary",
    "no-unused-expressions",
    "no-use-before-define",
    "no-useless-call",
    "no-useless-computed-key",
    "no-useless-concat",
    "no-useless-constructor",
    "no-useless-rename",
    "no-useless-return",
    "no-var",
    "no-void",
    "no-warning-comments",
    "object-shorthand",
    "one-var",
    "operator-assignment",
    "prefer-arrow-callback",
    "prefer-const",
    "prefer-destructuring",
    "prefer-exponentiation-operator",
    "prefer-numeric-literals",
    "prefer-object-spread",
    "prefer-promise-reject-errors",
    "prefer-regex-literals",
    "prefer-rest-params",
    "prefer-spread",
    "prefer-template",
    "radix",
    "require-atomic-updates",
    "require-await",
    "require-unicode-regexp",
    "sort-keys",
    "sort-vars",
    "strict",
    "symbol-description",
    "vars-on-top",
    "yoda",
];

fn rules_at(rule_ids: &[&str], severity: &str) -> ConfigObject {
    let mut rules = ConfigObject::new();
    for rule_id in rule_ids {
        rules.insert((*rule_id).to_owned(), Value::String(severity.to_owned()));
    }
    rules
}

/// The `eslint:recommended` body.
#[must_use]
pub fn recommended() -> ConfigBody {
    ConfigBody {
        rules: Some(rules_at(RECOMMENDED_RULES, "error")),
        ..Default::default()
    }
}

/// The `eslint:all` body: every core rule at `"error"`.
#[must_use]
pub fn all() -> ConfigBody {
    let mut rules = rules_at(RECOMMENDED_RULES, "error");
    rules.append(&mut rules_at(ADDITIONAL_ALL_RULES, "error"));
    ConfigBody {
        rules: Some(rules),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_recommended_is_a_rules_only_body() {
        let body = recommended();
        assert!(body.extends.is_none());
        assert!(body.env.is_none());
        let rules = body.rules.unwrap();
        assert_eq!(rules.get("no-unused-vars"), Some(&json!("error")));
        assert_eq!(rules.len(), RECOMMENDED_RULES.len());
    }

    #[test]
    fn test_all_is_a_superset_of_recommended() {
        let all_rules = all().rules.unwrap();
        let recommended_rules = recommended().rules.unwrap();
        assert!(all_rules.len() > recommended_rules.len());
        for rule_id in recommended_rules.keys() {
            assert!(all_rules.contains_key(rule_id), "missing {rule_id}");
        }
    }
}
