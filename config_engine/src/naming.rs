//! Package name normalization for shareable configs and plugins.
//!
//! Shorthand references in config files (`extends: "foo"`,
//! `plugins: ["bar"]`) expand to full package names (`eslint-config-foo`,
//! `eslint-plugin-bar`) before module resolution. Scoped packages keep
//! their scope: `@scope/foo` becomes `@scope/eslint-config-foo`, and a bare
//! `@scope` becomes `@scope/eslint-config`.

use regex::Regex;

fn captures<'t>(pattern: &str, text: &'t str) -> Option<regex::Captures<'t>> {
    Regex::new(pattern).ok().and_then(|re| re.captures(text))
}

fn matches(pattern: &str, text: &str) -> bool {
    Regex::new(pattern).map(|re| re.is_match(text)).unwrap_or(false)
}

/// Expand a (possibly shorthand) package reference into its full package
/// name for the given prefix (`"eslint-config"` or `"eslint-plugin"`).
///
/// Names that already carry the prefix are returned unchanged; backslashes
/// are normalized to forward slashes first.
#[must_use]
pub fn normalize_package_name(name: &str, prefix: &str) -> String {
    let normalized = if name.contains('\\') {
        name.replace('\\', "/")
    } else {
        name.to_owned()
    };
    let escaped = regex::escape(prefix);

    if normalized.starts_with('@') {
        // "@scope", "@scope/", and "@scope/<prefix>" are shortcuts for the
        // scope's default package.
        if let Some(caps) = captures(&format!("^(@[^/]+)(?:/(?:{escaped})?)?$"), &normalized) {
            return format!("{}/{}", &caps[1], prefix);
        }

        let mut parts = normalized.splitn(2, '/');
        let scope = parts.next().unwrap_or_default();
        let rest = parts.next().unwrap_or_default();
        if matches(&format!("^{escaped}(-|$)"), rest) {
            return normalized;
        }
        return format!("{scope}/{prefix}-{rest}");
    }

    if normalized.starts_with(&format!("{prefix}-")) {
        return normalized;
    }

    format!("{prefix}-{normalized}")
}

/// Strip the prefix from a full package name, producing the shorthand id
/// configs use to reference it. Unprefixed names are returned unchanged.
#[must_use]
pub fn get_shorthand_name(fullname: &str, prefix: &str) -> String {
    let escaped = regex::escape(prefix);

    if fullname.starts_with('@') {
        if let Some(caps) = captures(&format!("^(@[^/]+)/{escaped}$"), fullname) {
            return caps[1].to_owned();
        }
        if let Some(caps) = captures(&format!("^(@[^/]+)/{escaped}-(.+)$"), fullname) {
            return format!("{}/{}", &caps[1], &caps[2]);
        }
    } else if let Some(rest) = fullname.strip_prefix(&format!("{prefix}-")) {
        return rest.to_owned();
    }

    fullname.to_owned()
}

/// The `@scope/` namespace of a package reference, or an empty string.
#[must_use]
pub fn get_namespace_from_term(term: &str) -> String {
    captures("^(@[^/]+/)", term)
        .map(|caps| caps[1].to_owned())
        .unwrap_or_default()
}

/// Whether a reference is filesystem-shaped: absolute, or explicitly
/// relative (`./...` or `../...`).
#[must_use]
pub fn is_file_path(name: &str) -> bool {
    std::path::Path::new(name).is_absolute() || matches(r"^\.{1,2}[/\\]", name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
