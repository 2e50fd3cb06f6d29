//! Glob-based file-match criteria for `overrides` entries.
//!
//! An [`OverrideTester`] holds one or more pattern groups of include and
//! exclude globs plus a base path. A file matches when, for every group,
//! some include matches (or the group has no includes) and no exclude
//! matches (or the group has no excludes). Paths are made relative to the
//! base path before matching.
//!
//! Glob semantics: dotfiles are matched like any other file; a pattern
//! without a `/` matches against the base name only, a pattern with a `/`
//! matches against the full relative path.

use std::path::{Component, Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};

use crate::error::ConfigError;

/// A compiled glob pattern, retaining its source text for diagnostics.
#[derive(Debug, Clone)]
struct CompiledPattern {
    source: String,
    matcher: GlobMatcher,
    /// Whether the pattern contains a separator and therefore matches the
    /// full relative path instead of the base name.
    full_path: bool,
}

impl CompiledPattern {
    fn new(pattern: &str) -> Result<Self, ConfigError> {
        if Path::new(pattern).is_absolute() || has_parent_segment(pattern) {
            return Err(ConfigError::InvalidOverridePattern {
                pattern: pattern.to_owned(),
            });
        }

        let full_path = pattern.contains('/');
        let glob = GlobBuilder::new(pattern)
            .literal_separator(full_path)
            .backslash_escape(true)
            .build()
            .map_err(|_| ConfigError::InvalidOverridePattern {
                pattern: pattern.to_owned(),
            })?;

        Ok(Self {
            source: pattern.to_owned(),
            matcher: glob.compile_matcher(),
            full_path,
        })
    }

    fn test(&self, relative: &str) -> bool {
        if self.full_path {
            self.matcher.is_match(relative)
        } else {
            let base_name = relative.rsplit('/').next().unwrap_or(relative);
            self.matcher.is_match(base_name)
        }
    }
}

fn has_parent_segment(pattern: &str) -> bool {
    pattern.split(['/', '\\']).any(|segment| segment == "..")
}

/// One `{includes, excludes}` pattern group. Either side may be absent,
/// meaning "no constraint".
#[derive(Debug, Clone)]
struct PatternGroup {
    includes: Option<Vec<CompiledPattern>>,
    excludes: Option<Vec<CompiledPattern>>,
}

impl PatternGroup {
    fn test(&self, relative: &str) -> bool {
        let included = self
            .includes
            .as_ref()
            .map_or(true, |patterns| patterns.iter().any(|p| p.test(relative)));
        let excluded = self
            .excludes
            .as_ref()
            .is_some_and(|patterns| patterns.iter().any(|p| p.test(relative)));
        included && !excluded
    }
}

/// File-match criteria for a config element.
///
/// Immutable after construction, except for the factory's base-path
/// rebinding done before the owning element is published.
#[derive(Debug, Clone)]
pub struct OverrideTester {
    patterns: Vec<PatternGroup>,
    base_path: PathBuf,
}

impl OverrideTester {
    /// Compile a tester from `files` / `excludedFiles` patterns and a base
    /// path.
    ///
    /// Returns `Ok(None)` when both inputs are empty.
    ///
    /// # Errors
    ///
    /// Rejects patterns that are absolute or contain a `..` segment.
    pub fn create(
        files: &[String],
        excluded_files: &[String],
        base_path: &Path,
    ) -> Result<Option<Self>, ConfigError> {
        if files.is_empty() && excluded_files.is_empty() {
            return Ok(None);
        }

        let includes = compile_all(files)?;
        let excludes = compile_all(excluded_files)?;

        Ok(Some(Self {
            patterns: vec![PatternGroup { includes, excludes }],
            base_path: base_path.to_path_buf(),
        }))
    }

    /// Compose two testers into one that matches only when both match.
    ///
    /// The composed tester keeps the first operand's base path; an absent
    /// operand acts as identity.
    #[must_use]
    pub fn and(a: Option<Self>, b: Option<Self>) -> Option<Self> {
        match (a, b) {
            (Some(mut a), Some(b)) => {
                a.patterns.extend(b.patterns);
                Some(a)
            }
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        }
    }

    /// Test an absolute file path against every pattern group.
    #[must_use]
    pub fn test(&self, absolute_path: &Path) -> bool {
        let relative = relative_path_string(&self.base_path, absolute_path);
        self.patterns.iter().all(|group| group.test(&relative))
    }

    /// The base path the patterns are evaluated from.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// The source texts of all patterns, `(includes, excludes)` per group.
    /// Diagnostic only.
    #[must_use]
    pub fn pattern_sources(&self) -> Vec<(Vec<&str>, Vec<&str>)> {
        self.patterns
            .iter()
            .map(|group| {
                let includes = group
                    .includes
                    .iter()
                    .flatten()
                    .map(|p| p.source.as_str())
                    .collect();
                let excludes = group
                    .excludes
                    .iter()
                    .flatten()
                    .map(|p| p.source.as_str())
                    .collect();
                (includes, excludes)
            })
            .collect()
    }

    /// Rebind the base path. Factory-internal; called before the owning
    /// element is yielded.
    pub(crate) fn rebase(mut self, base_path: &Path) -> Self {
        self.base_path = base_path.to_path_buf();
        self
    }
}

fn compile_all(patterns: &[String]) -> Result<Option<Vec<CompiledPattern>>, ConfigError> {
    if patterns.is_empty() {
        return Ok(None);
    }
    patterns
        .iter()
        .map(|p| CompiledPattern::new(p))
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// Compute `target` relative to `base` lexically, handling non-descendant
/// targets with `..` components, and render it with forward slashes.
pub(crate) fn relative_path_string(base: &Path, target: &Path) -> String {
    let base_components: Vec<Component<'_>> = base.components().collect();
    let target_components: Vec<Component<'_>> = target.components().collect();

    let mut shared = 0;
    while shared < base_components.len()
        && shared < target_components.len()
        && base_components[shared] == target_components[shared]
    {
        shared += 1;
    }

    let mut relative = PathBuf::new();
    for _ in shared..base_components.len() {
        relative.push("..");
    }
    for component in &target_components[shared..] {
        relative.push(component);
    }

    relative.to_string_lossy().replace('\\', "/")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn tester(files: &[&str], excluded: &[&str], base: &str) -> Option<OverrideTester> {
        let files: Vec<String> = files.iter().map(|s| (*s).to_owned()).collect();
        let excluded: Vec<String> = excluded.iter().map(|s| (*s).to_owned()).collect();
        OverrideTester::create(&files, &excluded, Path::new(base)).unwrap()
    }

    #[test]
    fn test_empty_inputs_yield_no_tester() {
        assert!(tester(&[], &[], "/work").is_none());
    }

    #[test]
    fn test_base_name_matching_without_separator() {
        let t = tester(&["*.ts"], &[], "/work").unwrap();
        assert!(t.test(Path::new("/work/a.ts")));
        assert!(t.test(Path::new("/work/deep/nested/b.ts")));
        assert!(!t.test(Path::new("/work/a.js")));
    }

    #[test]
    fn test_full_path_matching_with_separator() {
        let t = tester(&["src/*.ts"], &[], "/work").unwrap();
        assert!(t.test(Path::new("/work/src/a.ts")));
        assert!(!t.test(Path::new("/work/other/a.ts")));
        // `*` does not cross separators in full-path mode.
        assert!(!t.test(Path::new("/work/src/deep/a.ts")));
    }

    #[test]
    fn test_globstar() {
        let t = tester(&["src/**/*.ts"], &[], "/work").unwrap();
        assert!(t.test(Path::new("/work/src/deep/nested/a.ts")));
        assert!(!t.test(Path::new("/work/lib/a.ts")));
    }

    #[test]
    fn test_dotfiles_are_matched() {
        let t = tester(&["*.js"], &[], "/work").unwrap();
        assert!(t.test(Path::new("/work/.hidden.js")));

        let t = tester(&["*rc.json"], &[], "/work").unwrap();
        assert!(t.test(Path::new("/work/.eslintrc.json")));
    }

    #[test]
    fn test_excludes() {
        let t = tester(&["*.js"], &["vendor/**/*.js"], "/work").unwrap();
        assert!(t.test(Path::new("/work/app.js")));
        assert!(!t.test(Path::new("/work/vendor/lib/app.js")));
    }

    #[test]
    fn test_excludes_only_group() {
        let t = tester(&[], &["*.min.js"], "/work").unwrap();
        assert!(t.test(Path::new("/work/app.js")));
        assert!(!t.test(Path::new("/work/app.min.js")));
    }

    #[test]
    fn test_rejects_absolute_pattern() {
        let files = vec!["/abs/*.js".to_owned()];
        let err = OverrideTester::create(&files, &[], Path::new("/work")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOverridePattern { .. }));
        assert!(err.to_string().contains("/abs/*.js"));
    }

    #[test]
    fn test_rejects_parent_segment() {
        let files = vec!["../sibling/*.js".to_owned()];
        let err = OverrideTester::create(&files, &[], Path::new("/work")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOverridePattern { .. }));
    }

    #[test]
    fn test_and_concatenates_groups() {
        let a = tester(&["*.ts"], &[], "/outer");
        let b = tester(&["src/**"], &[], "/inner");
        let combined = OverrideTester::and(a, b).unwrap();

        // Base path comes from the first operand.
        assert_eq!(combined.base_path(), Path::new("/outer"));
        // Both groups must pass.
        assert!(combined.test(Path::new("/outer/src/a.ts")));
        assert!(!combined.test(Path::new("/outer/src/a.js")));
        assert!(!combined.test(Path::new("/outer/lib/a.ts")));
    }

    #[test]
    fn test_and_identity() {
        let a = tester(&["*.ts"], &[], "/work");
        assert!(OverrideTester::and(a.clone(), None).is_some());
        assert!(OverrideTester::and(None, a).is_some());
        assert!(OverrideTester::and(None, None).is_none());
    }

    #[test]
    fn test_match_depends_only_on_relative_path() {
        let t1 = tester(&["src/*.ts"], &[], "/a").unwrap();
        let t2 = tester(&["src/*.ts"], &[], "/b/deep").unwrap();
        assert_eq!(
            t1.test(Path::new("/a/src/x.ts")),
            t2.test(Path::new("/b/deep/src/x.ts"))
        );
    }

    #[test]
    fn test_relative_path_string() {
        assert_eq!(relative_path_string(Path::new("/a/b"), Path::new("/a/b/c.js")), "c.js");
        assert_eq!(
            relative_path_string(Path::new("/a/b"), Path::new("/a/x/c.js")),
            "../x/c.js"
        );
        assert_eq!(relative_path_string(Path::new("/a"), Path::new("/a")), "");
    }

    #[test]
    fn test_rebase() {
        let t = tester(&["*.ts"], &[], "/old").unwrap();
        let t = t.rebase(Path::new("/new"));
        assert_eq!(t.base_path(), Path::new("/new"));
        assert!(t.test(Path::new("/new/a.ts")));
    }
}
