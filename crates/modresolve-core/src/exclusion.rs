//! Exclusion rules for modules known never to exist on disk.
//!
//! Some ecosystems routinely ask for resource and generated-serializer
//! satellites that are never shipped. Probing for them is pure overhead, so
//! the engine consults this table before touching the filesystem.
//!
//! Rules are data: case-insensitive regular expressions matched against the
//! bare module name. The default table can be extended or replaced entirely.

use regex::{Regex, RegexBuilder};
use thiserror::Error;

use crate::domain::ModuleIdentity;

/// Default namespace of the embedding library; its resource and serializer
/// satellites are never present.
pub const DEFAULT_OWN_NAMESPACE: &str = "Be.Stateless";

/// Patterns for named third-party libraries whose satellites are never shipped.
pub const KNOWN_ABSENT_PATTERNS: &[&str] = &[
    r"^Microsoft\.BizTalk\.(ExplorerOM|Pipeline\.Components)\.(resources|XmlSerializers)$",
    r"^Microsoft\.ServiceModel\.Channels\.(resources|XmlSerializers)$",
];

/// Error raised when an exclusion pattern does not compile.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Invalid exclusion pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// A single compiled exclusion rule.
#[derive(Debug, Clone)]
pub struct ExclusionRule {
    regex: Regex,
}

impl ExclusionRule {
    /// Compile a case-insensitive rule matched against the bare name.
    pub fn new(pattern: &str) -> Result<Self, RuleError> {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map(|regex| Self { regex })
            .map_err(|e| RuleError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
    }

    /// Rule excluding every resource or serializer satellite under `namespace`.
    pub fn own_namespace(namespace: &str) -> Result<Self, RuleError> {
        let namespace = namespace.trim().trim_end_matches('.');
        Self::new(&format!(
            r"^{}\..+\.(resources|XmlSerializers)$",
            regex::escape(namespace)
        ))
    }

    /// The source pattern.
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn matches(&self, identity: &ModuleIdentity) -> bool {
        self.regex.is_match(&identity.name)
    }
}

/// Ordered, user-overridable table of exclusion rules.
#[derive(Debug, Clone, Default)]
pub struct ExclusionRules {
    rules: Vec<ExclusionRule>,
}

impl ExclusionRules {
    /// Empty table: nothing is excluded.
    pub const fn none() -> Self {
        Self { rules: Vec::new() }
    }

    /// The built-in table: known-absent satellites plus those of
    /// [`DEFAULT_OWN_NAMESPACE`]. Every pattern is a constant that compiles.
    pub fn defaults() -> Self {
        let rules = KNOWN_ABSENT_PATTERNS
            .iter()
            .map(|pattern| ExclusionRule::new(pattern))
            .chain(std::iter::once(ExclusionRule::own_namespace(
                DEFAULT_OWN_NAMESPACE,
            )))
            .filter_map(Result::ok)
            .collect();
        Self { rules }
    }

    /// Known-absent third-party satellites plus those of `own_namespace`.
    pub fn with_defaults(own_namespace: &str) -> Result<Self, RuleError> {
        let mut rules = Self::from_patterns(KNOWN_ABSENT_PATTERNS.iter().copied())?;
        if !own_namespace.trim().is_empty() {
            rules.push(ExclusionRule::own_namespace(own_namespace)?);
        }
        Ok(rules)
    }

    /// Compile a table from raw patterns, failing on the first invalid one.
    pub fn from_patterns<I, S>(patterns: I) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rules = patterns
            .into_iter()
            .map(|pattern| ExclusionRule::new(pattern.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    pub fn push(&mut self, rule: ExclusionRule) {
        self.rules.push(rule);
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }

    /// First rule matching `identity`, if any.
    pub fn find_match(&self, identity: &ModuleIdentity) -> Option<&ExclusionRule> {
        self.rules.iter().find(|rule| rule.matches(identity))
    }

    pub fn is_excluded(&self, identity: &ModuleIdentity) -> bool {
        self.find_match(identity).is_some()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(ExclusionRule::pattern)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
