//! Cache-Control classification
//!
//! Maps a request path to a `Cache-Control` directive with an ordered,
//! first-match-wins rule list. Two deployment presets exist and are never
//! combined: extension-based and prefix-based. Operators pick one at startup,
//! or supply their own rule list.

use hyper::header::HeaderValue;

use crate::config::{CacheConfig, CachePolicyKind, CacheRuleConfig};
use crate::error::StartupError;

/// `.wasm` names carry no content hash, so they may change under the same URL
pub const SHORT_LIVED: &str = "max-age=86400";
/// Content-hashed bundle outputs never change under the same URL
pub const LONG_LIVED_IMMUTABLE: &str = "max-age=5184000, immutable";
/// Everything the bundler writes below `/assets`
pub const ASSETS_IMMUTABLE: &str = "max-age=10368000, immutable";

/// Path predicate of a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMatch {
    /// Final segment's extension, compared without the dot, ASCII case-insensitive
    Extensions(Vec<String>),
    /// The prefix itself or anything below it, on segment boundaries
    Prefix(String),
}

impl PathMatch {
    pub fn extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::Extensions(
            extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        )
    }

    pub fn prefix(prefix: &str) -> Self {
        Self::Prefix(prefix.trim_end_matches('/').to_string())
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Extensions(extensions) => extension_of(path)
                .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))),
            Self::Prefix(prefix) => {
                prefix.is_empty()
                    || path
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
            }
        }
    }
}

/// Extension of the last path segment, without the dot
fn extension_of(path: &str) -> Option<&str> {
    let name = path.rsplit('/').next()?;
    let (_, ext) = name.rsplit_once('.')?;
    (!ext.is_empty()).then_some(ext)
}

/// One `(predicate -> directive)` pair
#[derive(Debug, Clone)]
pub struct CacheRule {
    pub matcher: PathMatch,
    pub directive: HeaderValue,
}

impl CacheRule {
    pub const fn new(matcher: PathMatch, directive: HeaderValue) -> Self {
        Self { matcher, directive }
    }
}

/// Ordered rule list; an empty list never sets `Cache-Control`
#[derive(Debug, Clone, Default)]
pub struct CachePolicy {
    rules: Vec<CacheRule>,
}

impl CachePolicy {
    pub const fn new(rules: Vec<CacheRule>) -> Self {
        Self { rules }
    }

    /// `.wasm` short-lived; `.js .css .map .nnue .ttf` long-lived and immutable
    pub fn extension_based() -> Self {
        Self::new(vec![
            CacheRule::new(
                PathMatch::extensions(["wasm"]),
                HeaderValue::from_static(SHORT_LIVED),
            ),
            CacheRule::new(
                PathMatch::extensions(["js", "css", "map", "nnue", "ttf"]),
                HeaderValue::from_static(LONG_LIVED_IMMUTABLE),
            ),
        ])
    }

    /// Anything under `/assets` long-lived and immutable
    pub fn prefix_based() -> Self {
        Self::new(vec![CacheRule::new(
            PathMatch::prefix("/assets"),
            HeaderValue::from_static(ASSETS_IMMUTABLE),
        )])
    }

    pub fn none() -> Self {
        Self::default()
    }

    /// Build the policy selected by `[cache]`
    pub fn from_config(config: &CacheConfig) -> Result<Self, StartupError> {
        match config.policy {
            CachePolicyKind::Extension => Ok(Self::extension_based()),
            CachePolicyKind::Prefix => Ok(Self::prefix_based()),
            CachePolicyKind::None => Ok(Self::none()),
            CachePolicyKind::Custom => config
                .rules
                .iter()
                .enumerate()
                .map(|(index, rule)| rule_from_config(index, rule))
                .collect::<Result<Vec<_>, _>>()
                .map(Self::new),
        }
    }

    /// Directive for `path`, or `None` to leave caching to defaults
    pub fn classify(&self, path: &str) -> Option<&HeaderValue> {
        self.rules
            .iter()
            .find(|rule| rule.matcher.matches(path))
            .map(|rule| &rule.directive)
    }

    pub fn rules(&self) -> &[CacheRule] {
        &self.rules
    }
}

fn rule_from_config(index: usize, rule: &CacheRuleConfig) -> Result<CacheRule, StartupError> {
    let invalid = |reason: &str| StartupError::InvalidCacheRule {
        index,
        reason: reason.to_string(),
    };

    let matcher = match (&rule.extensions, &rule.prefix) {
        (Some(extensions), None) if !extensions.is_empty() => PathMatch::extensions(extensions),
        (None, Some(prefix)) if prefix.starts_with('/') => PathMatch::prefix(prefix),
        (None, Some(_)) => return Err(invalid("prefix must start with '/'")),
        (Some(_), None) => return Err(invalid("extensions must not be empty")),
        _ => return Err(invalid("exactly one of `extensions` or `prefix` is required")),
    };

    let directive = HeaderValue::from_str(rule.directive.trim())
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| invalid("directive is not a valid header value"))?;

    Ok(CacheRule::new(matcher, directive))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directive<'a>(policy: &'a CachePolicy, path: &str) -> Option<&'a str> {
        policy.classify(path).and_then(|v| v.to_str().ok())
    }

    #[test]
    fn test_extension_policy() {
        let policy = CachePolicy::extension_based();
        assert_eq!(directive(&policy, "/app.js"), Some(LONG_LIVED_IMMUTABLE));
        assert_eq!(directive(&policy, "/app.wasm"), Some(SHORT_LIVED));
        assert_eq!(directive(&policy, "/style.CSS"), Some(LONG_LIVED_IMMUTABLE));
        assert_eq!(directive(&policy, "/nn-62ef826d1a6d.nnue"), Some(LONG_LIVED_IMMUTABLE));
        assert_eq!(directive(&policy, "/app.js.map"), Some(LONG_LIVED_IMMUTABLE));
        assert_eq!(directive(&policy, "/favicon.ico"), None);
        assert_eq!(directive(&policy, "/index.html"), None);
        assert_eq!(directive(&policy, "/"), None);
        assert_eq!(directive(&policy, "/js.d/readme"), None);
    }

    #[test]
    fn test_prefix_policy() {
        let policy = CachePolicy::prefix_based();
        assert_eq!(
            directive(&policy, "/assets/chunk-abc123.js"),
            Some(ASSETS_IMMUTABLE)
        );
        assert_eq!(directive(&policy, "/assets"), Some(ASSETS_IMMUTABLE));
        assert_eq!(directive(&policy, "/assetsfoo.js"), None);
        assert_eq!(directive(&policy, "/index.html"), None);
        assert_eq!(directive(&policy, "/app.js"), None);
    }

    #[test]
    fn test_none_policy() {
        assert_eq!(directive(&CachePolicy::none(), "/app.js"), None);
    }

    #[test]
    fn test_first_match_wins() {
        let policy = CachePolicy::new(vec![
            CacheRule::new(PathMatch::prefix("/assets/"), HeaderValue::from_static("no-cache")),
            CacheRule::new(PathMatch::extensions([".js"]), HeaderValue::from_static("max-age=60")),
        ]);
        assert_eq!(directive(&policy, "/assets/app.js"), Some("no-cache"));
        assert_eq!(directive(&policy, "/app.js"), Some("max-age=60"));
    }

    #[test]
    fn test_from_config_presets() {
        let mut config = CacheConfig {
            policy: CachePolicyKind::Prefix,
            rules: Vec::new(),
        };
        assert_eq!(CachePolicy::from_config(&config).unwrap().rules().len(), 1);
        config.policy = CachePolicyKind::Extension;
        assert_eq!(CachePolicy::from_config(&config).unwrap().rules().len(), 2);
        config.policy = CachePolicyKind::None;
        assert!(CachePolicy::from_config(&config).unwrap().rules().is_empty());
    }

    #[test]
    fn test_from_config_custom() {
        let config = CacheConfig {
            policy: CachePolicyKind::Custom,
            rules: vec![
                CacheRuleConfig {
                    extensions: Some(vec!["html".to_string()]),
                    prefix: None,
                    directive: "no-cache".to_string(),
                },
                CacheRuleConfig {
                    extensions: None,
                    prefix: Some("/static".to_string()),
                    directive: "max-age=600".to_string(),
                },
            ],
        };
        let policy = CachePolicy::from_config(&config).unwrap();
        assert_eq!(directive(&policy, "/index.html"), Some("no-cache"));
        assert_eq!(directive(&policy, "/static/a.png"), Some("max-age=600"));
        assert_eq!(directive(&policy, "/a.png"), None);
    }

    #[test]
    fn test_from_config_rejects_bad_rules() {
        let bad_rules = [
            CacheRuleConfig {
                directive: "max-age=1".to_string(),
                ..CacheRuleConfig::default()
            },
            CacheRuleConfig {
                extensions: Some(vec!["js".to_string()]),
                prefix: Some("/assets".to_string()),
                directive: "max-age=1".to_string(),
            },
            CacheRuleConfig {
                prefix: Some("assets".to_string()),
                directive: "max-age=1".to_string(),
                ..CacheRuleConfig::default()
            },
            CacheRuleConfig {
                extensions: Some(vec!["js".to_string()]),
                directive: "bad\nvalue".to_string(),
                ..CacheRuleConfig::default()
            },
            CacheRuleConfig {
                extensions: Some(vec!["js".to_string()]),
                directive: "   ".to_string(),
                ..CacheRuleConfig::default()
            },
        ];

        for rule in bad_rules {
            let config = CacheConfig {
                policy: CachePolicyKind::Custom,
                rules: vec![rule],
            };
            assert!(matches!(
                CachePolicy::from_config(&config),
                Err(StartupError::InvalidCacheRule { index: 0, .. })
            ));
        }
    }
}
