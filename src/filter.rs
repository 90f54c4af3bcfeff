/// URLs that are never looked up in the visit map
use regex::RegexSet;

/// Browser-internal pages and other URLs that can't appear in a history export
pub const BUILTIN_FILTERS: &[&str] = &[
    r"^chrome-devtools://",
    r"^chrome-extension://",
    r"^chrome-error://",
    r"^chrome-native://",
    r"^chrome-search://",
    r"chrome://newtab",
    r"chrome://apps",
    r"chrome://history",
    r"^about:",
    r"^blob:",
    r"^view-source:",
    r"^content:",
];

#[derive(Debug, Clone)]
pub struct UrlFilter {
    patterns: RegexSet,
}

impl UrlFilter {
    /// Builtin filters plus any extra patterns
    pub fn with_patterns<I, P>(extra: I) -> Result<UrlFilter, regex::Error>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let extra: Vec<String> = extra.into_iter().map(|p| p.as_ref().to_string()).collect();
        let patterns = RegexSet::new(
            BUILTIN_FILTERS
                .iter()
                .map(|p| p.to_string())
                .chain(extra),
        )?;

        Ok(UrlFilter { patterns })
    }

    /// Builtin filters plus `extra`, or the builtin filters alone when one
    /// of the extra patterns doesn't compile
    pub fn with_patterns_or_builtin(extra: &[String]) -> UrlFilter {
        if extra.is_empty() {
            return UrlFilter::default();
        }
        match UrlFilter::with_patterns(extra) {
            Ok(filter) => filter,
            Err(e) => {
                log::warn!("Ignoring extra URL filters: {}", e);
                UrlFilter::default()
            }
        }
    }

    /// True if `url` should be skipped
    pub fn is_filtered(&self, url: &str) -> bool {
        self.patterns.is_match(url)
    }
}

impl Default for UrlFilter {
    fn default() -> Self {
        UrlFilter {
            patterns: RegexSet::new(BUILTIN_FILTERS).expect("builtin URL filters are valid"),
        }
    }
}
