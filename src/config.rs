// src/config.rs
// =============================================================================
// Every knob the admission filter and driver consult, gathered in one place.
//
// This mirrors the enumerated configuration inputs from the spec: depth and
// quota limits, scheme/domain/directory restrictions, robots compliance,
// and the accept/reject rule lists. `Config::default()` matches wget's
// historical defaults (recurse five levels, honor robots.txt, no quota).
// =============================================================================

use regex::Regex;

/// Maximum recursion depth. `None` means unlimited (wget's `-l inf`).
pub type MaxDepth = Option<usize>;

#[derive(Debug, Clone)]
pub struct Config {
    pub max_depth: MaxDepth,
    /// Total bytes after which the run stops. `None` means unlimited.
    pub quota: Option<u64>,
    pub https_only: bool,
    pub follow_ftp: bool,
    pub relative_only: bool,
    pub span_host: bool,
    pub no_parent: bool,
    pub page_requisites: bool,
    pub use_robots: bool,
    pub spider: bool,
    pub delete_after: bool,

    /// Accepted domain suffixes; empty means "accept everything".
    pub accept_domains: Vec<String>,
    pub reject_domains: Vec<String>,

    /// Directory prefixes a candidate's `dir()` must (or must not) match.
    pub includes: Vec<String>,
    pub excludes: Vec<String>,

    pub accept_regexes: Vec<Regex>,
    pub reject_regexes: Vec<Regex>,

    /// File suffixes (without the leading dot), lower-cased.
    pub accept_suffixes: Vec<String>,
    pub reject_suffixes: Vec<String>,

    pub rejected_log: Option<String>,

    /// Diagnostic only; stamped into the run's tracing span.
    pub locale: Option<String>,

    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: Some(5),
            quota: None,
            https_only: false,
            follow_ftp: false,
            relative_only: false,
            span_host: false,
            no_parent: false,
            page_requisites: false,
            use_robots: true,
            spider: false,
            delete_after: false,
            accept_domains: Vec::new(),
            reject_domains: Vec::new(),
            includes: Vec::new(),
            excludes: Vec::new(),
            accept_regexes: Vec::new(),
            reject_regexes: Vec::new(),
            accept_suffixes: Vec::new(),
            reject_suffixes: Vec::new(),
            rejected_log: None,
            locale: None,
            user_agent: "crawlcore/0.1".to_string(),
        }
    }
}

impl Config {
    /// True when recursion depth is unbounded.
    pub fn infinite_recursion(&self) -> bool {
        self.max_depth.is_none()
    }

    pub fn domain_accepted(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        let matches_suffix = |d: &str| {
            let d = d.to_ascii_lowercase();
            host == d || host.ends_with(&format!(".{d}"))
        };
        if self.reject_domains.iter().any(|d| matches_suffix(d)) {
            return false;
        }
        if self.accept_domains.is_empty() {
            return true;
        }
        self.accept_domains.iter().any(|d| matches_suffix(d))
    }

    pub fn directory_accepted(&self, dir: &str) -> bool {
        if self.excludes.iter().any(|e| dir.starts_with(e.as_str())) {
            return false;
        }
        if self.includes.is_empty() {
            return true;
        }
        self.includes.iter().any(|i| dir.starts_with(i.as_str()))
    }

    pub fn url_accepted(&self, url: &str) -> bool {
        if self.reject_regexes.iter().any(|r| r.is_match(url)) {
            return false;
        }
        if self.accept_regexes.is_empty() {
            return true;
        }
        self.accept_regexes.iter().any(|r| r.is_match(url))
    }

    pub fn filename_accepted(&self, file: &str) -> bool {
        let lower = file.to_ascii_lowercase();
        let suffix_matches = |s: &str| lower.ends_with(&format!(".{}", s.to_ascii_lowercase()));
        if self.reject_suffixes.iter().any(|s| suffix_matches(s)) {
            return false;
        }
        if self.accept_suffixes.is_empty() {
            return true;
        }
        self.accept_suffixes.iter().any(|s| suffix_matches(s))
    }

    pub fn has_html_suffix(file: &str) -> bool {
        let lower = file.to_ascii_lowercase();
        lower.ends_with(".html") || lower.ends_with(".htm")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_historical_wget_defaults() {
        let c = Config::default();
        assert_eq!(c.max_depth, Some(5));
        assert!(c.use_robots);
        assert!(c.quota.is_none());
    }

    #[test]
    fn domain_accept_list_matches_suffix() {
        let mut c = Config::default();
        c.accept_domains.push("example.com".to_string());
        assert!(c.domain_accepted("example.com"));
        assert!(c.domain_accepted("www.example.com"));
        assert!(!c.domain_accepted("example.org"));
    }

    #[test]
    fn reject_domain_wins_over_accept() {
        let mut c = Config::default();
        c.accept_domains.push("example.com".to_string());
        c.reject_domains.push("evil.example.com".to_string());
        assert!(!c.domain_accepted("evil.example.com"));
    }

    #[test]
    fn filename_suffix_rules_are_case_insensitive() {
        let mut c = Config::default();
        c.accept_suffixes.push("html".to_string());
        assert!(c.filename_accepted("INDEX.HTML"));
        assert!(!c.filename_accepted("image.png"));
    }
}
