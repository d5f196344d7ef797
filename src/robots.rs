// src/robots.rs
// =============================================================================
// The robots-policy store: fetches and caches `robots.txt` per (host, port)
// and answers "is this path allowed?" using Google's `robotstxt` matcher.
//
// A fetch failure is not fatal -- we cache an empty (permissive) body so the
// host is never re-fetched, matching wget's "produce dummy specs" fallback.
//
// Rust concepts:
// - HashMap keyed by a tuple: cheap, obvious cache key for (host, port)
// - async fn behind a cache: the lookup only awaits on a miss
// =============================================================================

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;

use crate::url::Scheme;

/// Raw `robots.txt` body for one (host, port). An empty body is the
/// permissive dummy specification used when the real file couldn't be
/// fetched.
#[derive(Debug, Clone, Default)]
pub struct RobotsSpecs {
    body: String,
}

impl RobotsSpecs {
    pub fn permissive() -> Self {
        Self { body: String::new() }
    }

    pub fn from_body(body: String) -> Self {
        Self { body }
    }

    pub fn matches(&self, user_agent: &str, url: &str) -> bool {
        if self.body.trim().is_empty() {
            return true;
        }
        let mut matcher = robotstxt::DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.body, user_agent, url)
    }
}

#[derive(Debug)]
pub struct RobotsCache {
    client: Client,
    cache: HashMap<(String, u16), RobotsSpecs>,
}

impl RobotsCache {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to build robots.txt HTTP client");
        Self {
            client,
            cache: HashMap::new(),
        }
    }

    /// A cache with no network client backing it, for tests that disable
    /// `use_robots` and never actually call `is_allowed`.
    pub fn with_preloaded_empty() -> Self {
        Self::new()
    }

    pub fn get(&self, host: &str, port: u16) -> Option<&RobotsSpecs> {
        self.cache.get(&(host.to_string(), port))
    }

    pub fn put(&mut self, host: &str, port: u16, specs: RobotsSpecs) {
        self.cache.insert((host.to_string(), port), specs);
    }

    async fn fetch(&self, scheme: Scheme, host: &str, port: u16) -> RobotsSpecs {
        let scheme_str = match scheme {
            Scheme::Https | Scheme::Ftps => "https",
            _ => "http",
        };
        let url = format!("{scheme_str}://{host}:{port}/robots.txt");
        match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => match resp.text().await {
                Ok(body) => RobotsSpecs::from_body(body),
                Err(_) => RobotsSpecs::permissive(),
            },
            _ => RobotsSpecs::permissive(),
        }
    }

    /// Returns whether `url` may be fetched by `user_agent`, fetching and
    /// caching `robots.txt` for `(host, port)` on first use.
    pub async fn is_allowed(
        &mut self,
        scheme: Scheme,
        host: &str,
        port: u16,
        url: &str,
        user_agent: &str,
    ) -> bool {
        if self.get(host, port).is_none() {
            let specs = self.fetch(scheme, host, port).await;
            self.put(host, port, specs);
        }
        self.get(host, port)
            .expect("just inserted")
            .matches(user_agent, url)
    }
}

impl Default for RobotsCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_is_permissive() {
        let specs = RobotsSpecs::permissive();
        assert!(specs.matches("crawlcore", "https://example.com/secret"));
    }

    #[test]
    fn disallow_rule_is_honored() {
        let specs = RobotsSpecs::from_body(
            "User-agent: *\nDisallow: /private/\n".to_string(),
        );
        assert!(!specs.matches("crawlcore", "https://example.com/private/x"));
        assert!(specs.matches("crawlcore", "https://example.com/public/x"));
    }

    #[test]
    fn cache_starts_empty() {
        let cache = RobotsCache::new();
        assert!(cache.get("example.com", 443).is_none());
    }
}
