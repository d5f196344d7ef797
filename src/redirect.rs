// src/redirect.rs
// =============================================================================
// Redirect reconciliation: when the fetcher reports that a URL redirected
// elsewhere, we need to decide whether to treat the *redirect target* as
// admitted before descending into it. This is a thin wrapper around the
// admission filter with one twist: include/exclude and regex rejections are
// downgraded to admits, because the server picked this target, not the
// page author -- our list/regex filters shouldn't veto it.
// =============================================================================

use tracing::debug;

use crate::admission::{download_child, RejectReason};
use crate::candidate::Candidate;
use crate::config::Config;
use crate::context::RetrievalContext;
use crate::url::ParsedUrl;
use crate::visited::VisitedSet;

/// Decide whether to follow a redirect from `original` to `redirected_str`.
///
/// Returns `Success` if the redirected URL should be blacklisted and
/// descended into; any other reason means the redirect should not be
/// followed. A redirect target that fails to parse is treated the same as
/// any other rejection: it is dropped defensively.
pub async fn descend_redirect(
    redirected_str: &str,
    original: &ParsedUrl,
    depth: usize,
    seed: &ParsedUrl,
    visited: &mut VisitedSet,
    context: &mut RetrievalContext,
    config: &Config,
) -> RejectReason {
    let redirected = match original.join(redirected_str).or_else(|_| ParsedUrl::parse(redirected_str)) {
        Ok(url) => url,
        Err(e) => {
            debug!(redirected_str, error = %e, "dropping unparsable redirect target");
            return RejectReason::NonHttp;
        }
    };

    let candidate = Candidate::new(redirected.clone());
    let reason = download_child(&candidate, original, depth, seed, visited, context, config).await;

    match reason {
        RejectReason::Success => {
            visited.insert(redirected.as_str());
            RejectReason::Success
        }
        RejectReason::List | RejectReason::Regex => {
            debug!(url = redirected.as_str(), "ignoring list/regex rejection for a redirect target");
            visited.insert(redirected.as_str());
            RejectReason::Success
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robots::RobotsCache;

    fn ctx() -> RetrievalContext {
        RetrievalContext::new(RobotsCache::with_preloaded_empty())
    }

    #[tokio::test]
    async fn regex_rejection_is_downgraded_to_success() {
        let mut visited = VisitedSet::new();
        let original = ParsedUrl::parse("http://a/alias").unwrap();
        let seed = ParsedUrl::parse("http://a/").unwrap();
        let config = Config {
            reject_regexes: vec![regex::Regex::new("canonical").unwrap()],
            use_robots: false,
            ..Config::default()
        };
        let mut c = ctx();

        let reason = descend_redirect(
            "http://a/canonical",
            &original,
            0,
            &seed,
            &mut visited,
            &mut c,
            &config,
        )
        .await;

        assert_eq!(reason, RejectReason::Success);
        assert!(visited.contains("http://a/canonical"));
    }

    #[tokio::test]
    async fn genuine_rejection_is_preserved() {
        let mut visited = VisitedSet::new();
        let original = ParsedUrl::parse("http://a/alias").unwrap();
        let seed = ParsedUrl::parse("http://a/").unwrap();
        let config = Config {
            span_host: false,
            use_robots: false,
            ..Config::default()
        };
        let mut c = ctx();

        let reason = descend_redirect(
            "http://other-host/canonical",
            &original,
            0,
            &seed,
            &mut visited,
            &mut c,
            &config,
        )
        .await;

        assert_eq!(reason, RejectReason::SpannedHost);
    }
}
