// src/admission.rs
// =============================================================================
// The admission filter: given a freshly-discovered link, decide whether the
// driver should enqueue it. This is the single most behavior-sensitive part
// of the crawler, because the order the checks run in is itself a contract
// -- the first failing check is the reason reported to the audit log.
//
// Checks are ordered cheapest-first: string comparisons and set lookups
// before regexes, and regexes before the one check that can touch the
// network (robots.txt).
//
// Rust concepts:
// - async fn: only the robots check (and the redirect wrapper around this
//   function, see src/redirect.rs) ever awaits anything
// - matches!: readable membership tests against pattern sets of one
// =============================================================================

use std::fmt;

use crate::candidate::Candidate;
use crate::config::Config;
use crate::context::RetrievalContext;
use crate::url::{schemes_are_similar, ParsedUrl, Scheme};
use crate::visited::VisitedSet;

/// Why a candidate was (or wasn't) admitted. `Success` is the internal
/// "passed every check" marker; it is never written to the audit log, since
/// only rejections are audited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Success,
    Blacklist,
    NotHttps,
    NonHttp,
    Absolute,
    Domain,
    Parent,
    List,
    Regex,
    Rules,
    SpannedHost,
    Robots,
}

impl RejectReason {
    /// Token used in the REASON column of the rejection audit log.
    pub fn audit_token(self) -> &'static str {
        match self {
            RejectReason::Success => "SUCCESS",
            RejectReason::Blacklist => "BLACKLIST",
            RejectReason::NotHttps => "NOTHTTPS",
            RejectReason::NonHttp => "NONHTTP",
            RejectReason::Absolute => "ABSOLUTE",
            RejectReason::Domain => "DOMAIN",
            RejectReason::Parent => "PARENT",
            RejectReason::List => "LIST",
            RejectReason::Regex => "REGEX",
            RejectReason::Rules => "RULES",
            RejectReason::SpannedHost => "SPANNEDHOST",
            RejectReason::Robots => "ROBOTS",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.audit_token())
    }
}

/// True exactly when a sub-directory check should be applied under
/// `no_parent`. The scheme condition here is preserved verbatim from the
/// original tool: it's `scheme != start.scheme || port == start.port`,
/// which reads backwards at first glance -- see SPEC_FULL.md's Open
/// Questions for why it's kept rather than "fixed".
fn no_parent_applies(candidate: &ParsedUrl, seed: &ParsedUrl, page_requisites: bool, inline: bool) -> bool {
    if page_requisites && inline {
        return false;
    }
    let Some(c_host) = candidate.host() else {
        return false;
    };
    let Some(s_host) = seed.host() else {
        return false;
    };
    schemes_are_similar(candidate.scheme(), seed.scheme())
        && c_host.eq_ignore_ascii_case(s_host)
        && (candidate.scheme() != seed.scheme() || candidate.port() == seed.port())
}

/// A candidate's directory is a sub-directory of `base_dir` if `base_dir`
/// is a string prefix of it on a `/`-boundary. `base_dir` always ends in
/// `/` (see `ParsedUrl::dir`), so a plain `starts_with` already respects
/// path-segment boundaries.
fn is_subdir(base_dir: &str, candidate_dir: &str) -> bool {
    candidate_dir.starts_with(base_dir)
}

/// Applies the HTML exception to rule 9 (filename accept/reject rules): a
/// leaf HTML page still needs its filename checked, because there's nothing
/// further to discover past it, but a non-leaf HTML page (one we might
/// still recurse through) is exempted so link discovery can continue.
fn waives_filename_rules(file: &str, depth: usize, config: &Config) -> bool {
    if !crate::config::Config::has_html_suffix(file) {
        return false;
    }
    config.infinite_recursion()
        || config.max_depth.is_some_and(|max| depth < max.saturating_sub(1))
        || config.page_requisites
}

/// Runs every check in spec order, returning the first failure or `Success`.
///
/// `visited` and `context` are mutated: a robots rejection is memoized into
/// `visited` so it isn't retested, and a blacklist hit in spider mode
/// records a visit into `context`'s spider log.
pub async fn download_child(
    candidate: &Candidate,
    parent: &ParsedUrl,
    depth: usize,
    seed: &ParsedUrl,
    visited: &mut VisitedSet,
    context: &mut RetrievalContext,
    config: &Config,
) -> RejectReason {
    let url = &candidate.url;

    // 1. Already visited.
    if visited.contains(url.as_str()) {
        if config.spider {
            context.record_visit(url.as_str(), Some(&parent.without_user_info()));
        }
        return RejectReason::Blacklist;
    }

    // 2. HTTPS-only.
    if config.https_only && url.scheme() != Scheme::Https {
        return RejectReason::NotHttps;
    }

    // 3. Scheme permitted for recursion.
    let http_like = url.scheme().is_http_like();
    if !http_like && !(url.scheme().is_ftp_like() && config.follow_ftp) {
        return RejectReason::NonHttp;
    }

    // 4. Relative-only.
    if http_like && config.relative_only && !candidate.link_relative_p {
        return RejectReason::Absolute;
    }

    // 5. Domain accept-list.
    if let Some(host) = url.host() {
        if !config.domain_accepted(host) {
            return RejectReason::Domain;
        }
    }

    // 6. No-parent.
    if config.no_parent
        && no_parent_applies(url, seed, config.page_requisites, candidate.link_inline_p)
        && !is_subdir(&seed.dir(), &url.dir())
    {
        return RejectReason::Parent;
    }

    // 7. Include/exclude directory lists.
    if (!config.includes.is_empty() || !config.excludes.is_empty())
        && !config.directory_accepted(&url.dir())
    {
        return RejectReason::List;
    }

    // 8. URL regex filter.
    if !config.url_accepted(url.as_str()) {
        return RejectReason::Regex;
    }

    // 9. Filename accept/reject rules, with the non-leaf-HTML exception.
    let file = url.file();
    if !file.is_empty() && !waives_filename_rules(&file, depth, config) && !config.filename_accepted(&file) {
        return RejectReason::Rules;
    }

    // 10. Span-host.
    if schemes_are_similar(url.scheme(), parent.scheme()) && !config.span_host {
        if let (Some(c_host), Some(p_host)) = (url.host(), parent.host()) {
            if !c_host.eq_ignore_ascii_case(p_host) {
                return RejectReason::SpannedHost;
            }
        }
    }

    // 11. Robots.
    if config.use_robots && http_like {
        if let (Some(host), Some(port)) = (url.host(), url.port()) {
            let allowed = context
                .robots
                .is_allowed(url.scheme(), host, port, url.as_str(), &config.user_agent)
                .await;
            if !allowed {
                visited.insert(url.as_str());
                return RejectReason::Robots;
            }
        }
    }

    RejectReason::Success
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robots::RobotsCache;

    fn ctx() -> RetrievalContext {
        RetrievalContext::new(RobotsCache::with_preloaded_empty())
    }

    fn candidate(url: &str) -> Candidate {
        Candidate::new(ParsedUrl::parse(url).unwrap())
    }

    #[tokio::test]
    async fn blacklisted_url_is_rejected() {
        let mut visited = VisitedSet::new();
        visited.insert("https://a/x");
        let parent = ParsedUrl::parse("https://a/").unwrap();
        let seed = parent.clone();
        let config = Config::default();
        let mut c = ctx();

        let r = download_child(
            &candidate("https://a/x"),
            &parent,
            0,
            &seed,
            &mut visited,
            &mut c,
            &config,
        )
        .await;
        assert_eq!(r, RejectReason::Blacklist);
    }

    #[tokio::test]
    async fn span_host_rejects_cross_host_links_by_default() {
        let mut visited = VisitedSet::new();
        let parent = ParsedUrl::parse("http://a/").unwrap();
        let seed = parent.clone();
        let config = Config {
            use_robots: false,
            ..Config::default()
        };
        let mut c = ctx();

        let r = download_child(
            &candidate("http://b/p2"),
            &parent,
            0,
            &seed,
            &mut visited,
            &mut c,
            &config,
        )
        .await;
        assert_eq!(r, RejectReason::SpannedHost);
    }

    #[tokio::test]
    async fn span_host_mode_allows_cross_host_links() {
        let mut visited = VisitedSet::new();
        let parent = ParsedUrl::parse("http://a/").unwrap();
        let seed = parent.clone();
        let config = Config {
            span_host: true,
            use_robots: false,
            ..Config::default()
        };
        let mut c = ctx();

        let r = download_child(
            &candidate("http://b/p2"),
            &parent,
            0,
            &seed,
            &mut visited,
            &mut c,
            &config,
        )
        .await;
        assert_eq!(r, RejectReason::Success);
    }

    #[tokio::test]
    async fn no_parent_rejects_ascent_above_seed_directory() {
        let mut visited = VisitedSet::new();
        let seed = ParsedUrl::parse("http://a/dir/idx.html").unwrap();
        let config = Config {
            no_parent: true,
            use_robots: false,
            ..Config::default()
        };
        let mut c = ctx();

        let r = download_child(
            &candidate("http://a/other/x"),
            &seed,
            0,
            &seed,
            &mut visited,
            &mut c,
            &config,
        )
        .await;
        assert_eq!(r, RejectReason::Parent);
    }

    #[tokio::test]
    async fn no_parent_admits_sub_directory_descendants() {
        let mut visited = VisitedSet::new();
        let seed = ParsedUrl::parse("http://a/dir/idx.html").unwrap();
        let config = Config {
            no_parent: true,
            use_robots: false,
            ..Config::default()
        };
        let mut c = ctx();

        let r = download_child(
            &candidate("http://a/dir/sub/y"),
            &seed,
            0,
            &seed,
            &mut visited,
            &mut c,
            &config,
        )
        .await;
        assert_eq!(r, RejectReason::Success);
    }

    #[tokio::test]
    async fn https_only_rejects_plain_http() {
        let mut visited = VisitedSet::new();
        let parent = ParsedUrl::parse("https://a/").unwrap();
        let seed = parent.clone();
        let config = Config {
            https_only: true,
            use_robots: false,
            ..Config::default()
        };
        let mut c = ctx();

        let r = download_child(
            &candidate("http://a/x"),
            &parent,
            0,
            &seed,
            &mut visited,
            &mut c,
            &config,
        )
        .await;
        assert_eq!(r, RejectReason::NotHttps);
    }

    #[tokio::test]
    async fn running_the_filter_twice_yields_the_same_reason() {
        let mut visited = VisitedSet::new();
        let parent = ParsedUrl::parse("http://a/").unwrap();
        let seed = parent.clone();
        let config = Config {
            span_host: false,
            use_robots: false,
            ..Config::default()
        };
        let mut c1 = ctx();
        let mut c2 = ctx();

        let r1 = download_child(
            &candidate("http://b/p2"),
            &parent,
            0,
            &seed,
            &mut visited.clone(),
            &mut c1,
            &config,
        )
        .await;
        let r2 = download_child(
            &candidate("http://b/p2"),
            &parent,
            0,
            &seed,
            &mut visited.clone(),
            &mut c2,
            &config,
        )
        .await;
        assert_eq!(r1, r2);
    }
}
