// src/extract/html.rs
// =============================================================================
// HTML link extraction, built on `scraper` the same way the host crate's own
// HTML checker resolves links: parse once, select per tag, join each href/src
// against the document's base URL.
//
// Inline tags (img, link, script, frame, iframe) are page requisites; `a`
// tags are not. We also scan for a `<meta name="robots" content="nofollow">`
// directive, the same detection `wget-faster` implements as
// `has_meta_robots_nofollow`.
// =============================================================================

use scraper::{Html, Selector};

use crate::candidate::Candidate;
use crate::url::ParsedUrl;

struct TagRule {
    selector: &'static str,
    attr: &'static str,
    inline: bool,
    expect_html: bool,
    expect_css: bool,
}

const TAG_RULES: &[TagRule] = &[
    TagRule { selector: "a[href]", attr: "href", inline: false, expect_html: true, expect_css: false },
    TagRule { selector: "img[src]", attr: "src", inline: true, expect_html: false, expect_css: false },
    TagRule { selector: "link[href]", attr: "href", inline: true, expect_html: false, expect_css: true },
    TagRule { selector: "script[src]", attr: "src", inline: true, expect_html: false, expect_css: false },
    TagRule { selector: "frame[src]", attr: "src", inline: true, expect_html: true, expect_css: false },
    TagRule { selector: "iframe[src]", attr: "src", inline: true, expect_html: true, expect_css: false },
];

/// Parses `document` (already-read file contents) resolving every link
/// against `base_url`, or against a `<base href>` tag's target when present
/// (the same override a browser applies). Returns the discovered candidates
/// plus whether a `<meta name="robots" content="nofollow">` directive was
/// present.
pub fn extract_html(document: &str, base_url: &ParsedUrl) -> (Vec<Candidate>, bool) {
    let parsed = Html::parse_document(document);
    let mut candidates = Vec::new();

    let effective_base = extract_base_tag(&parsed, base_url, &mut candidates);

    for rule in TAG_RULES {
        let Ok(selector) = Selector::parse(rule.selector) else {
            continue;
        };
        for element in parsed.select(&selector) {
            let Some(href) = element.value().attr(rule.attr) else {
                continue;
            };
            let href = href.trim();
            if href.is_empty() || href.starts_with('#') {
                continue;
            }
            let Ok(resolved) = effective_base.join(href) else {
                continue;
            };
            let is_relative = !(href.contains("://") || href.starts_with("//"));
            candidates.push(
                Candidate::new(resolved)
                    .relative(is_relative)
                    .inline(rule.inline)
                    .expect_html(rule.expect_html)
                    .expect_css(rule.expect_css),
            );
        }
    }

    (candidates, has_meta_robots_nofollow(&parsed))
}

/// A `<base href>` tag retargets every relative reference in the document;
/// it is never itself something to download, so it's recorded as a
/// `Candidate` with `ignore_when_downloading` set, the same way a
/// fragment-only anchor would be if it weren't filtered out earlier.
fn extract_base_tag(parsed: &Html, base_url: &ParsedUrl, candidates: &mut Vec<Candidate>) -> ParsedUrl {
    let Ok(selector) = Selector::parse("base[href]") else {
        return base_url.clone();
    };
    let Some(href) = parsed.select(&selector).next().and_then(|el| el.value().attr("href")) else {
        return base_url.clone();
    };
    let href = href.trim();
    if href.is_empty() {
        return base_url.clone();
    }
    let Ok(resolved) = base_url.join(href) else {
        return base_url.clone();
    };
    let is_relative = !(href.contains("://") || href.starts_with("//"));
    candidates.push(
        Candidate::new(resolved.clone())
            .relative(is_relative)
            .ignore_when_downloading(true),
    );
    resolved
}

fn has_meta_robots_nofollow(parsed: &Html) -> bool {
    let Ok(selector) = Selector::parse(r#"meta[name="robots" i]"#) else {
        return false;
    };
    parsed.select(&selector).any(|el| {
        el.value()
            .attr("content")
            .map(|c| c.to_ascii_lowercase().contains("nofollow"))
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_anchor_and_image_links() {
        let base = ParsedUrl::parse("http://a/dir/page.html").unwrap();
        let doc = r#"<html><body>
            <a href="/p1">one</a>
            <a href="http://b/p2">two</a>
            <img src="logo.png">
        </body></html>"#;
        let (candidates, nofollow) = extract_html(doc, &base);
        assert!(!nofollow);
        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0].url.as_str(), "http://a/p1");
        assert!(candidates[0].link_relative_p);
        assert!(!candidates[0].link_inline_p);
        assert_eq!(candidates[1].url.as_str(), "http://b/p2");
        assert!(!candidates[1].link_relative_p);
        assert!(candidates[2].link_inline_p);
        assert_eq!(candidates[2].url.as_str(), "http://a/dir/logo.png");
    }

    #[test]
    fn meta_robots_nofollow_is_detected() {
        let base = ParsedUrl::parse("http://a/").unwrap();
        let doc = r#"<html><head><meta name="robots" content="noindex, nofollow"></head>
            <body><a href="/x">x</a></body></html>"#;
        let (candidates, nofollow) = extract_html(doc, &base);
        assert!(nofollow);
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn fragment_only_anchors_are_skipped() {
        let base = ParsedUrl::parse("http://a/").unwrap();
        let doc = r#"<a href="#section">jump</a>"#;
        let (candidates, _) = extract_html(doc, &base);
        assert!(candidates.is_empty());
    }

    #[test]
    fn base_tag_retargets_relative_links_and_is_itself_ignored() {
        let base = ParsedUrl::parse("http://a/dir/page.html").unwrap();
        let doc = r#"<html><head><base href="http://b/other/"></head>
            <body><a href="p1">one</a></body></html>"#;
        let (candidates, _) = extract_html(doc, &base);
        assert_eq!(candidates.len(), 2);

        let base_candidate = &candidates[0];
        assert_eq!(base_candidate.url.as_str(), "http://b/other/");
        assert!(base_candidate.ignore_when_downloading);

        let link_candidate = &candidates[1];
        assert_eq!(link_candidate.url.as_str(), "http://b/other/p1");
        assert!(!link_candidate.ignore_when_downloading);
    }
}
