// src/extract/css.rs
// =============================================================================
// CSS reference extraction. The original tool hand-rolls a small CSS
// tokenizer for this; this pack has no lightweight CSS-parser crate (the one
// available, `cssparser`, is Servo's full grammar engine and overkill for
// "find every url(...) and @import"), so a `regex` scan stands in for it,
// matching what the grammar actually needs here.
//
// Every reference found this way is a page requisite: a stylesheet's
// resources are always needed to render the page that pulled it in, so
// every candidate from this extractor is marked inline.
//
// `@import` targets are known to be stylesheets at discovery time (unlike a
// plain `url(...)` reference, which might be an image or a font), so they
// carry `link_expect_css = true`: the same "misserved CSS" override the
// driver's `css_allowed` check applies to the top-level fetch (see
// SPEC_FULL.md §9) lets a nested stylesheet served with a wrong
// `Content-Type` still get parsed recursively.
// =============================================================================

use once_cell::sync::Lazy;
use regex::Regex;

use crate::candidate::Candidate;
use crate::url::ParsedUrl;

static URL_FN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"url\(\s*['"]?([^'")]+)['"]?\s*\)"#).unwrap());
static IMPORT_RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"@import\s+(?:url\(\s*['"]?([^'")]+)['"]?\s*\)|['"]([^'"]+)['"])"#).unwrap());

/// Scans `document` (already-read CSS file contents) for `url(...)` and
/// `@import` references, resolving each against `base_url`.
pub fn extract_css(document: &str, base_url: &ParsedUrl) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for caps in URL_FN.captures_iter(document) {
        push_candidate(&mut candidates, base_url, &caps[1], false);
    }
    for caps in IMPORT_RULE.captures_iter(document) {
        let reference = caps.get(1).or_else(|| caps.get(2));
        if let Some(m) = reference {
            push_candidate(&mut candidates, base_url, m.as_str(), true);
        }
    }

    candidates
}

fn push_candidate(candidates: &mut Vec<Candidate>, base_url: &ParsedUrl, reference: &str, is_import: bool) {
    let reference = reference.trim();
    if reference.is_empty() || reference.starts_with("data:") {
        return;
    }
    let Ok(resolved) = base_url.join(reference) else {
        return;
    };
    let is_relative = !(reference.contains("://") || reference.starts_with("//"));
    candidates.push(
        Candidate::new(resolved)
            .relative(is_relative)
            .inline(true)
            .expect_css(is_import)
            .expect_html(false),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_url_function_references() {
        let base = ParsedUrl::parse("http://a/css/").unwrap();
        let doc = "body { background: url('bg.png'); } .x { background: url(\"/img/x.png\"); }";
        let candidates = extract_css(doc, &base);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].url.as_str(), "http://a/css/bg.png");
        assert_eq!(candidates[1].url.as_str(), "http://a/img/x.png");
        assert!(candidates.iter().all(|c| c.link_inline_p));
    }

    #[test]
    fn finds_import_rules_with_and_without_url_fn() {
        let base = ParsedUrl::parse("http://a/css/").unwrap();
        let doc = "@import url(\"base.css\");\n@import \"theme.css\";";
        let candidates = extract_css(doc, &base);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].url.as_str(), "http://a/css/base.css");
        assert_eq!(candidates[1].url.as_str(), "http://a/css/theme.css");
    }

    #[test]
    fn import_targets_expect_css_but_plain_url_refs_do_not() {
        let base = ParsedUrl::parse("http://a/css/").unwrap();
        let doc = "@import \"base.css\"; .x { background: url(\"bg.png\"); }";
        let candidates = extract_css(doc, &base);
        let import = candidates.iter().find(|c| c.url.as_str().ends_with("base.css")).unwrap();
        let url_ref = candidates.iter().find(|c| c.url.as_str().ends_with("bg.png")).unwrap();
        assert!(import.link_expect_css);
        assert!(!url_ref.link_expect_css);
    }

    #[test]
    fn data_uris_are_ignored() {
        let base = ParsedUrl::parse("http://a/").unwrap();
        let doc = "body { background: url(data:image/png;base64,AAAA); }";
        assert!(extract_css(doc, &base).is_empty());
    }
}
