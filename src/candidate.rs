// src/candidate.rs
// =============================================================================
// A `Candidate` (wget calls this a `urlpos`) is a single link discovered by
// an extractor (HTML or CSS) while parsing a fetched document. The driver
// runs each candidate through the admission filter before deciding whether
// to turn it into a `QueueEntry`.
// =============================================================================

use crate::url::ParsedUrl;

/// A link discovered while parsing a document, not yet admitted.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub url: ParsedUrl,
    /// True if the href/url() text was written as a relative reference.
    pub link_relative_p: bool,
    /// True if this link is required to render the parent page (image,
    /// stylesheet, frame source) rather than just discovered inside it.
    pub link_inline_p: bool,
    /// Hint passed verbatim into the resulting queue entry.
    pub link_expect_html: bool,
    /// Hint passed verbatim into the resulting queue entry.
    pub link_expect_css: bool,
    /// Set for links the extractor found but that should never be
    /// downloaded (e.g. a `<base>` tag's href, or a fragment-only anchor).
    pub ignore_when_downloading: bool,
}

impl Candidate {
    pub fn new(url: ParsedUrl) -> Self {
        Self {
            url,
            link_relative_p: false,
            link_inline_p: false,
            link_expect_html: false,
            link_expect_css: false,
            ignore_when_downloading: false,
        }
    }

    pub fn relative(mut self, relative: bool) -> Self {
        self.link_relative_p = relative;
        self
    }

    pub fn inline(mut self, inline: bool) -> Self {
        self.link_inline_p = inline;
        self
    }

    pub fn expect_html(mut self, expect: bool) -> Self {
        self.link_expect_html = expect;
        self
    }

    pub fn expect_css(mut self, expect: bool) -> Self {
        self.link_expect_css = expect;
        self
    }

    pub fn ignore_when_downloading(mut self, ignore: bool) -> Self {
        self.ignore_when_downloading = ignore;
        self
    }
}
