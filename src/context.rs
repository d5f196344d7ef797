// src/context.rs
// =============================================================================
// The process-wide state the original tool keeps in global variables
// (dl_url_file_map, downloaded_html_set, downloaded_css_set, the robots
// cache) made into an explicit struct, per the spec's design notes, so that
// two traversals -- or a test and the rest of the test suite -- never share
// state by accident.
//
// The queue and visited set stay private to one `Driver::retrieve_tree`
// call; this context is the part that's safe (and sometimes desirable) to
// share across calls.
// =============================================================================

use std::collections::HashMap;
use std::collections::HashSet;

use crate::robots::RobotsCache;

/// One recorded visit, used only in spider mode for post-run reporting.
#[derive(Debug, Clone)]
pub struct SpiderVisit {
    pub url: String,
    pub referer: Option<String>,
}

#[derive(Debug)]
pub struct RetrievalContext {
    /// URL -> local file path, for the "already downloaded, reuse it"
    /// fetch-policy branch.
    pub url_file_map: HashMap<String, String>,
    /// Local file paths already parsed as HTML.
    pub downloaded_html: HashSet<String>,
    /// Local file paths already parsed as CSS.
    pub downloaded_css: HashSet<String>,
    pub robots: RobotsCache,
    pub total_downloaded_bytes: u64,
    pub spider_log: Vec<SpiderVisit>,
    /// Paths removed by the driver's post-download disposal step
    /// (delete-after/spider/not-acceptable-to-keep), for diagnostics.
    pub deleted_files: Vec<String>,
}

impl RetrievalContext {
    pub fn new(robots: RobotsCache) -> Self {
        Self {
            url_file_map: HashMap::new(),
            downloaded_html: HashSet::new(),
            downloaded_css: HashSet::new(),
            robots,
            total_downloaded_bytes: 0,
            spider_log: Vec::new(),
            deleted_files: Vec::new(),
        }
    }

    /// Records that `path` was unlinked after download, the filesystem
    /// accounting layer's `register_delete_file` from the spec's external
    /// interfaces (4.1 step 8).
    pub fn register_delete_file(&mut self, path: &str) {
        self.deleted_files.push(path.to_string());
    }

    pub fn record_visit(&mut self, url: &str, referer: Option<&str>) {
        self.spider_log.push(SpiderVisit {
            url: url.to_string(),
            referer: referer.map(|r| r.to_string()),
        });
    }

    pub fn record_download(&mut self, url: &str, local_path: &str, is_html: bool, is_css: bool) {
        self.url_file_map
            .insert(url.to_string(), local_path.to_string());
        if is_html {
            self.downloaded_html.insert(local_path.to_string());
        }
        if is_css {
            self.downloaded_css.insert(local_path.to_string());
        }
    }
}

impl Default for RetrievalContext {
    fn default() -> Self {
        Self::new(RobotsCache::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_download_updates_both_maps() {
        let mut ctx = RetrievalContext::default();
        ctx.record_download("https://a/x.html", "/tmp/a/x.html", true, false);
        assert_eq!(
            ctx.url_file_map.get("https://a/x.html").map(String::as_str),
            Some("/tmp/a/x.html")
        );
        assert!(ctx.downloaded_html.contains("/tmp/a/x.html"));
        assert!(!ctx.downloaded_css.contains("/tmp/a/x.html"));
    }

    #[test]
    fn spider_log_records_in_order() {
        let mut ctx = RetrievalContext::default();
        ctx.record_visit("https://a/1", None);
        ctx.record_visit("https://a/2", Some("https://a/1"));
        assert_eq!(ctx.spider_log.len(), 2);
        assert_eq!(ctx.spider_log[1].referer.as_deref(), Some("https://a/1"));
    }

    #[test]
    fn register_delete_file_appends_to_the_log() {
        let mut ctx = RetrievalContext::default();
        ctx.register_delete_file("/tmp/a/x.html");
        assert_eq!(ctx.deleted_files, vec!["/tmp/a/x.html".to_string()]);
    }
}
