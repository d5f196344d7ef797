// src/audit.rs
// =============================================================================
// Writes one tab-separated record per rejected candidate, for post-hoc
// analysis of why a crawl didn't follow a given link.
//
// The writer holds an `Option<File>` rather than forcing every call site to
// null-check: when auditing is disabled, every write is simply a no-op.
// =============================================================================

use std::fs::File;
use std::io::Write;

use tracing::warn;
use url::Url;

use crate::admission::RejectReason;
use crate::url::ParsedUrl;

const HEADER: &str = "REASON\tU_URL\tU_SCHEME\tU_HOST\tU_PORT\tU_PATH\tU_PARAMS\tU_QUERY\tU_FRAGMENT\t\
P_URL\tP_SCHEME\tP_HOST\tP_PORT\tP_PATH\tP_PARAMS\tP_QUERY\tP_FRAGMENT\n";

pub struct RejectionAuditWriter {
    sink: Option<File>,
}

impl RejectionAuditWriter {
    /// Opens `path` for writing and writes the header line. If `path` is
    /// `None`, or the file can't be opened, auditing is disabled and every
    /// subsequent write is a no-op; an open failure is logged, not fatal.
    pub fn open(path: Option<&str>) -> Self {
        let sink = match path {
            None => None,
            Some(path) => match File::create(path) {
                Ok(mut f) => {
                    if let Err(e) = f.write_all(HEADER.as_bytes()) {
                        warn!(path, error = %e, "failed to write rejection log header");
                    }
                    Some(f)
                }
                Err(e) => {
                    warn!(path, error = %e, "failed to open rejection log");
                    None
                }
            },
        };
        Self { sink }
    }

    pub fn disabled() -> Self {
        Self { sink: None }
    }

    pub fn write(&mut self, reason: RejectReason, url: &ParsedUrl, parent: &ParsedUrl) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        let line = format!(
            "{}\t{}\t{}\n",
            reason.audit_token(),
            format_url_columns(url),
            format_url_columns(parent)
        );
        if let Err(e) = sink.write_all(line.as_bytes()) {
            warn!(error = %e, "failed to write rejection log record");
        }
    }
}

fn format_url_columns(url: &ParsedUrl) -> String {
    let escaped = Url::parse(url.as_str())
        .map(|u| u.as_str().to_string())
        .unwrap_or_else(|_| url.as_str().to_string());
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        escaped,
        url.scheme().audit_token(),
        url.host().unwrap_or_default(),
        url.port().unwrap_or_default(),
        url.path(),
        url.params().unwrap_or_default(),
        url.query().unwrap_or_default(),
        url.fragment().unwrap_or_default(),
    )
}
