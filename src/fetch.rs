// src/fetch.rs
// =============================================================================
// The fetcher: turns a URL into bytes on disk (or, in spider mode, bytes
// nowhere) plus enough metadata for the driver to decide whether to descend.
//
// Built once per `Driver`, shared across every `retrieve_url` call the way
// the host crate already builds one `reqwest::Client` up front rather than
// per-request.
// =============================================================================

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::url::ParsedUrl;

/// A minimal bitset: which content-type buckets a response fell into.
/// `OK` is set whenever the transport succeeded regardless of body type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContentFlags {
    pub ok: bool,
    pub text_html: bool,
    pub text_css: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Ok,
    WriteError,
    TransportError,
}

#[derive(Debug)]
pub struct FetchOutcome {
    pub local_path: Option<PathBuf>,
    pub status: FetchStatus,
    pub redirected_url: Option<ParsedUrl>,
    pub content_flags: ContentFlags,
    pub bytes_downloaded: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct FetchFlags {
    pub html_allowed: bool,
    pub css_allowed: bool,
    /// Spider mode: fetch headers/body to classify content, but never
    /// persist it to disk.
    pub spider: bool,
}

pub struct Fetcher {
    client: Client,
    output_dir: PathBuf,
}

impl Fetcher {
    pub fn new(user_agent: &str, output_dir: PathBuf) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent.to_string())
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client, output_dir })
    }

    pub async fn retrieve_url(
        &self,
        url: &ParsedUrl,
        referer: Option<&str>,
        flags: FetchFlags,
    ) -> FetchOutcome {
        let mut request = self.client.get(url.as_str());
        if let Some(referer) = referer {
            request = request.header(reqwest::header::REFERER, referer);
        }

        let response = match request.send().await {
            Ok(resp) => resp,
            Err(e) => {
                debug!(url = url.as_str(), error = %e, "fetch failed");
                return FetchOutcome {
                    local_path: None,
                    status: FetchStatus::TransportError,
                    redirected_url: None,
                    content_flags: ContentFlags::default(),
                    bytes_downloaded: 0,
                };
            }
        };

        let redirected_url = if response.url().as_str() != url.as_str() {
            ParsedUrl::parse(response.url().as_str()).ok()
        } else {
            None
        };

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();
        let is_success = response.status().is_success();

        let body = match response.bytes().await {
            Ok(b) => b,
            Err(e) => {
                debug!(url = url.as_str(), error = %e, "failed to read response body");
                return FetchOutcome {
                    local_path: None,
                    status: FetchStatus::TransportError,
                    redirected_url,
                    content_flags: ContentFlags::default(),
                    bytes_downloaded: 0,
                };
            }
        };

        let content_flags = ContentFlags {
            ok: is_success,
            text_html: content_type.contains("text/html"),
            text_css: content_type.contains("text/css"),
        };

        if flags.spider {
            return FetchOutcome {
                local_path: None,
                status: FetchStatus::Ok,
                redirected_url,
                content_flags,
                bytes_downloaded: body.len() as u64,
            };
        }

        let local_path = self.local_path_for(url);
        if let Some(parent) = local_path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                debug!(path = %parent.display(), error = %e, "failed to create output directory");
                return FetchOutcome {
                    local_path: None,
                    status: FetchStatus::WriteError,
                    redirected_url,
                    content_flags,
                    bytes_downloaded: 0,
                };
            }
        }
        if let Err(e) = fs::write(&local_path, &body) {
            debug!(path = %local_path.display(), error = %e, "failed to write fetched body");
            return FetchOutcome {
                local_path: None,
                status: FetchStatus::WriteError,
                redirected_url,
                content_flags,
                bytes_downloaded: 0,
            };
        }

        FetchOutcome {
            local_path: Some(local_path),
            status: FetchStatus::Ok,
            redirected_url,
            content_flags,
            bytes_downloaded: body.len() as u64,
        }
    }

    /// Mirrors the URL's host/path onto the output directory, the same
    /// layout wget's own `-r` mode produces.
    fn local_path_for(&self, url: &ParsedUrl) -> PathBuf {
        let mut path = self.output_dir.clone();
        if let Some(host) = url.host() {
            path.push(host);
        }
        let url_path = url.path().trim_start_matches('/');
        if url_path.is_empty() || url_path.ends_with('/') {
            path.push(url_path);
            path.push("index.html");
        } else {
            path.push(url_path);
        }
        path
    }
}
