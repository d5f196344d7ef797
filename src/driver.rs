// src/driver.rs
// =============================================================================
// The traversal driver: the breadth-first main loop that ties the queue,
// admission filter, fetcher, and extractors together.
//
// One `Driver` owns a `Fetcher` and a `Config`; `retrieve_tree` owns a fresh
// `UrlQueue`/`VisitedSet` per call (private to this one traversal) but takes
// a caller-supplied `RetrievalContext`, which may be shared across calls (see
// SPEC_FULL.md's concurrency model).
// =============================================================================

use std::fs;

use tracing::{debug, info, instrument};

use crate::admission::{download_child, RejectReason};
use crate::audit::RejectionAuditWriter;
use crate::candidate::Candidate;
use crate::config::Config;
use crate::context::RetrievalContext;
use crate::extract::{extract_css, extract_html};
use crate::fetch::{FetchFlags, FetchStatus, Fetcher};
use crate::queue::{QueueEntry, UrlQueue};
use crate::url::ParsedUrl;
use crate::visited::VisitedSet;

/// How a traversal run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalStatus {
    Ok,
    QuotaExceeded,
    WriteError,
}

pub struct Driver {
    fetcher: Fetcher,
    config: Config,
}

impl Driver {
    pub fn new(fetcher: Fetcher, config: Config) -> Self {
        Self { fetcher, config }
    }

    #[instrument(skip(self, context), fields(locale = self.config.locale.as_deref().unwrap_or("none")))]
    pub async fn retrieve_tree(&self, seed: ParsedUrl, context: &mut RetrievalContext) -> FinalStatus {
        let mut queue = UrlQueue::new();
        let mut visited = VisitedSet::new();
        let mut audit = RejectionAuditWriter::open(self.config.rejected_log.as_deref());

        visited.insert(seed.as_str());
        queue.enqueue(QueueEntry {
            url: seed.clone(),
            referer: None,
            depth: 0,
            html_allowed: true,
            css_allowed: false,
        });

        let mut status = FinalStatus::Ok;

        while let Some(entry) = queue.dequeue() {
            if let Some(quota) = self.config.quota {
                if context.total_downloaded_bytes > quota {
                    status = FinalStatus::QuotaExceeded;
                    break;
                }
            }

            let QueueEntry { url, referer, depth, html_allowed, css_allowed } = entry;

            let (local_path, mut descend, mut is_css, redirected_url) = match context
                .url_file_map
                .get(url.as_str())
                .cloned()
            {
                Some(path) => {
                    let is_css = css_allowed && context.downloaded_css.contains(&path);
                    let is_html = html_allowed && context.downloaded_html.contains(&path);
                    (Some(path), is_css || is_html, is_css, None)
                }
                None => {
                    let flags = FetchFlags {
                        html_allowed,
                        css_allowed,
                        spider: self.config.spider,
                    };
                    let outcome = self.fetcher.retrieve_url(&url, referer.as_deref(), flags).await;
                    context.total_downloaded_bytes += outcome.bytes_downloaded;

                    match outcome.status {
                        FetchStatus::WriteError => {
                            status = FinalStatus::WriteError;
                            break;
                        }
                        FetchStatus::TransportError => {
                            debug!(url = url.as_str(), "fetch failed, not descending");
                            (None, false, false, None)
                        }
                        FetchStatus::Ok => {
                            let is_css = outcome.content_flags.text_css || css_allowed;
                            let is_html = outcome.content_flags.text_html;
                            let descend = outcome.content_flags.ok
                                && ((html_allowed && is_html) || (css_allowed || is_css));
                            (
                                outcome.local_path.as_ref().map(|p| p.display().to_string()),
                                descend,
                                is_css,
                                outcome.redirected_url,
                            )
                        }
                    }
                }
            };

            if let Some(path) = &local_path {
                context.record_download(url.as_str(), path, false, false);
            }

            // Redirect reconciliation.
            if descend {
                if let Some(redirected) = &redirected_url {
                    let reason = crate::redirect::descend_redirect(
                        redirected.as_str(),
                        &url,
                        depth,
                        &seed,
                        &mut visited,
                        context,
                        &self.config,
                    )
                    .await;
                    if reason != RejectReason::Success {
                        descend = false;
                        audit.write(reason, &url, &seed);
                    }
                }
            }

            if self.config.spider {
                context.record_visit(url.as_str(), referer.as_deref());
            }

            let mut dash_p_leaf = false;
            if descend {
                if let Some(max_depth) = self.config.max_depth {
                    if depth >= max_depth {
                        if self.config.page_requisites && (depth == max_depth || depth == max_depth + 1) {
                            dash_p_leaf = true;
                        } else {
                            descend = false;
                        }
                    }
                }
            }

            if descend {
                if let Some(path) = &local_path {
                    if let Some(content) = fs::read_to_string(path).ok() {
                        let (children, meta_nofollow) = if is_css {
                            (extract_css(&content, &url), false)
                        } else {
                            extract_html(&content, &url)
                        };

                        context.record_download(url.as_str(), path, !is_css, is_css);

                        if !(meta_nofollow && self.config.use_robots) {
                            self.enqueue_children(
                                children,
                                &url,
                                depth,
                                dash_p_leaf,
                                &seed,
                                &mut visited,
                                &mut queue,
                                context,
                                &mut audit,
                            )
                            .await;
                        }
                    }
                }
            }

            if let Some(path) = &local_path {
                let acceptable_to_keep = self.config.filename_accepted(&url.file());
                let keep = !(self.config.delete_after || self.config.spider) && acceptable_to_keep;
                if !keep && fs::remove_file(path).is_ok() {
                    debug!(path, "removed file per delete-after/spider/not-acceptable-to-keep policy");
                    context.register_delete_file(path);
                }
            }
        }

        info!(status = ?status, "traversal finished");
        status
    }

    #[allow(clippy::too_many_arguments)]
    async fn enqueue_children(
        &self,
        children: Vec<Candidate>,
        parent: &ParsedUrl,
        depth: usize,
        dash_p_leaf: bool,
        seed: &ParsedUrl,
        visited: &mut VisitedSet,
        queue: &mut UrlQueue,
        context: &mut RetrievalContext,
        audit: &mut RejectionAuditWriter,
    ) {
        for child in children {
            if child.ignore_when_downloading {
                continue;
            }
            if dash_p_leaf && !child.link_inline_p {
                continue;
            }

            let reason =
                download_child(&child, parent, depth, seed, visited, context, &self.config).await;

            if reason == RejectReason::Success {
                let referer = if parent.has_user_info() {
                    Some(parent.without_user_info())
                } else {
                    Some(parent.as_str().to_string())
                };
                visited.insert(child.url.as_str());
                queue.enqueue(QueueEntry {
                    url: child.url,
                    referer,
                    depth: depth + 1,
                    html_allowed: child.link_expect_html,
                    css_allowed: child.link_expect_css,
                });
            } else {
                audit.write(reason, &child.url, parent);
            }
        }
    }
}
