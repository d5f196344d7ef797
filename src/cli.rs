// src/cli.rs
// =============================================================================
// Command-line interface, built with `clap`'s derive API the same way the
// host crate's original CLI was built -- just one flat set of crawl options
// instead of a github/site subcommand split, since this tool only ever does
// one thing: recursively retrieve a seed URL.
// =============================================================================

use clap::Parser;

use crawlcore::Config;

#[derive(Parser, Debug)]
#[command(
    name = "crawlcore",
    version,
    about = "Breadth-first recursive retrieval core for a web mirroring tool"
)]
pub struct Cli {
    /// Seed URL to start the traversal from.
    pub url: String,

    /// Maximum recursion depth (default: 5).
    #[arg(short = 'l', long = "level")]
    pub max_depth: Option<usize>,

    /// Recurse without any depth limit. Overrides `--level`.
    #[arg(long)]
    pub infinite: bool,

    /// Stop after downloading this many bytes total.
    #[arg(long)]
    pub quota: Option<u64>,

    /// Only follow HTTPS links.
    #[arg(long)]
    pub https_only: bool,

    /// Follow FTP/FTPS links in addition to HTTP(S).
    #[arg(long)]
    pub follow_ftp: bool,

    /// Only follow links written as relative references.
    #[arg(long)]
    pub relative_only: bool,

    /// Follow links to other hosts (off by default).
    #[arg(long)]
    pub span_host: bool,

    /// Never ascend above the seed's starting directory.
    #[arg(long)]
    pub no_parent: bool,

    /// Download images, stylesheets, and other page requisites.
    #[arg(short = 'p', long)]
    pub page_requisites: bool,

    /// Disable robots.txt compliance.
    #[arg(long)]
    pub no_robots: bool,

    /// Spider mode: visit pages without saving them to disk.
    #[arg(long)]
    pub spider: bool,

    /// Delete each file immediately after parsing it.
    #[arg(long)]
    pub delete_after: bool,

    /// Only recurse into these domains (repeatable).
    #[arg(long = "domain")]
    pub accept_domains: Vec<String>,

    /// Never recurse into these domains (repeatable).
    #[arg(long = "exclude-domain")]
    pub reject_domains: Vec<String>,

    /// Only recurse into these directories (repeatable).
    #[arg(short = 'I', long = "include")]
    pub includes: Vec<String>,

    /// Never recurse into these directories (repeatable).
    #[arg(short = 'X', long = "exclude")]
    pub excludes: Vec<String>,

    /// Only follow URLs matching this regex (repeatable).
    #[arg(long = "accept-regex")]
    pub accept_regexes: Vec<String>,

    /// Never follow URLs matching this regex (repeatable).
    #[arg(long = "reject-regex")]
    pub reject_regexes: Vec<String>,

    /// Only follow links whose filename has one of these suffixes.
    #[arg(short = 'A', long = "accept")]
    pub accept_suffixes: Vec<String>,

    /// Never follow links whose filename has one of these suffixes.
    #[arg(short = 'R', long = "reject")]
    pub reject_suffixes: Vec<String>,

    /// Write rejected candidates to this tab-separated log.
    #[arg(long)]
    pub rejected_log: Option<String>,

    /// Diagnostic locale tag, stamped into the run's tracing span only.
    #[arg(long)]
    pub locale: Option<String>,

    /// User-Agent header sent with every request.
    #[arg(long, default_value = "crawlcore/0.1")]
    pub user_agent: String,

    /// Directory fetched files are written under.
    #[arg(short = 'P', long = "directory-prefix", default_value = ".")]
    pub output_dir: String,
}

impl Cli {
    /// Builds the traversal `Config` from parsed CLI flags, compiling the
    /// regex options up front so a malformed pattern fails fast.
    pub fn to_config(&self) -> anyhow::Result<Config> {
        let accept_regexes = self
            .accept_regexes
            .iter()
            .map(|p| regex::Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        let reject_regexes = self
            .reject_regexes
            .iter()
            .map(|p| regex::Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        let max_depth = if self.infinite {
            None
        } else {
            Some(self.max_depth.unwrap_or(5))
        };

        Ok(Config {
            max_depth,
            quota: self.quota,
            https_only: self.https_only,
            follow_ftp: self.follow_ftp,
            relative_only: self.relative_only,
            span_host: self.span_host,
            no_parent: self.no_parent,
            page_requisites: self.page_requisites,
            use_robots: !self.no_robots,
            spider: self.spider,
            delete_after: self.delete_after,
            accept_domains: self.accept_domains.clone(),
            reject_domains: self.reject_domains.clone(),
            includes: self.includes.clone(),
            excludes: self.excludes.clone(),
            accept_regexes,
            reject_regexes,
            accept_suffixes: self.accept_suffixes.clone(),
            reject_suffixes: self.reject_suffixes.clone(),
            rejected_log: self.rejected_log.clone(),
            locale: self.locale.clone(),
            user_agent: self.user_agent.clone(),
        })
    }
}
