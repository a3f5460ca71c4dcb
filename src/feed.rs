use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use tracing::debug;

use crate::demo_feed::DemoFeed;
use crate::http_client::http_client;
use crate::state::{Delta, ProviderCommand};

const CACHE_BUST_PARAM: &str = "_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    Http { url: String },
    File { path: PathBuf },
    Demo,
}

impl FeedSource {
    pub fn describe(&self) -> String {
        match self {
            FeedSource::Http { url } => url.clone(),
            FeedSource::File { path } => path.display().to_string(),
            FeedSource::Demo => "demo".to_string(),
        }
    }
}

/// Appends a volatile `_=<token>` query parameter so intermediaries never
/// serve a cached copy of the feed.
pub fn cache_busted_url(url: &str, token: i64) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}{CACHE_BUST_PARAM}={token}")
}

pub fn fetch_http(url: &str, timeout: Duration) -> Result<String> {
    let client = http_client(timeout)?;
    let url = cache_busted_url(url, Utc::now().timestamp_millis());
    let resp = client.get(&url).send().context("request failed")?;
    let status = resp.status();
    if !status.is_success() {
        return Err(anyhow!("http {status}"));
    }
    resp.text().context("failed reading body")
}

pub fn fetch_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// One fetch outside the provider thread (used by the one-shot dump).
pub fn fetch_once(source: &FeedSource, timeout: Duration) -> Result<String> {
    match source {
        FeedSource::Http { url } => fetch_http(url, timeout),
        FeedSource::File { path } => fetch_file(path),
        FeedSource::Demo => DemoFeed::new().next_csv(),
    }
}

/// Serves `FetchFeed` commands until the command channel closes. Network and
/// file fetches each run on their own worker so a slow response can be
/// overtaken by a later one; the state layer sorts that out by sequence.
pub fn spawn_provider(
    source: FeedSource,
    timeout: Duration,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) {
    thread::spawn(move || {
        let _ = tx.send(Delta::Log(format!("[INFO] Feed source: {}", source.describe())));
        let mut demo = DemoFeed::new();
        for cmd in cmd_rx {
            match cmd {
                ProviderCommand::FetchFeed { seq } => {
                    debug!(seq, source = %source.describe(), "fetching feed");
                    match &source {
                        FeedSource::Demo => {
                            let delta = match demo.next_csv() {
                                Ok(text) => Delta::FeedLoaded { seq, text },
                                Err(err) => Delta::FeedFailed {
                                    seq,
                                    error: format!("{err:#}"),
                                },
                            };
                            let _ = tx.send(delta);
                        }
                        FeedSource::Http { .. } | FeedSource::File { .. } => {
                            let source = source.clone();
                            let tx = tx.clone();
                            thread::spawn(move || {
                                let delta = match fetch_once(&source, timeout) {
                                    Ok(text) => Delta::FeedLoaded { seq, text },
                                    Err(err) => Delta::FeedFailed {
                                        seq,
                                        error: format!("{err:#}"),
                                    },
                                };
                                let _ = tx.send(delta);
                            });
                        }
                    }
                }
            }
        }
    });
}
