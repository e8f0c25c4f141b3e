//! Forward-proxy pipeline: cache probe, upstream fetch, relay, persist.

mod error;
mod upstream;
pub mod url;

pub use error::ProxyError;
pub use upstream::{FetchError, FetchTimeouts, USER_AGENT, fetch};

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::time::Duration;
use tracing::{info, instrument, warn};

use cachalot_cache::{CacheKey, DiskStore, FreshnessPolicy, Lookup};
use cachalot_config::ProxyConfig;
use cachalot_http::response::{send_error, send_response};

use crate::url::parse_url;

/// Cache-or-fetch front end for one resolved proxy URL.
///
/// Shared across connections behind an `Arc`; the disk store is the only
/// shared state and tolerates concurrent use without locks.
#[derive(Debug)]
pub struct Proxy {
    store: DiskStore,
    policy: FreshnessPolicy,
    timeouts: FetchTimeouts,
    cache_max_entries: usize,
}

impl Proxy {
    /// Opens the cache directory and captures the fetch/freshness settings.
    pub async fn open(cfg: &ProxyConfig) -> anyhow::Result<Self> {
        let store = DiskStore::open(cfg.cache_dir()).await?;
        Ok(Self {
            store,
            policy: FreshnessPolicy::new(Duration::from_secs(cfg.cache_ttl_secs())),
            timeouts: FetchTimeouts {
                connect: Duration::from_secs(cfg.connect_timeout_secs()),
                read: Duration::from_secs(cfg.upstream_read_timeout_secs()),
            },
            cache_max_entries: cfg.cache_max_entries(),
        })
    }

    /// Serves one request for `url`: a fresh cache hit goes out through the
    /// response writer; otherwise the origin is fetched, the entry stored,
    /// and the raw origin bytes relayed. Failures become one synthesized
    /// error response on `stream`.
    #[instrument(skip(self, stream), fields(%url))]
    pub async fn serve<S>(&self, stream: &mut S, url: &str) -> anyhow::Result<()>
    where
        S: AsyncWrite + Unpin + Send + ?Sized,
    {
        match self.try_serve(stream, url).await {
            Ok(()) => Ok(()),
            Err(err) => {
                let (status, reason) = err.status();
                warn!(target: "cachalot::proxy", %url, error = %err, status, "request failed");
                send_error(stream, status, reason).await
            }
        }
    }

    async fn try_serve<S>(&self, stream: &mut S, url: &str) -> Result<(), ProxyError>
    where
        S: AsyncWrite + Unpin + Send + ?Sized,
    {
        let key = CacheKey::from_url(url);

        if let Lookup::Fresh(payload) = self.store.lookup(&key, &self.policy).await {
            info!(target: "cachalot::proxy", %url, "serving from cache");
            let mime = mime_guess::from_path(url).first_or_octet_stream();
            send_response(stream, 200, "OK", &payload, mime.as_ref()).await?;
            return Ok(());
        }

        let (host, path) = parse_url(url);
        let response = fetch(&host, &path, &self.timeouts).await?;

        self.store
            .insert(&key, &response)
            .await
            .map_err(ProxyError::Internal)?;
        self.store.enforce_capacity(self.cache_max_entries).await;

        stream
            .write_all(&response)
            .await
            .map_err(|e| ProxyError::Internal(e.into()))?;
        stream
            .flush()
            .await
            .map_err(|e| ProxyError::Internal(e.into()))?;

        info!(target: "cachalot::proxy", %url, bytes = response.len(), "relayed origin response");
        Ok(())
    }
}
