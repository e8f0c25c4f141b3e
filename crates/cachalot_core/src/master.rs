use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use cachalot_config::CachalotConfig;
use cachalot_proxy::Proxy;

use crate::worker::{handle_proxy_connection, handle_static_connection};

/// Owns the listening sockets and the global connection limit; runs until
/// interrupted.
pub struct Master {
    cfg: Arc<CachalotConfig>,
}

impl Master {
    pub fn new(cfg: CachalotConfig) -> Self {
        Self { cfg: Arc::new(cfg) }
    }

    /// Binds both listeners, spawns their accept loops, and waits for an
    /// interrupt. On ctrl-c the accept loops are aborted (closing the
    /// listening sockets); in-flight connections are not awaited.
    #[instrument(skip(self), fields(
        max_connections = %self.cfg.global().max_connections(),
    ))]
    pub async fn run(self) -> anyhow::Result<()> {
        info!(target: "cachalot::master", "starting cachalot");

        // Global limit for concurrent connections across both listeners.
        let max_conns = self.cfg.global().max_connections() as usize;
        let semaphore = Arc::new(Semaphore::new(max_conns));
        info!(target: "cachalot::master", max_conns, "connection semaphore initialized");

        let proxy = Arc::new(Proxy::open(self.cfg.proxy()).await?);

        let proxy_listener = bind(self.cfg.proxy().listen()).await?;
        let static_listener = bind(self.cfg.static_site().listen()).await?;

        let mut accept_tasks: Vec<JoinHandle<()>> = Vec::new();

        {
            let semaphore = semaphore.clone();
            let proxy = proxy.clone();
            let cfg = self.cfg.clone();
            let addr = self.cfg.proxy().listen().to_string();
            accept_tasks.push(tokio::spawn(async move {
                if let Err(e) = accept_proxy_loop(proxy_listener, addr.clone(), semaphore, proxy, cfg).await
                {
                    error!(
                        target: "cachalot::master",
                        listen = %addr,
                        error = ?e,
                        "proxy accept loop exited with an error"
                    );
                }
            }));
        }

        {
            let semaphore = semaphore.clone();
            let cfg = self.cfg.clone();
            let addr = self.cfg.static_site().listen().to_string();
            accept_tasks.push(tokio::spawn(async move {
                if let Err(e) = accept_static_loop(static_listener, addr.clone(), semaphore, cfg).await {
                    error!(
                        target: "cachalot::master",
                        listen = %addr,
                        error = ?e,
                        "static accept loop exited with an error"
                    );
                }
            }));
        }

        info!(
            target: "cachalot::master",
            proxy = %self.cfg.proxy().listen(),
            static_site = %self.cfg.static_site().listen(),
            "listening (ctrl-c to stop)"
        );

        tokio::signal::ctrl_c().await?;
        warn!(target: "cachalot::master", "interrupt received; closing listeners");

        for task in &accept_tasks {
            task.abort();
        }

        Ok(())
    }
}

async fn bind(addr: &str) -> anyhow::Result<TcpListener> {
    match TcpListener::bind(addr).await {
        Ok(listener) => {
            info!(target: "cachalot::master", listen = %addr, "bind() successful");
            Ok(listener)
        }
        Err(e) => {
            error!(target: "cachalot::master", listen = %addr, error = ?e, "failed to bind listener");
            Err(e.into())
        }
    }
}

#[instrument(skip(listener, semaphore, proxy, cfg), fields(listen = %listen_addr))]
async fn accept_proxy_loop(
    listener: TcpListener,
    listen_addr: String,
    semaphore: Arc<Semaphore>,
    proxy: Arc<Proxy>,
    cfg: Arc<CachalotConfig>,
) -> anyhow::Result<()> {
    info!(target: "cachalot::master", "proxy accept loop started");

    loop {
        let (stream, addr) = match listener.accept().await {
            Ok(pair) => pair,
            Err(e) => {
                error!(target: "cachalot::master", error = ?e, "failed to accept connection");
                return Err(e.into());
            }
        };

        // Permits must be acquired via acquire_owned to move into the task.
        let permit = semaphore.clone().acquire_owned().await?;
        debug!(
            target: "cachalot::master",
            client_addr = %addr,
            available = semaphore.available_permits(),
            "proxy connection accepted"
        );

        let proxy = proxy.clone();
        let cfg = cfg.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_proxy_connection(stream, addr, proxy, cfg).await {
                error!(
                    target: "cachalot::worker",
                    client_addr = %addr,
                    error = ?e,
                    "error while handling proxy connection"
                );
            }
            drop(permit);
        });
    }
}

#[instrument(skip(listener, semaphore, cfg), fields(listen = %listen_addr))]
async fn accept_static_loop(
    listener: TcpListener,
    listen_addr: String,
    semaphore: Arc<Semaphore>,
    cfg: Arc<CachalotConfig>,
) -> anyhow::Result<()> {
    info!(target: "cachalot::master", "static accept loop started");

    loop {
        let (stream, addr) = match listener.accept().await {
            Ok(pair) => pair,
            Err(e) => {
                error!(target: "cachalot::master", error = ?e, "failed to accept connection");
                return Err(e.into());
            }
        };

        let permit = semaphore.clone().acquire_owned().await?;
        debug!(
            target: "cachalot::master",
            client_addr = %addr,
            available = semaphore.available_permits(),
            "static connection accepted"
        );

        let cfg = cfg.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_static_connection(stream, addr, cfg).await {
                error!(
                    target: "cachalot::worker",
                    client_addr = %addr,
                    error = ?e,
                    "error while handling static connection"
                );
            }
            drop(permit);
        });
    }
}
