use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::Duration;
use tracing::{debug, info, instrument};

use cachalot_config::CachalotConfig;
use cachalot_http::request::{parse_request_line, read_request_head};
use cachalot_http::response::send_error;
use cachalot_proxy::Proxy;
use cachalot_proxy::url::normalize_target;
use cachalot_static::serve_file;

pub trait ClientStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> ClientStream for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

/// Handles one proxy connection end to end: read the request head, parse
/// and validate the request line, resolve the target, then let the proxy
/// serve from cache or upstream. The connection closes when this returns,
/// on every path.
#[instrument(skip(stream, proxy, cfg), fields(client = %client_addr))]
pub async fn handle_proxy_connection<S>(
    mut stream: S,
    client_addr: SocketAddr,
    proxy: Arc<Proxy>,
    cfg: Arc<CachalotConfig>,
) -> anyhow::Result<()>
where
    S: ClientStream,
{
    let read_timeout = Duration::from_secs(cfg.proxy().client_read_timeout_secs());

    let Some(head) = read_request_head(&mut stream, read_timeout).await? else {
        debug!(target: "cachalot::worker", "client sent no data; closing");
        return Ok(());
    };

    let Some(req) = parse_request_line(&head) else {
        debug!(target: "cachalot::worker", "malformed request line");
        return send_error(&mut stream, 400, "Bad Request").await;
    };

    info!(
        target: "cachalot::worker",
        method = %req.method,
        request_target = %req.target,
        version = %req.version,
        "proxy request"
    );

    if req.method != "GET" {
        return send_error(&mut stream, 405, "Method Not Allowed").await;
    }

    let url = match normalize_target(&req.target) {
        Ok(url) => url,
        Err(_) => {
            debug!(target: "cachalot::worker", request_target = %req.target, "unrecognized target form");
            return send_error(&mut stream, 400, "Bad Request").await;
        }
    };

    proxy.serve(&mut stream, &url).await
}

/// Handles one static-server connection: same request-line rules, then a
/// file lookup under the document root.
#[instrument(skip(stream, cfg), fields(client = %client_addr))]
pub async fn handle_static_connection<S>(
    mut stream: S,
    client_addr: SocketAddr,
    cfg: Arc<CachalotConfig>,
) -> anyhow::Result<()>
where
    S: ClientStream,
{
    let site = cfg.static_site();
    let read_timeout = Duration::from_secs(site.client_read_timeout_secs());

    let Some(head) = read_request_head(&mut stream, read_timeout).await? else {
        debug!(target: "cachalot::worker", "client sent no data; closing");
        return Ok(());
    };

    let Some(req) = parse_request_line(&head) else {
        debug!(target: "cachalot::worker", "malformed request line");
        return send_error(&mut stream, 400, "Bad Request").await;
    };

    info!(
        target: "cachalot::worker",
        method = %req.method,
        request_target = %req.target,
        "static request"
    );

    if req.method != "GET" {
        return send_error(&mut stream, 405, "Method Not Allowed").await;
    }

    serve_file(&mut stream, site, &req.target).await
}
