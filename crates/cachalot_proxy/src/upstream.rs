use std::io;

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{Duration, timeout};
use tracing::{debug, instrument};

/// User-Agent sent on every upstream request.
pub const USER_AGENT: &str = "cachalot/0.1";

/// Default origin port when the URL carries none.
const HTTP_PORT: u16 = 80;

/// Connection-level upstream failures.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("connect to {addr} timed out")]
    ConnectTimeout { addr: String },

    #[error("connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("transfer from {addr} failed: {source}")]
    Transfer {
        addr: String,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct FetchTimeouts {
    pub connect: Duration,
    pub read: Duration,
}

/// Issues one GET to the origin and drains the connection to EOF.
///
/// The accumulated bytes are the origin's response verbatim (status line,
/// headers, body); nothing is reinterpreted. A connect timeout, a connect
/// failure, and a stalled or broken transfer each surface as their own
/// error — no partial response escapes this function.
#[instrument(skip(timeouts))]
pub async fn fetch(
    host: &str,
    path: &str,
    timeouts: &FetchTimeouts,
) -> Result<Vec<u8>, FetchError> {
    let addr = if host.contains(':') {
        host.to_string()
    } else {
        format!("{host}:{HTTP_PORT}")
    };

    let mut stream = match timeout(timeouts.connect, TcpStream::connect(&addr)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(source)) => return Err(FetchError::Connect { addr, source }),
        Err(_) => return Err(FetchError::ConnectTimeout { addr }),
    };

    debug!(target: "cachalot::proxy", upstream = %addr, %path, "connected to origin");

    let request = format!(
        "GET {path} HTTP/1.1\r\n\
         Host: {host}\r\n\
         Connection: close\r\n\
         User-Agent: {USER_AGENT}\r\n\
         \r\n"
    );
    if let Err(source) = stream.write_all(request.as_bytes()).await {
        return Err(FetchError::Transfer { addr, source });
    }

    let mut response = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = match timeout(timeouts.read, stream.read(&mut chunk)).await {
            Ok(Ok(n)) => n,
            Ok(Err(source)) => return Err(FetchError::Transfer { addr, source }),
            Err(_) => {
                return Err(FetchError::Transfer {
                    addr,
                    source: io::Error::new(io::ErrorKind::TimedOut, "origin read timed out"),
                });
            }
        };
        if n == 0 {
            break;
        }
        response.extend_from_slice(&chunk[..n]);
    }

    if response.is_empty() {
        return Err(FetchError::Transfer {
            addr,
            source: io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "origin closed without sending a response",
            ),
        });
    }

    debug!(
        target: "cachalot::proxy",
        upstream = %addr,
        bytes = response.len(),
        "origin response drained"
    );
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::{FetchError, FetchTimeouts, fetch};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::time::Duration;

    const ORIGIN_RESPONSE: &[u8] =
        b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello";

    fn timeouts() -> FetchTimeouts {
        FetchTimeouts {
            connect: Duration::from_secs(5),
            read: Duration::from_secs(5),
        }
    }

    async fn spawn_origin() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let mut req = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let Ok(n) = stream.read(&mut buf).await else {
                    return;
                };
                if n == 0 {
                    return;
                }
                req.extend_from_slice(&buf[..n]);
                if req.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let _ = stream.write_all(ORIGIN_RESPONSE).await;
        });
        format!("127.0.0.1:{}", addr.port())
    }

    #[tokio::test]
    async fn fetch_drains_origin_response_verbatim() {
        let host = spawn_origin().await;
        let response = fetch(&host, "/file.txt", &timeouts())
            .await
            .expect("expected response");
        assert_eq!(response, ORIGIN_RESPONSE);
    }

    #[tokio::test]
    async fn refused_connection_is_a_connect_error() {
        // Bind then drop to find a port with no listener behind it.
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);

        let host = format!("127.0.0.1:{}", addr.port());
        let err = fetch(&host, "/", &timeouts()).await.expect_err("expected error");
        assert!(matches!(err, FetchError::Connect { .. }));
    }

    #[tokio::test]
    async fn origin_closing_without_bytes_is_a_transfer_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            drop(stream);
        });

        let host = format!("127.0.0.1:{}", addr.port());
        let err = fetch(&host, "/", &timeouts()).await.expect_err("expected error");
        assert!(matches!(err, FetchError::Transfer { .. }));
    }
}
