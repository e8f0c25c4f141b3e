//! Static file serving for the document root.
//!
//! A request path resolves to a file under the configured root; the file is
//! read whole and sent through the response writer with a MIME type guessed
//! from its extension. No caching and no upstream dependency.

mod fs;

use std::io::ErrorKind;
use std::path::Path;

use tokio::io::AsyncWrite;
use tracing::{debug, warn};

use cachalot_config::StaticConfig;
use cachalot_http::response::{send_error, send_response};

use crate::fs::resolve_request_path;

/// Serves one GET for `req_path` from the configured document root.
pub async fn serve_file<S>(
    stream: &mut S,
    site: &StaticConfig,
    req_path: &str,
) -> anyhow::Result<()>
where
    S: AsyncWrite + Unpin + ?Sized,
{
    let Some(relative) = resolve_request_path(req_path, site.index()) else {
        debug!(target: "cachalot::static", %req_path, "unsafe or unresolvable path");
        return send_error(stream, 404, "Not Found").await;
    };

    let full = Path::new(site.root()).join(relative);
    match tokio::fs::read(&full).await {
        Ok(content) => {
            let mime = mime_guess::from_path(&full).first_or_octet_stream();
            debug!(
                target: "cachalot::static",
                path = %full.display(),
                bytes = content.len(),
                "serving file"
            );
            send_response(stream, 200, "OK", &content, mime.as_ref()).await
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(target: "cachalot::static", path = %full.display(), "file not found");
            send_error(stream, 404, "Not Found").await
        }
        Err(e) => {
            warn!(target: "cachalot::static", path = %full.display(), error = ?e, "read failed");
            send_error(stream, 500, "Internal Server Error").await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::serve_file;
    use cachalot_config::StaticConfig;
    use tokio::io::{AsyncReadExt, duplex};

    async fn request(root: &std::path::Path, req_path: &str) -> Vec<u8> {
        let site = StaticConfig {
            root: root.to_string_lossy().into_owned(),
            ..StaticConfig::default()
        };

        let (mut client, mut server) = duplex(1024 * 1024);
        serve_file(&mut server, &site, req_path).await.expect("serve");
        drop(server);
        let mut out = Vec::new();
        client.read_to_end(&mut out).await.expect("read response");
        out
    }

    #[tokio::test]
    async fn serves_index_for_root_with_html_mime() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("index.html"), "<p>hi</p>").expect("write");

        let out = request(dir.path(), "/").await;
        let head = String::from_utf8_lossy(&out);
        assert!(head.starts_with("HTTP/1.1 200 OK"));
        assert!(head.contains("Content-Type: text/html"));
        assert!(out.ends_with(b"<p>hi</p>"));
    }

    #[tokio::test]
    async fn missing_file_is_404() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = request(dir.path(), "/nope.html").await;
        assert!(out.starts_with(b"HTTP/1.1 404 Not Found"));
    }

    #[tokio::test]
    async fn traversal_is_404() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = request(dir.path(), "/../secret.txt").await;
        assert!(out.starts_with(b"HTTP/1.1 404 Not Found"));
    }
}
