use std::time::SystemTime;

use httpdate::fmt_http_date;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Server identifier sent on every synthesized response.
pub const SERVER_ID: &str = "cachalot/0.1";

/// Sends a complete HTTP response: status line, Date, Server,
/// Content-Length, Content-Type, Connection: close, blank line, body.
pub async fn send_response<S>(
    stream: &mut S,
    status: u16,
    reason: &str,
    body: &[u8],
    content_type: &str,
) -> anyhow::Result<()>
where
    S: AsyncWrite + Unpin + ?Sized,
{
    let head = format!(
        "HTTP/1.1 {status} {reason}\r\n\
         Date: {date}\r\n\
         Server: {SERVER_ID}\r\n\
         Content-Length: {length}\r\n\
         Content-Type: {content_type}\r\n\
         Connection: close\r\n\
         \r\n",
        date = fmt_http_date(SystemTime::now()),
        length = body.len(),
    );

    stream.write_all(head.as_bytes()).await?;
    stream.write_all(body).await?;
    stream.flush().await?;
    Ok(())
}

/// Sends a synthesized HTML error page for the given status.
pub async fn send_error<S>(stream: &mut S, status: u16, reason: &str) -> anyhow::Result<()>
where
    S: AsyncWrite + Unpin + ?Sized,
{
    let body = error_page(status, reason);
    send_response(stream, status, reason, body.as_bytes(), "text/html").await
}

/// Minimal HTML document naming the status code and reason.
pub fn error_page(status: u16, reason: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
             <title>{status} {reason}</title>\n\
         </head>\n\
         <body>\n\
             <h1>{status} {reason}</h1>\n\
             <p>Error occurred while processing your request.</p>\n\
         </body>\n\
         </html>\n"
    )
}
